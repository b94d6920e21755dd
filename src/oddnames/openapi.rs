use super::handlers::{consumer, health, provider};
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        consumer::root,
        consumer::request_phase,
        consumer::callback,
        consumer::callback_form,
        consumer::failure,
        provider::login_form,
        provider::authenticate,
    ),
    components(schemas(crate::handshake::IdentityRecord)),
    tags(
        (name = "consumer", description = "Relying party: request phase and callback verification"),
        (name = "provider", description = "Identity provider: user authentication and assertions"),
        (name = "health", description = "Service status"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
