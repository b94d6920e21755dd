use crate::{
    cli::globals::GlobalArgs,
    handshake::{AssertionDigest, OnlyOddNames, Provider, PROVIDER_AUTH_PATH},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod handlers;
use self::handlers::{consumer, health, provider, Consumer};

mod openapi;
pub use self::openapi::ApiDoc;

/// Consumer and provider routes, without middleware.
#[must_use]
pub fn router(consumer: Arc<Consumer>, provider: Arc<Provider>) -> Router {
    Router::new()
        .route("/", get(consumer::root))
        .route(consumer::FAILURE_PATH, get(consumer::failure))
        .route("/auth/:provider", get(consumer::request_phase))
        .route(
            "/auth/:provider/callback",
            get(consumer::callback).post(consumer::callback_form),
        )
        .route(
            PROVIDER_AUTH_PATH,
            get(provider::login_form).post(provider::authenticate),
        )
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(Extension(consumer))
        .layer(Extension(provider))
}

/// Full application: both parties share the secret from `globals`.
///
/// # Errors
/// Returns an error if the secret cannot key the configured digest.
pub fn app(globals: &GlobalArgs) -> Result<Router> {
    let digest = AssertionDigest::new(&globals.secret, globals.digest)
        .context("Failed to initialize assertion digest")?;

    let strategy = OnlyOddNames::new(digest.clone(), globals.provider_url.clone());
    let consumer = Arc::new(Consumer::new(strategy, globals.public_url.clone()));
    let provider = Arc::new(Provider::new(digest));

    let app = router(consumer, provider).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    Ok(app)
}

/// Serve until Ctrl-C.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, globals: &GlobalArgs) -> Result<()> {
    let app = app(globals)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, method = %request.method(), request_id)
}
