//! Identity provider endpoints. Could be served by a different host than the consumer.

use super::found;
use crate::handshake::Provider;
use axum::{
    extract::{Extension, Form, Query},
    response::{Html, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, Debug)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct LoginFormParams {
    /// Consumer callback to return to.
    pub redirect_uri: String,
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(deny_unknown_fields)]
pub struct AuthenticateForm {
    pub redirect_uri: String,
    pub username: String,
}

#[utoipa::path(
    get,
    path= "/provider/auth",
    params (LoginFormParams),
    responses (
        (status = 200, description = "Login form", body = String, content_type = "text/html"),
        (status = 400, description = "Missing redirect_uri")
    ),
    tag = "provider",
)]
#[instrument(skip(provider))]
pub async fn login_form(
    Extension(provider): Extension<Arc<Provider>>,
    Query(params): Query<LoginFormParams>,
) -> Html<String> {
    Html(provider.render_login_form(&params.redirect_uri))
}

#[utoipa::path(
    post,
    path= "/provider/auth",
    request_body (content = AuthenticateForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 302, description = "Redirect to redirect_uri with an assertion or an error"),
        (status = 400, description = "redirect_uri cannot be used as a Location header")
    ),
    tag = "provider",
)]
#[instrument(skip(provider, form))]
pub async fn authenticate(
    Extension(provider): Extension<Arc<Provider>>,
    Form(form): Form<AuthenticateForm>,
) -> Response {
    found(&provider.authenticate(&form.username, &form.redirect_uri))
}
