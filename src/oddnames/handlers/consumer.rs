//! Relying-party endpoints: start the handshake, verify the callback, explain failures.

use super::found;
use crate::handshake::{
    encoding::{append_query, escape_html},
    CallbackParams, ErrorSignal, Handshake, IdentityRecord, OnlyOddNames,
};
use axum::{
    extract::{rejection::FormRejection, Extension, Form, Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::{IntoParams, ToSchema};

pub const FAILURE_PATH: &str = "/auth/failure";

/// Strategy plus the public URL the provider should send users back to.
#[derive(Debug, Clone)]
pub struct Consumer {
    strategy: OnlyOddNames,
    public_url: String,
}

impl Consumer {
    #[must_use]
    pub fn new(strategy: OnlyOddNames, public_url: impl Into<String>) -> Self {
        Self {
            strategy,
            public_url: public_url.into(),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> &OnlyOddNames {
        &self.strategy
    }

    #[must_use]
    pub fn callback_url(&self) -> String {
        self.strategy.callback_url(&self.public_url)
    }

    #[must_use]
    pub fn failure_url(&self, signal: ErrorSignal) -> String {
        append_query(
            FAILURE_PATH,
            &[("message", signal.key()), ("strategy", self.strategy.name())],
        )
    }

    fn serves(&self, provider: &str) -> bool {
        provider == self.strategy.name()
    }

    // Shared by the GET and POST callback handlers. The request phase was
    // served by an earlier request, so each callback resumes a redirected handshake.
    fn finish(&self, params: CallbackParams) -> Response {
        let mut handshake = Handshake::awaiting_callback(&self.strategy);
        match handshake.complete_auth(params) {
            Ok(record) => render_identity(&record),
            Err(e) => found(&self.failure_url(e.signal())),
        }
    }
}

fn render_identity(record: &IdentityRecord) -> Response {
    match serde_json::to_string_pretty(record) {
        Ok(dump) => Html(format!("<pre>{}</pre>", escape_html(&dump))).into_response(),
        Err(e) => {
            error!("Failed to serialize identity record: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 302, description = "Redirect to the strategy's request phase")
    ),
    tag = "consumer",
)]
pub async fn root(Extension(consumer): Extension<Arc<Consumer>>) -> Response {
    found(&consumer.strategy().request_path())
}

#[utoipa::path(
    get,
    path= "/auth/{provider}",
    params (
        ("provider" = String, Path, description = "Strategy name, `only_odd_names`")
    ),
    responses (
        (status = 302, description = "Redirect to the provider authorization endpoint"),
        (status = 404, description = "Unknown strategy")
    ),
    tag = "consumer",
)]
#[instrument(skip(consumer))]
pub async fn request_phase(
    Path(provider): Path<String>,
    Extension(consumer): Extension<Arc<Consumer>>,
) -> Response {
    if !consumer.serves(&provider) {
        return StatusCode::NOT_FOUND.into_response();
    }

    found(&consumer.strategy().begin_auth(&consumer.callback_url()))
}

#[utoipa::path(
    get,
    path= "/auth/{provider}/callback",
    params (
        ("provider" = String, Path, description = "Strategy name, `only_odd_names`"),
        CallbackParams
    ),
    responses (
        (status = 200, description = "Verified identity record", body = String, content_type = "text/html"),
        (status = 302, description = "Redirect to /auth/failure"),
        (status = 400, description = "Unexpected query parameters"),
        (status = 404, description = "Unknown strategy")
    ),
    tag = "consumer",
)]
#[instrument(skip(consumer, params))]
pub async fn callback(
    Path(provider): Path<String>,
    Extension(consumer): Extension<Arc<Consumer>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if !consumer.serves(&provider) {
        return StatusCode::NOT_FOUND.into_response();
    }

    consumer.finish(params)
}

#[utoipa::path(
    post,
    path= "/auth/{provider}/callback",
    params (
        ("provider" = String, Path, description = "Strategy name, `only_odd_names`"),
        CallbackParams
    ),
    request_body (content = CallbackParams, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Verified identity record", body = String, content_type = "text/html"),
        (status = 302, description = "Redirect to /auth/failure"),
        (status = 400, description = "Unexpected query or form fields"),
        (status = 404, description = "Unknown strategy")
    ),
    tag = "consumer",
)]
#[instrument(skip(consumer, query, form))]
pub async fn callback_form(
    Path(provider): Path<String>,
    Extension(consumer): Extension<Arc<Consumer>>,
    Query(query): Query<CallbackParams>,
    form: Result<Form<CallbackParams>, FormRejection>,
) -> Response {
    if !consumer.serves(&provider) {
        return StatusCode::NOT_FOUND.into_response();
    }

    // Body fields win over the query string; a POST without a form body is query-only.
    let params = match form {
        Ok(Form(body)) => body.or(query),
        Err(FormRejection::InvalidFormContentType(_)) => query,
        Err(rejection) => return rejection.into_response(),
    };

    consumer.finish(params)
}

#[derive(Deserialize, IntoParams, ToSchema, Debug, Default)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct FailureParams {
    /// Failure key: `user_auth`, `trust_failure`, anything else is unknown.
    pub message: Option<String>,
    pub strategy: Option<String>,
}

#[utoipa::path(
    get,
    path= "/auth/failure",
    params (FailureParams),
    responses (
        (status = 200, description = "Human readable failure message", body = String)
    ),
    tag = "consumer",
)]
#[instrument]
pub async fn failure(Query(params): Query<FailureParams>) -> impl IntoResponse {
    let signal = params
        .message
        .as_deref()
        .map_or(ErrorSignal::Unknown, ErrorSignal::from_key);

    (StatusCode::OK, signal.message())
}
