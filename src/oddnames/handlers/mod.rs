pub mod consumer;
pub use self::consumer::Consumer;

pub mod health;
pub use self::health::health;

pub mod provider;

// common functions for the handlers
use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

/// `302 Found` to `location`, or `400` if it cannot be sent as a header.
pub fn found(location: &str) -> Response {
    match HeaderValue::try_from(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(e) => {
            warn!("Refusing redirect target: {}", e);
            (StatusCode::BAD_REQUEST, "invalid redirect target").into_response()
        }
    }
}
