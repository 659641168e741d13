use crate::reply::message_feed;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Failure classes a handler can surface to the browser.
///
/// Validation failures short-circuit before any origin call; origin-reported
/// failures are relayed verbatim; everything else collapses to an opaque 503
/// so transport details never leak to the browser.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Inbound request is missing the X-Requested-With marker header.
    #[error("X-Requested-With header is required")]
    MissingMarker,
    /// Parameter validation failed; no origin call was made.
    #[error("{0}")]
    Validation(String),
    /// The origin service reported a failure. Carries the headers to relay so
    /// a rotated session cookie still reaches the browser.
    #[error("origin error: status={status} {message}")]
    Origin {
        /// Numeric status reported by the origin, echoed to the browser.
        status: StatusCode,
        /// Message extracted from the origin's envelope, or a fallback
        /// embedding the numeric status.
        message: String,
        /// Set-Cookie values relayed alongside the error.
        headers: HeaderMap,
    },
    /// The origin call itself failed (connect, timeout, body read).
    #[error("origin request error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::MissingMarker => StatusCode::EXPECTATION_FAILED.into_response(),
            GatewayError::Validation(message) => {
                (StatusCode::BAD_REQUEST, message_feed(&message)).into_response()
            }
            GatewayError::Origin {
                status,
                message,
                headers,
            } => (status, headers, message_feed(&message)).into_response(),
            GatewayError::Transport(err) => {
                warn!("origin request failed: {err}");
                (StatusCode::SERVICE_UNAVAILABLE, message_feed("Error occured.")).into_response()
            }
        }
    }
}
