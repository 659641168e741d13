use crate::error::GatewayError;
use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Header whose presence distinguishes programmatic calls from direct
/// navigation. Required on every /api route.
pub const MARKER_HEADER: &str = "x-requested-with";

pub async fn server_header(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().append(
        header::SERVER,
        HeaderValue::from_static(env!("CARGO_PKG_NAME")),
    );
    response
}

/// Marker-header gate. Requests without X-Requested-With are refused with an
/// empty 417 before any origin call is made.
pub async fn require_marker(request: Request, next: Next) -> Response {
    if request.headers().get(MARKER_HEADER).is_none() {
        debug!("refusing request without {MARKER_HEADER} header");
        return GatewayError::MissingMarker.into_response();
    }
    next.run(request).await
}
