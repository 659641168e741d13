use crate::{AppState, error::GatewayError, origin::OriginAuth, routes::respond_json};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::Response,
};

pub const INDEX_ENDPOINT: &str = "/";
pub const HEALTH_ENDPOINT: &str = "/health";
pub const NOW_ENDPOINT: &str = "/api/now";

/// The origin's current server time, passed through as-is.
pub async fn now(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let reply = state
        .origin
        .request(Method::GET, "/d/?_now", OriginAuth::session(&headers), None)
        .await?
        .classify()?;
    Ok(respond_json(reply))
}

pub async fn index_handler() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"))
}

pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
