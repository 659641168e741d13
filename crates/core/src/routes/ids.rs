use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::{ActionQuery, check_not_null},
    routes::respond_title,
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method},
    response::Response,
};
use tracing::debug;

pub const ALLOCIDS_ENDPOINT: &str = "/api/allocids";
pub const ADDIDS_ENDPOINT: &str = "/api/addids";
pub const GETIDS_ENDPOINT: &str = "/api/getids";
pub const SETIDS_ENDPOINT: &str = "/api/setids";
pub const RANGEIDS_ENDPOINT: &str = "/api/rangeids";

/// Allocate `num` numbers under a key. The reply title carries the allocated
/// numbers, comma separated when there is more than one.
pub async fn allocids(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "num"]);
    let uri = query.uri("uri")?;
    let num = query.number("num")?;
    debug!(uri, num, "allocids");
    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{uri}?_allocids={num}"),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_title(reply))
}

/// Add `num` to the counter under a key and echo the new value.
pub async fn addids(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "num"]);
    let uri = query.uri("uri")?;
    let num = query.number("num")?;
    debug!(uri, num, "addids");
    let reply = state
        .origin
        .request(
            Method::PUT,
            &format!("/p{uri}?_addids={num}"),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_title(reply))
}

/// Read the counter under a key.
pub async fn getids(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["key"]);
    let key = query.uri("key")?;
    debug!(key, "getids");
    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{key}?_getids"),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_title(reply))
}

/// Set the counter under a key and echo the stored value.
pub async fn setids(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["key", "num"]);
    let key = query.uri("key")?;
    let num = query.number("num")?;
    debug!(key, num, "setids");
    let reply = state
        .origin
        .request(
            Method::PUT,
            &format!("/p{key}?_setids={num}"),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_title(reply))
}

/// PUT an addition range for a key. The range travels in the request envelope
/// title rather than the query string.
pub async fn set_rangeids(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "range"]);
    let uri = query.uri("uri")?;
    let range = query.string("range");
    check_not_null(&range, "range")?;
    debug!(uri, range, "rangeids");
    let body = serde_json::json!({ "feed": { "title": range } });
    let reply = state
        .origin
        .request(
            Method::PUT,
            &format!("/p{uri}?_rangeids"),
            OriginAuth::session(&headers),
            Some(body.to_string()),
        )
        .await?
        .classify()?;
    Ok(respond_title(reply))
}

/// GET the addition range configured for a key.
pub async fn get_rangeids(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri"]);
    let uri = query.uri("uri")?;
    debug!(uri, "getrangeids");
    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{uri}?_rangeids"),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_title(reply))
}
