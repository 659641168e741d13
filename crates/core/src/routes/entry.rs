use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::{ActionQuery, append_marker, check_uri},
    routes::{respond_json, respond_message},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::Response,
};
use serde_json::Value;
use tracing::debug;

pub const GETENTRY_ENDPOINT: &str = "/api/getentry";
pub const GETFEED_ENDPOINT: &str = "/api/getfeed";
pub const GETCOUNT_ENDPOINT: &str = "/api/getcount";
pub const POSTENTRY_ENDPOINT: &str = "/api/postentry";
pub const PUTENTRY_ENDPOINT: &str = "/api/putentry";
pub const DELETEENTRY_ENDPOINT: &str = "/api/deleteentry";
pub const DELETEFOLDER_ENDPOINT: &str = "/api/deletefolder";

/// GET a single entry by key.
pub async fn getentry(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["key"]);
    let key = query.uri("key")?;
    debug!(key, "getentry");
    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{key}?e"),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_json(reply))
}

/// GET a feed (entry list) by key plus search conditions, which are forwarded
/// to the origin untouched.
pub async fn getfeed(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri"]);
    let requesturi = query.uri_with_leftover("uri")?;
    debug!(requesturi, "getfeed");
    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{}", append_marker(&requesturi, "f")),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_json(reply))
}

/// GET the number of entries matching a key plus search conditions.
pub async fn getcount(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri"]);
    let requesturi = query.uri_with_leftover("uri")?;
    debug!(requesturi, "getcount");
    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{}", append_marker(&requesturi, "c")),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(super::respond_title(reply))
}

/// POST new entries. The optional `key` parameter supplies a parent key for
/// entries that don't carry their own.
pub async fn postentry(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: String,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["key"]);
    let key = query.string("key");
    if !key.is_empty() {
        check_uri(&key, "Key")?;
    }
    let feed = parse_feed(&body)?;
    debug!(key, "postentry");
    let path = if key.is_empty() {
        "/p/?e".to_string()
    } else {
        format!("/p{key}?e")
    };
    let reply = state
        .origin
        .request(
            Method::POST,
            &path,
            OriginAuth::session(&headers),
            Some(feed.to_string()),
        )
        .await?
        .classify()?;
    Ok(respond_json(reply))
}

/// PUT updated entries.
pub async fn putentry(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, GatewayError> {
    let feed = parse_feed(&body)?;
    debug!("putentry");
    let reply = state
        .origin
        .request(
            Method::PUT,
            "/p/?e",
            OriginAuth::session(&headers),
            Some(feed.to_string()),
        )
        .await?
        .classify()?;
    Ok(respond_json(reply))
}

/// DELETE a single entry, optionally pinned to a revision via `r`.
pub async fn deleteentry(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["key", "r"]);
    let key = query.uri("key")?;
    let revision = query.number_opt("r")?;
    debug!(key, ?revision, "deleteentry");
    let path = match revision {
        Some(revision) => format!("/p{key}?e&r={revision}"),
        None => format!("/p{key}?e"),
    };
    let reply = state
        .origin
        .request(Method::DELETE, &path, OriginAuth::session(&headers), None)
        .await?
        .classify()?;
    Ok(respond_message(
        StatusCode::OK,
        &reply,
        &format!("entry deleted. {key}"),
    ))
}

/// DELETE a folder (the key and everything under it). With the `_async` flag
/// the origin only accepts the request, and the browser gets a 202.
pub async fn deletefolder(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "_async"]);
    let uri = query.uri("uri")?;
    let run_async = query.flag("_async");
    debug!(uri, run_async, "deletefolder");
    let path = if run_async {
        format!("/p{uri}?_rf&_async")
    } else {
        format!("/p{uri}?_rf")
    };
    let reply = state
        .origin
        .request(Method::DELETE, &path, OriginAuth::session(&headers), None)
        .await?
        .classify()?;
    Ok(if run_async {
        respond_message(
            StatusCode::ACCEPTED,
            &reply,
            &format!("folder deleted. (accepted) {uri}"),
        )
    } else {
        respond_message(StatusCode::OK, &reply, &format!("folder deleted. {uri}"))
    })
}

/// Request bodies for entry registration must at least be well-formed JSON;
/// a malformed body is a browser-side mistake, not an origin failure.
fn parse_feed(body: &str) -> Result<Value, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::Validation("Feed is required.".to_string()));
    }
    serde_json::from_str(body).map_err(|err| GatewayError::Validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_rejects_empty_and_malformed_bodies() {
        assert!(matches!(
            parse_feed(""),
            Err(GatewayError::Validation(message)) if message == "Feed is required."
        ));
        assert!(matches!(parse_feed("{oops"), Err(GatewayError::Validation(_))));
        assert!(parse_feed(r#"{"feed":{"entry":[]}}"#).is_ok());
    }
}
