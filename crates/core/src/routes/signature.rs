use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::ActionQuery,
    routes::{respond_json, respond_title_or_no_content},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method},
    response::Response,
};
use serde_json::Value;
use tracing::debug;

pub const SIGNATURE_ENDPOINT: &str = "/api/signature";

/// Digital signature operations on an entry, multiplexed on HTTP method:
/// GET verifies, PUT signs (one revision, or several entries when a body is
/// supplied), DELETE revokes a signature on a revision.
pub async fn signature(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: String,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "r"]);
    let uri = query.uri("uri")?;
    debug!(%method, uri, "signature");

    match method {
        Method::GET => {
            let reply = state
                .origin
                .request(
                    Method::GET,
                    &format!("/p{uri}?_signature"),
                    OriginAuth::session(&headers),
                    None,
                )
                .await?
                .classify()?;
            Ok(respond_title_or_no_content(reply))
        }
        Method::PUT => {
            // A body means bulk signing; otherwise a single revision is
            // signed and `r` is mandatory.
            let (path, envelope) = if body.is_empty() {
                let revision = query.number("r")?;
                (format!("/p{uri}?_signature&r={revision}"), None)
            } else {
                let feed: Value = serde_json::from_str(&body)
                    .map_err(|err| GatewayError::Validation(err.to_string()))?;
                (format!("/p{uri}?_signature"), Some(feed.to_string()))
            };
            let reply = state
                .origin
                .request(Method::PUT, &path, OriginAuth::session(&headers), envelope)
                .await?
                .classify()?;
            Ok(respond_json(reply))
        }
        Method::DELETE => {
            let revision = query.number("r")?;
            let reply = state
                .origin
                .request(
                    Method::DELETE,
                    &format!("/p{uri}?_signature&r={revision}"),
                    OriginAuth::session(&headers),
                    None,
                )
                .await?
                .classify()?;
            Ok(respond_title_or_no_content(reply))
        }
        other => Err(GatewayError::Validation(format!("invalid method. {other}"))),
    }
}
