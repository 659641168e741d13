use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::ActionQuery,
    reply::message_feed,
    routes::{respond_json, respond_message},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;

pub const SENDMESSAGE_ENDPOINT: &str = "/api/sendmessage";
pub const MESSAGEQUEUE_ENDPOINT: &str = "/api/messagequeue";

/// Echo a message back to the browser with the given status code. The one
/// action with no origin call at all; it exists so UI flows can exercise
/// their status handling.
pub async fn sendmessage(RawQuery(raw): RawQuery) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["status", "message"]);
    let status = query.number("status")?;
    let status = u16::try_from(status)
        .ok()
        .and_then(|status| StatusCode::from_u16(status).ok())
        .ok_or_else(|| GatewayError::Validation(format!("invalid status. {status}")))?;
    let message = query.string("message");
    debug!(status = status.as_u16(), message, "sendmessage");
    Ok((status, message_feed(&message)).into_response())
}

/// Message queue operations on a channel key, multiplexed on HTTP method:
/// GET fetches pending messages, POST queues new ones.
pub async fn messagequeue(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: String,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri"]);
    let uri = query.uri("uri")?;
    debug!(%method, uri, "messagequeue");

    match method {
        Method::GET => {
            let reply = state
                .origin
                .request(
                    Method::GET,
                    &format!("/p{uri}?_mq"),
                    OriginAuth::session(&headers),
                    None,
                )
                .await?
                .classify()?;
            Ok(respond_json(reply))
        }
        Method::POST => {
            let feed: Value = serde_json::from_str(&body)
                .map_err(|err| GatewayError::Validation(err.to_string()))?;
            let reply = state
                .origin
                .request(
                    Method::POST,
                    &format!("/p{uri}?_mq"),
                    OriginAuth::session(&headers),
                    Some(feed.to_string()),
                )
                .await?
                .classify()?;
            Ok(respond_message(
                StatusCode::OK,
                &reply,
                &format!("message queued. {uri}"),
            ))
        }
        other => Err(GatewayError::Validation(format!("invalid method. {other}"))),
    }
}
