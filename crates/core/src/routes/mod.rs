pub mod auth;
pub mod bigquery;
pub mod entry;
pub mod group;
pub mod ids;
pub mod log;
pub mod message;
pub mod misc;
pub mod paging;
pub mod session;
pub mod signature;

use crate::{
    relay,
    reply::{OriginReply, message_feed},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 200 + JSON passthrough, or 204 when the origin reply carries no content.
/// Session cookies are relayed either way.
pub(crate) fn respond_json(reply: OriginReply) -> Response {
    let relayed = relay::session_headers(&reply.headers);
    match reply.json() {
        Some(json) => (StatusCode::OK, relayed, axum::Json(json)).into_response(),
        None => (StatusCode::NO_CONTENT, relayed).into_response(),
    }
}

/// Acknowledgement with a fixed message and status (200 for the common case,
/// 202 for accepted-async variants).
pub(crate) fn respond_message(status: StatusCode, reply: &OriginReply, message: &str) -> Response {
    (
        status,
        relay::session_headers(&reply.headers),
        message_feed(message),
    )
        .into_response()
}

/// The success reply's feed.title echoed back as an acknowledgement message.
pub(crate) fn respond_title(reply: OriginReply) -> Response {
    let message = reply.title().unwrap_or_default();
    respond_message(StatusCode::OK, &reply, &message)
}

/// The success reply's feed.title as a message, or 204 when it is absent.
pub(crate) fn respond_title_or_no_content(reply: OriginReply) -> Response {
    match reply.title() {
        Some(title) => respond_message(StatusCode::OK, &reply, &title),
        None => (StatusCode::NO_CONTENT, relay::session_headers(&reply.headers)).into_response(),
    }
}
