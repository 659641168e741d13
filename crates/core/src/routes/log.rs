use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    routes::respond_message,
};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

pub const LOG_ENDPOINT: &str = "/api/log";

const DEFAULT_TITLE: &str = "feedgate";
const DEFAULT_SUBTITLE: &str = "INFO";

#[derive(Debug, Deserialize)]
struct LogEntry {
    title: Option<String>,
    subtitle: Option<String>,
    summary: Option<String>,
}

/// Register a log entry with the origin's server-side log. The body is an
/// array of entries; only the first is used, with the summary as the message.
pub async fn log(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, GatewayError> {
    let entries: Vec<LogEntry> =
        serde_json::from_str(&body).map_err(|err| GatewayError::Validation(err.to_string()))?;
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Validation("Message is required.".to_string()))?;
    let message = entry
        .summary
        .filter(|message| !message.is_empty())
        .ok_or_else(|| GatewayError::Validation("Message is required.".to_string()))?;
    let title = entry.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let subtitle = entry
        .subtitle
        .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string());
    debug!(title, subtitle, "log");

    let envelope = serde_json::json!([
        { "title": title, "subtitle": subtitle, "summary": message }
    ]);
    let reply = state
        .origin
        .request(
            Method::POST,
            "/p/?_log",
            OriginAuth::session(&headers),
            Some(envelope.to_string()),
        )
        .await?
        .classify()?;
    Ok(respond_message(StatusCode::OK, &reply, "post log entry."))
}
