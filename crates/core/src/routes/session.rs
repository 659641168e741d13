use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::{ActionQuery, check_not_null},
    routes::{respond_json, respond_message, respond_title},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::Response,
};
use tracing::debug;

pub const SESSION_ENDPOINT: &str = "/api/session";

/// Session key-value operations, multiplexed on HTTP method and the value
/// `type` parameter (feed, entry, string, long).
///
/// - PUT stores a value under `name` (`incr` flag: add `num` to a numeric
///   slot and echo the result).
/// - GET reads the value back (feed/entry as JSON, string/long as a title).
/// - DELETE removes it.
///
/// The session itself lives in the origin; this layer only shapes the call.
pub async fn session(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: String,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["type", "name", "num", "value", "incr"]);
    let name = query.string("name");
    check_not_null(&name, "Name")?;

    if method == Method::PUT && query.flag("incr") {
        let num = query.number("num")?;
        debug!(name, num, "session increment");
        let reply = state
            .origin
            .request(
                Method::PUT,
                &format!("/p?_sessionincr={name}&_num={num}"),
                OriginAuth::session(&headers),
                None,
            )
            .await?
            .classify()?;
        return Ok(respond_title(reply));
    }

    let value_type = query.string("type");
    let path = match value_type.as_str() {
        "feed" => format!("/p?_sessionfeed={name}"),
        "entry" => format!("/p?_sessionentry={name}"),
        "string" => format!("/p?_sessionstring={name}"),
        "long" => format!("/p?_sessionlong={name}"),
        other => {
            return Err(GatewayError::Validation(format!(
                "invalid session type. {other}"
            )));
        }
    };
    debug!(%method, name, value_type, "session");

    match method {
        Method::PUT => {
            let envelope = put_envelope(&value_type, &query, &body)?;
            let reply = state
                .origin
                .request(
                    Method::PUT,
                    &path,
                    OriginAuth::session(&headers),
                    Some(envelope),
                )
                .await?
                .classify()?;
            Ok(respond_message(
                StatusCode::OK,
                &reply,
                &format!("session updated. {name}"),
            ))
        }
        Method::GET => {
            let reply = state
                .origin
                .request(Method::GET, &path, OriginAuth::session(&headers), None)
                .await?
                .classify()?;
            Ok(match value_type.as_str() {
                "feed" | "entry" => respond_json(reply),
                _ => respond_title(reply),
            })
        }
        Method::DELETE => {
            let reply = state
                .origin
                .request(Method::DELETE, &path, OriginAuth::session(&headers), None)
                .await?
                .classify()?;
            Ok(respond_message(
                StatusCode::OK,
                &reply,
                &format!("session deleted. {name}"),
            ))
        }
        other => Err(GatewayError::Validation(format!("invalid method. {other}"))),
    }
}

/// Build the stored-value envelope for a session PUT. Feeds travel as-is;
/// entries, strings, and numbers are wrapped the way the origin expects them.
fn put_envelope(
    value_type: &str,
    query: &ActionQuery,
    body: &str,
) -> Result<String, GatewayError> {
    match value_type {
        "feed" => {
            check_not_null(body, "Feed")?;
            let feed: serde_json::Value = serde_json::from_str(body)
                .map_err(|err| GatewayError::Validation(err.to_string()))?;
            Ok(feed.to_string())
        }
        "entry" => {
            check_not_null(body, "Entry")?;
            let entry: serde_json::Value = serde_json::from_str(body)
                .map_err(|err| GatewayError::Validation(err.to_string()))?;
            Ok(serde_json::json!({ "feed": { "entry": entry } }).to_string())
        }
        "string" => {
            let value = query.string("value");
            check_not_null(&value, "String")?;
            Ok(serde_json::json!({ "feed": { "title": value } }).to_string())
        }
        // "long": the stored value is numeric, so it is validated as such.
        _ => {
            let num = query.number("num")?;
            Ok(serde_json::json!({ "feed": { "title": num } }).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_envelope_wraps_values_per_type() {
        let query = ActionQuery::parse(Some("value=hello&num=12"), &["value", "num"]);
        assert_eq!(
            put_envelope("string", &query, "").unwrap(),
            r#"{"feed":{"title":"hello"}}"#
        );
        assert_eq!(
            put_envelope("long", &query, "").unwrap(),
            r#"{"feed":{"title":12}}"#
        );
        assert_eq!(
            put_envelope("entry", &query, r#"{"title":"x"}"#).unwrap(),
            r#"{"feed":{"entry":{"title":"x"}}}"#
        );
    }

    #[test]
    fn test_put_envelope_requires_values() {
        let query = ActionQuery::parse(None, &["value", "num"]);
        assert!(put_envelope("feed", &query, "").is_err());
        assert!(put_envelope("string", &query, "").is_err());
        assert!(put_envelope("long", &query, "").is_err());
    }
}
