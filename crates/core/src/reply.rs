use crate::{error::GatewayError, relay};
use axum::{
    Json,
    http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use serde_json::Value;

/// Buffered response from the origin service, before classification.
#[derive(Debug)]
pub struct OriginReply {
    /// Status code reported by the origin.
    pub status: StatusCode,
    /// Origin response headers (source of the relayed Set-Cookie values).
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Bytes,
}

impl OriginReply {
    /// Whether the origin reported a failure (status >= 400).
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    /// The reply body as JSON. A 204 reply, an empty body, and a body that
    /// fails to parse are all treated as "no content" rather than errors.
    pub fn json(&self) -> Option<Value> {
        if self.status == StatusCode::NO_CONTENT || self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// The envelope's feed.title, as text.
    pub fn title(&self) -> Option<String> {
        let json = self.json()?;
        let title = json.get("feed")?.get("title")?;
        match title {
            Value::String(title) => Some(title.clone()),
            Value::Number(title) => Some(title.to_string()),
            _ => None,
        }
    }

    /// Human-readable message for an error reply: the envelope's feed.title
    /// when present, otherwise a fallback embedding the numeric status.
    pub fn error_message(&self) -> String {
        self.title()
            .unwrap_or_else(|| format!("status={}", self.status.as_u16()))
    }

    /// Classify the reply. Origin-reported failures become
    /// [`GatewayError::Origin`], carrying the relayable headers so a rotated
    /// session cookie still reaches the browser alongside the error.
    pub fn classify(self) -> Result<Self, GatewayError> {
        if self.is_error() {
            Err(GatewayError::Origin {
                status: self.status,
                message: self.error_message(),
                headers: relay::session_headers(&self.headers),
            })
        } else {
            Ok(self)
        }
    }
}

/// The `{"feed": {"title": <message>}}` acknowledgement envelope.
pub fn message_feed(message: &str) -> Json<Value> {
    Json(serde_json::json!({ "feed": { "title": message } }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: StatusCode, body: &str) -> OriginReply {
        OriginReply {
            status,
            headers: HeaderMap::new(),
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    #[test]
    fn test_no_content_is_never_parsed() {
        // A 204 reply is empty by definition, even if bytes are present.
        assert_eq!(reply(StatusCode::NO_CONTENT, "not json").json(), None);
        assert_eq!(reply(StatusCode::OK, "").json(), None);
    }

    #[test]
    fn test_malformed_success_body_is_empty_result() {
        assert_eq!(reply(StatusCode::OK, "<html>oops</html>").json(), None);
    }

    #[test]
    fn test_title_extraction() {
        assert_eq!(
            reply(StatusCode::OK, r#"{"feed":{"title":"/foo/bar"}}"#).title(),
            Some("/foo/bar".to_string())
        );
        assert_eq!(
            reply(StatusCode::OK, r#"{"feed":{"title":42}}"#).title(),
            Some("42".to_string())
        );
        assert_eq!(reply(StatusCode::OK, r#"{"feed":{}}"#).title(), None);
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            reply(StatusCode::CONFLICT, r#"{"feed":{"title":"X"}}"#).error_message(),
            "X"
        );
        assert_eq!(
            reply(StatusCode::INTERNAL_SERVER_ERROR, "boom").error_message(),
            "status=500"
        );
    }

    #[test]
    fn test_classify_relays_origin_error() {
        let mut headers = HeaderMap::new();
        headers.insert("set-cookie", "SID=abc".parse().unwrap());
        let reply = OriginReply {
            status: StatusCode::FORBIDDEN,
            headers,
            body: Bytes::from_static(br#"{"feed":{"title":"denied"}}"#),
        };
        match reply.classify() {
            Err(GatewayError::Origin {
                status,
                message,
                headers,
            }) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "denied");
                assert_eq!(headers.get("set-cookie").unwrap(), "SID=abc");
            }
            other => panic!("expected origin error, got {other:?}"),
        }
    }
}
