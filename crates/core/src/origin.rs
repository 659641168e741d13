use crate::{OriginSettings, error::GatewayError, reply::OriginReply};
use anyhow::Result;
use axum::http::{HeaderMap, HeaderValue, Method, header};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Value of the outbound marker header attached to every origin call.
const REQUESTED_WITH: &str = "XMLHttpRequest";

/// Credentials attached to an outbound origin call.
#[derive(Debug)]
pub enum OriginAuth<'a> {
    /// Forward the inbound request's Cookie header verbatim, preserving the
    /// browser's session without this layer holding any session state.
    Session(Option<&'a HeaderValue>),
    /// WSSE credential header, used only by login to establish a new session.
    /// No cookie is forwarded in this mode.
    Wsse(&'a HeaderValue),
}

impl<'a> OriginAuth<'a> {
    /// Session auth from the inbound request's headers.
    pub fn session(headers: &'a HeaderMap) -> Self {
        OriginAuth::Session(headers.get(header::COOKIE))
    }
}

/// Client for the origin service. One outbound call per inbound request; no
/// retries, no fan-out.
#[derive(Debug, Clone)]
pub struct OriginClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl OriginClient {
    /// Create a client from immutable [`OriginSettings`].
    pub fn new(settings: &OriginSettings) -> Result<Self> {
        let http = reqwest::ClientBuilder::default()
            .redirect(Policy::none())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(settings.request_timeout))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Issue the outbound call and buffer the reply. `path_and_query` is
    /// appended to the configured base URL verbatim.
    ///
    /// Network failures surface as [`GatewayError::Transport`]; origin error
    /// statuses are not distinguished here (that's the translator's job).
    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        auth: OriginAuth<'_>,
        body: Option<String>,
    ) -> Result<OriginReply, GatewayError> {
        let url = format!(
            "{}{path_and_query}",
            self.base_url.as_str().trim_end_matches('/')
        );
        debug!(%method, url, "origin request");
        let mut request = self
            .http
            .request(method, &url)
            .header(header::HeaderName::from_static("x-requested-with"), REQUESTED_WITH);
        if let Some(api_key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("APIKey {api_key}"));
        }
        match auth {
            OriginAuth::Session(Some(cookie)) => {
                request = request.header(header::COOKIE, cookie.clone());
            }
            OriginAuth::Session(None) => {}
            OriginAuth::Wsse(wsse) => {
                request = request.header(header::HeaderName::from_static("x-wsse"), wsse.clone());
            }
        }
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), "origin reply");
        Ok(OriginReply {
            status,
            headers,
            body,
        })
    }
}
