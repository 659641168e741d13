//! Crate for Feedgate, a backend-for-frontend gateway that translates
//! browser-facing requests into calls against a single feed/entry origin
//! service and reshapes the origin's JSON envelope for the browser.

#[cfg(feature = "rustls-tls")]
#[cfg(feature = "native-tls")]
compile_error!("You can only enable one TLS backend");

pub extern crate url;

mod error;
mod middleware;
mod origin;
mod params;
mod relay;
mod reply;
mod routes;

use crate::origin::OriginClient;
use anyhow::Result;
use axum::{
    Router, middleware as axum_middleware,
    routing::{any, delete, get, post, put},
};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    normalize_path::NormalizePathLayer,
    timeout::TimeoutLayer,
    trace::{self, TraceLayer},
};
use tracing::{Level, info};
use url::Url;

pub use error::GatewayError;

/// # Example
/// ```rust,no_run
/// use std::net::{SocketAddr, IpAddr, Ipv4Addr};
/// use feedgate::{FeedgateServer, FeedgateServerSettings, OriginSettings, url::Url};
///
/// # #[tokio::main]
/// # async fn main() {
/// let server = FeedgateServer::new(FeedgateServerSettings {
///     request_timeout: 30,
///     origin_settings: OriginSettings {
///         base_url: Url::parse("http://localhost:8080").unwrap(),
///         api_key: None,
///         request_timeout: 10,
///     },
/// })
/// .unwrap();
/// server.start(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 3600)).await.unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FeedgateServer {
    router_inner: Router,
}

/// Settings to run the Feedgate server with.
#[derive(Debug, Clone)]
pub struct FeedgateServerSettings {
    /// How long (in seconds) to allow an inbound request to be processed
    /// before it is abandoned and an error is sent to the browser.
    pub request_timeout: u64,
    /// See [`OriginSettings`].
    pub origin_settings: OriginSettings,
}

/// Configuration options used when making any call to the origin service.
///
/// Loaded once at process start and immutable thereafter; no environment
/// reads happen at call time.
#[derive(Debug, Clone)]
pub struct OriginSettings {
    /// Base URL of the origin service that owns data, sessions, and business
    /// logic. Outbound paths are appended to this verbatim.
    pub base_url: Url,
    /// Static API key attached to every origin call as
    /// `Authorization: APIKey <key>` when set.
    pub api_key: Option<String>,
    /// How long (in seconds) to wait for an origin call to complete before
    /// it's abandoned and an opaque error is sent back to the browser.
    pub request_timeout: u64,
}

#[derive(Debug, Clone)]
struct AppState {
    origin: OriginClient,
}

impl FeedgateServer {
    /// Create a new [`FeedgateServer`] using the provided
    /// [`FeedgateServerSettings`].
    pub fn new(settings: FeedgateServerSettings) -> Result<Self> {
        // Every /api route sits behind the marker-header gate; the index and
        // health routes are reachable without it.
        let api = Router::new()
            .route(routes::entry::GETENTRY_ENDPOINT, get(routes::entry::getentry))
            .route(routes::entry::GETFEED_ENDPOINT, get(routes::entry::getfeed))
            .route(routes::entry::GETCOUNT_ENDPOINT, get(routes::entry::getcount))
            .route(routes::entry::POSTENTRY_ENDPOINT, post(routes::entry::postentry))
            .route(routes::entry::PUTENTRY_ENDPOINT, put(routes::entry::putentry))
            .route(routes::entry::DELETEENTRY_ENDPOINT, delete(routes::entry::deleteentry))
            .route(routes::entry::DELETEFOLDER_ENDPOINT, delete(routes::entry::deletefolder))
            .route(routes::ids::ALLOCIDS_ENDPOINT, get(routes::ids::allocids))
            .route(routes::ids::ADDIDS_ENDPOINT, put(routes::ids::addids))
            .route(routes::ids::GETIDS_ENDPOINT, get(routes::ids::getids))
            .route(routes::ids::SETIDS_ENDPOINT, put(routes::ids::setids))
            .route(
                routes::ids::RANGEIDS_ENDPOINT,
                put(routes::ids::set_rangeids).get(routes::ids::get_rangeids),
            )
            .route(routes::session::SESSION_ENDPOINT, any(routes::session::session))
            .route(routes::paging::PAGING_ENDPOINT, get(routes::paging::paging))
            .route(routes::bigquery::BIGQUERY_ENDPOINT, any(routes::bigquery::bigquery))
            .route(routes::group::GROUP_ENDPOINT, any(routes::group::group))
            .route(routes::signature::SIGNATURE_ENDPOINT, any(routes::signature::signature))
            .route(routes::message::MESSAGEQUEUE_ENDPOINT, any(routes::message::messagequeue))
            .route(routes::message::SENDMESSAGE_ENDPOINT, get(routes::message::sendmessage))
            .route(routes::auth::LOGIN_ENDPOINT, get(routes::auth::login))
            .route(routes::auth::LOGOUT_ENDPOINT, get(routes::auth::logout))
            .route(routes::auth::UID_ENDPOINT, get(routes::auth::uid))
            .route(routes::auth::WHOAMI_ENDPOINT, get(routes::auth::whoami))
            .route(routes::auth::ISLOGGEDIN_ENDPOINT, get(routes::auth::isloggedin))
            .route(routes::log::LOG_ENDPOINT, post(routes::log::log))
            .route(routes::misc::NOW_ENDPOINT, get(routes::misc::now))
            .route_layer(axum_middleware::from_fn(middleware::require_marker));

        let router = Router::new()
            .merge(api)
            .route(routes::misc::INDEX_ENDPOINT, get(routes::misc::index_handler))
            .route(routes::misc::HEALTH_ENDPOINT, get(routes::misc::health_handler))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(
                settings.request_timeout,
            )))
            .layer(NormalizePathLayer::trim_trailing_slash())
            .layer(CatchPanicLayer::new())
            .layer(axum_middleware::from_fn(middleware::server_header))
            .with_state(AppState {
                origin: OriginClient::new(&settings.origin_settings)?,
            });

        Ok(Self {
            router_inner: router,
        })
    }

    /// Start the server and expose it on the provided [`SocketAddr`].
    pub async fn start(self, address: &SocketAddr) -> Result<()> {
        let tcp_listener = TcpListener::bind(&address).await?;
        info!("Listening on http://{}", tcp_listener.local_addr()?);
        axum::serve(tcp_listener, self.router_inner)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("failed to listen for ctrl-c");
            })
            .await?;

        Ok(())
    }

    /// Consume the server and return its [`Router`], for embedding into an
    /// existing axum application or driving it directly in tests.
    pub fn into_router(self) -> Router {
        self.router_inner
    }
}
