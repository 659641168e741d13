use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use feedgate::{FeedgateServer, FeedgateServerSettings, OriginSettings, url::Url};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
struct AppOptions {
    /// Internet socket address that the server should be ran on.
    #[arg(
        long = "address",
        env = "FEEDGATE_ADDRESS",
        default_value = "127.0.0.1:3600"
    )]
    address: SocketAddr,

    /// Maximum waiting time before an inbound request is aborted.
    #[arg(
        long = "request-timeout",
        env = "FEEDGATE_REQUEST_TIMEOUT",
        default_value = "30s"
    )]
    request_timeout: humantime::Duration,

    /// Base URL of the origin service that owns data, sessions, and business logic.
    #[arg(long = "origin-url", env = "FEEDGATE_ORIGIN_URL")]
    origin_url: Url,

    /// Static API key sent to the origin as 'Authorization: APIKey <key>' on every call.
    #[arg(long = "origin-api-key", env = "FEEDGATE_ORIGIN_APIKEY")]
    origin_api_key: Option<String>,

    /// Maximum waiting time before a call to the origin is aborted.
    #[arg(
        long = "origin-request-timeout",
        env = "FEEDGATE_ORIGIN_REQUEST_TIMEOUT",
        default_value = "10s"
    )]
    origin_request_timeout: humantime::Duration,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info")))
        .init();
    let args = AppOptions::parse();

    FeedgateServer::new(FeedgateServerSettings {
        request_timeout: args.request_timeout.as_secs(),
        origin_settings: OriginSettings {
            base_url: args.origin_url,
            api_key: args.origin_api_key,
            request_timeout: args.origin_request_timeout.as_secs(),
        },
    })?
    .start(&args.address)
    .await
}
