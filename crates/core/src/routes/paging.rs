use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::{ActionQuery, append_marker},
    routes::respond_json,
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method},
    response::Response,
};
use tracing::debug;

pub const PAGING_ENDPOINT: &str = "/api/paging";

/// Paginated listing. `_pagination=<range>` prepares page cursors for the
/// given range; `n=<page>` fetches one prepared page. Exactly one of the two
/// must be present; leftover search conditions forward untouched.
pub async fn paging(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "_pagination", "n"]);
    let requesturi = query.uri_with_leftover("uri")?;
    let pagerange = query.string("_pagination");

    let marker = if !pagerange.is_empty() {
        format!("_pagination={pagerange}")
    } else if query.get("n").is_some() {
        format!("n={}", query.number("n")?)
    } else {
        return Err(GatewayError::Validation(format!(
            "invalid paging type. uri={requesturi}"
        )));
    };
    debug!(requesturi, marker, "paging");

    let reply = state
        .origin
        .request(
            Method::GET,
            &format!("/p{}", append_marker(&requesturi, &marker)),
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_json(reply))
}
