use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::{ActionQuery, check_not_null},
    routes::{respond_json, respond_message},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::Response,
};
use tracing::debug;

pub const GROUP_ENDPOINT: &str = "/api/group";

/// Group membership, multiplexed on HTTP method: PUT joins, DELETE leaves,
/// GET lists membership entries the user has not yet countersigned.
pub async fn group(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["group", "selfid"]);
    let group = query.string("group");
    check_not_null(&group, "Group")?;
    let selfid = query.string("selfid");
    debug!(%method, group, selfid, "group");

    match method {
        Method::PUT => {
            let path = if selfid.is_empty() {
                format!("/p/?_joingroup&_group={group}")
            } else {
                format!("/p/?_joingroup&_group={group}&_selfid={selfid}")
            };
            let reply = state
                .origin
                .request(Method::PUT, &path, OriginAuth::session(&headers), None)
                .await?
                .classify()?;
            Ok(respond_json(reply))
        }
        Method::DELETE => {
            let reply = state
                .origin
                .request(
                    Method::DELETE,
                    &format!("/p/?_leavegroup&_group={group}"),
                    OriginAuth::session(&headers),
                    None,
                )
                .await?
                .classify()?;
            Ok(respond_message(
                StatusCode::OK,
                &reply,
                &format!("left the group. {group}"),
            ))
        }
        Method::GET => {
            let reply = state
                .origin
                .request(
                    Method::GET,
                    &format!("/p/?_nogroupmember&_group={group}"),
                    OriginAuth::session(&headers),
                    None,
                )
                .await?
                .classify()?;
            Ok(respond_json(reply))
        }
        other => Err(GatewayError::Validation(format!("invalid method. {other}"))),
    }
}
