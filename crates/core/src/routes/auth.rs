use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::ActionQuery,
    relay,
    reply::message_feed,
    routes::{respond_json, respond_message, respond_title},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

pub const LOGIN_ENDPOINT: &str = "/api/login";
pub const LOGOUT_ENDPOINT: &str = "/api/logout";
pub const UID_ENDPOINT: &str = "/api/uid";
pub const WHOAMI_ENDPOINT: &str = "/api/whoami";
pub const ISLOGGEDIN_ENDPOINT: &str = "/api/isloggedin";

/// Log in with WSSE credentials carried in the X-WSSE header. No cookie is
/// forwarded; on success the origin's Set-Cookie establishes the session.
///
/// Login success collapses to a boolean derived purely from the origin
/// status: < 400 means logged in, anything else means the credentials were
/// refused. Both cases answer 200.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Result<Response, GatewayError> {
    let Some(wsse) = headers.get("x-wsse") else {
        return Err(GatewayError::Validation(
            "Authentication is required.".to_string(),
        ));
    };
    // The recaptcha token is forwarded, never verified here.
    let query = ActionQuery::parse(raw.as_deref(), &["g-recaptcha-token"]);
    let path = match query.get("g-recaptcha-token") {
        Some(token) if !token.is_empty() => format!("/d/?_login&g-recaptcha-token={token}"),
        _ => "/d/?_login".to_string(),
    };
    let reply = state
        .origin
        .request(Method::GET, &path, OriginAuth::Wsse(wsse), None)
        .await?;
    let logged_in = reply.status.as_u16() < 400;
    info!(status = reply.status.as_u16(), logged_in, "login");
    let message = if logged_in { "Logged in!" } else { "login failed." };
    let relayed = relay::login_headers(&reply.headers);
    let mut response = (StatusCode::OK, message_feed(message)).into_response();
    for (name, value) in &relayed {
        if name == header::CONTENT_TYPE {
            response.headers_mut().insert(name.clone(), value.clone());
        } else {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
    Ok(response)
}

/// Log out; the origin clears the session cookie via Set-Cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let reply = state
        .origin
        .request(
            Method::GET,
            "/d/?_logout",
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_message(StatusCode::OK, &reply, "Logged out!"))
}

/// The logged-in user's uid, echoed from the origin reply title.
pub async fn uid(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let reply = state
        .origin
        .request(Method::GET, "/d/?_uid", OriginAuth::session(&headers), None)
        .await?
        .classify()?;
    Ok(respond_title(reply))
}

/// Full login user information, passed through as-is.
pub async fn whoami(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let reply = state
        .origin
        .request(
            Method::GET,
            "/d/?_whoami",
            OriginAuth::session(&headers),
            None,
        )
        .await?
        .classify()?;
    Ok(respond_json(reply))
}

/// Whether the browser holds a live session, defined as "the uid call
/// succeeds". Any failure at all, origin-reported or transport, reads as
/// not-logged-in; the browser only ever sees 200 true/false.
pub async fn isloggedin(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = state
        .origin
        .request(Method::GET, "/d/?_uid", OriginAuth::session(&headers), None)
        .await;
    match result {
        Ok(reply) => {
            let logged_in = !reply.is_error();
            respond_message(
                StatusCode::OK,
                &reply,
                if logged_in { "true" } else { "false" },
            )
        }
        Err(err) => {
            debug!("isloggedin treated failure as logged-out: {err}");
            (StatusCode::OK, message_feed("false")).into_response()
        }
    }
}
