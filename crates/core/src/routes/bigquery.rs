use crate::{
    AppState,
    error::GatewayError,
    origin::OriginAuth,
    params::{ActionQuery, check_not_null, check_uri},
    relay,
    routes::{respond_json, respond_message},
};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;

pub const BIGQUERY_ENDPOINT: &str = "/api/bigquery";

const DEFAULT_CSV_FILENAME: &str = "query.csv";

/// BigQuery operations, multiplexed on HTTP method: PUT runs a query, POST
/// inserts rows, DELETE removes them. Insert and delete honor the `_async`
/// flag (origin accepts and the browser gets a 202).
pub async fn bigquery(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    body: String,
) -> Result<Response, GatewayError> {
    let query = ActionQuery::parse(raw.as_deref(), &["uri", "_async", "_csv", "tablenames"]);
    match method {
        Method::PUT => query_bq(&state, &headers, &query, &body).await,
        Method::POST => insert_bq(&state, &headers, &query, &body).await,
        Method::DELETE => delete_bq(&state, &headers, &query).await,
        other => Err(GatewayError::Validation(format!("invalid method. {other}"))),
    }
}

/// Run a query. The SQL travels in the envelope title, the parent key in the
/// subtitle, and bound parameters in the category array. The `_csv` flag
/// switches the response from a JSON envelope to a CSV attachment.
async fn query_bq(
    state: &AppState,
    headers: &HeaderMap,
    query: &ActionQuery,
    body: &str,
) -> Result<Response, GatewayError> {
    check_not_null(body, "Feed")?;
    let mut envelope: Value =
        serde_json::from_str(body).map_err(|err| GatewayError::Validation(err.to_string()))?;
    let sql = envelope
        .pointer("/feed/title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    check_not_null(&sql, "SQL")?;
    coerce_categories(&mut envelope);

    let csv = query.flag("_csv");
    debug!(sql, csv, "bigquery query");
    let path = if csv { "/p/?_querybq&_csv" } else { "/p/?_querybq" };
    let reply = state
        .origin
        .request(
            Method::PUT,
            path,
            OriginAuth::session(headers),
            Some(envelope.to_string()),
        )
        .await?
        .classify()?;

    if csv {
        let filename = match query.get("_csv") {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => DEFAULT_CSV_FILENAME.to_owned(),
        };
        let mut response = (
            StatusCode::OK,
            relay::session_headers(&reply.headers),
            reply.body.clone(),
        )
            .into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/csv"),
        );
        response.headers_mut().insert(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}")
                .parse()
                .map_err(|_| {
                    GatewayError::Validation(format!("invalid filename. {filename}"))
                })?,
        );
        Ok(response)
    } else {
        Ok(respond_json(reply))
    }
}

async fn insert_bq(
    state: &AppState,
    headers: &HeaderMap,
    query: &ActionQuery,
    body: &str,
) -> Result<Response, GatewayError> {
    check_not_null(body, "Feed")?;
    let envelope: Value =
        serde_json::from_str(body).map_err(|err| GatewayError::Validation(err.to_string()))?;
    let run_async = query.flag("_async");
    let path = operation_path("/p/?_bq", run_async, query.get("tablenames"));
    debug!(run_async, "bigquery insert");
    let reply = state
        .origin
        .request(
            Method::POST,
            &path,
            OriginAuth::session(headers),
            Some(envelope.to_string()),
        )
        .await?
        .classify()?;
    Ok(accepted_or_ok(run_async, &reply, "post bigquery."))
}

async fn delete_bq(
    state: &AppState,
    headers: &HeaderMap,
    query: &ActionQuery,
) -> Result<Response, GatewayError> {
    // Several keys may be deleted at once, comma separated; each one is still
    // a key and must start with a slash.
    let uris = query.string("uri");
    check_not_null(&uris, "Key")?;
    for uri in uris.split(',') {
        check_uri(uri, "Key")?;
    }
    let run_async = query.flag("_async");
    let path = operation_path(
        &format!("/p/?_bq&uri={uris}"),
        run_async,
        query.get("tablenames"),
    );
    debug!(uris, run_async, "bigquery delete");
    let reply = state
        .origin
        .request(Method::DELETE, &path, OriginAuth::session(headers), None)
        .await?
        .classify()?;
    Ok(accepted_or_ok(run_async, &reply, "delete bigquery."))
}

fn operation_path(base: &str, run_async: bool, tablenames: Option<&str>) -> String {
    let mut path = base.to_owned();
    if run_async {
        path.push_str("&_async");
    }
    if let Some(tablenames) = tablenames.filter(|t| !t.is_empty()) {
        path.push_str(&format!("&tablenames={tablenames}"));
    }
    path
}

fn accepted_or_ok(run_async: bool, reply: &crate::reply::OriginReply, message: &str) -> Response {
    if run_async {
        respond_message(
            StatusCode::ACCEPTED,
            reply,
            &format!("{message} (accepted)"),
        )
    } else {
        respond_message(StatusCode::OK, reply, message)
    }
}

/// Coerce bound query parameters to their tagged type before the envelope is
/// forwarded. Each category entry carries the value in `___label` and the
/// type tag in `___term`: int, float, bool, anything else stays a string.
fn coerce_categories(envelope: &mut Value) {
    let Some(categories) = envelope
        .pointer_mut("/feed/category")
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for category in categories {
        let Some(term) = category.get("___term").and_then(Value::as_str) else {
            continue;
        };
        let term = term.to_owned();
        let Some(label) = category.get("___label").and_then(Value::as_str) else {
            continue;
        };
        let label = label.to_owned();
        let coerced = match term.as_str() {
            "int" => label.parse::<i64>().map(Value::from).unwrap_or(Value::String(label)),
            "float" => label.parse::<f64>().map(Value::from).unwrap_or(Value::String(label)),
            "bool" => Value::from(label == "true"),
            _ => Value::String(label),
        };
        category["___label"] = coerced;
    }
}
