//! Request handlers and the auth gate.
//!
//! Every path except `/health` requires the configured bearer token,
//! accepted from the `Authorization` header or the `_token` query
//! parameter. Handlers are stateless between requests; the only shared
//! state is the store handle.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

use redbridge_client::StoreClient;
use redbridge_common::{BatchMode, Command, Error};

use crate::batch::{parse_batch, results_to_json};
use crate::command::{build_command, TOKEN_QUERY_PARAM};
use crate::encoding::{format_reply, EncodeOptions};

/// Shared per-process state handed to every handler.
pub(crate) struct AppState {
    pub store: StoreClient,
    pub token: String,
}

/// JSON error response: `{"error": <message>}` with a 4xx status.
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self {
            status: StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// GET /health - liveness plus a store round trip, no auth.
pub(crate) async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reply = state.store.run(&Command::new("PING", Vec::new())).await?;
    Ok(Json(json!({
        "status": "healthy",
        "redis": serde_json::Value::from(reply),
    })))
}

/// POST /pipeline - ordered batch, no cross-command atomicity.
pub(crate) async fn pipeline(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    run_batch(state, headers, query, body, BatchMode::Pipeline).await
}

/// POST /multi-exec - ordered batch executed atomically at the store.
pub(crate) async fn multi_exec(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    run_batch(state, headers, query, body, BatchMode::Transaction).await
}

/// Fallback: any other path and method is a single generic command.
pub(crate) async fn command(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Bytes>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = uri.query();
    authorize(&headers, query, &state.token)?;

    // A body that could not be read is treated as absent, not as an error.
    let body = body.unwrap_or_default();
    let command = build_command(&method, uri.path(), query, &body)?;
    let reply = state.store.run(&command).await?;

    let opts = EncodeOptions::from_headers(&headers);
    Ok(Json(json!({ "result": format_reply(reply, &opts) })))
}

async fn run_batch(
    state: Arc<AppState>,
    headers: HeaderMap,
    query: Option<String>,
    body: Bytes,
    mode: BatchMode,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    authorize(&headers, query.as_deref(), &state.token)?;

    let commands = parse_batch(&body)?;
    debug!(mode = mode.as_str(), commands = commands.len(), "executing batch");
    let results = state.store.run_batch(&commands, mode).await?;

    let opts = EncodeOptions::from_headers(&headers);
    Ok(Json(results_to_json(results, &opts)))
}

/// Compare the presented token against the configured secret.
///
/// The header form wins when both are present. The token value itself is
/// never logged.
fn authorize(headers: &HeaderMap, query: Option<&str>, expected: &str) -> Result<(), Error> {
    let header_token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    match header_token.or_else(|| query_token(query)) {
        Some(token) if token == expected => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}

fn query_token(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_header_auth() {
        assert!(authorize(&headers_with_bearer("secret"), None, "secret").is_ok());
        assert!(authorize(&headers_with_bearer("wrong"), None, "secret").is_err());
        assert!(authorize(&HeaderMap::new(), None, "secret").is_err());
    }

    #[test]
    fn test_query_param_auth() {
        assert!(authorize(&HeaderMap::new(), Some("_token=secret"), "secret").is_ok());
        assert!(authorize(&HeaderMap::new(), Some("_token=wrong"), "secret").is_err());
        assert!(authorize(&HeaderMap::new(), Some("other=secret"), "secret").is_err());
    }

    #[test]
    fn test_header_wins_over_query_param() {
        let err = authorize(
            &headers_with_bearer("wrong"),
            Some("_token=secret"),
            "secret",
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_scheme_must_be_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic secret"));
        assert!(authorize(&headers, None, "secret").is_err());
    }
}
