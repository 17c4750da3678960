//! API-key authentication middleware.
//!
//! Every route requires the pre-shared key, presented either as an
//! `x-api-key` header or an `x-api-key` query parameter (the query form
//! exists for `EventSource` feed clients, which cannot set headers).
//! Missing or mismatched keys are rejected before any handler runs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the header and query parameter carrying the key.
const API_KEY_PARAM: &str = "x-api-key";

/// Reject requests that do not carry the configured API key.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_key = request
        .headers()
        .get(API_KEY_PARAM)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let provided = header_key.or_else(|| query_api_key(request.uri().query()));

    match provided {
        None => {
            debug!("request rejected: API key is missing");
            Err(ApiError::Unauthorized(String::from("API key is missing")))
        }
        Some(key) if key == state.api_key => Ok(next.run(request).await),
        Some(_) => {
            debug!("request rejected: invalid API key");
            Err(ApiError::Unauthorized(String::from(
                "invalid API key provided",
            )))
        }
    }
}

/// Extract the `x-api-key` query parameter, if present.
///
/// Keys are constrained to URL-safe characters, so a plain split is enough
/// -- no percent-decoding required.
fn query_api_key(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == API_KEY_PARAM)
        .map(|(_, value)| value.to_owned())
}
