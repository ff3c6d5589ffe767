//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks (429 with `Retry-After` parsing,
//! non-success → [`ClientError::Api`]) so the endpoint methods stay focused
//! on request construction and response mapping.

use serde::Deserialize;

use crate::error::ClientError;

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Check an HTTP response for error statuses.
///
/// Returns the response unchanged on success. 429 becomes
/// [`ClientError::RateLimited`]; every other non-success status becomes
/// [`ClientError::Api`] carrying the body's `detail` field when the body is
/// JSON, or the raw body otherwise.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status() == 429 {
        return Err(ClientError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status,
            message: error_message(&body),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as whole seconds.
fn parse_retry_after(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    }
}
