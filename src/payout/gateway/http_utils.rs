//! Shared HTTP utilities for the payout gateway.

use http::StatusCode;

use super::error_mapping::{map_http_error, map_transport_error};
use crate::payout::error::PayoutError;

/// Pulls the `detail` field out of a backend error body.
///
/// Validation failures carry a list of objects rather than a string; those are
/// returned as compact JSON.
pub(super) fn extract_backend_detail(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_owned());
    };
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Returns the body of a successful response, or maps the failure.
pub(super) async fn read_success_body(
    response: reqwest::Response,
    operation: &str,
) -> Result<String, PayoutError> {
    let status: StatusCode = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_http_error(
            operation,
            status,
            extract_backend_detail(&body),
        ));
    }

    response
        .text()
        .await
        .map_err(|error| map_transport_error(operation, &error))
}
