//! Error mapping helpers for the HTTP payout gateway.

use http::StatusCode;

use crate::payout::error::PayoutError;

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> PayoutError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "could not connect"
    } else {
        "failed"
    };
    PayoutError::BackendUnavailable {
        message: format!("{operation} {kind}: {error}"),
    }
}

pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    maybe_detail: Option<String>,
) -> PayoutError {
    let detail = maybe_detail.unwrap_or_else(|| "no detail provided".to_owned());
    PayoutError::BackendUnavailable {
        message: format!("{operation} failed with status {status}: {detail}"),
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> PayoutError {
    PayoutError::BackendUnavailable {
        message: format!("{operation} response deserialisation failed: {error}"),
    }
}
