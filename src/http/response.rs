//! Response shaping for proxied calls.
//!
//! # Responsibilities
//! - Relay the upstream body under a forced `Content-Type: application/json`
//! - Decide the inbound status (fixed 200 unless propagation is enabled)
//! - Map upstream failures to 500 with the error text as body

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::upstream::{UpstreamError, UpstreamResponse};

/// Build the inbound response for a completed upstream call.
///
/// With `propagate_status` off the status is always 200, so upstream 4xx/5xx
/// payloads reach the caller as successful responses.
pub fn relay(upstream: UpstreamResponse, propagate_status: bool) -> Response {
    let status = if propagate_status {
        upstream.status
    } else {
        StatusCode::OK
    };

    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        upstream.body,
    )
        .into_response()
}

/// Failure of a proxied call, rendered as a plain-text 500.
#[derive(Debug)]
pub struct ProxyError(pub UpstreamError);

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.detailed_message()).into_response()
    }
}
