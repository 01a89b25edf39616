//! Handlers for the `/posts` resource.
//!
//! Every handler forwards its request as exactly one upstream call and relays
//! the upstream body back. Item routes receive the `{id}` segment as a typed
//! [`PostId`] straight from the request target.

use axum::{
    body::Bytes,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Method, StatusCode},
    response::Response,
};

use crate::http::request::{request_id, request_id_str};
use crate::http::response::{relay, ProxyError};
use crate::http::server::AppState;
use crate::upstream::UpstreamRequest;

/// Opaque post identifier taken from `/posts/{id}`. Never validated locally.
///
/// Holds the segment exactly as it appeared on the wire, percent-encoding
/// included, so it can be appended to the upstream target unchanged. It is
/// never decoded, which keeps `%2E%2E` distinct from `..` and accepts
/// escapes that are not UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(String);

impl PostId {
    /// The still-encoded path segment.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of a `/posts/{id}` path.
    fn from_path(path: &str) -> Option<Self> {
        path.rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(|segment| PostId(segment.to_owned()))
    }
}

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        PostId::from_path(parts.uri.path()).ok_or(StatusCode::NOT_FOUND)
    }
}

/// GET /posts
pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ProxyError> {
    forward(&state, &headers, UpstreamRequest::new(Method::GET)).await
}

/// POST /posts
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let call = UpstreamRequest::new(Method::POST).with_json_body(body);
    forward(&state, &headers, call).await
}

/// GET /posts/{id}
pub async fn get(
    State(state): State<AppState>,
    id: PostId,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let call = UpstreamRequest::new(Method::GET).with_id(id.as_str());
    forward(&state, &headers, call).await
}

/// PUT /posts/{id}
pub async fn update(
    State(state): State<AppState>,
    id: PostId,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let call = UpstreamRequest::new(Method::PUT)
        .with_id(id.as_str())
        .with_json_body(body);
    forward(&state, &headers, call).await
}

/// DELETE /posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    id: PostId,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let call = UpstreamRequest::new(Method::DELETE).with_id(id.as_str());
    forward(&state, &headers, call).await
}

async fn forward(
    state: &AppState,
    headers: &HeaderMap,
    call: UpstreamRequest<'_>,
) -> Result<Response, ProxyError> {
    let call = call.with_request_id(request_id(headers));

    match state.upstream.send(call).await {
        Ok(upstream) => {
            if !upstream.status.is_success() {
                tracing::debug!(
                    request_id = %request_id_str(headers),
                    status = %upstream.status,
                    "Upstream returned non-success status"
                );
            }
            Ok(relay(upstream, state.propagate_status))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id_str(headers),
                kind = e.kind(),
                error = %e.detailed_message(),
                "Upstream error"
            );
            Err(ProxyError(e))
        }
    }
}
