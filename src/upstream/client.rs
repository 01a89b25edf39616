//! HTTP client for the upstream posts API.
//!
//! # Responsibilities
//! - Own the pooled outbound client and the normalized base URL
//! - Map a (method, id, body) triple onto exactly one outbound call
//! - Enforce connect and whole-call deadlines
//! - Read the response body to completion and release the connection
//!
//! # Design Decisions
//! - Outbound targets are `http::Uri`, never re-parsed as WHATWG URLs, so a raw
//!   id segment such as `%2E%2E` or `%FF` reaches the upstream byte-for-byte

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{
    header::{CONTENT_TYPE, USER_AGENT},
    HeaderValue, Method, Request, StatusCode, Uri,
};
use http_body_util::BodyExt;
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::request::X_REQUEST_ID;
use crate::upstream::error::UpstreamError;

const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// One outbound call, described before any I/O happens.
#[derive(Debug, Clone)]
pub struct UpstreamRequest<'a> {
    method: Method,
    id: Option<&'a str>,
    json_body: Option<Bytes>,
    request_id: Option<&'a HeaderValue>,
}

impl<'a> UpstreamRequest<'a> {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            id: None,
            json_body: None,
            request_id: None,
        }
    }

    /// Target `<base>/posts/<id>`. `id` is a still-encoded path segment.
    pub fn with_id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    /// Send `body` untouched, labelled `application/json`.
    pub fn with_json_body(mut self, body: Bytes) -> Self {
        self.json_body = Some(body);
        self
    }

    pub fn with_request_id(mut self, request_id: Option<&'a HeaderValue>) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Status and fully buffered body of an upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Shared client for the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    /// Base URL without a trailing slash.
    base: String,
    timeout: Duration,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let invalid = || UpstreamError::InvalidBaseUrl(config.base_url.clone());

        let base_url = Url::parse(&config.base_url).map_err(|_| invalid())?;
        if !matches!(base_url.scheme(), "http" | "https")
            || base_url.cannot_be_a_base()
            || base_url.query().is_some()
            || base_url.fragment().is_some()
        {
            return Err(invalid());
        }

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new())
            .build(HttpsConnector::new_with_connector(http));

        Ok(Self {
            client,
            base: base_url.as_str().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Base URL every target is built from, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `<base>/posts`, or `<base>/posts/<id>` with `id` appended verbatim.
    pub fn posts_uri(&self, id: Option<&str>) -> Result<Uri, UpstreamError> {
        let target = match id {
            Some(id) => format!("{}/posts/{}", self.base, id),
            None => format!("{}/posts", self.base),
        };
        Uri::try_from(target).map_err(UpstreamError::InvalidTarget)
    }

    /// Issue exactly one outbound call and read its body.
    pub async fn send(&self, request: UpstreamRequest<'_>) -> Result<UpstreamResponse, UpstreamError> {
        let uri = self.posts_uri(request.id)?;
        let method = request.method;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .header(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(request_id) = request.request_id {
            builder = builder.header(X_REQUEST_ID, request_id.clone());
        }
        let body = match request.json_body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let outbound = builder.body(body).map_err(UpstreamError::Request)?;

        let start = Instant::now();
        let exchange = async {
            let response = self
                .client
                .request(outbound)
                .await
                .map_err(UpstreamError::Transport)?;
            let status = response.status();
            // collect() consumes the body, so the connection is released on both arms.
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(UpstreamError::Body)?
                .to_bytes();
            Ok::<_, UpstreamError>(UpstreamResponse { status, body })
        };

        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout.as_secs()))??;

        tracing::debug!(
            method = %method,
            uri = %uri,
            status = %response.status,
            bytes = response.body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream call complete"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            base_url: base_url.to_string(),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_collection_and_item_uris() {
        let client = client_for("https://jsonplaceholder.typicode.com");
        assert_eq!(
            client.posts_uri(None).unwrap(),
            "https://jsonplaceholder.typicode.com/posts"
        );
        assert_eq!(
            client.posts_uri(Some("42")).unwrap(),
            "https://jsonplaceholder.typicode.com/posts/42"
        );
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let client = client_for("http://127.0.0.1:3000/api/");
        assert_eq!(client.base_url(), "http://127.0.0.1:3000/api");
        assert_eq!(client.posts_uri(Some("7")).unwrap(), "http://127.0.0.1:3000/api/posts/7");
    }

    #[test]
    fn test_raw_segment_is_appended_verbatim() {
        let client = client_for("http://upstream.test");
        for id in ["a%20b", "hello%2Fworld", "%2E%2E", "%2e", "%FF", "50%25", "abc-1_2.x~"] {
            let uri = client.posts_uri(Some(id)).unwrap();
            assert_eq!(uri.path(), format!("/posts/{}", id));
        }
    }

    #[test]
    fn test_rejects_non_base_url() {
        for bad in ["mailto:someone@example.com", "ftp://example.com", "http://h/?q=1", "nope"] {
            let err = UpstreamClient::new(&UpstreamConfig {
                base_url: bad.to_string(),
                ..UpstreamConfig::default()
            })
            .unwrap_err();
            assert!(matches!(err, UpstreamError::InvalidBaseUrl(_)), "{bad}");
        }
    }
}
