//! Upstream failure taxonomy.

use axum::http::uri::InvalidUri;
use thiserror::Error;

/// Errors that can occur while talking to the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The configured base URL cannot carry a `/posts` path.
    #[error("invalid upstream base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Base URL plus id did not form a valid request target.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[source] InvalidUri),

    /// The outbound request could not be constructed.
    #[error("failed to build upstream request: {0}")]
    Request(#[source] axum::http::Error),

    /// The outbound call did not finish within its deadline.
    #[error("upstream request timed out after {0} seconds")]
    Timeout(u64),

    /// DNS, connect, TLS or protocol failure reaching the upstream.
    #[error("upstream request failed: {0}")]
    Transport(#[source] hyper_util::client::legacy::Error),

    /// The response arrived but its body could not be read.
    #[error("failed to read upstream response body: {0}")]
    Body(#[source] hyper::Error),
}

impl UpstreamError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidBaseUrl(_) => "invalid_base_url",
            UpstreamError::InvalidTarget(_) => "invalid_target",
            UpstreamError::Request(_) => "request",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Body(_) => "body",
        }
    }

    /// The error text followed by every underlying cause.
    ///
    /// hyper keeps the useful detail (DNS failure, refused connection) in
    /// the source chain rather than in its own message.
    pub fn detailed_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Timeout(30);
        assert_eq!(err.to_string(), "upstream request timed out after 30 seconds");
        assert_eq!(err.kind(), "timeout");

        let err = UpstreamError::InvalidBaseUrl("mailto:x@y".into());
        assert!(err.detailed_message().contains("mailto:x@y"));

        let err = UpstreamError::InvalidTarget("http://a b".parse::<axum::http::Uri>().unwrap_err());
        assert_eq!(err.kind(), "invalid_target");
        assert!(err.to_string().starts_with("invalid upstream target"));
    }
}
