//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use posts_proxy::config::ProxyConfig;
use posts_proxy::http::{HttpServer, X_REQUEST_ID};
use posts_proxy::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock upstream saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub body: Bytes,
}

/// A running mock upstream that records every request it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.recorded.lock().unwrap().clear();
    }
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// `respond` decides the status and body for each recorded request. The
/// response is labelled `text/plain` so tests can see the proxy override it.
pub async fn start_mock_upstream<F, Fut>(respond: F) -> MockUpstream
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let log = recorded.clone();
    let app = Router::new().fallback(move |req: Request<Body>| {
        let log = log.clone();
        let respond = respond.clone();
        async move {
            let (parts, body) = req.into_parts();
            let header_str = |name: header::HeaderName| {
                parts
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let seen = RecordedRequest {
                method: parts.method.clone(),
                path: parts.uri.path().to_string(),
                content_type: header_str(header::CONTENT_TYPE),
                request_id: header_str(X_REQUEST_ID),
                body: to_bytes(body, usize::MAX).await.unwrap(),
            };
            log.lock().unwrap().push(seen.clone());

            let (status, body) = respond(seen).await;
            (StatusCode::from_u16(status).unwrap(), body).into_response()
        }
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, recorded }
}

/// Mock upstream that answers every request with the same status and body.
#[allow(dead_code)]
pub async fn start_fixed_upstream(status: u16, body: &'static str) -> MockUpstream {
    start_mock_upstream(move |_| async move { (status, body.to_string()) }).await
}

/// Proxy configuration pointed at `base_url`.
pub fn proxy_config(base_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.upstream.base_url = base_url.to_string();
    config.upstream.timeout_secs = 5;
    config.upstream.connect_timeout_secs = 2;
    config
}

/// Start the proxy on an ephemeral port. Trigger the returned handle to stop it.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Test client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Send a request line exactly as written and return the response status.
///
/// URL-based clients normalize targets like `/posts/%2E%2E`; this writes the
/// bytes straight to the socket instead.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, method: &str, target: &str) -> u16 {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        method, target, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);
    response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("malformed response: {response}"))
}
