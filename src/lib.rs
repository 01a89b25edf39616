//! posts-proxy library.
//!
//! Exposes `/posts` and `/posts/{id}` and forwards each call to a single
//! upstream JSON API, relaying the upstream body back as `application/json`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::UpstreamClient;
