//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional)
//!     → loader.rs (populate process environment)
//! ProxyConfig::default()
//!     → loader.rs (optional TOML file from PROXY_CONFIG)
//!     → loader.rs (PORT / UPSTREAM_* / LOG_LEVEL overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → passed by value into HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::TimeoutConfig;
pub use schema::UpstreamConfig;
