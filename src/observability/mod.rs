//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers / upstream client
//!     → tracing events with request_id fields
//!     → logging.rs (fmt subscriber, EnvFilter)
//!     → stdout
//! tower_http TraceLayer
//!     → one span per request (access log)
//! ```

pub mod logging;
