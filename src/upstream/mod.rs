//! Upstream API subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler (method, optional PostId, optional body)
//!     → client.rs (build URL under <base>/posts, one outbound call)
//!     → error.rs (classify construction / transport / body failures)
//!     → UpstreamResponse (status + fully read body)
//! ```
//!
//! # Design Decisions
//! - One client per process, shared via Arc; connection pooling is hyper-util's
//! - Every call carries a deadline; dropping the future cancels it
//! - The body is read to completion before the caller sees a response, so a
//!   failed read can still become a clean 500

pub mod client;
pub mod error;

pub use client::{UpstreamClient, UpstreamRequest, UpstreamResponse};
pub use error::UpstreamError;
