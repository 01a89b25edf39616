//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route table)
//!     → request.rs (assign request ID)
//!     → posts.rs (typed PostId, one upstream call)
//!     → response.rs (forced JSON content type, 200 or 500)
//!     → Send to client
//! ```

pub mod posts;
pub mod request;
pub mod response;
pub mod server;

pub use posts::PostId;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
