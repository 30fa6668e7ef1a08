//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (assign request ID)
//!     → middleware/policy.rs (request chain)
//!     → server.rs proxy_handler (forward to upstream)
//!     → middleware/policy.rs (response chain)
//!     → Send to client
//! ```
//!
//! `body.rs` provides the buffer-and-replay body used by policies that
//! need to read a body without consuming it.

pub mod body;
pub mod middleware;
pub mod request;
pub mod server;

pub use body::BufferedBody;
pub use middleware::{policy_middleware, PolicyChains};
pub use request::X_REQUEST_ID;
pub use server::{GatewayServer, ServerError};
