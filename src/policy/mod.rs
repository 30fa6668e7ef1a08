//! Policy execution subsystem.
//!
//! # Data Flow
//! ```text
//! policy built from config or code
//!     → executor.rs (validate, append in order)
//!     → per request: PolicyContext created by the caller
//!     → executor.rs runs each policy against the context, in order
//!     → context.rs resolves the header set named by the policy's Flow
//!     → add_header.rs / remove_header.rs / interceptor.rs mutate it
//! ```
//!
//! # Design Decisions
//! - Validation happens once, at registration; never at execution time
//! - First failure halts the chain; applied mutations are not rolled back
//! - Policies hold immutable configuration and are shared via `Arc`
//! - Insertion order is the only ordering signal

pub mod add_header;
pub mod context;
pub mod error;
pub mod executor;
pub mod headers;
pub mod interceptor;
pub mod remove_header;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use add_header::AddHeaderPolicy;
pub use context::PolicyContext;
pub use error::{ConfigError, ExecutionError, ExecutorError};
pub use executor::Executor;
pub use headers::HeaderStore;
pub use interceptor::{InterceptorPolicy, InterceptorRequest, InterceptorResponse};
pub use remove_header::RemoveHeaderPolicy;

/// Selects which header set within a [`PolicyContext`] a policy targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Applied before the request reaches the backend.
    Request,
    /// Applied before the response is returned to the client.
    Response,
    /// Applied when an error occurs. Operates on the generic header set.
    Fault,
    /// No flow given. Operates on the generic header set.
    #[default]
    Unspecified,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flow::Request => "request",
            Flow::Response => "response",
            Flow::Fault => "fault",
            Flow::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// A named, validated transformation applied to a [`PolicyContext`].
///
/// Implementations hold only immutable configuration, so one instance may be
/// executed concurrently against independent contexts.
#[async_trait]
pub trait Policy: Send + Sync + fmt::Debug {
    /// Stable identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// Flow fixed at construction.
    fn flow(&self) -> Flow;

    /// Structural checks on the configuration. Performs no I/O.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Apply the policy. Must not retain references into `ctx`.
    async fn execute(&self, ctx: &mut PolicyContext) -> Result<(), ExecutionError>;
}
