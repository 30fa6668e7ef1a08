//! Header policy chains for an API gateway.
//!
//! Policies (add header, remove header, external interceptor) are validated
//! when registered with an [`Executor`] and then applied, in order, to a
//! per-request [`PolicyContext`]. The `http` module wires the chains into an
//! axum gateway in front of a single upstream.

pub mod config;
pub mod http;
pub mod observability;
pub mod policy;

pub use config::GatewayConfig;
pub use http::{GatewayServer, PolicyChains};
pub use policy::{
    AddHeaderPolicy, Executor, ExecutorError, Flow, InterceptorPolicy, Policy, PolicyContext,
    RemoveHeaderPolicy,
};
