//! axum middleware.

pub mod policy;

pub use policy::{policy_middleware, PolicyChains};
