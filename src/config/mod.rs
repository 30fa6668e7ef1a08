//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, including every policy entry)
//!     → GatewayConfig (validated, immutable)
//!     → policy chains built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload of policies
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, LoadError};
pub use schema::{GatewayConfig, LimitsConfig, PolicyConfig};
pub use validation::ValidationError;
