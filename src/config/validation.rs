//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (timeouts > 0, limits > 0)
//! - Validate every policy entry the same way the executor will
//! - Reject policies on flows the gateway has no header set for
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::policy::{ConfigError, Flow};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid upstream address '{0}'")]
    InvalidUpstreamAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("request timeout must be positive")]
    ZeroRequestTimeout,

    #[error("policies[{index}] ({kind}): {source}")]
    Policy {
        index: usize,
        kind: &'static str,
        #[source]
        source: ConfigError,
    },

    #[error("policies[{index}] ({kind}): flow '{flow}' is not served by the gateway")]
    UnsupportedFlow {
        index: usize,
        kind: &'static str,
        flow: Flow,
    },
}

/// Check `config` and collect every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if Authority::from_str(&config.upstream.address).is_err() {
        errors.push(ValidationError::InvalidUpstreamAddress(
            config.upstream.address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    for (index, entry) in config.policies.iter().enumerate() {
        let kind = entry.kind();
        if let Err(source) = entry.build(&config.limits).validate() {
            errors.push(ValidationError::Policy { index, kind, source });
        }
        let flow = entry.flow();
        if !matches!(flow, Flow::Request | Flow::Response) {
            errors.push(ValidationError::UnsupportedFlow { index, kind, flow });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
