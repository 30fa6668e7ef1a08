//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::interceptor::{DEFAULT_MAX_BODY_SIZE, DEFAULT_TIMEOUT};
use crate::policy::{AddHeaderPolicy, Flow, InterceptorPolicy, Policy, RemoveHeaderPolicy};

/// Root configuration for the policy gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body buffering limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Policy chain, in execution order.
    pub policies: Vec<PolicyConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend authority (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Limits applied when policies buffer bodies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One entry of the `[[policies]]` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    AddHeader {
        header: String,
        value: String,
        #[serde(default)]
        flow: Flow,
    },
    RemoveHeader {
        header: String,
        #[serde(default)]
        flow: Flow,
    },
    Interceptor {
        url: String,
        #[serde(default = "default_interceptor_timeout_ms")]
        timeout_ms: u64,
        #[serde(default)]
        flow: Flow,
    },
}

fn default_interceptor_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

impl PolicyConfig {
    /// The `kind` tag as written in config.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyConfig::AddHeader { .. } => "add_header",
            PolicyConfig::RemoveHeader { .. } => "remove_header",
            PolicyConfig::Interceptor { .. } => "interceptor",
        }
    }

    pub fn flow(&self) -> Flow {
        match self {
            PolicyConfig::AddHeader { flow, .. }
            | PolicyConfig::RemoveHeader { flow, .. }
            | PolicyConfig::Interceptor { flow, .. } => *flow,
        }
    }

    /// Construct the policy. The result is not validated.
    pub fn build(&self, limits: &LimitsConfig) -> Arc<dyn Policy> {
        match self {
            PolicyConfig::AddHeader { header, value, flow } => {
                Arc::new(AddHeaderPolicy::new(header.clone(), value.clone(), *flow))
            }
            PolicyConfig::RemoveHeader { header, flow } => {
                Arc::new(RemoveHeaderPolicy::new(header.clone(), *flow))
            }
            PolicyConfig::Interceptor { url, timeout_ms, flow } => Arc::new(
                InterceptorPolicy::new(url.clone(), *flow)
                    .with_timeout(Duration::from_millis(*timeout_ms))
                    .with_max_body_size(limits.max_body_size),
            ),
        }
    }
}
