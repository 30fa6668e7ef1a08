//! Policy error definitions.

use thiserror::Error;

use crate::policy::Flow;

/// Invalid policy configuration, detected when a policy is registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("header name cannot be empty")]
    EmptyHeaderName,

    #[error("header value cannot be empty")]
    EmptyHeaderValue,

    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid header value for '{0}'")]
    InvalidHeaderValue(String),

    #[error("service URL cannot be empty")]
    EmptyServiceUrl,

    #[error("invalid service URL '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },

    #[error("timeout must be positive")]
    NonPositiveTimeout,

    #[error("maximum body size must be positive")]
    ZeroBodyLimit,
}

/// Failure while a policy is being applied to a context.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The flow names a header set the context does not carry.
    #[error("no headers available in context for {0} flow")]
    MissingTarget(Flow),

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to read body: {0}")]
    BodyRead(String),

    /// Transport failure, including timeout expiry.
    #[error("interceptor service call failed: {0}")]
    InterceptorCall(#[source] reqwest::Error),

    #[error("interceptor service returned status {0}")]
    InterceptorStatus(u16),

    #[error("failed to decode interceptor response: {0}")]
    InterceptorDecode(String),
}

/// Errors surfaced by [`Executor`](crate::policy::Executor).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("policy cannot be nil")]
    NilPolicy,

    #[error("policy context cannot be nil")]
    NilContext,

    #[error("policy {policy} validation failed: {source}")]
    Validation {
        policy: &'static str,
        #[source]
        source: ConfigError,
    },

    #[error("policy {policy} execution failed: {source}")]
    Execution {
        policy: &'static str,
        #[source]
        source: ExecutionError,
    },
}

impl ExecutorError {
    /// Name of the policy that caused the error, if any.
    pub fn failed_policy(&self) -> Option<&'static str> {
        match self {
            ExecutorError::Validation { policy, .. } | ExecutorError::Execution { policy, .. } => {
                Some(policy)
            }
            ExecutorError::NilPolicy | ExecutorError::NilContext => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExecutionError::MissingTarget(Flow::Response);
        assert_eq!(err.to_string(), "no headers available in context for response flow");

        let err = ExecutorError::Validation {
            policy: "AddHeader",
            source: ConfigError::EmptyHeaderName,
        };
        assert_eq!(
            err.to_string(),
            "policy AddHeader validation failed: header name cannot be empty"
        );
        assert_eq!(err.failed_policy(), Some("AddHeader"));
        assert_eq!(ExecutorError::NilContext.failed_policy(), None);
    }

    #[test]
    fn test_status_error_display() {
        let err = ExecutionError::InterceptorStatus(503);
        assert!(err.to_string().contains("503"));
    }
}
