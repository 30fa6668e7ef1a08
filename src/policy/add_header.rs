//! Header insertion policy.
//!
//! Sets a header on the request, response, or generic header set. Existing
//! values for the same name are replaced, so applying the policy twice leaves
//! the same single value.

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};

use crate::policy::headers::HeaderStore;
use crate::policy::{ConfigError, ExecutionError, Flow, Policy, PolicyContext};

/// Sets `header_name: header_value` on the header set selected by `flow`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddHeaderPolicy {
    header_name: String,
    header_value: String,
    flow: Flow,
}

impl AddHeaderPolicy {
    pub fn new(header_name: impl Into<String>, header_value: impl Into<String>, flow: Flow) -> Self {
        Self {
            header_name: header_name.into(),
            header_value: header_value.into(),
            flow,
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn header_value(&self) -> &str {
        &self.header_value
    }
}

#[async_trait]
impl Policy for AddHeaderPolicy {
    fn name(&self) -> &'static str {
        "AddHeader"
    }

    fn flow(&self) -> Flow {
        self.flow
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.header_name.is_empty() {
            return Err(ConfigError::EmptyHeaderName);
        }
        if self.header_value.is_empty() {
            return Err(ConfigError::EmptyHeaderValue);
        }
        HeaderName::from_bytes(self.header_name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(self.header_name.clone()))?;
        HeaderValue::from_str(&self.header_value)
            .map_err(|_| ConfigError::InvalidHeaderValue(self.header_name.clone()))?;
        Ok(())
    }

    async fn execute(&self, ctx: &mut PolicyContext) -> Result<(), ExecutionError> {
        ctx.headers_mut(self.flow)?
            .set_header(&self.header_name, &self.header_value)
    }
}
