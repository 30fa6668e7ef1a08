//! Header removal policy.

use async_trait::async_trait;
use axum::http::HeaderName;

use crate::policy::headers::HeaderStore;
use crate::policy::{ConfigError, ExecutionError, Flow, Policy, PolicyContext};

/// Deletes every value of `header_name` from the header set selected by `flow`.
/// Removing a header that is not present succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveHeaderPolicy {
    header_name: String,
    flow: Flow,
}

impl RemoveHeaderPolicy {
    pub fn new(header_name: impl Into<String>, flow: Flow) -> Self {
        Self {
            header_name: header_name.into(),
            flow,
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }
}

#[async_trait]
impl Policy for RemoveHeaderPolicy {
    fn name(&self) -> &'static str {
        "RemoveHeader"
    }

    fn flow(&self) -> Flow {
        self.flow
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.header_name.is_empty() {
            return Err(ConfigError::EmptyHeaderName);
        }
        HeaderName::from_bytes(self.header_name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(self.header_name.clone()))?;
        Ok(())
    }

    async fn execute(&self, ctx: &mut PolicyContext) -> Result<(), ExecutionError> {
        ctx.headers_mut(self.flow)?.delete_header(&self.header_name);
        Ok(())
    }
}
