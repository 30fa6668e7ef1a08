//! Ordered policy chain runner.
//!
//! # Responsibilities
//! - Validate policies on registration; reject invalid ones
//! - Run registered policies in insertion order against one context
//! - Stop at the first failure and report the failing policy
//!
//! # Design Decisions
//! - Mutation (`add`, `clear`) needs `&mut self`; execution needs `&self`.
//!   Build once, then share via `Arc` for concurrent requests.
//! - No rollback: policies applied before a failure keep their effects
//! - Duplicates are allowed; identity is the `Arc`, not the configuration

use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;
use crate::policy::{ExecutorError, Policy, PolicyContext};

/// Ordered sequence of validated policies.
#[derive(Debug, Default, Clone)]
pub struct Executor {
    policies: Vec<Arc<dyn Policy>>,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Validate `policy` and append it to the chain.
    ///
    /// `None` is rejected with [`ExecutorError::NilPolicy`]. A policy that
    /// fails validation is not appended.
    pub fn add(&mut self, policy: Option<Arc<dyn Policy>>) -> Result<(), ExecutorError> {
        let policy = policy.ok_or(ExecutorError::NilPolicy)?;

        policy
            .validate()
            .map_err(|source| ExecutorError::Validation {
                policy: policy.name(),
                source,
            })?;

        tracing::debug!(
            policy = policy.name(),
            flow = %policy.flow(),
            position = self.policies.len(),
            "Policy registered"
        );
        self.policies.push(policy);
        Ok(())
    }

    /// Convenience for `add(Some(Arc::new(policy)))`.
    pub fn push<P: Policy + 'static>(&mut self, policy: P) -> Result<(), ExecutorError> {
        self.add(Some(Arc::new(policy)))
    }

    /// Run every policy in order against `ctx`.
    ///
    /// `None` is rejected with [`ExecutorError::NilContext`]. The first
    /// failure halts the chain; the error names the failing policy.
    pub async fn execute(&self, ctx: Option<&mut PolicyContext>) -> Result<(), ExecutorError> {
        let ctx = ctx.ok_or(ExecutorError::NilContext)?;

        for policy in &self.policies {
            let start = Instant::now();
            match policy.execute(ctx).await {
                Ok(()) => {
                    metrics::record_policy_execution(policy.name(), true, start);
                    tracing::debug!(policy = policy.name(), flow = %policy.flow(), "Policy applied");
                }
                Err(source) => {
                    metrics::record_policy_execution(policy.name(), false, start);
                    tracing::warn!(
                        policy = policy.name(),
                        flow = %policy.flow(),
                        error = %source,
                        "Policy execution failed"
                    );
                    return Err(ExecutorError::Execution {
                        policy: policy.name(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Registered policies in execution order.
    pub fn list(&self) -> &[Arc<dyn Policy>] {
        &self.policies
    }

    /// Drop every registered policy.
    pub fn clear(&mut self) {
        self.policies.clear();
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        AddHeaderPolicy, ConfigError, ExecutionError, Flow, RemoveHeaderPolicy,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request};

    /// Always fails at execution time.
    #[derive(Debug)]
    struct FailingPolicy;

    #[async_trait]
    impl Policy for FailingPolicy {
        fn name(&self) -> &'static str {
            "Failing"
        }

        fn flow(&self) -> Flow {
            Flow::Request
        }

        fn validate(&self) -> Result<(), ConfigError> {
            Ok(())
        }

        async fn execute(&self, _ctx: &mut PolicyContext) -> Result<(), ExecutionError> {
            Err(ExecutionError::BodyRead("boom".into()))
        }
    }

    fn request_ctx() -> PolicyContext {
        let req = Request::builder()
            .uri("http://example.com")
            .body(Body::empty())
            .unwrap();
        PolicyContext::for_request(req)
    }

    #[test]
    fn test_add_policy() {
        let mut executor = Executor::new();
        executor
            .push(AddHeaderPolicy::new("X-Test", "value", Flow::Request))
            .unwrap();
        assert_eq!(executor.list().len(), 1);
    }

    #[test]
    fn test_add_nil_policy() {
        let mut executor = Executor::new();
        let err = executor.add(None).unwrap_err();
        assert!(matches!(err, ExecutorError::NilPolicy));
        assert!(err.to_string().contains("policy cannot be nil"));
    }

    #[test]
    fn test_add_invalid_policy() {
        let mut executor = Executor::new();
        executor
            .push(RemoveHeaderPolicy::new("X-Ok", Flow::Request))
            .unwrap();

        let err = executor
            .push(AddHeaderPolicy::new("", "value", Flow::Request))
            .unwrap_err();
        assert!(err.to_string().contains("validation failed"));
        assert_eq!(err.failed_policy(), Some("AddHeader"));
        assert_eq!(executor.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_add_and_remove() {
        let mut executor = Executor::new();
        executor
            .push(AddHeaderPolicy::new("X-Custom", "test-value", Flow::Request))
            .unwrap();
        executor
            .push(RemoveHeaderPolicy::new("X-Remove", Flow::Request))
            .unwrap();

        let req = Request::builder()
            .header("X-Remove", "should-be-removed")
            .body(Body::empty())
            .unwrap();
        let mut ctx = PolicyContext::for_request(req);

        executor.execute(Some(&mut ctx)).await.unwrap();

        let req = ctx.take_request().unwrap();
        assert_eq!(req.headers().get("x-custom").unwrap(), "test-value");
        assert!(req.headers().get("x-remove").is_none());
    }

    #[tokio::test]
    async fn test_execute_nil_context() {
        let mut executor = Executor::new();
        assert!(matches!(
            executor.execute(None).await,
            Err(ExecutorError::NilContext)
        ));

        executor
            .push(AddHeaderPolicy::new("X-Test", "value", Flow::Request))
            .unwrap();
        let err = executor.execute(None).await.unwrap_err();
        assert!(err.to_string().contains("context cannot be nil"));
    }

    #[tokio::test]
    async fn test_empty_chain_leaves_context_untouched() {
        let executor = Executor::new();
        let mut headers = HeaderMap::new();
        headers.insert("x-existing", "1".parse().unwrap());
        let mut ctx = PolicyContext::for_headers(headers.clone());

        executor.execute(Some(&mut ctx)).await.unwrap();
        assert_eq!(ctx.headers, Some(headers));
    }

    #[test]
    fn test_clear() {
        let mut executor = Executor::new();
        executor
            .push(AddHeaderPolicy::new("X-Test", "value", Flow::Request))
            .unwrap();
        assert_eq!(executor.list().len(), 1);

        executor.clear();
        assert!(executor.list().is_empty());
        assert!(executor.is_empty());
    }

    #[tokio::test]
    async fn test_chained_execution_in_order() {
        let mut executor = Executor::new();
        executor
            .push(AddHeaderPolicy::new("X-Header-1", "value-1", Flow::Request))
            .unwrap();
        executor
            .push(AddHeaderPolicy::new("X-Header-2", "value-2", Flow::Request))
            .unwrap();
        executor
            .push(AddHeaderPolicy::new("X-Header-1", "overridden", Flow::Request))
            .unwrap();

        let names: Vec<_> = executor.list().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["AddHeader", "AddHeader", "AddHeader"]);

        let mut ctx = request_ctx();
        executor.execute(Some(&mut ctx)).await.unwrap();

        let req = ctx.take_request().unwrap();
        assert_eq!(req.headers().get("x-header-1").unwrap(), "overridden");
        assert_eq!(req.headers().get("x-header-2").unwrap(), "value-2");
    }

    #[tokio::test]
    async fn test_failure_halts_chain_without_rollback() {
        let mut executor = Executor::new();
        executor
            .push(AddHeaderPolicy::new("X-Before", "applied", Flow::Request))
            .unwrap();
        executor.push(FailingPolicy).unwrap();
        executor
            .push(AddHeaderPolicy::new("X-After", "skipped", Flow::Request))
            .unwrap();

        let mut ctx = request_ctx();
        let err = executor.execute(Some(&mut ctx)).await.unwrap_err();

        assert_eq!(err.failed_policy(), Some("Failing"));
        assert!(err.to_string().contains("policy Failing execution failed"));

        let req = ctx.take_request().unwrap();
        assert_eq!(req.headers().get("x-before").unwrap(), "applied");
        assert!(req.headers().get("x-after").is_none());
    }

    #[tokio::test]
    async fn test_missing_target_names_policy() {
        let mut executor = Executor::new();
        executor
            .push(RemoveHeaderPolicy::new("X-Anything", Flow::Response))
            .unwrap();

        let mut ctx = request_ctx();
        let err = executor.execute(Some(&mut ctx)).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Execution {
                policy: "RemoveHeader",
                source: ExecutionError::MissingTarget(Flow::Response),
            }
        ));
    }

    #[tokio::test]
    async fn test_shared_executor_across_tasks() {
        let mut executor = Executor::new();
        executor
            .push(AddHeaderPolicy::new("X-Gateway", "api-platform", Flow::Unspecified))
            .unwrap();
        let executor = Arc::new(executor);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let executor = executor.clone();
            handles.push(tokio::spawn(async move {
                let mut ctx = PolicyContext::for_headers(HeaderMap::new());
                executor.execute(Some(&mut ctx)).await.unwrap();
                ctx.headers.unwrap()
            }));
        }

        for handle in handles {
            let headers = handle.await.unwrap();
            assert_eq!(headers.get("x-gateway").unwrap(), "api-platform");
        }
    }
}
