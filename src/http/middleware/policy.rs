//! Policy chain middleware.
//! Runs the request chain before the inner service and the response chain
//! after it.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::GatewayConfig;
use crate::http::request::request_id;
use crate::policy::{Executor, ExecutorError, Flow, PolicyContext};

/// Request-side and response-side executors, built once at startup.
#[derive(Debug, Default, Clone)]
pub struct PolicyChains {
    pub request: Executor,
    pub response: Executor,
}

impl PolicyChains {
    pub fn new(request: Executor, response: Executor) -> Self {
        Self { request, response }
    }

    /// Build both chains from `config.policies`, preserving declaration
    /// order. Response-flow entries go to the response chain; all others
    /// to the request chain.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ExecutorError> {
        let mut chains = Self::default();
        for entry in &config.policies {
            let policy = entry.build(&config.limits);
            match entry.flow() {
                Flow::Response => chains.response.add(Some(policy))?,
                _ => chains.request.add(Some(policy))?,
            }
        }

        tracing::info!(
            request_policies = chains.request.len(),
            response_policies = chains.response.len(),
            "Policy chains built"
        );
        Ok(chains)
    }
}

fn policy_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Policy execution failed").into_response()
}

pub async fn policy_middleware(
    State(chains): State<Arc<PolicyChains>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request_id(req.headers()).to_string();

    // 1. Request chain
    let mut ctx = PolicyContext::for_request(req);
    if let Err(e) = chains.request.execute(Some(&mut ctx)).await {
        tracing::warn!(request_id = %request_id, error = %e, "Request policy chain failed");
        return policy_failure();
    }
    let req = match ctx.take_request() {
        Some(req) => req,
        None => return policy_failure(),
    };

    let response = next.run(req).await;

    // 2. Response chain
    let mut ctx = PolicyContext::for_response(response);
    if let Err(e) = chains.response.execute(Some(&mut ctx)).await {
        tracing::warn!(request_id = %request_id, error = %e, "Response policy chain failed");
        return policy_failure();
    }
    ctx.take_response().unwrap_or_else(policy_failure)
}
