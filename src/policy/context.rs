//! Per-request state shared across a policy chain.
//!
//! # Responsibilities
//! - Carry the request, response, or generic header set being transformed
//! - Carry free-form metadata for inter-policy signaling
//! - Resolve which header set a [`Flow`] targets
//!
//! # Design Decisions
//! - Created fresh by the caller for each request/response cycle
//! - Owned exclusively by one chain execution, never by the executor
//! - Absent stores are an error at resolution time; empty stores are not

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{HeaderMap, Request, Response};
use serde_json::Value;

use crate::policy::{ExecutionError, Flow};

/// Mutable bundle of header stores and metadata for one chain execution.
#[derive(Debug, Default)]
pub struct PolicyContext {
    /// Outbound request, targeted by [`Flow::Request`].
    pub request: Option<Request<Body>>,

    /// Inbound response, targeted by [`Flow::Response`].
    pub response: Option<Response<Body>>,

    /// Generic headers, targeted by [`Flow::Fault`] and [`Flow::Unspecified`].
    pub headers: Option<HeaderMap>,

    /// Policy-specific data keyed by name.
    pub metadata: HashMap<String, Value>,
}

impl PolicyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_request(request: Request<Body>) -> Self {
        Self {
            request: Some(request),
            ..Self::default()
        }
    }

    pub fn for_response(response: Response<Body>) -> Self {
        Self {
            response: Some(response),
            ..Self::default()
        }
    }

    pub fn for_headers(headers: HeaderMap) -> Self {
        Self {
            headers: Some(headers),
            ..Self::default()
        }
    }

    /// Header set targeted by `flow`, if the context carries it.
    pub fn headers(&self, flow: Flow) -> Option<&HeaderMap> {
        match flow {
            Flow::Request => self.request.as_ref().map(Request::headers),
            Flow::Response => self.response.as_ref().map(Response::headers),
            Flow::Fault | Flow::Unspecified => self.headers.as_ref(),
        }
    }

    /// Mutable header set targeted by `flow`.
    pub fn headers_mut(&mut self, flow: Flow) -> Result<&mut HeaderMap, ExecutionError> {
        let headers = match flow {
            Flow::Request => self.request.as_mut().map(Request::headers_mut),
            Flow::Response => self.response.as_mut().map(Response::headers_mut),
            Flow::Fault | Flow::Unspecified => self.headers.as_mut(),
        };
        headers.ok_or(ExecutionError::MissingTarget(flow))
    }

    pub fn take_request(&mut self) -> Option<Request<Body>> {
        self.request.take()
    }

    pub fn take_response(&mut self) -> Option<Response<Body>> {
        self.response.take()
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}
