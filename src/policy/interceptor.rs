//! External interceptor policy.
//!
//! # Responsibilities
//! - Snapshot the targeted headers (and body, for requests and responses)
//! - POST the snapshot as JSON to the interceptor service
//! - Overlay the header entries from the reply onto the target
//!
//! # Design Decisions
//! - Bodies are buffered and replayed; downstream readers see the full body
//! - Only HTTP 200 is accepted from the interceptor
//! - The reply is a partial overlay: names absent from it are left untouched
//! - Reply `body` and `status` are decoded but not applied

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::http::body::BufferedBody;
use crate::policy::headers::{parse_name, parse_value, HeaderStore};
use crate::policy::{ConfigError, ExecutionError, Flow, Policy, PolicyContext};

/// Default interceptor call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on the body size buffered for the snapshot (2MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Payload sent to the interceptor service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorRequest {
    /// Names in canonical MIME form, e.g. `X-Request-Id`.
    pub headers: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Present only when the target is a request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Present only when the target is a request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Payload returned by the interceptor service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorResponse {
    /// A `null` map means no changes; a `null` value list clears the header.
    #[serde(default, deserialize_with = "nullable_headers")]
    pub headers: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Decoded but not applied, so any integer is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
}

fn nullable_headers<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<Vec<String>>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| (name, values.unwrap_or_default()))
        .collect())
}

/// Delegates header rewriting to an external HTTP service.
#[derive(Debug, Clone)]
pub struct InterceptorPolicy {
    service_url: String,
    timeout: Duration,
    max_body_size: usize,
    flow: Flow,
    client: Client,
}

impl InterceptorPolicy {
    pub fn new(service_url: impl Into<String>, flow: Flow) -> Self {
        Self {
            service_url: service_url.into(),
            timeout: DEFAULT_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            flow,
            client: Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Use a shared client (connection pool) instead of a dedicated one.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Build the outbound snapshot, buffering and restoring any body.
    async fn snapshot(&self, ctx: &mut PolicyContext) -> Result<InterceptorRequest, ExecutionError> {
        match self.flow {
            Flow::Request => {
                let req = ctx
                    .request
                    .as_mut()
                    .ok_or(ExecutionError::MissingTarget(self.flow))?;
                let body = BufferedBody::replay(req.body_mut(), self.max_body_size).await?;
                Ok(InterceptorRequest {
                    headers: req.headers().to_canonical_multimap(),
                    body: body_text(&body),
                    method: Some(req.method().to_string()),
                    path: Some(req.uri().path().to_string()),
                })
            }
            Flow::Response => {
                let resp = ctx
                    .response
                    .as_mut()
                    .ok_or(ExecutionError::MissingTarget(self.flow))?;
                let body = BufferedBody::replay(resp.body_mut(), self.max_body_size).await?;
                Ok(InterceptorRequest {
                    headers: resp.headers().to_canonical_multimap(),
                    body: body_text(&body),
                    ..InterceptorRequest::default()
                })
            }
            Flow::Fault | Flow::Unspecified => {
                let headers = ctx
                    .headers(self.flow)
                    .ok_or(ExecutionError::MissingTarget(self.flow))?;
                Ok(InterceptorRequest {
                    headers: headers.to_canonical_multimap(),
                    ..InterceptorRequest::default()
                })
            }
        }
    }

    async fn call(&self, snapshot: &InterceptorRequest) -> Result<InterceptorResponse, ExecutionError> {
        let response = self
            .client
            .post(&self.service_url)
            .timeout(self.timeout)
            .json(snapshot)
            .send()
            .await
            .map_err(ExecutionError::InterceptorCall)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExecutionError::InterceptorStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(ExecutionError::InterceptorCall)?;
        serde_json::from_slice(&body).map_err(|e| ExecutionError::InterceptorDecode(e.to_string()))
    }
}

fn body_text(body: &BufferedBody) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(body.text().into_owned())
    }
}

/// Replace every header named in `reply` with the reply's values.
///
/// All entries are parsed before any is applied, so an invalid entry leaves
/// `headers` unchanged.
pub(crate) fn apply_reply_headers(
    headers: &mut HeaderMap,
    reply: &BTreeMap<String, Vec<String>>,
) -> Result<(), ExecutionError> {
    let mut parsed = Vec::with_capacity(reply.len());
    for (name, values) in reply {
        let header_name = parse_name(name)?;
        let header_values = values
            .iter()
            .map(|v| parse_value(name, v))
            .collect::<Result<Vec<_>, _>>()?;
        parsed.push((header_name, header_values));
    }

    for (name, values) in parsed {
        headers.remove(&name);
        for value in values {
            headers.append(name.clone(), value);
        }
    }
    Ok(())
}

#[async_trait]
impl Policy for InterceptorPolicy {
    fn name(&self) -> &'static str {
        "Interceptor"
    }

    fn flow(&self) -> Flow {
        self.flow
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.service_url.is_empty() {
            return Err(ConfigError::EmptyServiceUrl);
        }
        let url = Url::parse(&self.service_url).map_err(|e| ConfigError::InvalidServiceUrl {
            url: self.service_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidServiceUrl {
                url: self.service_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout);
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }

    async fn execute(&self, ctx: &mut PolicyContext) -> Result<(), ExecutionError> {
        let snapshot = self.snapshot(ctx).await?;

        tracing::debug!(
            url = %self.service_url,
            flow = %self.flow,
            headers = snapshot.headers.len(),
            "Calling interceptor service"
        );

        let reply = self.call(&snapshot).await?;
        let target = ctx.headers_mut(self.flow)?;
        apply_reply_headers(target, &reply.headers)?;

        tracing::debug!(
            url = %self.service_url,
            headers_applied = reply.headers.len(),
            "Interceptor reply applied"
        );
        Ok(())
    }
}
