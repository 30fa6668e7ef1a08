//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::Json,
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use gateway_policies::policy::{HeaderStore, InterceptorRequest};
use serde_json::json;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral localhost port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A localhost address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a programmable interceptor service at `/intercept`.
///
/// `f` receives the decoded snapshot and returns the status and raw body to
/// reply with.
pub async fn start_interceptor<F, Fut>(f: F) -> String
where
    F: Fn(InterceptorRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    let router = Router::new().route(
        "/intercept",
        post(move |Json(snapshot): Json<InterceptorRequest>| {
            let f = f.clone();
            async move {
                let (status, body) = f(snapshot).await;
                (StatusCode::from_u16(status).unwrap(), body)
            }
        }),
    );
    let addr = serve(router).await;
    format!("http://{}/intercept", addr)
}

/// Build an interceptor reply that sets the given headers. Repeated names
/// become multiple values.
pub fn reply_with_headers(pairs: &[(&str, &str)]) -> String {
    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        headers
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }
    json!({ "headers": headers }).to_string()
}

/// Start a backend that echoes the request it received as JSON and counts
/// hits. Responses carry `server: mock-backend`.
pub async fn start_echo_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().fallback(move |req: Request<Body>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            let headers = req.headers().to_multimap();
            let path = req.uri().path().to_string();
            let body = axum::body::to_bytes(req.into_body(), usize::MAX)
                .await
                .unwrap();
            let echo = json!({
                "path": path,
                "headers": headers,
                "body": String::from_utf8_lossy(&body),
            });
            ([("server", "mock-backend")], Json(echo))
        }
    });
    (serve(router).await, hits)
}
