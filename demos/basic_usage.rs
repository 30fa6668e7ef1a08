//! Walkthrough of the policy API: single policies, a chain, and the axum
//! middleware.
//!
//! Run with `cargo run --example basic_usage`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceExt;

use gateway_policies::http::{policy_middleware, PolicyChains};
use gateway_policies::policy::{
    AddHeaderPolicy, Executor, Flow, Policy, PolicyContext, RemoveHeaderPolicy,
};

fn sample_request(headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri("http://api.example.com/users");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).expect("static request is valid")
}

fn print_headers(label: &str, headers: &HeaderMap) {
    println!("{label}:");
    for (name, value) in headers {
        println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
}

async fn add_header_example() -> Result<(), Box<dyn std::error::Error>> {
    let policy = AddHeaderPolicy::new("X-API-Version", "v1.0", Flow::Request);
    let mut ctx = PolicyContext::for_request(sample_request(&[]));
    print_headers("Before", ctx.headers(Flow::Request).unwrap_or(&HeaderMap::new()));

    policy.execute(&mut ctx).await?;

    print_headers("After", ctx.headers(Flow::Request).unwrap_or(&HeaderMap::new()));
    Ok(())
}

async fn remove_header_example() -> Result<(), Box<dyn std::error::Error>> {
    let policy = RemoveHeaderPolicy::new("Authorization", Flow::Request);
    let mut ctx = PolicyContext::for_request(sample_request(&[
        ("Authorization", "Bearer secret-token"),
        ("Content-Type", "application/json"),
    ]));
    print_headers("Before", ctx.headers(Flow::Request).unwrap_or(&HeaderMap::new()));

    policy.execute(&mut ctx).await?;

    print_headers("After", ctx.headers(Flow::Request).unwrap_or(&HeaderMap::new()));
    Ok(())
}

async fn chaining_example() -> Result<(), Box<dyn std::error::Error>> {
    let mut executor = Executor::new();
    executor.push(AddHeaderPolicy::new("X-Request-ID", "12345-67890", Flow::Request))?;
    executor.push(AddHeaderPolicy::new("X-Gateway", "api-platform", Flow::Request))?;
    executor.push(RemoveHeaderPolicy::new("X-Internal-Token", Flow::Request))?;

    let mut ctx = PolicyContext::for_request(sample_request(&[
        ("X-Internal-Token", "internal-secret"),
        ("User-Agent", "TestClient/1.0"),
    ]));
    print_headers("Before", ctx.headers(Flow::Request).unwrap_or(&HeaderMap::new()));

    executor.execute(Some(&mut ctx)).await?;

    print_headers("After", ctx.headers(Flow::Request).unwrap_or(&HeaderMap::new()));
    println!("Policies applied:");
    for policy in executor.list() {
        println!("  - {}", policy.name());
    }
    Ok(())
}

async fn middleware_example() -> Result<(), Box<dyn std::error::Error>> {
    let mut chains = PolicyChains::default();
    chains
        .request
        .push(AddHeaderPolicy::new("X-Gateway", "api-platform", Flow::Request))?;

    let app = Router::new()
        .route(
            "/test",
            get(|req: Request<Body>| async move {
                print_headers("Handler received", req.headers());
                "Success"
            }),
        )
        .layer(middleware::from_fn_with_state(
            Arc::new(chains),
            policy_middleware,
        ));

    let req = Request::builder()
        .uri("http://api.example.com/test")
        .body(Body::empty())?;
    let response = app.oneshot(req).await?;
    println!("Response status: {}", response.status());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Gateway Policies - Basic Usage Example");
    println!("======================================\n");

    println!("Example 1: Add Header Policy");
    add_header_example().await?;
    println!();

    println!("Example 2: Remove Header Policy");
    remove_header_example().await?;
    println!();

    println!("Example 3: Chaining Multiple Policies");
    chaining_example().await?;
    println!();

    println!("Example 4: HTTP Middleware Integration");
    middleware_example().await?;

    Ok(())
}
