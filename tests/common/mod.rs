#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub use product_svc::testing::TestContext;

const BODY_LIMIT: usize = 1024 * 1024;

/// Send one request through a fresh router and decode the JSON body
pub async fn send(router: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

/// POST a raw body to the GraphQL endpoint
pub async fn post_raw(ctx: &TestContext, token: Option<&str>, body: impl Into<Body>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(ctx.path())
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    send(ctx.router(), builder.body(body.into())?).await
}

/// POST a GraphQL document
pub async fn graphql(ctx: &TestContext, token: Option<&str>, query: &str) -> Result<(StatusCode, Value)> {
    post_raw(ctx, token, json!({ "query": query }).to_string()).await
}

/// First error's `extensions.code`
pub fn first_error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}
