mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestContext;

#[tokio::test]
async fn missing_authorization_is_401_before_store_access() -> Result<()> {
    let ctx = TestContext::new()?;
    // An unreachable store would turn any store access into a 503
    ctx.repo.set_unavailable(true);

    let (status, body) = common::graphql(&ctx, None, "{ products { id } }").await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Missing Authorization header");
    Ok(())
}

#[tokio::test]
async fn tampered_token_is_401() -> Result<()> {
    let ctx = TestContext::new()?;
    let mut token = ctx.viewer_token()?;
    token.push('x');

    let (status, body) = common::graphql(&ctx, Some(&token), "{ products { id } }").await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn token_from_other_secret_is_401() -> Result<()> {
    let ctx = TestContext::new()?;
    let foreign = product_svc::auth::JwtKeys::from_secret("someone-else", 1)?;
    let token = foreign.issue(product_svc::auth::AuthClaims::new().with("role", "admin"))?;

    let (status, _) = common::graphql(&ctx, Some(&token), "{ products { id } }").await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(ctx.repo.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_401() -> Result<()> {
    let ctx = TestContext::new()?;
    let keys = product_svc::auth::JwtKeys::from_secret(product_svc::testing::TEST_SECRET, 1)?;
    let expired = chrono::Utc::now().timestamp() - 3600;
    let token = keys.issue(product_svc::auth::AuthClaims::new().with("role", "admin").with("exp", expired))?;

    let (status, _) = common::graphql(&ctx, Some(&token), "{ products { id } }").await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_dispatcher() -> Result<()> {
    let ctx = TestContext::new()?;
    let (status, body) = common::graphql(&ctx, Some(&ctx.viewer_token()?), "{ products { id } }").await?;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["data"]["products"], serde_json::json!([]));
    Ok(())
}
