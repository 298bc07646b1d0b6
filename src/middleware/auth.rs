use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{JwtKeys, RequestContext};
use crate::error::ApiError;

/// JWT authentication middleware that verifies the bearer token and
/// injects a [`RequestContext`] for downstream resolvers
pub async fn jwt_auth_middleware(
    State(keys): State<Arc<JwtKeys>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        warn!("Rejected request: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = keys.verify(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    debug!(subject = claims.subject().unwrap_or("<none>"), "Token verified");
    request.extensions_mut().insert(RequestContext::new(claims));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
