//! Test harness: an app wired to the in-process store with a known secret.

use std::sync::Arc;

use axum::Router;

use crate::app::{app, AppState};
use crate::auth::{AuthClaims, JwtKeys, RoleClaimsValidator};
use crate::config::{AppConfig, StoreBackend};
use crate::database::MemoryProductRepository;

pub const TEST_SECRET: &str = "product-svc-test-secret";

/// Application state plus handles tests use to inspect the store
pub struct TestContext {
    pub config: AppConfig,
    pub repo: Arc<MemoryProductRepository>,
    pub state: AppState,
    keys: JwtKeys,
}

impl TestContext {
    pub fn new() -> anyhow::Result<Self> {
        let mut config = AppConfig::from_env();
        config.database.backend = StoreBackend::Memory;
        config.security.jwt_secret = TEST_SECRET.to_string();
        config.security.admin_claim = "role".to_string();
        config.security.admin_role = "admin".to_string();
        config.security.cors_origins = vec!["*".to_string()];

        let keys = JwtKeys::from_secret(TEST_SECRET, 1)?;
        let repo = Arc::new(MemoryProductRepository::new());
        let state = AppState::new(repo.clone(), keys.clone(), Arc::new(RoleClaimsValidator::default()));

        Ok(Self { config, repo, state, keys })
    }

    /// Fresh router over the shared state
    pub fn router(&self) -> Router {
        app(self.state.clone(), &self.config)
    }

    /// GraphQL endpoint path
    pub fn path(&self) -> &str {
        &self.config.server.path
    }

    /// Signed token carrying `role` under the admin claim
    pub fn token(&self, role: &str) -> anyhow::Result<String> {
        let claims = AuthClaims::new().with("sub", format!("test-{}", role)).with("role", role);
        Ok(self.keys.issue(claims)?)
    }

    pub fn admin_token(&self) -> anyhow::Result<String> {
        self.token("admin")
    }

    pub fn viewer_token(&self) -> anyhow::Result<String> {
        self.token("viewer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_verify_with_state_keys() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;
        let claims = ctx.state.jwt.verify(&ctx.admin_token()?)?;
        assert_eq!(claims.get_str("role"), Some("admin"));
        assert_eq!(claims.subject(), Some("test-admin"));
        Ok(())
    }
}
