use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::auth::{ClaimsValidator, JwtError, JwtKeys, RoleClaimsValidator};
use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, ProductRepository};
use crate::graphql::{build_schema, ProductSchema};
use crate::handlers;
use crate::middleware::{cors_layer, jwt_auth_middleware};
use crate::services::ProductService;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("JWT configuration error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub schema: ProductSchema,
    pub service: ProductService,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProductRepository>, jwt: JwtKeys, validator: Arc<dyn ClaimsValidator>) -> Self {
        Self::with_service(ProductService::new(repo), jwt, validator)
    }

    pub fn with_service(service: ProductService, jwt: JwtKeys, validator: Arc<dyn ClaimsValidator>) -> Self {
        Self {
            schema: build_schema(service.clone(), validator),
            service,
            jwt: Arc::new(jwt),
        }
    }

    /// Connect the configured store and derive keys and validator from config
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let jwt = JwtKeys::from_secret(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
        let validator = RoleClaimsValidator::new(&config.security.admin_claim, &config.security.admin_role);
        let repo = DatabaseManager::repository(&config.database).await?;
        Ok(Self::new(repo, jwt, Arc::new(validator)))
    }
}

/// Router: CORS outermost, then JWT auth on the GraphQL route only
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route(&config.server.path, post(handlers::graphql_post))
        .route_layer(axum::middleware::from_fn_with_state(state.jwt.clone(), jwt_auth_middleware))
        .route("/health", get(handlers::health))
        .layer(cors_layer(&config.security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
