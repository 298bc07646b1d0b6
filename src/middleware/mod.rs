pub mod auth;
pub mod cors;

pub use auth::jwt_auth_middleware;
pub use cors::cors_layer;
