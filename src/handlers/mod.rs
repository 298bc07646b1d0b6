pub mod graphql;
pub mod health;

pub use graphql::graphql_post;
pub use health::health;
