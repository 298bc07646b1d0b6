use std::sync::Arc;
use std::time::Duration;

use mongodb::{bson::doc, options::ClientOptions, Client};
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::MemoryProductRepository;
use crate::database::mongo::MongoProductRepository;
use crate::database::repository::ProductRepository;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Builds the MongoDB client and the product repository for a configuration
pub struct DatabaseManager;

impl DatabaseManager {
    const APP_NAME: &'static str = "product-svc";

    /// Create a pooled client. The driver connects lazily on first use.
    pub async fn connect(config: &DatabaseConfig) -> Result<Client, DatabaseError> {
        if config.uri.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("MONGODB_URI"));
        }

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(Self::APP_NAME.to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));

        let client = Client::with_options(options)?;
        info!("Created MongoDB client for database: {}", config.name);
        Ok(client)
    }

    /// Round-trip a ping command to the configured database
    pub async fn health_check(client: &Client, database: &str) -> Result<(), DatabaseError> {
        client.database(database).run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Repository for the configured backend
    pub async fn repository(config: &DatabaseConfig) -> Result<Arc<dyn ProductRepository>, DatabaseError> {
        match config.backend {
            StoreBackend::Mongo => {
                let client = Self::connect(config).await?;
                Ok(Arc::new(MongoProductRepository::new(client, &config.name, &config.collection)))
            }
            StoreBackend::Memory => {
                info!("Using in-memory product store");
                Ok(Arc::new(MemoryProductRepository::new()))
            }
        }
    }
}
