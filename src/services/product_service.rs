use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{NewProduct, Product, ProductInput, ProductUpdate};
use crate::database::repository::{ProductRepository, StoreError};

/// Source of "now" for timestamp stamping
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable classification exposed to API clients
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            ServiceError::Store(StoreError::Insert(_)) => "INSERT_FAILED",
            ServiceError::Store(StoreError::Update(_)) => "UPDATE_FAILED",
            ServiceError::Store(StoreError::Delete(_)) => "DELETE_FAILED",
            ServiceError::Store(StoreError::Commit(_)) => "COMMIT_FAILED",
            ServiceError::Store(StoreError::Unavailable(_)) => "UNAVAILABLE",
        }
    }
}

/// Product CRUD over a repository, stamping creation and update times
#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    clock: Clock,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self::with_clock(repo, Arc::new(Utc::now))
    }

    pub fn with_clock(repo: Arc<dyn ProductRepository>, clock: Clock) -> Self {
        Self { repo, clock }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ServiceError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, ServiceError> {
        validate(&input)?;
        let product = NewProduct::stamped(input, (self.clock)());
        Ok(self.repo.create(product).await?)
    }

    pub async fn update_product(&self, id: &str, input: ProductInput) -> Result<Product, ServiceError> {
        validate(&input)?;
        let update = ProductUpdate::stamped(input, (self.clock)());
        Ok(self.repo.update(id, update).await?)
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.repo.delete(id).await?)
    }

    pub async fn health(&self) -> Result<(), ServiceError> {
        Ok(self.repo.ping().await?)
    }
}

fn validate(input: &ProductInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::Validation("name must not be empty".to_string()));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(ServiceError::Validation("price must be a non-negative number".to_string()));
    }
    if input.stock < 0 {
        return Err(ServiceError::Validation("stock must not be negative".to_string()));
    }
    Ok(())
}
