use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::database::models::{NewProduct, Product, ProductUpdate};

/// Errors surfaced by product repositories
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("could not find product: {0}")]
    NotFound(String),

    #[error("could not insert product: {0}")]
    Insert(String),

    #[error("could not update product: {0}")]
    Update(String),

    #[error("could not delete product: {0}")]
    Delete(String),

    #[error("could not commit product update: {0}")]
    Commit(String),

    #[error("product store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract for product documents
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product in the collection, unfiltered
    async fn get_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert and return the product with its store-assigned id
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Product, StoreError>;

    /// Transactionally replace name, price and stock, then stamp `updated_at`
    async fn update(&self, id: &str, update: ProductUpdate) -> Result<Product, StoreError>;

    /// Remove by id; a missing id is not an error
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Parse a hex id; malformed input maps to the zero id, which never matches
pub fn parse_object_id(id: &str) -> ObjectId {
    ObjectId::parse_str(id).unwrap_or_else(|_| ObjectId::from_bytes([0; 12]))
}

/// Decide whether an update may commit from its matched/modified counts.
///
/// Zero matched means the id does not exist. Matched but zero modified means
/// the payload equals the stored document. Both abort the transaction.
pub fn check_update(id: &str, matched: u64, modified: u64) -> Result<(), StoreError> {
    if matched == 0 {
        return Err(StoreError::Update(format!("no product with id '{}'", id)));
    }
    if modified == 0 {
        return Err(StoreError::Update(format!("no changes applied to product '{}'", id)));
    }
    Ok(())
}
