use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::models::{product::to_bson_datetime, NewProduct, Product, ProductDocument, ProductUpdate};
use crate::database::repository::{check_update, parse_object_id, ProductRepository, StoreError};

/// In-process product store for development and tests.
///
/// Documents keep insertion order. The write lock is held for the whole
/// update, so a rejected update leaves the document untouched.
#[derive(Default)]
pub struct MemoryProductRepository {
    documents: RwLock<Vec<ProductDocument>>,
    unavailable: AtomicBool,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the server were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), String> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err("server selection timeout".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, StoreError> {
        self.check_available().map_err(StoreError::Unavailable)?;
        let documents = self.documents.read().await;
        Ok(documents.iter().cloned().map(Product::from).collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        self.check_available().map_err(StoreError::Insert)?;
        let mut document = ProductDocument::from(product);
        document.id = Some(ObjectId::new());

        self.documents.write().await.push(document.clone());
        debug!("Inserted product {:?}", document.id);
        Ok(Product::from(document))
    }

    async fn find_by_id(&self, id: &str) -> Result<Product, StoreError> {
        self.check_available().map_err(StoreError::NotFound)?;
        let oid = parse_object_id(id);
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|doc| doc.id == Some(oid))
            .cloned()
            .map(Product::from)
            .ok_or_else(|| StoreError::NotFound(format!("no product with id '{}'", id)))
    }

    async fn update(&self, id: &str, update: ProductUpdate) -> Result<Product, StoreError> {
        self.check_available().map_err(StoreError::Update)?;
        let oid = parse_object_id(id);
        let mut documents = self.documents.write().await;

        let existing = documents.iter_mut().find(|doc| doc.id == Some(oid));
        let matched = u64::from(existing.is_some());
        let modified = u64::from(existing.as_ref().is_some_and(|doc| doc.differs_from(&update)));
        check_update(id, matched, modified)?;

        let Some(document) = existing else {
            return Err(StoreError::Update(format!("no product with id '{}'", id)));
        };
        document.name = update.name;
        document.price = update.price;
        document.stock = update.stock;
        document.updated_at = to_bson_datetime(update.updated_at);

        debug!("Updated product '{}'", id);
        Ok(Product::from(document.clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check_available().map_err(StoreError::Delete)?;
        let oid = parse_object_id(id);
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|doc| doc.id != Some(oid));
        debug!("Deleted {} product(s) for id '{}'", before - documents.len(), id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available().map_err(StoreError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ProductInput;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn new_product(name: &str) -> NewProduct {
        NewProduct::stamped(ProductInput::new(name, 9.99, 10), at(1_000))
    }

    fn update(name: &str, secs: i64) -> ProductUpdate {
        ProductUpdate::stamped(ProductInput::new(name, 9.99, 10), at(secs))
    }

    #[tokio::test]
    async fn create_assigns_hex_id() {
        let repo = MemoryProductRepository::new();
        let product = repo.create(new_product("Lamp")).await.unwrap();
        assert_eq!(product.id.len(), 24);
        assert!(ObjectId::parse_str(&product.id).is_ok());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn get_all_keeps_insertion_order() {
        let repo = MemoryProductRepository::new();
        repo.create(new_product("a")).await.unwrap();
        repo.create(new_product("b")).await.unwrap();
        let names: Vec<_> = repo.get_all().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn find_malformed_id_is_not_found() {
        let repo = MemoryProductRepository::new();
        repo.create(new_product("Lamp")).await.unwrap();
        assert!(matches!(repo.find_by_id("xyz").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_keeps_id_and_created_at() {
        let repo = MemoryProductRepository::new();
        let created = repo.create(new_product("Lamp")).await.unwrap();
        let updated = repo.update(&created.id, update("Desk", 2_000)).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, at(2_000));
        assert_eq!(updated.name, "Desk");
    }

    #[tokio::test]
    async fn identical_update_is_rejected_and_leaves_stamp() {
        let repo = MemoryProductRepository::new();
        let created = repo.create(new_product("Lamp")).await.unwrap();

        let err = repo.update(&created.id, update("Lamp", 2_000)).await.unwrap_err();
        assert!(matches!(err, StoreError::Update(_)));

        let stored = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(stored.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_is_rejected() {
        let repo = MemoryProductRepository::new();
        let err = repo.update(&ObjectId::new().to_hex(), update("Lamp", 2_000)).await.unwrap_err();
        assert!(matches!(err, StoreError::Update(_)));
    }

    #[tokio::test]
    async fn delete_missing_is_noop() {
        let repo = MemoryProductRepository::new();
        repo.create(new_product("Lamp")).await.unwrap();
        repo.delete(&ObjectId::new().to_hex()).await.unwrap();
        repo.delete("not-an-id").await.unwrap();
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn unavailable_store_surfaces_errors() {
        let repo = MemoryProductRepository::new();
        repo.set_unavailable(true);
        assert!(matches!(repo.get_all().await, Err(StoreError::Unavailable(_))));
        assert!(matches!(repo.create(new_product("x")).await, Err(StoreError::Insert(_))));
        assert!(matches!(repo.delete("x").await, Err(StoreError::Delete(_))));
        assert!(repo.ping().await.is_err());

        repo.set_unavailable(false);
        assert!(repo.ping().await.is_ok());
    }
}
