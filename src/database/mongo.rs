use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::ReturnDocument,
    Client, ClientSession, Collection,
};
use tracing::{debug, error, warn};

use crate::database::models::{product::to_bson_datetime, NewProduct, Product, ProductDocument, ProductUpdate};
use crate::database::repository::{check_update, parse_object_id, ProductRepository, StoreError};

/// Product repository over a MongoDB collection
#[derive(Clone)]
pub struct MongoProductRepository {
    client: Client,
    database: String,
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection::<ProductDocument>(collection);
        Self {
            client,
            database: database.to_string(),
            collection,
        }
    }

    async fn abort(session: &mut ClientSession, id: &str) {
        if let Err(e) = session.abort_transaction().await {
            warn!("Failed to abort update transaction for product '{}': {}", id, e);
        }
    }

    /// Body of the update transaction. Caller owns the session and aborts on error.
    async fn update_in_session(
        &self,
        session: &mut ClientSession,
        id: &str,
        update: &ProductUpdate,
    ) -> Result<ProductDocument, StoreError> {
        let filter = doc! { "_id": parse_object_id(id) };

        let result = self
            .collection
            .update_one(
                filter.clone(),
                doc! { "$set": {
                    "name": update.name.as_str(),
                    "price": update.price,
                    "stock": update.stock,
                } },
            )
            .session(&mut *session)
            .await
            .map_err(|e| StoreError::Update(e.to_string()))?;

        check_update(id, result.matched_count, result.modified_count)?;

        self.collection
            .find_one_and_update(filter, doc! { "$set": { "updated_at": to_bson_datetime(update.updated_at) } })
            .return_document(ReturnDocument::After)
            .session(&mut *session)
            .await
            .map_err(|e| StoreError::Update(e.to_string()))?
            .ok_or_else(|| StoreError::Update(format!("product '{}' vanished during update", id)))
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, StoreError> {
        let cursor = self.collection.find(doc! {}).await.map_err(|e| {
            error!("Failed to query products: {}", e);
            StoreError::Unavailable(e.to_string())
        })?;

        let documents: Vec<ProductDocument> = cursor.try_collect().await.map_err(|e| {
            error!("Failed to read product cursor: {}", e);
            StoreError::Unavailable(e.to_string())
        })?;

        debug!("Loaded {} products", documents.len());
        Ok(documents.into_iter().map(Product::from).collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut document = ProductDocument::from(product);
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| StoreError::Insert(e.to_string()))?;

        document.id = result.inserted_id.as_object_id();
        debug!("Inserted product {:?}", document.id);
        Ok(Product::from(document))
    }

    async fn find_by_id(&self, id: &str) -> Result<Product, StoreError> {
        self.collection
            .find_one(doc! { "_id": parse_object_id(id) })
            .await
            .map_err(|e| StoreError::NotFound(e.to_string()))?
            .map(Product::from)
            .ok_or_else(|| StoreError::NotFound(format!("no product with id '{}'", id)))
    }

    async fn update(&self, id: &str, update: ProductUpdate) -> Result<Product, StoreError> {
        // Dropping the session ends it, so every return path releases it
        let mut session = self
            .client
            .start_session()
            .await
            .map_err(|e| StoreError::Update(e.to_string()))?;

        session
            .start_transaction()
            .await
            .map_err(|e| StoreError::Update(e.to_string()))?;

        let document = match self.update_in_session(&mut session, id, &update).await {
            Ok(document) => document,
            Err(err) => {
                warn!("Aborting update of product '{}': {}", id, err);
                Self::abort(&mut session, id).await;
                return Err(err);
            }
        };

        session.commit_transaction().await.map_err(|e| {
            error!("Failed to commit update of product '{}': {}", id, e);
            StoreError::Commit(e.to_string())
        })?;

        debug!("Updated product '{}'", id);
        Ok(Product::from(document))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": parse_object_id(id) })
            .await
            .map_err(|e| StoreError::Delete(e.to_string()))?;

        debug!("Deleted {} product(s) for id '{}'", result.deleted_count, id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::database::manager::DatabaseManager::health_check(&self.client, &self.database)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
