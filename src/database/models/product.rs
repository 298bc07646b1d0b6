use async_graphql::SimpleObject;
use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Stored product as exposed to API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller may set on create and update
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub stock: i32,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: f64, stock: i32) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }
}

/// A product ready to insert; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewProduct {
    pub fn stamped(input: ProductInput, now: DateTime<Utc>) -> Self {
        Self {
            name: input.name,
            price: input.price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Replacement values for an existing product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

impl ProductUpdate {
    pub fn stamped(input: ProductInput, now: DateTime<Utc>) -> Self {
        Self {
            name: input.name,
            price: input.price,
            stock: input.stock,
            updated_at: now,
        }
    }
}

/// BSON shape of a product in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl ProductDocument {
    /// True when applying `update` would change a business field
    pub fn differs_from(&self, update: &ProductUpdate) -> bool {
        self.name != update.name || self.price != update.price || self.stock != update.stock
    }
}

impl From<NewProduct> for ProductDocument {
    fn from(product: NewProduct) -> Self {
        Self {
            id: None,
            name: product.name,
            price: product.price,
            stock: product.stock,
            created_at: to_bson_datetime(product.created_at),
            updated_at: to_bson_datetime(product.updated_at),
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name,
            price: doc.price,
            stock: doc.stock,
            created_at: to_chrono(doc.created_at),
            updated_at: to_chrono(doc.updated_at),
        }
    }
}

pub fn to_bson_datetime(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

pub fn to_chrono(dt: BsonDateTime) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(dt.timestamp_millis()).single().unwrap_or_default()
}
