use async_graphql::{Context, ErrorExtensions, Object, Result};

use crate::database::models::Product;
use crate::services::ProductService;

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Fetch one product by its 24-hex id
    async fn get_product(&self, ctx: &Context<'_>, id: String) -> Result<Product> {
        let service = ctx.data::<ProductService>()?;
        service.get_product(&id).await.map_err(|e| e.extend())
    }

    /// Every product in the catalog
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let service = ctx.data::<ProductService>()?;
        service.list_products().await.map_err(|e| e.extend())
    }
}
