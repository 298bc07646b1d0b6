use std::sync::Arc;

use async_graphql::{Context, ErrorExtensions, Object, Result};
use tracing::warn;

use crate::auth::{ClaimsValidator, RequestContext};
use crate::database::models::{Product, ProductInput};
use crate::graphql::errors::forbidden;
use crate::services::ProductService;

#[derive(Default)]
pub struct MutationRoot;

/// Fails unless the request's claims carry the admin role
fn require_admin(ctx: &Context<'_>, operation: &str) -> Result<()> {
    let validator = ctx.data::<Arc<dyn ClaimsValidator>>()?;
    let request = ctx.data::<RequestContext>().map_err(|_| forbidden())?;

    if validator.is_admin(&request.claims) {
        return Ok(());
    }

    warn!(
        subject = request.claims.subject().unwrap_or("<none>"),
        operation, "Rejected non-admin mutation"
    );
    Err(forbidden())
}

#[Object]
impl MutationRoot {
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        name: String,
        price: f64,
        stock: i32,
    ) -> Result<Product> {
        let service = ctx.data::<ProductService>()?;
        service
            .create_product(ProductInput::new(name, price, stock))
            .await
            .map_err(|e| e.extend())
    }

    /// Admin only
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: String,
        name: String,
        price: f64,
        stock: i32,
    ) -> Result<Product> {
        require_admin(ctx, "updateProduct")?;
        let service = ctx.data::<ProductService>()?;
        service
            .update_product(&id, ProductInput::new(name, price, stock))
            .await
            .map_err(|e| e.extend())
    }

    /// Admin only. True once no product has the id.
    async fn delete_product(&self, ctx: &Context<'_>, id: String) -> Result<bool> {
        require_admin(ctx, "deleteProduct")?;
        let service = ctx.data::<ProductService>()?;
        service.delete_product(&id).await.map_err(|e| e.extend())?;
        Ok(true)
    }
}
