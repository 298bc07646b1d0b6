//! Product catalog GraphQL schema.
//!
//! The schema is built once at startup. Product operations and the claims
//! validator are schema data; the caller's [`RequestContext`] is attached per
//! request with `Request::data`.
//!
//! [`RequestContext`]: crate::auth::RequestContext

pub mod errors;
pub mod mutation;
pub mod query;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

use crate::auth::ClaimsValidator;
use crate::services::ProductService;

pub use errors::error_code;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type ProductSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(service: ProductService, validator: Arc<dyn ClaimsValidator>) -> ProductSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .data(validator)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthClaims, RequestContext, RoleClaimsValidator};
    use crate::database::models::ProductInput;
    use crate::database::MemoryProductRepository;
    use async_graphql::Request;

    struct Fixture {
        schema: ProductSchema,
        service: ProductService,
        repo: Arc<MemoryProductRepository>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryProductRepository::new());
        let service = ProductService::new(repo.clone());
        let schema = build_schema(service.clone(), Arc::new(RoleClaimsValidator::default()));
        Fixture { schema, service, repo }
    }

    fn as_role(query: &str, role: &str) -> Request {
        Request::new(query).data(RequestContext::new(AuthClaims::new().with("sub", "u-1").with("role", role)))
    }

    #[tokio::test]
    async fn sdl_exposes_operations() {
        let sdl = fixture().schema.sdl();
        for field in ["getProduct", "products", "createProduct", "updateProduct", "deleteProduct"] {
            assert!(sdl.contains(field), "missing {} in schema", field);
        }
        assert!(sdl.contains("createdAt"));
    }

    #[tokio::test]
    async fn create_then_list() {
        let fx = fixture();
        let resp = fx
            .schema
            .execute(as_role(
                r#"mutation { createProduct(name: "Lamp", price: 12.5, stock: 3) { id name price stock } }"#,
                "viewer",
            ))
            .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);

        let resp = fx.schema.execute(as_role("{ products { name stock } }", "viewer")).await;
        let data = resp.data.into_json().unwrap();
        assert_eq!(data["products"][0]["name"], "Lamp");
        assert_eq!(data["products"][0]["stock"], 3);
    }

    #[tokio::test]
    async fn non_admin_delete_is_forbidden() {
        let fx = fixture();
        let product = fx.service.create_product(ProductInput::new("Lamp", 1.0, 1)).await.unwrap();

        let query = format!(r#"mutation {{ deleteProduct(id: "{}") }}"#, product.id);
        let resp = fx.schema.execute(as_role(&query, "viewer")).await;

        assert_eq!(resp.errors.len(), 1);
        assert_eq!(error_code(&resp.errors[0]), Some(errors::FORBIDDEN));
        assert_eq!(fx.repo.len().await, 1);
    }

    #[tokio::test]
    async fn non_admin_update_is_forbidden() {
        let fx = fixture();
        let product = fx.service.create_product(ProductInput::new("Lamp", 1.0, 1)).await.unwrap();

        let query = format!(
            r#"mutation {{ updateProduct(id: "{}", name: "X", price: 2.0, stock: 2) {{ name }} }}"#,
            product.id
        );
        let resp = fx.schema.execute(as_role(&query, "viewer")).await;

        assert_eq!(error_code(&resp.errors[0]), Some(errors::FORBIDDEN));
        assert_eq!(fx.service.get_product(&product.id).await.unwrap().name, "Lamp");
    }

    #[tokio::test]
    async fn missing_context_is_forbidden() {
        let fx = fixture();
        let resp = fx
            .schema
            .execute(Request::new(r#"mutation { deleteProduct(id: "x") }"#))
            .await;
        assert_eq!(error_code(&resp.errors[0]), Some(errors::FORBIDDEN));
    }

    #[tokio::test]
    async fn admin_update_applies() {
        let fx = fixture();
        let product = fx.service.create_product(ProductInput::new("Lamp", 1.0, 1)).await.unwrap();

        let query = format!(
            r#"mutation {{ updateProduct(id: "{}", name: "X", price: 2.0, stock: 2) {{ id name }} }}"#,
            product.id
        );
        let resp = fx.schema.execute(as_role(&query, "admin")).await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);

        let data = resp.data.into_json().unwrap();
        assert_eq!(data["updateProduct"]["id"], product.id.as_str());
        assert_eq!(data["updateProduct"]["name"], "X");
    }

    #[tokio::test]
    async fn get_missing_reports_not_found() {
        let fx = fixture();
        let resp = fx
            .schema
            .execute(as_role(r#"{ getProduct(id: "64b7f0c2a1b2c3d4e5f60718") { id } }"#, "viewer"))
            .await;
        assert_eq!(error_code(&resp.errors[0]), Some("NOT_FOUND"));
    }
}
