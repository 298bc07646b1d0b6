pub mod product;

pub use product::{NewProduct, Product, ProductDocument, ProductInput, ProductUpdate};
