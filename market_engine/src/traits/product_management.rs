use thiserror::Error;

use crate::db_types::{NewProduct, Product};

#[derive(Debug, Clone, Error)]
pub enum ProductApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid product. {0}")]
    InvalidProduct(String),
    #[error("Product {0} is referenced by existing purchases and cannot be deleted")]
    ProductInUse(i64),
}

impl From<sqlx::Error> for ProductApiError {
    fn from(e: sqlx::Error) -> Self {
        ProductApiError::DatabaseError(e.to_string())
    }
}

/// The `ProductManagement` trait defines the catalogue operations a backend must support.
#[allow(async_fn_in_trait)]
pub trait ProductManagement {
    async fn fetch_all_products(&self) -> Result<Vec<Product>, ProductApiError>;

    /// Fetches the product with the given id. If no such product exists, `None` is returned.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError>;

    async fn fetch_products_by_category(&self, category_id: i64) -> Result<Vec<Product>, ProductApiError>;

    /// Fetches all *active* products whose stock is at most `quantity`.
    async fn fetch_scarce_products(&self, quantity: i64) -> Result<Vec<Product>, ProductApiError>;

    /// Stores a new product and returns it with its generated id.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError>;

    /// Deletes the product. Returns `false` if there was nothing to delete.
    async fn delete_product(&self, product_id: i64) -> Result<bool, ProductApiError>;
}
