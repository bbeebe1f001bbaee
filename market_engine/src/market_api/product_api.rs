use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewProduct, Product},
    traits::{ProductApiError, ProductManagement},
};

/// The `ProductApi` provides access to the product catalogue.
pub struct ProductApi<B> {
    db: B,
}

impl<B: Debug> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi ({:?})", self.db)
    }
}

impl<B> ProductApi<B>
where B: ProductManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, ProductApiError> {
        self.db.fetch_all_products().await
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError> {
        self.db.fetch_product(product_id).await
    }

    /// Returns the products in the given category, or `None` if the category has no products.
    pub async fn products_by_category(&self, category_id: i64) -> Result<Option<Vec<Product>>, ProductApiError> {
        let products = self.db.fetch_products_by_category(category_id).await?;
        Ok(non_empty(products))
    }

    /// Returns the active products with `quantity` or fewer units in stock, or `None` if there aren't any.
    pub async fn scarce_products(&self, quantity: i64) -> Result<Option<Vec<Product>>, ProductApiError> {
        let products = self.db.fetch_scarce_products(quantity).await?;
        trace!("{} products have less than {quantity} units in stock", products.len());
        Ok(non_empty(products))
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        if product.name.trim().is_empty() {
            return Err(ProductApiError::InvalidProduct("The product name cannot be empty".into()));
        }
        if product.price < 0.0 || !product.price.is_finite() {
            return Err(ProductApiError::InvalidProduct(format!("{} is not a valid price", product.price)));
        }
        if product.stock < 0 {
            return Err(ProductApiError::InvalidProduct("Stock cannot be negative".into()));
        }
        let product = self.db.insert_product(product).await?;
        debug!("Product #{} ({}) created", product.product_id, product.name);
        Ok(product)
    }

    /// Deletes the product. Returns `false` if the product did not exist.
    pub async fn delete_product(&self, product_id: i64) -> Result<bool, ProductApiError> {
        self.db.delete_product(product_id).await
    }
}

pub(crate) fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}
