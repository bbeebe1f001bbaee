//! `SqliteDatabase` is a concrete implementation of a marketplace backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{customers, new_pool, products, purchases};
use crate::{
    db_types::{Customer, NewCustomer, NewProduct, NewPurchase, Product, Purchase},
    traits::{
        is_foreign_key_violation,
        is_unique_violation,
        CustomerApiError,
        CustomerManagement,
        ProductApiError,
        ProductManagement,
        PurchaseApiError,
        PurchaseManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl ProductManagement for SqliteDatabase {
    async fn fetch_all_products(&self) -> Result<Vec<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_all(&mut conn).await?;
        Ok(products)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_by_id(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products_by_category(&self, category_id: i64) -> Result<Vec<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_by_category(category_id, &mut conn).await?;
        Ok(products)
    }

    async fn fetch_scarce_products(&self, quantity: i64) -> Result<Vec<Product>, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_scarce(quantity, &mut conn).await?;
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert(product, &mut conn).await?;
        Ok(product)
    }

    async fn delete_product(&self, product_id: i64) -> Result<bool, ProductApiError> {
        let mut conn = self.pool.acquire().await?;
        products::delete(product_id, &mut conn).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                ProductApiError::ProductInUse(product_id)
            } else {
                ProductApiError::from(e)
            }
        })
    }
}

impl PurchaseManagement for SqliteDatabase {
    async fn fetch_all_purchases(&self) -> Result<Vec<Purchase>, PurchaseApiError> {
        let mut conn = self.pool.acquire().await?;
        let purchases = purchases::fetch_all(&mut conn).await?;
        Ok(purchases)
    }

    async fn fetch_purchases_for_client(&self, client_id: &str) -> Result<Vec<Purchase>, PurchaseApiError> {
        let mut conn = self.pool.acquire().await?;
        let purchases = purchases::fetch_for_client(client_id, &mut conn).await?;
        Ok(purchases)
    }

    /// Takes a new purchase, and in a single atomic transaction,
    /// * stores the purchase header,
    /// * stores every line item against the new purchase id.
    ///
    /// If the client or any product does not exist, or a product appears twice, nothing is stored.
    async fn insert_purchase(&self, purchase: NewPurchase) -> Result<Purchase, PurchaseApiError> {
        let mut tx = self.pool.begin().await?;
        let saved = purchases::insert(purchase, &mut tx).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                PurchaseApiError::InvalidPurchase("The client or one of the products does not exist".into())
            } else if is_unique_violation(&e) {
                PurchaseApiError::InvalidPurchase("A product may only appear once in a purchase".into())
            } else {
                PurchaseApiError::from(e)
            }
        })?;
        tx.commit().await?;
        debug!("🗃️ Purchase #{} committed", saved.purchase_id);
        Ok(saved)
    }
}

impl CustomerManagement for SqliteDatabase {
    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_by_email(email, &mut conn).await?;
        Ok(customer)
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        customers::insert(customer, &mut conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                CustomerApiError::CustomerAlreadyExists
            } else {
                CustomerApiError::from(e)
            }
        })
    }
}

impl SqliteDatabase {
    /// Opens a connection pool to the database at `url`.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete for {}", self.url);
        Ok(())
    }
}
