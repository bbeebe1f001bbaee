use thiserror::Error;

use crate::db_types::{NewPurchase, Purchase};

#[derive(Debug, Clone, Error)]
pub enum PurchaseApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid purchase. {0}")]
    InvalidPurchase(String),
}

impl From<sqlx::Error> for PurchaseApiError {
    fn from(e: sqlx::Error) -> Self {
        PurchaseApiError::DatabaseError(e.to_string())
    }
}

/// The `PurchaseManagement` trait defines how purchases and their line items are stored and queried.
///
/// Purchases are always returned with their items populated.
#[allow(async_fn_in_trait)]
pub trait PurchaseManagement {
    async fn fetch_all_purchases(&self) -> Result<Vec<Purchase>, PurchaseApiError>;

    async fn fetch_purchases_for_client(&self, client_id: &str) -> Result<Vec<Purchase>, PurchaseApiError>;

    /// Stores the purchase header and all of its items atomically. Either everything is saved, or nothing is.
    async fn insert_purchase(&self, purchase: NewPurchase) -> Result<Purchase, PurchaseApiError>;
}
