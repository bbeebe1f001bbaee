use std::fmt::Debug;

use log::*;

use super::product_api::non_empty;
use crate::{
    db_types::{NewPurchase, Purchase},
    traits::{PurchaseApiError, PurchaseManagement},
};

/// The `PurchaseApi` records purchases and serves purchase histories.
pub struct PurchaseApi<B> {
    db: B,
}

impl<B: Debug> Debug for PurchaseApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PurchaseApi ({:?})", self.db)
    }
}

impl<B> PurchaseApi<B>
where B: PurchaseManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn purchases(&self) -> Result<Vec<Purchase>, PurchaseApiError> {
        self.db.fetch_all_purchases().await
    }

    /// Returns the purchases made by the given client, or `None` if they haven't made any.
    pub async fn purchases_for_client(&self, client_id: &str) -> Result<Option<Vec<Purchase>>, PurchaseApiError> {
        let purchases = self.db.fetch_purchases_for_client(client_id).await?;
        Ok(non_empty(purchases))
    }

    /// Saves a new purchase along with its items.
    ///
    /// The client and every product referenced by the items must already exist. Item quantities must be positive.
    pub async fn create_purchase(&self, purchase: NewPurchase) -> Result<Purchase, PurchaseApiError> {
        if purchase.client_id.trim().is_empty() {
            return Err(PurchaseApiError::InvalidPurchase("A purchase must belong to a client".into()));
        }
        if let Some(item) = purchase.items.iter().find(|i| i.quantity <= 0) {
            return Err(PurchaseApiError::InvalidPurchase(format!(
                "Item for product {} has a non-positive quantity",
                item.product_id
            )));
        }
        let purchase = self.db.insert_purchase(purchase).await?;
        info!(
            "Purchase #{} recorded for client {} with {} items",
            purchase.purchase_id,
            purchase.client_id,
            purchase.items.len()
        );
        Ok(purchase)
    }
}
