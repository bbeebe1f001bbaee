//! Data types that are stored in, and returned from, the marketplace database.
//!
//! The JSON representation of the catalogue and purchase types uses camelCase field names, which is what the
//! storefront clients send and expect.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//--------------------------------------     Customer       ---------------------------------------------------------
/// A registered customer. The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: String,
    /// The encoded credential. Plaintext passwords never reach the engine.
    pub password_hash: String,
}

//--------------------------------------      Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub category_id: i64,
    pub barcode: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

//--------------------------------------      Purchase      ---------------------------------------------------------
/// A purchase (order header) together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub purchase_id: i64,
    pub client_id: String,
    pub date: NaiveDateTime,
    pub payment_method: String,
    pub comment: Option<String>,
    pub state: String,
    #[sqlx(skip)]
    pub items: Vec<PurchaseItem>,
}

/// A single line of a purchase. Items are owned by their purchase and have no identity of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub product_id: i64,
    pub quantity: i64,
    pub total: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub client_id: String,
    pub date: NaiveDateTime,
    pub payment_method: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub state: String,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
}

fn default_true() -> bool {
    true
}
