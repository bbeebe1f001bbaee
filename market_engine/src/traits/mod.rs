//! # Backend behaviour
//!
//! This module defines the contracts that a database backend must honour in order to serve the marketplace API.
//!
//! * [`ProductManagement`] covers the product catalogue.
//! * [`PurchaseManagement`] covers purchases and their line items.
//! * [`CustomerManagement`] covers registered customers and their stored credentials.
//!
//! Each trait comes with its own error type, so that a backend can be mocked one concern at a time.
mod customer_management;
mod product_management;
mod purchase_management;

pub use customer_management::{CustomerApiError, CustomerManagement};
pub use product_management::{ProductApiError, ProductManagement};
pub use purchase_management::{PurchaseApiError, PurchaseManagement};

/// Classifies constraint violations reported by the database backend.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(de) if de.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(de) if de.is_foreign_key_violation())
}
