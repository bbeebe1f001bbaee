//! Marketplace Engine
//!
//! This library contains the persistence layer and the programmatic API of the marketplace back-office. It is
//! transport-agnostic; the HTTP surface lives in `market_server`.
//!
//! The library is divided into three main sections:
//! 1. The data types stored in the database ([`mod@db_types`]).
//! 2. The backend contracts ([`mod@traits`]). A storage backend implements these traits to serve the API. The
//!    SQLite backend, [`SqliteDatabase`], is the only one shipped.
//! 3. The public API facades ([`ProductApi`], [`PurchaseApi`] and [`CustomerApi`]). Callers create an API instance
//!    by supplying any backend that implements the matching trait, which is also how the server tests substitute
//!    mocks for the database.
pub mod db_types;
mod market_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use market_api::{customer_api::CustomerApi, product_api::ProductApi, purchase_api::PurchaseApi};
pub use traits::{
    CustomerApiError,
    CustomerManagement,
    ProductApiError,
    ProductManagement,
    PurchaseApiError,
    PurchaseManagement,
};
