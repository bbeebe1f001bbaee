//! # Marketplace public API
//!
//! The `market_api` module exposes the programmatic API for the marketplace back-office. Each API wraps a backend
//! that implements the matching trait from [`crate::traits`]:
//!
//! * [`product_api`] serves the product catalogue.
//! * [`purchase_api`] records and queries purchases.
//! * [`customer_api`] registers customers and looks them up for login.
//!
//! ```rust,ignore
//! use market_engine::{ProductApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/market.db", 25).await?;
//! let api = ProductApi::new(db);
//! let products = api.products().await?;
//! ```
pub mod customer_api;
pub mod product_api;
pub mod purchase_api;
