use thiserror::Error;

use crate::db_types::{Customer, NewCustomer};

#[derive(Debug, Clone, Error)]
pub enum CustomerApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A customer with this id or email already exists")]
    CustomerAlreadyExists,
}

impl From<sqlx::Error> for CustomerApiError {
    fn from(e: sqlx::Error) -> Self {
        CustomerApiError::DatabaseError(e.to_string())
    }
}

/// Customer records, as needed by the credential-issuance flow.
#[allow(async_fn_in_trait)]
pub trait CustomerManagement {
    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError>;

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError>;
}
