use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Customer, NewCustomer},
    traits::{CustomerApiError, CustomerManagement},
};

/// The `CustomerApi` manages registered customers.
///
/// It only ever deals with *encoded* credentials; hashing and verifying passwords is the caller's job.
pub struct CustomerApi<B> {
    db: B,
}

impl<B: Debug> Debug for CustomerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomerApi ({:?})", self.db)
    }
}

impl<B> CustomerApi<B>
where B: CustomerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError> {
        self.db.fetch_customer_by_email(&normalize_email(email)).await
    }

    pub async fn register(&self, mut customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        customer.email = normalize_email(&customer.email);
        let customer = self.db.insert_customer(customer).await?;
        debug!("Customer {} registered", customer.id);
        Ok(customer)
    }
}

/// E-mail addresses are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
