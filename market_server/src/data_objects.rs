use std::fmt::Display;

use market_common::Secret;
use market_engine::db_types::NewCustomer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// The body of a `POST /auth/register` request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub id: String,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub email: String,
    pub password: Secret<String>,
}

impl RegisterRequest {
    /// Converts the request into a customer record, with the password replaced by its encoded hash.
    pub fn into_new_customer(self, password_hash: String) -> NewCustomer {
        NewCustomer {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            email: self.email,
            password_hash,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(token: String, expires_in: i64) -> Self {
        Self { token, token_type: "Bearer".to_string(), expires_in }
    }
}
