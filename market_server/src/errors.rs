use actix_web::{
    error::ResponseError,
    http::{
        header::{ContentType, WWW_AUTHENTICATE},
        StatusCode,
    },
    HttpResponse,
};
use market_engine::traits::{CustomerApiError, ProductApiError, PurchaseApiError};
use thiserror::Error;

use crate::route_rules::RouteRuleError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("The request was invalid. {0}")]
    InvalidInput(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Invalid route rule. {0}")]
    RouteRuleError(#[from] RouteRuleError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with existing data. {0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::Rejected(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::CredentialEncodingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::TokenIssueError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RouteRuleError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::UNAUTHORIZED {
            // Every authentication failure looks the same from the outside. The reason is only logged.
            return HttpResponse::build(status)
                .insert_header(ContentType::json())
                .insert_header((WWW_AUTHENTICATE, "Bearer"))
                .body(serde_json::json!({ "error": "Unauthorized" }).to_string());
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// The reasons a bearer token can be turned away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("No bearer credentials were provided.")]
    MissingCredentials,
    #[error("The bearer token is malformed. {0}")]
    MalformedToken(String),
    #[error("The bearer token signature is invalid.")]
    InvalidSignature,
    #[error("The bearer token has expired.")]
    ExpiredToken,
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(#[from] TokenRejection),
    #[error("The email or password is incorrect.")]
    InvalidCredentials,
    #[error("Could not encode or verify the credential. {0}")]
    CredentialEncodingError(String),
    #[error("Could not issue an access token. {0}")]
    TokenIssueError(String),
}

impl From<TokenRejection> for ServerError {
    fn from(e: TokenRejection) -> Self {
        Self::AuthenticationError(AuthError::Rejected(e))
    }
}

impl From<ProductApiError> for ServerError {
    fn from(e: ProductApiError) -> Self {
        match e {
            ProductApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ProductApiError::InvalidProduct(s) => Self::InvalidInput(s),
            ProductApiError::ProductInUse(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<PurchaseApiError> for ServerError {
    fn from(e: PurchaseApiError) -> Self {
        match e {
            PurchaseApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            PurchaseApiError::InvalidPurchase(s) => Self::InvalidInput(s),
        }
    }
}

impl From<CustomerApiError> for ServerError {
    fn from(e: CustomerApiError) -> Self {
        match e {
            CustomerApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            CustomerApiError::CustomerAlreadyExists => Self::Conflict(e.to_string()),
        }
    }
}
