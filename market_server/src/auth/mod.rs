//! Stateless bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying the customer's e-mail as the `sub` claim. [`TokenIssuer`] mints them at login and
//! [`TokenValidator`] checks them on every protected request. The validated identity travels with the request as an
//! [`AuthenticatedIdentity`], which handlers can ask for as an extractor.
mod password;
mod tokens;

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::HeaderValue, FromRequest, HttpMessage, HttpRequest};
pub use password::{hash_password, verify_password};
use serde::Serialize;
pub use tokens::{Claims, TokenIssuer, TokenValidator};

use crate::errors::{ServerError, TokenRejection};

/// The identity attached to a request once its bearer token has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedIdentity {
    subject: String,
}

impl AuthenticatedIdentity {
    pub fn new<S: Into<String>>(subject: S) -> Self {
        Self { subject: subject.into() }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl FromRequest for AuthenticatedIdentity {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<AuthenticatedIdentity>().cloned();
        ready(identity.ok_or(ServerError::from(TokenRejection::MissingCredentials)))
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Any other scheme, or an empty token, is a malformed credential.
pub fn extract_bearer_token(header: &HeaderValue) -> Result<&str, TokenRejection> {
    let value = header
        .to_str()
        .map_err(|_| TokenRejection::MalformedToken("Authorization header is not valid ASCII".into()))?;
    let (scheme, token) = value.trim().split_once(' ').unwrap_or((value.trim(), ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenRejection::MalformedToken(format!("Unsupported authorization scheme '{scheme}'")));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenRejection::MalformedToken("Empty bearer token".into()));
    }
    Ok(token)
}
