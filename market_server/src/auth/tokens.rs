use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use super::AuthenticatedIdentity;
use crate::{
    config::AuthConfig,
    errors::{AuthError, TokenRejection},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The customer's e-mail address
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, lifetime: config.token_lifetime }
    }

    /// How long, in seconds, an issued token stays valid.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Issue a new access token for `subject`.
    /// This method DOES NOT check the subject's credentials. That must happen before calling `issue_token`.
    pub fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_token_at(subject, Utc::now().timestamp())
    }

    pub fn issue_token_at(&self, subject: &str, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims { sub: subject.to_string(), iat: issued_at, exp: issued_at + self.lifetime.num_seconds() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::TokenIssueError(e.to_string()))
    }
}

#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
    leeway: i64,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `validate_at` against the caller's clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self { key, validation, leeway: config.leeway_secs }
    }

    /// Validate a token against the wall clock.
    pub fn validate(&self, token: &str) -> Result<AuthenticatedIdentity, TokenRejection> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token as though the current time were `now` (seconds since the Unix epoch).
    ///
    /// A token is expired once `exp + leeway < now`.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<AuthenticatedIdentity, TokenRejection> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
            _ => TokenRejection::MalformedToken(e.to_string()),
        })?;
        let claims = data.claims;
        if claims.exp.saturating_add(self.leeway) < now {
            trace!("🔐️ Token for {} expired at {}", claims.sub, claims.exp);
            return Err(TokenRejection::ExpiredToken);
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenRejection::MalformedToken("Empty subject claim".into()));
        }
        Ok(AuthenticatedIdentity::new(claims.sub))
    }
}
