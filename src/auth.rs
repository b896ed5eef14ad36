use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::storage::KeyValueStore;

/// TokenProvider
///
/// Read-only access to the current auth token. Only presence matters: the
/// token is never decoded, validated or checked for expiry here.
///
/// Implementations must return `None` for anything that is not a usable
/// token; [`normalize_token`] does that for the common cases.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// normalize_token
///
/// Empty and whitespace-only values count as "no token".
pub fn normalize_token(raw: Option<String>) -> Option<String> {
    raw.map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// StoredToken
///
/// Token persisted in a [`KeyValueStore`] under a fixed key (`jwtToken` by
/// default). Written by the login flow, removed by logout; read here.
#[derive(Clone)]
pub struct StoredToken {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl StoredToken {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl TokenProvider for StoredToken {
    fn current_token(&self) -> Option<String> {
        match self.store.get(&self.key) {
            Ok(value) => normalize_token(value),
            Err(e) => {
                // Treated exactly like a missing token.
                tracing::warn!(key = %self.key, error = %e, "token store unreadable");
                None
            }
        }
    }
}

/// StaticToken
///
/// A fixed answer. Used for tokens that arrive with a request and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(normalize_token(token))
    }

    pub fn present(token: impl Into<String>) -> Self {
        Self::new(Some(token.into()))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// BearerToken Extractor
///
/// Pulls `Authorization: Bearer <token>` off a request. Unlike a typical auth
/// extractor this one never rejects: a missing or malformed header simply
/// yields `BearerToken(None)`, because "unauthenticated" is a state the guards
/// handle, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        Ok(BearerToken(normalize_token(token)))
    }
}
