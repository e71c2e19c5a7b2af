//! Bearer credentials attached to every API request.
//!
//! Login and token refresh happen elsewhere; this crate only reads the
//! current token when it builds a request.

use std::sync::{Arc, PoisonError, RwLock};

/// Source of the bearer token for the current user.
pub trait TokenProvider: Send + Sync {
    /// The token to send, or `None` to send the request unauthenticated.
    fn bearer_token(&self) -> Option<String>;
}

/// Never authenticates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// A token slot shared with the session layer, updated on login and logout.
///
/// Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    slot: Arc<RwLock<Option<String>>>,
}

impl SharedToken {
    pub fn new() -> Self {
        Self::default()
    }

    // The slot holds a plain value, so a poisoned lock is still usable.
    pub fn set(&self, token: impl Into<String>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl TokenProvider for SharedToken {
    fn bearer_token(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token()
    }
}
