use std::fmt;

use crate::collection::ProductId;
use crate::remote::RemoteError;

/// Error returned by sync controller operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The product id was empty; nothing was sent.
    InvalidProductId,
    /// No local item references the product, so there is no wrapper id to delete.
    NotFoundLocally(ProductId),
    /// The local item is still an optimistic placeholder without a remote id.
    Unconfirmed(ProductId),
    /// The store lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// The remote call failed.
    Remote(RemoteError),
}

impl SyncError {
    /// The message a consumer view would show in a toast.
    pub fn message(&self) -> String {
        match self {
            SyncError::Remote(err) => err.message().to_string(),
            other => other.to_string(),
        }
    }

    /// True when the local store may have diverged from the server and a
    /// `fetch_all` is the way back.
    pub fn needs_resync(&self) -> bool {
        matches!(self, SyncError::Remote(_))
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::InvalidProductId => write!(f, "product id must not be empty"),
            SyncError::NotFoundLocally(id) => {
                write!(f, "product {} not found locally", id)
            }
            SyncError::Unconfirmed(id) => {
                write!(f, "product {} has not been confirmed by the server yet", id)
            }
            SyncError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            SyncError::Remote(err) => write!(f, "remote error: {}", err),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        SyncError::Remote(err)
    }
}
