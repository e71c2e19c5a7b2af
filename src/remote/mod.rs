//! Remote - transport seam between the sync controller and the API.
//!
//! The API exposes each collection as a REST resource:
//!
//! - `GET /{collection}/` - the current user's items, each with a nested product.
//! - `POST /{collection}/` with `{ "product_id": ... }` - creates a wrapper item.
//! - `DELETE /{collection}/{wrapper_id}` - removes one wrapper item.
//!
//! [`HttpRemote`] talks to the real API (feature `http`); [`InMemoryRemote`]
//! keeps everything in process and is what tests and the reference server use.

mod config;
#[cfg(feature = "http")]
mod http;
mod in_memory;
mod token;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::{CollectionItem, ItemId, ProductId};

pub use config::{ConfigError, RemoteConfig};
#[cfg(feature = "http")]
pub use http::HttpRemote;
pub use in_memory::{InMemoryRemote, RemoteCall};
pub use token::{NoToken, SharedToken, StaticToken, TokenProvider};

/// Message used when a transport failure has no useful detail.
pub const NETWORK_ERROR_MESSAGE: &str = "network error";

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRequest {
    pub product_id: ProductId,
    /// Extra body fields, e.g. `quantity` for the cart.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AddRequest {
    pub fn new(product_id: ProductId) -> Self {
        AddRequest {
            product_id,
            fields: Map::new(),
        }
    }

    pub fn with_fields(product_id: ProductId, fields: Map<String, Value>) -> Self {
        AddRequest { product_id, fields }
    }
}

/// Error type for remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never reached the server or never came back.
    Transport(String),
    /// The server answered with a non-success status.
    Rejected { status: u16, message: String },
    /// A success response carried a body we could not parse.
    Decode(String),
}

impl RemoteError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        RemoteError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn network() -> Self {
        RemoteError::Transport(NETWORK_ERROR_MESSAGE.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RemoteError::Transport(msg) => msg,
            RemoteError::Rejected { message, .. } => message,
            RemoteError::Decode(msg) => msg,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "transport failure: {}", msg),
            RemoteError::Rejected { status, message } => {
                write!(f, "rejected with status {}: {}", status, message)
            }
            RemoteError::Decode(msg) => write!(f, "invalid response body: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

/// Transport for one user's collections.
///
/// Authentication is the implementation's concern; the caller only names the
/// collection.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Every item of the collection, in server order.
    async fn list(&self, collection: &str) -> Result<Vec<CollectionItem>, RemoteError>;

    /// Create a wrapper item and return the server's canonical copy.
    async fn create(
        &self,
        collection: &str,
        request: &AddRequest,
    ) -> Result<CollectionItem, RemoteError>;

    /// Delete a wrapper item by its remote id.
    async fn delete(&self, collection: &str, item_id: &ItemId) -> Result<(), RemoteError>;
}

/// Pick the user-facing message out of an error response body.
///
/// Accepts `{"detail": ..}`, `{"message": ..}`, `{"error": ..}` or a bare JSON
/// string; anything else yields a generic fallback naming the status.
pub fn rejection_message(status: u16, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value {
            Value::String(s) => Some(s),
            Value::Object(map) => ["detail", "message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str).map(str::to_string)),
            _ => None,
        })
        .filter(|msg| !msg.trim().is_empty());

    from_body.unwrap_or_else(|| format!("request failed with status {}", status))
}
