//! Collections - per-user lists of products kept in sync with the API.
//!
//! A collection is a list of wrapper items, each pointing at one product.
//! The local copy lives in a [`CollectionStore`] driven by [`SyncEvent`]s,
//! shared across the app through a [`SharedStore`] handle.
//!
//! ## Example
//!
//! ```ignore
//! use herd_sync::{CollectionStore, ProductId, SyncEvent};
//!
//! let mut store = CollectionStore::new();
//! store.apply(SyncEvent::OptimisticAdd(ProductId::from("42")));
//! assert!(store.contains(&ProductId::from(42u64)));
//! ```

mod item;
mod optimistic;
mod store;

pub use item::{CollectionItem, ItemId, ProductId, ProductRef, TEMP_ID_PREFIX};
pub use store::{CollectionStore, Operation, SharedStore, Status, SyncEvent};

/// A kind of remote collection.
pub trait Collection: Send + Sync + 'static {
    /// Path segment of the REST resource (`/wishlist/`, `/cart/`).
    const PATH: &'static str;
}

/// The buyer's wishlist.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wishlist;

impl Collection for Wishlist {
    const PATH: &'static str = "wishlist";
}

/// The buyer's shopping cart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cart;

impl Collection for Cart {
    const PATH: &'static str = "cart";
}
