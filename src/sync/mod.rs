//! Sync controller - mediates between a local collection store and the API.
//!
//! ## Example
//!
//! ```ignore
//! use herd_sync::{InMemoryRemote, WishlistSync};
//!
//! let wishlist = WishlistSync::new(InMemoryRemote::new());
//!
//! // Heart button: show it now, confirm in the background.
//! wishlist.optimistic_add("42")?;
//! if wishlist.add("42").await.is_err() {
//!     wishlist.fetch_all().await?;
//! }
//! ```

mod controller;

pub use controller::{SyncController, Toggled};

use crate::collection::{Cart, Wishlist};

pub type WishlistSync<R> = SyncController<R, Wishlist>;
pub type CartSync<R> = SyncController<R, Cart>;
