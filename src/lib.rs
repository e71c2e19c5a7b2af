mod collection;
mod error;
mod remote;
mod sync;

#[cfg(feature = "server")]
pub mod server;

pub use collection::{
    Cart, Collection, CollectionItem, CollectionStore, ItemId, Operation, ProductId, ProductRef,
    SharedStore, Status, SyncEvent, Wishlist, TEMP_ID_PREFIX,
};
pub use error::SyncError;
#[cfg(feature = "http")]
pub use remote::HttpRemote;
pub use remote::{
    rejection_message, AddRequest, ConfigError, InMemoryRemote, NoToken, RemoteCall,
    RemoteCollection, RemoteConfig, RemoteError, SharedToken, StaticToken, TokenProvider,
    NETWORK_ERROR_MESSAGE,
};
pub use sync::{CartSync, SyncController, Toggled, WishlistSync};

// Re-export so implementors of `RemoteCollection` need not depend on it directly.
pub use async_trait::async_trait;
