use std::marker::PhantomData;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::collection::{
    Collection, CollectionItem, CollectionStore, ItemId, Operation, ProductId, SharedStore,
    Status, SyncEvent, Wishlist,
};
use crate::error::SyncError;
use crate::remote::{AddRequest, RemoteCollection, RemoteError};

/// Outcome of [`SyncController::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Keeps a [`SharedStore`] in sync with one remote collection.
///
/// Every remote operation dispatches `Pending`, then `*Fulfilled` or
/// `Rejected`. Optimistic patches are separate calls so the consumer can
/// apply them before the request goes out. Failures are returned as-is;
/// calling [`fetch_all`](Self::fetch_all) is the way back to a consistent
/// store.
pub struct SyncController<R, C = Wishlist> {
    remote: R,
    store: SharedStore,
    _collection: PhantomData<C>,
}

impl<R: RemoteCollection, C: Collection> SyncController<R, C> {
    /// Controller with a fresh, empty store.
    pub fn new(remote: R) -> Self {
        Self::with_store(remote, SharedStore::new())
    }

    /// Controller over a store owned elsewhere (typically the app root).
    pub fn with_store(remote: R, store: SharedStore) -> Self {
        SyncController {
            remote,
            store,
            _collection: PhantomData,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn collection(&self) -> &'static str {
        C::PATH
    }

    fn dispatch(&self, event: SyncEvent) -> Result<(), SyncError> {
        debug!("{}: {}", C::PATH, event.name());
        self.store.dispatch(event)
    }

    fn reject(&self, operation: Operation, err: RemoteError) -> SyncError {
        warn!("{} {} failed: {}", C::PATH, operation.as_str(), err);
        let event = SyncEvent::Rejected {
            operation,
            message: err.message().to_string(),
        };
        match self.dispatch(event) {
            Ok(()) => SyncError::Remote(err),
            Err(lock) => lock,
        }
    }

    /// Replace local items with the server's list.
    ///
    /// On failure the previous items are kept and the store is marked failed.
    pub async fn fetch_all(&self) -> Result<Vec<CollectionItem>, SyncError> {
        self.dispatch(SyncEvent::Pending(Operation::Fetch))?;
        match self.remote.list(C::PATH).await {
            Ok(items) => {
                debug!("{}: fetched {} items", C::PATH, items.len());
                self.dispatch(SyncEvent::FetchFulfilled(items.clone()))?;
                Ok(items)
            }
            Err(err) => Err(self.reject(Operation::Fetch, err)),
        }
    }

    /// Create a wrapper item for `product_id` and merge the server's copy.
    pub async fn add(&self, product_id: impl Into<ProductId>) -> Result<CollectionItem, SyncError> {
        self.add_with(product_id, Map::new()).await
    }

    /// [`add`](Self::add) with extra body fields, e.g. `quantity` for the cart.
    pub async fn add_with(
        &self,
        product_id: impl Into<ProductId>,
        fields: Map<String, Value>,
    ) -> Result<CollectionItem, SyncError> {
        let product_id = validate(product_id.into())?;
        self.create(AddRequest::with_fields(product_id, fields)).await
    }

    async fn create(&self, request: AddRequest) -> Result<CollectionItem, SyncError> {
        self.dispatch(SyncEvent::Pending(Operation::Add))?;
        match self.remote.create(C::PATH, &request).await {
            Ok(item) => {
                self.dispatch(SyncEvent::AddFulfilled(item.clone()))?;
                Ok(item)
            }
            Err(err) => Err(self.reject(Operation::Add, err)),
        }
    }

    /// Delete the wrapper item referencing `product_id`.
    ///
    /// The wrapper id comes from the local store, so a product that is not
    /// listed locally fails with [`SyncError::NotFoundLocally`] without a
    /// request being sent.
    pub async fn remove(&self, product_id: impl Into<ProductId>) -> Result<ProductId, SyncError> {
        let product_id = product_id.into();
        let item_id = self.wrapper_id(&product_id)?;
        self.delete(product_id, item_id).await
    }

    /// Hide `product_id` right away, then delete its wrapper item.
    ///
    /// The wrapper id is resolved before the optimistic patch is applied, so
    /// this is the remove to use when the view should update instantly. On
    /// failure the item stays hidden until the next
    /// [`fetch_all`](Self::fetch_all).
    pub async fn remove_optimistic(
        &self,
        product_id: impl Into<ProductId>,
    ) -> Result<ProductId, SyncError> {
        let product_id = validate(product_id.into())?;
        let item_id = self.wrapper_id(&product_id)?;
        self.optimistic_remove(product_id.clone())?;
        self.delete(product_id, item_id).await
    }

    async fn delete(&self, product_id: ProductId, item_id: ItemId) -> Result<ProductId, SyncError> {
        self.dispatch(SyncEvent::Pending(Operation::Remove))?;
        match self.remote.delete(C::PATH, &item_id).await {
            Ok(()) => {
                self.dispatch(SyncEvent::RemoveFulfilled(product_id.clone()))?;
                Ok(product_id)
            }
            Err(err) => Err(self.reject(Operation::Remove, err)),
        }
    }

    /// Remote id of the local item for `product_id`.
    pub fn wrapper_id(&self, product_id: &ProductId) -> Result<ItemId, SyncError> {
        let item_id = self
            .store
            .read(|store| store.find(product_id).map(|item| item.id.clone()))?
            .ok_or_else(|| SyncError::NotFoundLocally(product_id.clone()))?;

        if item_id.is_temporary() {
            return Err(SyncError::Unconfirmed(product_id.clone()));
        }
        Ok(item_id)
    }

    /// Show `product_id` as listed right away. Returns whether it was added.
    pub fn optimistic_add(&self, product_id: impl Into<ProductId>) -> Result<bool, SyncError> {
        let product_id = product_id.into();
        debug!("{}: optimistic add {}", C::PATH, product_id);
        self.store.update(|store| store.optimistic_add(product_id))
    }

    /// Hide `product_id` right away. Returns how many items were dropped.
    pub fn optimistic_remove(&self, product_id: impl Into<ProductId>) -> Result<usize, SyncError> {
        let product_id = product_id.into();
        debug!("{}: optimistic remove {}", C::PATH, product_id);
        self.store.update(|store| store.optimistic_remove(&product_id))
    }

    /// Flip membership of `product_id`, optimistically.
    ///
    /// A listed product is hidden and then deleted; an unlisted one is shown
    /// and then created. If the remote call fails the collection is fetched
    /// again once and the original error is returned.
    pub async fn toggle(&self, product_id: impl Into<ProductId>) -> Result<Toggled, SyncError> {
        let product_id = validate(product_id.into())?;

        let outcome = if self.contains(&product_id)? {
            // Resolution errors return before anything is hidden.
            let item_id = self.wrapper_id(&product_id)?;
            self.optimistic_remove(product_id.clone())?;
            self.delete(product_id, item_id).await.map(|_| Toggled::Removed)
        } else {
            self.optimistic_add(product_id.clone())?;
            self.create(AddRequest::new(product_id))
                .await
                .map(|_| Toggled::Added)
        };

        if let Err(err) = &outcome {
            if err.needs_resync() {
                warn!("{}: resyncing after failed toggle", C::PATH);
                if let Err(resync) = self.fetch_all().await {
                    warn!("{}: resync failed: {}", C::PATH, resync);
                }
            }
        }
        outcome
    }

    /// Drop all local state without telling the server (logout).
    pub fn clear(&self) -> Result<(), SyncError> {
        self.dispatch(SyncEvent::Reset)
    }

    pub fn contains(&self, product_id: &ProductId) -> Result<bool, SyncError> {
        self.store.read(|store| store.contains(product_id))
    }

    pub fn items(&self) -> Result<Vec<CollectionItem>, SyncError> {
        self.store.read(|store| store.items().to_vec())
    }

    pub fn len(&self) -> Result<usize, SyncError> {
        self.store.read(CollectionStore::len)
    }

    pub fn is_empty(&self) -> Result<bool, SyncError> {
        self.store.read(CollectionStore::is_empty)
    }

    pub fn status(&self) -> Result<Status, SyncError> {
        self.store.read(CollectionStore::status)
    }

    pub fn error(&self) -> Result<Option<String>, SyncError> {
        self.store.read(|store| store.error().map(str::to_string))
    }

    pub fn snapshot(&self) -> Result<CollectionStore, SyncError> {
        self.store.snapshot()
    }
}

fn validate(product_id: ProductId) -> Result<ProductId, SyncError> {
    if product_id.is_blank() {
        return Err(SyncError::InvalidProductId);
    }
    Ok(product_id)
}
