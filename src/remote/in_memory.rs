//! InMemoryRemote - in-process stand-in for the collection API.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::{AddRequest, RemoteCollection, RemoteError};
use crate::collection::{CollectionItem, ItemId, Operation, ProductId, ProductRef};

/// Owner used when no user has been selected.
const ANONYMOUS: &str = "anonymous";

/// A call that reached the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub owner: String,
    pub collection: String,
    pub operation: Operation,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<CollectionItem>>,
    catalog: HashMap<ProductId, ProductRef>,
    failures: HashMap<Operation, VecDeque<RemoteError>>,
    calls: Vec<RemoteCall>,
    next_id: u64,
}

/// In-memory collection backend.
///
/// Storage key is `"owner:collection"`. Clones share storage; use
/// [`for_owner`](Self::for_owner) to get a view scoped to another user.
/// Creating an item for a product that is already listed returns the
/// existing wrapper.
#[derive(Clone)]
pub struct InMemoryRemote {
    owner: String,
    state: Arc<RwLock<State>>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        InMemoryRemote {
            owner: ANONYMOUS.to_string(),
            state: Arc::new(RwLock::new(State {
                next_id: 1,
                ..State::default()
            })),
        }
    }

    /// A handle on the same storage acting as `owner`.
    pub fn for_owner(&self, owner: impl Into<String>) -> Self {
        InMemoryRemote {
            owner: owner.into(),
            state: Arc::clone(&self.state),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn make_key(owner: &str, collection: &str) -> String {
        format!("{}:{}", owner, collection)
    }

    /// Register a product snapshot returned inside created items.
    pub fn with_product(self, product: ProductRef) -> Self {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .catalog
            .insert(product.id.clone(), product);
        self
    }

    /// Replace the server-side contents of a collection.
    pub fn seed(&self, collection: &str, items: Vec<CollectionItem>) -> Result<(), RemoteError> {
        let mut state = self.write()?;
        state
            .collections
            .insert(Self::make_key(&self.owner, collection), items);
        Ok(())
    }

    /// Make the next call of `operation` fail with `error`. Queues up.
    pub fn fail_next(&self, operation: Operation, error: RemoteError) -> Result<(), RemoteError> {
        let mut state = self.write()?;
        state.failures.entry(operation).or_default().push_back(error);
        Ok(())
    }

    /// Server-side contents of a collection, bypassing call tracking.
    pub fn items(&self, collection: &str) -> Vec<CollectionItem> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .collections
            .get(&Self::make_key(&self.owner, collection))
            .cloned()
            .unwrap_or_default()
    }

    /// Every call received so far, across owners.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    /// Create a wrapper for the requested product, or return the one already
    /// listed. The flag is `true` when a new item was stored.
    ///
    /// Lookup and insert happen under one lock, so concurrent creates for the
    /// same product store exactly one item.
    pub fn create_or_get(
        &self,
        collection: &str,
        request: &AddRequest,
    ) -> Result<(CollectionItem, bool), RemoteError> {
        let mut state = self.write()?;
        self.begin(&mut state, collection, Operation::Add)?;

        if request.product_id.is_blank() {
            return Err(RemoteError::rejected(400, "product_id is required."));
        }

        let key = Self::make_key(&self.owner, collection);
        if let Some(existing) = state
            .collections
            .get(&key)
            .and_then(|items| items.iter().find(|item| item.references(&request.product_id)))
        {
            return Ok((existing.clone(), false));
        }

        let id = state.next_id;
        state.next_id += 1;

        let product = state
            .catalog
            .get(&request.product_id)
            .cloned()
            .unwrap_or_else(|| ProductRef::new(request.product_id.clone()));
        let mut item = CollectionItem::new(ItemId::from(id), product);
        item.extra = request.fields.clone();

        state.collections.entry(key).or_default().push(item.clone());
        Ok((item, true))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, RemoteError> {
        self.state
            .write()
            .map_err(|_| RemoteError::Transport("in-memory backend lock poisoned".into()))
    }

    /// Record the call and pop an injected failure, if any.
    fn begin(
        &self,
        state: &mut State,
        collection: &str,
        operation: Operation,
    ) -> Result<(), RemoteError> {
        state.calls.push(RemoteCall {
            owner: self.owner.clone(),
            collection: collection.to_string(),
            operation,
        });
        match state.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteCollection for InMemoryRemote {
    async fn list(&self, collection: &str) -> Result<Vec<CollectionItem>, RemoteError> {
        let mut state = self.write()?;
        self.begin(&mut state, collection, Operation::Fetch)?;
        Ok(state
            .collections
            .get(&Self::make_key(&self.owner, collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn create(
        &self,
        collection: &str,
        request: &AddRequest,
    ) -> Result<CollectionItem, RemoteError> {
        self.create_or_get(collection, request).map(|(item, _)| item)
    }

    async fn delete(&self, collection: &str, item_id: &ItemId) -> Result<(), RemoteError> {
        let mut state = self.write()?;
        self.begin(&mut state, collection, Operation::Remove)?;

        let items = state
            .collections
            .entry(Self::make_key(&self.owner, collection))
            .or_default();
        let before = items.len();
        items.retain(|item| &item.id != item_id);

        if items.len() == before {
            return Err(RemoteError::rejected(404, "Not found."));
        }
        Ok(())
    }
}
