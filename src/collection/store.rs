//! CollectionStore - local state container for one remote collection.

use std::sync::{Arc, RwLock};

use super::{CollectionItem, ProductId};
use crate::error::SyncError;

/// Lifecycle status of the last remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The remote operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Add,
    Remove,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Add => "add",
            Operation::Remove => "remove",
        }
    }
}

/// A state transition of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A remote call was issued.
    Pending(Operation),
    /// Server list replaces the local items.
    FetchFulfilled(Vec<CollectionItem>),
    /// Canonical item returned by a create.
    AddFulfilled(CollectionItem),
    /// Server confirmed the delete of this product's wrapper.
    RemoveFulfilled(ProductId),
    /// A remote call failed. Items are left as they are.
    Rejected { operation: Operation, message: String },
    OptimisticAdd(ProductId),
    OptimisticRemove(ProductId),
    /// Back to the initial empty, idle state.
    Reset,
}

impl SyncEvent {
    /// Short name for logs; never includes item payloads.
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::Pending(_) => "pending",
            SyncEvent::FetchFulfilled(_) => "fetch_fulfilled",
            SyncEvent::AddFulfilled(_) => "add_fulfilled",
            SyncEvent::RemoveFulfilled(_) => "remove_fulfilled",
            SyncEvent::Rejected { .. } => "rejected",
            SyncEvent::OptimisticAdd(_) => "optimistic_add",
            SyncEvent::OptimisticRemove(_) => "optimistic_remove",
            SyncEvent::Reset => "reset",
        }
    }
}

/// Ordered items plus the status of the last remote operation.
///
/// Holds at most one item per product id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionStore {
    pub(super) items: Vec<CollectionItem>,
    status: Status,
    error: Option<String>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.position(product_id).is_some()
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&CollectionItem> {
        self.items.iter().find(|item| item.references(product_id))
    }

    pub fn product_ids(&self) -> Vec<&ProductId> {
        self.items.iter().filter_map(CollectionItem::identity).collect()
    }

    pub(super) fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.references(product_id))
    }

    /// Apply one transition.
    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Pending(_) => {
                self.status = Status::Loading;
                self.error = None;
            }
            SyncEvent::FetchFulfilled(items) => {
                self.items = dedupe(items);
                self.status = Status::Succeeded;
            }
            SyncEvent::AddFulfilled(item) => {
                self.merge(item);
                self.status = Status::Succeeded;
            }
            SyncEvent::RemoveFulfilled(product_id) => {
                self.items.retain(|item| !item.references(&product_id));
                self.status = Status::Succeeded;
            }
            SyncEvent::Rejected { message, .. } => {
                self.status = Status::Failed;
                self.error = Some(message);
            }
            SyncEvent::OptimisticAdd(product_id) => {
                self.optimistic_add(product_id);
            }
            SyncEvent::OptimisticRemove(product_id) => {
                self.optimistic_remove(&product_id);
            }
            SyncEvent::Reset => *self = Self::default(),
        }
    }

    /// Merge a canonical item. A placeholder for the same product is upgraded
    /// in place; a confirmed item for the same product wins over the new one.
    fn merge(&mut self, item: CollectionItem) {
        let existing = item.identity().and_then(|id| self.position(id));
        match existing {
            None => self.items.push(item),
            Some(index) if self.items[index].is_placeholder() => self.items[index] = item,
            Some(_) => {}
        }
    }
}

/// First occurrence of each product wins; items with no identity are kept.
fn dedupe(items: Vec<CollectionItem>) -> Vec<CollectionItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| match item.identity() {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}

/// Clone-friendly handle to a [`CollectionStore`] owned by the app root.
///
/// Locks are taken per call and never held across an `.await`, so every
/// event is applied atomically with respect to other tasks.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<CollectionStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: CollectionStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn dispatch(&self, event: SyncEvent) -> Result<(), SyncError> {
        self.update(|store| store.apply(event))
    }

    /// Read through the lock.
    pub fn read<T>(&self, f: impl FnOnce(&CollectionStore) -> T) -> Result<T, SyncError> {
        let store = self
            .inner
            .read()
            .map_err(|_| SyncError::LockPoisoned("read"))?;
        Ok(f(&store))
    }

    /// Mutate through the lock.
    pub fn update<T>(&self, f: impl FnOnce(&mut CollectionStore) -> T) -> Result<T, SyncError> {
        let mut store = self
            .inner
            .write()
            .map_err(|_| SyncError::LockPoisoned("write"))?;
        Ok(f(&mut store))
    }

    /// Copy of the current state, for rendering.
    pub fn snapshot(&self) -> Result<CollectionStore, SyncError> {
        self.read(Clone::clone)
    }
}
