//! Optimistic patches: speculative local mutations applied before the remote
//! call is issued. Nothing here waits on the network or rolls anything back;
//! divergence is repaired by the next fetch.

use super::{CollectionItem, CollectionStore, ProductId};

impl CollectionStore {
    /// Push a placeholder for `product_id` unless one is already present.
    /// Returns whether an item was added.
    pub fn optimistic_add(&mut self, product_id: ProductId) -> bool {
        if self.contains(&product_id) {
            return false;
        }
        self.items.push(CollectionItem::placeholder(product_id));
        true
    }

    /// Drop every item referencing `product_id`. Returns how many were removed.
    pub fn optimistic_remove(&mut self, product_id: &ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.references(product_id));
        before - self.items.len()
    }
}
