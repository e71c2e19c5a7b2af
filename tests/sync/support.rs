//! Shared fixtures: a small livestock catalog behind an in-memory backend.

use herd_sync::{CollectionItem, InMemoryRemote, ItemId, ProductRef, WishlistSync};

/// Backend that knows a few listings.
pub fn marketplace() -> InMemoryRemote {
    InMemoryRemote::new()
        .with_product(
            ProductRef::new("5")
                .with("name", "Dorper ram")
                .with("price", "450.00")
                .with("farmer", "Green Acres"),
        )
        .with_product(
            ProductRef::new("7")
                .with("name", "Boer goat doe")
                .with("price", "180.00"),
        )
        .with_product(
            ProductRef::new("42")
                .with("name", "Angus heifer")
                .with("price", "1250.00"),
        )
}

pub fn wishlist(remote: &InMemoryRemote) -> WishlistSync<InMemoryRemote> {
    WishlistSync::new(remote.clone())
}

pub fn item(id: &str, product: &str) -> CollectionItem {
    CollectionItem::new(ItemId::from(id), ProductRef::new(product))
}
