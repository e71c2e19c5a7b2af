//! Items and identifiers of a remote collection.
//!
//! Identifiers arrive as JSON numbers from the API and as strings from UI
//! event handlers. Both are normalized to one canonical string form so that
//! `7`, `7.0` and `"7"` name the same product.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Prefix of locally generated placeholder wrapper ids.
pub const TEMP_ID_PREFIX: &str = "temp-";

static TEMP_SEQ: AtomicU64 = AtomicU64::new(1);

/// Wire form of an identifier before canonicalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Num(Number),
}

impl RawId {
    fn into_canonical(self) -> String {
        match self {
            RawId::Str(s) => s,
            RawId::Num(n) => canonical_number(&n),
        }
    }
}

fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // Integral floats print the way a JS `String(7.0)` would.
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            (f as i64).to_string()
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Identifier of a marketplace product (the deduplication key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        ProductId(id.into())
    }

    /// Canonicalize an arbitrary JSON value. Only strings and numbers are ids.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ProductId(s.clone())),
            Value::Number(n) => Some(ProductId(canonical_number(n))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<RawId> for ProductId {
    fn from(raw: RawId) -> Self {
        ProductId(raw.into_canonical())
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId(id)
    }
}

impl From<&ProductId> for ProductId {
    fn from(id: &ProductId) -> Self {
        id.clone()
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id.to_string())
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id.to_string())
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        ProductId(id.to_string())
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        ProductId(id.to_string())
    }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProductId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote identifier of a wrapper item.
///
/// Optimistic placeholders carry a `temp-<millis>-<seq>` id until the server
/// assigns a real one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    /// Generate a fresh placeholder id. Unique within the process.
    pub fn temporary() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        ItemId(format!("{}{}-{}", TEMP_ID_PREFIX, millis, seq))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<RawId> for ItemId {
    fn from(raw: RawId) -> Self {
        ItemId(raw.into_canonical())
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProduct {
    Full {
        id: ProductId,
        #[serde(flatten)]
        snapshot: Map<String, Value>,
    },
    Bare(RawId),
}

/// Product snapshot nested inside a collection item.
///
/// The API may also send a bare primary key in place of the object; that
/// deserializes to a ref with an empty snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProduct")]
pub struct ProductRef {
    pub id: ProductId,
    #[serde(flatten)]
    pub snapshot: Map<String, Value>,
}

impl ProductRef {
    pub fn new(id: impl Into<ProductId>) -> Self {
        ProductRef {
            id: id.into(),
            snapshot: Map::new(),
        }
    }

    /// Builder-style snapshot field (name, price, breed, ...).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.snapshot.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.snapshot.get(key)
    }
}

impl From<RawProduct> for ProductRef {
    fn from(raw: RawProduct) -> Self {
        match raw {
            RawProduct::Full { id, snapshot } => ProductRef { id, snapshot },
            RawProduct::Bare(id) => ProductRef {
                id: ProductId(id.into_canonical()),
                snapshot: Map::new(),
            },
        }
    }
}

/// A wrapper record associating the current user with a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
    /// Fallback identity when the API omits the nested product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Everything else the API sends (quantity, added_at, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionItem {
    pub fn new(id: impl Into<ItemId>, product: ProductRef) -> Self {
        CollectionItem {
            id: id.into(),
            product: Some(product),
            product_id: None,
            extra: Map::new(),
        }
    }

    /// Optimistic placeholder with a temporary id and a minimal product ref.
    pub fn placeholder(product_id: ProductId) -> Self {
        Self::new(ItemId::temporary(), ProductRef::new(product_id))
    }

    /// The product this item stands for, if it names one.
    pub fn identity(&self) -> Option<&ProductId> {
        self.product
            .as_ref()
            .map(|p| &p.id)
            .or(self.product_id.as_ref())
    }

    pub fn references(&self, product_id: &ProductId) -> bool {
        self.identity() == Some(product_id)
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_temporary()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
