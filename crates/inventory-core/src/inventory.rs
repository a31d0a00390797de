//! Inventory store adapter
//!
//! The only code that talks to the document collection. Quantity changes are
//! relative, so increments and decrements are read-modify-write sequences:
//!
//! ```text
//! upsert_increment:     get ─┬─ absent  → set(Replace){quantity: 1, dateAdded, ..}
//!                            └─ present → set(Merge){quantity: q + 1}
//! decrement_or_remove:  get ─┬─ absent  → no write
//!                            ├─ q <= 1  → delete
//!                            └─ q > 1   → set(Replace){..fields, quantity: q - 1}
//! ```
//!
//! The read and the write are separate store calls. Two concurrent callers on
//! the same name can both read the same quantity and one update is lost.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::document::{Document, Value, DATE_ADDED, DESCRIPTION, PHOTO_URL, QUANTITY};
use crate::error::{InventoryError, Result};
use crate::item::{format_timestamp, validate_name, InventoryItem, NewItem};
use crate::store::{DocumentStore, SetMode, StoreError};

/// Name of the collection holding inventory documents.
pub const DEFAULT_COLLECTION: &str = "inventory";

/// Result of [`InventoryStore::upsert_increment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No document existed; it was created with quantity 1.
    Created { item: InventoryItem },
    /// An existing document's quantity was raised to `quantity`.
    Incremented { quantity: i64 },
}

/// Result of [`InventoryStore::decrement_or_remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecrementOutcome {
    /// No document existed; nothing was written.
    Missing,
    /// The last unit was taken and the document deleted.
    Removed,
    /// Quantity was lowered to `quantity`.
    Decremented { quantity: i64 },
}

/// Typed access to the inventory collection of a document store.
#[derive(Clone)]
pub struct InventoryStore {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl InventoryStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_collection(store, DEFAULT_COLLECTION)
    }

    pub fn with_collection(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Every item in the collection, in store order.
    pub fn list_all(&self) -> Result<Vec<InventoryItem>> {
        let docs = self
            .store
            .list(&self.collection)
            .map_err(|e| self.failed("fetching inventory", None, e))?;

        tracing::debug!(collection = %self.collection, count = docs.len(), "listed inventory");
        Ok(docs
            .iter()
            .map(|(key, doc)| InventoryItem::from_document(key, doc))
            .collect())
    }

    /// A single item, or `None` when no document has that name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<InventoryItem>> {
        validate_name(name)?;
        let doc = self
            .store
            .get(&self.collection, name)
            .map_err(|e| self.failed("fetching item", Some(name), e))?;
        Ok(doc.map(|d| InventoryItem::from_document(name, &d)))
    }

    /// Add one unit of `name`, creating the item if needed.
    ///
    /// `details` is only used on creation; an existing item keeps its
    /// `dateAdded`, description and photo.
    pub fn upsert_increment(&self, name: &str, details: NewItem) -> Result<UpsertOutcome> {
        validate_name(name)?;
        let existing = self
            .store
            .get(&self.collection, name)
            .map_err(|e| self.failed("adding item", Some(name), e))?;

        match existing {
            Some(doc) => {
                let quantity = current_quantity(&doc)
                    .checked_add(1)
                    .ok_or_else(|| InventoryError::QuantityOverflow(name.to_string()))?;
                let mut patch = Document::new();
                patch.insert(QUANTITY.into(), Value::Int(quantity));
                self.store
                    .set(&self.collection, name, patch, SetMode::Merge)
                    .map_err(|e| self.failed("adding item", Some(name), e))?;

                tracing::info!(item = name, quantity, "incremented item");
                Ok(UpsertOutcome::Incremented { quantity })
            }
            None => {
                let details = details.normalized();
                let mut doc = Document::new();
                doc.insert(QUANTITY.into(), Value::Int(1));
                doc.insert(DATE_ADDED.into(), Value::String(format_timestamp(Utc::now())));
                if let Some(desc) = details.description {
                    doc.insert(DESCRIPTION.into(), Value::String(desc));
                }
                if let Some(url) = details.photo_url {
                    doc.insert(PHOTO_URL.into(), Value::String(url));
                }

                let item = InventoryItem::from_document(name, &doc);
                self.store
                    .set(&self.collection, name, doc, SetMode::Replace)
                    .map_err(|e| self.failed("adding item", Some(name), e))?;

                tracing::info!(item = name, "created item");
                Ok(UpsertOutcome::Created { item })
            }
        }
    }

    /// Take one unit of `name`, deleting the item when the last unit goes.
    pub fn decrement_or_remove(&self, name: &str) -> Result<DecrementOutcome> {
        validate_name(name)?;
        let existing = self
            .store
            .get(&self.collection, name)
            .map_err(|e| self.failed("removing item", Some(name), e))?;

        let Some(mut doc) = existing else {
            tracing::debug!(item = name, "remove on missing item ignored");
            return Ok(DecrementOutcome::Missing);
        };

        let quantity = current_quantity(&doc);
        if quantity <= 1 {
            self.store
                .delete(&self.collection, name)
                .map_err(|e| self.failed("removing item", Some(name), e))?;
            tracing::info!(item = name, "removed item");
            return Ok(DecrementOutcome::Removed);
        }

        let quantity = quantity - 1;
        doc.insert(QUANTITY.into(), Value::Int(quantity));
        self.store
            .set(&self.collection, name, doc, SetMode::Replace)
            .map_err(|e| self.failed("removing item", Some(name), e))?;

        tracing::info!(item = name, quantity, "decremented item");
        Ok(DecrementOutcome::Decremented { quantity })
    }

    fn failed(&self, action: &str, item: Option<&str>, err: StoreError) -> StoreError {
        match item {
            Some(item) => {
                tracing::error!(collection = %self.collection, item, "Error {}: {}", action, err)
            }
            None => tracing::error!(collection = %self.collection, "Error {}: {}", action, err),
        }
        err
    }
}

impl fmt::Debug for InventoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryStore")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

/// Stored quantity, absent or non-integer counting as zero.
fn current_quantity(doc: &Document) -> i64 {
    doc.get(QUANTITY).and_then(Value::as_int).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryDocumentStore;

    fn setup() -> (Arc<MemoryDocumentStore>, InventoryStore) {
        let backend = Arc::new(MemoryDocumentStore::new());
        let inventory = InventoryStore::new(backend.clone());
        (backend, inventory)
    }

    #[test]
    fn create_stamps_metadata() {
        let (_, inventory) = setup();
        let outcome = inventory
            .upsert_increment("widget", NewItem::new().with_description("blue"))
            .unwrap();

        let item = match outcome {
            UpsertOutcome::Created { item } => item,
            other => panic!("expected Created, got {:?}", other),
        };
        assert_eq!(item.quantity, Some(1));
        assert!(item.date_added.is_some());
        assert_eq!(item.description.as_deref(), Some("blue"));
        assert_eq!(item.photo_url, None);
    }

    #[test]
    fn missing_quantity_increments_from_zero() {
        let (backend, inventory) = setup();
        backend
            .set(DEFAULT_COLLECTION, "bolt", Document::new(), SetMode::Replace)
            .unwrap();
        assert_eq!(
            inventory.upsert_increment("bolt", NewItem::new()).unwrap(),
            UpsertOutcome::Incremented { quantity: 1 }
        );
    }

    #[test]
    fn full_quantity_is_not_incremented() {
        let (backend, inventory) = setup();
        let mut doc = Document::new();
        doc.insert(QUANTITY.into(), Value::Int(i64::MAX));
        backend
            .set(DEFAULT_COLLECTION, "grain", doc, SetMode::Replace)
            .unwrap();

        assert!(matches!(
            inventory.upsert_increment("grain", NewItem::new()),
            Err(InventoryError::QuantityOverflow(name)) if name == "grain"
        ));
        let stored = backend.get(DEFAULT_COLLECTION, "grain").unwrap().unwrap();
        assert_eq!(stored.get(QUANTITY), Some(&Value::Int(i64::MAX)));
    }

    #[test]
    fn huge_float_quantity_counts_as_zero() {
        let (backend, inventory) = setup();
        let mut doc = Document::new();
        doc.insert(QUANTITY.into(), Value::Float(1e19));
        backend
            .set(DEFAULT_COLLECTION, "widget", doc, SetMode::Replace)
            .unwrap();

        assert_eq!(
            inventory.upsert_increment("widget", NewItem::new()).unwrap(),
            UpsertOutcome::Incremented { quantity: 1 }
        );
    }

    #[test]
    fn decrement_keeps_unknown_fields() {
        let (backend, inventory) = setup();
        let mut doc = Document::new();
        doc.insert(QUANTITY.into(), Value::Int(2));
        doc.insert("shelf".into(), "B2".into());
        backend
            .set(DEFAULT_COLLECTION, "nut", doc, SetMode::Replace)
            .unwrap();

        assert_eq!(
            inventory.decrement_or_remove("nut").unwrap(),
            DecrementOutcome::Decremented { quantity: 1 }
        );
        let stored = backend.get(DEFAULT_COLLECTION, "nut").unwrap().unwrap();
        assert_eq!(stored.get("shelf").and_then(Value::as_str), Some("B2"));
    }

    #[test]
    fn invalid_name_does_no_io() {
        let (backend, inventory) = setup();
        backend.set_offline(true);
        // Offline store would fail any call; validation fires first.
        assert!(matches!(
            inventory.upsert_increment("", NewItem::new()),
            Err(InventoryError::InvalidName(_))
        ));
        assert!(matches!(
            inventory.decrement_or_remove("a/b"),
            Err(InventoryError::InvalidName(_))
        ));
    }

    #[test]
    fn custom_collection() {
        let backend = Arc::new(MemoryDocumentStore::new());
        let pantry = InventoryStore::with_collection(backend.clone(), "pantry");
        pantry.upsert_increment("rice", NewItem::new()).unwrap();
        assert_eq!(backend.len("pantry"), 1);
        assert_eq!(backend.len(DEFAULT_COLLECTION), 0);
        assert_eq!(pantry.collection(), "pantry");
    }
}
