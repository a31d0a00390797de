//! Inventory store adapter integration tests

mod common;

use std::collections::BTreeSet;

use common::RecordingStore;
use inventory_core::{
    DecrementOutcome, Document, DocumentStore, InventoryError, InventoryStore, NewItem, SetMode,
    UpsertOutcome, Value, DEFAULT_COLLECTION,
};

fn seed(store: &RecordingStore, name: &str, quantity: i64) {
    let mut doc = Document::new();
    doc.insert("quantity".into(), Value::Int(quantity));
    doc.insert("description".into(), "seeded".into());
    store
        .inner
        .set(DEFAULT_COLLECTION, name, doc, SetMode::Replace)
        .unwrap();
}

#[test]
fn test_list_is_repeatable() {
    let backend = RecordingStore::new();
    let inventory = InventoryStore::new(backend.clone());
    for name in ["Apple", "banana", "Cherry"] {
        inventory.upsert_increment(name, NewItem::new()).unwrap();
    }

    let first: BTreeSet<_> = inventory.list_all().unwrap().into_iter().map(|i| i.name).collect();
    let second: BTreeSet<_> = inventory.list_all().unwrap().into_iter().map(|i| i.name).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_create_then_increment() {
    let backend = RecordingStore::new();
    let inventory = InventoryStore::new(backend.clone());

    let details = NewItem::new()
        .with_description("blue widget")
        .with_photo_url("https://img.example/widget.png");
    let created = inventory.upsert_increment("widget", details).unwrap();
    assert!(matches!(created, UpsertOutcome::Created { .. }));

    let first = inventory.get_by_name("widget").unwrap().unwrap();
    assert_eq!(first.quantity, Some(1));

    // Metadata on later calls is ignored.
    let again = inventory
        .upsert_increment("widget", NewItem::new().with_description("changed"))
        .unwrap();
    assert_eq!(again, UpsertOutcome::Incremented { quantity: 2 });

    let second = inventory.get_by_name("widget").unwrap().unwrap();
    assert_eq!(second.quantity, Some(2));
    assert_eq!(second.date_added, first.date_added);
    assert_eq!(second.description.as_deref(), Some("blue widget"));
    assert_eq!(second.photo_url, first.photo_url);
}

#[test]
fn test_decrement_to_deletion() {
    let backend = RecordingStore::new();
    seed(&backend, "widget", 1);
    let inventory = InventoryStore::new(backend.clone());

    assert_eq!(
        inventory.decrement_or_remove("widget").unwrap(),
        DecrementOutcome::Removed
    );
    assert_eq!(inventory.get_by_name("widget").unwrap(), None);
    assert!(inventory.list_all().unwrap().is_empty());
}

#[test]
fn test_decrement_above_floor() {
    let backend = RecordingStore::new();
    seed(&backend, "widget", 3);
    let inventory = InventoryStore::new(backend.clone());

    assert_eq!(
        inventory.decrement_or_remove("widget").unwrap(),
        DecrementOutcome::Decremented { quantity: 2 }
    );
    let item = inventory.get_by_name("widget").unwrap().unwrap();
    assert_eq!(item.quantity, Some(2));
    assert_eq!(item.description.as_deref(), Some("seeded"));
}

#[test]
fn test_decrement_missing_is_noop() {
    let backend = RecordingStore::new();
    let inventory = InventoryStore::new(backend.clone());

    assert_eq!(
        inventory.decrement_or_remove("ghost").unwrap(),
        DecrementOutcome::Missing
    );
    assert_eq!(backend.writes(), 0);
}

#[test]
fn test_zero_quantity_document_is_deleted() {
    let backend = RecordingStore::new();
    seed(&backend, "odd", 0);
    let inventory = InventoryStore::new(backend.clone());

    assert_eq!(
        inventory.decrement_or_remove("odd").unwrap(),
        DecrementOutcome::Removed
    );
    assert_eq!(backend.inner.len(DEFAULT_COLLECTION), 0);
}

#[test]
fn test_names_are_case_sensitive() {
    let backend = RecordingStore::new();
    let inventory = InventoryStore::new(backend.clone());
    inventory.upsert_increment("Apple", NewItem::new()).unwrap();
    inventory.upsert_increment("apple", NewItem::new()).unwrap();

    assert_eq!(inventory.list_all().unwrap().len(), 2);
    assert_eq!(inventory.get_by_name("APPLE").unwrap(), None);
}

#[test]
fn test_transport_failure_is_returned() {
    let backend = RecordingStore::new();
    seed(&backend, "widget", 2);
    let inventory = InventoryStore::new(backend.clone());
    backend.inner.set_offline(true);

    let err = inventory.list_all().unwrap_err();
    assert!(err.is_unavailable());
    assert!(inventory
        .upsert_increment("widget", NewItem::new())
        .unwrap_err()
        .is_unavailable());
    assert!(matches!(
        inventory.decrement_or_remove("widget"),
        Err(InventoryError::Store(_))
    ));

    backend.inner.set_offline(false);
    assert_eq!(inventory.get_by_name("widget").unwrap().unwrap().quantity, Some(2));
}
