//! Shared test helpers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use inventory_core::{Document, DocumentStore, MemoryDocumentStore, SetMode, StoreError};

/// Memory store that counts every call it receives.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryDocumentStore,
    lists: AtomicUsize,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.sets.load(Ordering::SeqCst) + self.deletes.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.lists() + self.gets() + self.writes()
    }
}

impl DocumentStore for RecordingStore {
    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(collection)
    }

    fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(collection, key)
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        doc: Document,
        mode: SetMode,
    ) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(collection, key, doc, mode)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(collection, key)
    }
}
