use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::document::{merge_into, Document};
use crate::store::{check_key, DocumentStore, SetMode, StoreError};

type Collection = Vec<(String, Document)>;

/// In-process document store.
///
/// Documents are listed in insertion order; an update keeps the document's
/// position, a delete-then-create moves it to the end.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Collection>>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Collection>>, StoreError> {
        if self.is_offline() {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        self.collections
            .lock()
            .map_err(|e| StoreError::Storage(format!("Mutex poisoned: {}", e)))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let collections = self.lock()?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        check_key(key)?;
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(k, _)| k == key))
            .map(|(_, doc)| doc.clone()))
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        doc: Document,
        mode: SetMode,
    ) -> Result<(), StoreError> {
        check_key(key)?;
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => match mode {
                SetMode::Replace => *existing = doc,
                SetMode::Merge => merge_into(existing, doc),
            },
            None => docs.push((key.to_string(), doc)),
        }
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let mut collections = self.lock()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|(k, _)| k != key);
        }
        Ok(())
    }
}
