use crate::document::Document;

/// How `set` treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Overwrite the whole document.
    Replace,
    /// Update only the supplied fields; create the document if it is absent.
    Merge,
}

/// A keyed collection of documents.
///
/// Implementations must give read-after-write consistency for a single
/// caller. No operation is atomic across calls.
pub trait DocumentStore: Send + Sync {
    /// All documents in a collection, in the backend's natural order.
    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError>;

    /// A document by key, or `None` if it does not exist.
    fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Write a document under a key.
    fn set(
        &self,
        collection: &str,
        key: &str,
        doc: Document,
        mode: SetMode,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing key succeeds.
    fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
}

/// Errors from a document store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
