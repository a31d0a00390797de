use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::document::{merge_into, Document};
use crate::store::{check_key, DocumentStore, SetMode, StoreError};

/// SQLite-backed implementation of the DocumentStore trait.
///
/// Every document is one JSON row; `seq` keeps insertion order for listing.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                data TEXT NOT NULL,
                UNIQUE (collection, key)
            );
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Storage(format!("Mutex poisoned: {}", e)))
    }

    fn read_doc(conn: &Connection, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Storage(format!("get: {}", e)))?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write_doc(conn: &Connection, collection: &str, key: &str, doc: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_string(doc)?;
        conn.execute(
            "INSERT INTO documents (collection, key, data) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, key) DO UPDATE SET data = excluded.data",
            params![collection, key, json],
        )
        .map_err(|e| StoreError::Storage(format!("set: {}", e)))?;
        Ok(())
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT key, data FROM documents WHERE collection = ?1 ORDER BY seq")
            .map_err(|e| StoreError::Storage(format!("list: {}", e)))?;
        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StoreError::Storage(format!("list: {}", e)))?;

        let mut docs = Vec::new();
        for row in rows {
            let (key, json) = row.map_err(|e| StoreError::Storage(format!("list row: {}", e)))?;
            let doc: Document = serde_json::from_str(&json)?;
            docs.push((key, doc));
        }
        Ok(docs)
    }

    fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        check_key(key)?;
        let conn = self.lock()?;
        Self::read_doc(&conn, collection, key)
    }

    fn set(
        &self,
        collection: &str,
        key: &str,
        doc: Document,
        mode: SetMode,
    ) -> Result<(), StoreError> {
        check_key(key)?;
        let mut conn = self.lock()?;
        match mode {
            SetMode::Replace => Self::write_doc(&conn, collection, key, &doc),
            SetMode::Merge => {
                let tx = conn
                    .transaction()
                    .map_err(|e| StoreError::Storage(format!("begin: {}", e)))?;
                let mut merged = Self::read_doc(&tx, collection, key)?.unwrap_or_default();
                merge_into(&mut merged, doc);
                Self::write_doc(&tx, collection, key, &merged)?;
                tx.commit()
                    .map_err(|e| StoreError::Storage(format!("commit: {}", e)))
            }
        }
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection, key],
        )
        .map_err(|e| StoreError::Storage(format!("delete: {}", e)))?;
        Ok(())
    }
}
