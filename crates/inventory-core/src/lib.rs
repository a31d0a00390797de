//! Inventory core
//!
//! Data access and view-state logic for a small inventory tracker. Items live
//! in one keyed document collection; the [`InventoryStore`] adapter turns
//! add/remove actions into read-modify-write sequences on it, and the
//! [`InventoryController`] keeps the view state in step with the signed-in
//! identity and user actions.

pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod filter;
pub mod identity;
pub mod inventory;
pub mod item;
pub mod memory_store;
pub mod store;
pub mod view;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use config::{ConfigError, InventoryConfig, StoreBackend};
pub use controller::InventoryController;
pub use document::{Document, Value};
pub use error::{InventoryError, Result};
pub use filter::filter_by_name;
pub use identity::{Identity, IdentityError, IdentityProvider, LocalIdentityProvider, Subscription};
pub use inventory::{DecrementOutcome, InventoryStore, UpsertOutcome, DEFAULT_COLLECTION};
pub use item::{InventoryItem, NewItem};
pub use memory_store::MemoryDocumentStore;
pub use store::{DocumentStore, SetMode, StoreError};
pub use view::{FormEdit, ItemForm, Modal, Session, ViewPhase, ViewState};

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteDocumentStore;
