//! Error types for inventory-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::store::StoreError;
use crate::view::ViewPhase;

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Main error type for inventory operations
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The document store failed (transport, permissions, storage)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The identity provider failed
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Name cannot be used as an item key
    #[error("Invalid item name: {0:?}")]
    InvalidName(String),

    /// Item is not in the current inventory
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Controller is not listening for identity changes
    #[error("Inventory view is not mounted")]
    NotMounted,

    /// Action requires a signed-in identity
    #[error("Not signed in")]
    NotSignedIn,

    /// Stored quantity cannot take another unit
    #[error("Quantity of {0} is at its maximum")]
    QuantityOverflow(String),

    /// Action is not allowed in the current view phase
    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: ViewPhase, action: &'static str },
}

impl InventoryError {
    /// Whether the failure came from the store being unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, InventoryError::Store(StoreError::Unavailable(_)))
    }
}
