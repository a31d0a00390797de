//! Inventory view state machine
//!
//! State transitions:
//! ```text
//!                    sign-in
//! Unauthenticated ──────────→ Idle ⟲ search / remove / refresh
//!        ↑                    │  ↑
//!        │ sign-out     add / │  │ close / submit
//!        │              view  ↓  │
//!        └──────────── AddingItem | ViewingItem
//! ```
//!
//! Sign-out is accepted from every authenticated phase.

use serde::{Deserialize, Serialize};

use crate::filter::filter_by_name;
use crate::identity::Identity;
use crate::item::{InventoryItem, NewItem};

/// The four phases of the inventory view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPhase {
    /// No identity; only sign-in is offered
    Unauthenticated,
    /// Signed in, list shown, no modal
    Idle,
    /// Add-item modal open with an editable form
    AddingItem,
    /// Detail modal open for one item
    ViewingItem,
}

impl ViewPhase {
    /// Check if a phase transition is valid
    pub fn can_transition_to(&self, target: &ViewPhase) -> bool {
        match (self, target) {
            (ViewPhase::Unauthenticated, ViewPhase::Idle) => true,

            // Search, remove and refresh keep the view idle
            (ViewPhase::Idle, ViewPhase::Idle) => true,
            (ViewPhase::Idle, ViewPhase::AddingItem) => true,
            (ViewPhase::Idle, ViewPhase::ViewingItem) => true,

            (ViewPhase::AddingItem, ViewPhase::Idle) => true,
            (ViewPhase::ViewingItem, ViewPhase::Idle) => true,

            // Signing out is always possible once signed in
            (ViewPhase::Unauthenticated, ViewPhase::Unauthenticated) => false,
            (_, ViewPhase::Unauthenticated) => true,

            _ => false,
        }
    }

    /// Get valid next phases from the current phase
    pub fn valid_transitions(&self) -> Vec<ViewPhase> {
        match self {
            ViewPhase::Unauthenticated => vec![ViewPhase::Idle],
            ViewPhase::Idle => vec![
                ViewPhase::Idle,
                ViewPhase::AddingItem,
                ViewPhase::ViewingItem,
                ViewPhase::Unauthenticated,
            ],
            ViewPhase::AddingItem | ViewPhase::ViewingItem => {
                vec![ViewPhase::Idle, ViewPhase::Unauthenticated]
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, ViewPhase::Unauthenticated)
    }

    pub fn is_modal_open(&self) -> bool {
        matches!(self, ViewPhase::AddingItem | ViewPhase::ViewingItem)
    }

    /// Get a human-readable description of the phase
    pub fn description(&self) -> &'static str {
        match self {
            ViewPhase::Unauthenticated => "Signed out, waiting for sign-in",
            ViewPhase::Idle => "Showing inventory",
            ViewPhase::AddingItem => "Adding a new item",
            ViewPhase::ViewingItem => "Viewing item details",
        }
    }
}

impl std::fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewPhase::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            ViewPhase::Idle => write!(f, "IDLE"),
            ViewPhase::AddingItem => write!(f, "ADDING_ITEM"),
            ViewPhase::ViewingItem => write!(f, "VIEWING_ITEM"),
        }
    }
}

/// In-progress values of the add-item form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub photo_url: String,
}

impl ItemForm {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.photo_url.is_empty()
    }

    /// Overwrite the fields present in `edit`.
    pub fn apply(&mut self, edit: FormEdit) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(photo_url) = edit.photo_url {
            self.photo_url = photo_url;
        }
    }

    pub fn to_new_item(&self) -> NewItem {
        NewItem {
            description: Some(self.description.clone()),
            photo_url: Some(self.photo_url.clone()),
        }
        .normalized()
    }
}

/// A partial update to the form; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

/// Modal overlay of a signed-in view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Modal {
    #[default]
    Closed,
    Adding(ItemForm),
    Viewing(InventoryItem),
}

/// Everything shown to a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    identity: Identity,
    inventory: Vec<InventoryItem>,
    search: String,
    filtered: Vec<InventoryItem>,
    modal: Modal,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            inventory: Vec::new(),
            search: String::new(),
            filtered: Vec::new(),
            modal: Modal::Closed,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Full inventory from the last successful listing.
    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    /// Inventory narrowed by the current search text.
    pub fn filtered(&self) -> &[InventoryItem] {
        &self.filtered
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// The add-item form, when it is open.
    pub fn form(&self) -> Option<&ItemForm> {
        match &self.modal {
            Modal::Adding(form) => Some(form),
            _ => None,
        }
    }

    pub fn phase(&self) -> ViewPhase {
        match self.modal {
            Modal::Closed => ViewPhase::Idle,
            Modal::Adding(_) => ViewPhase::AddingItem,
            Modal::Viewing(_) => ViewPhase::ViewingItem,
        }
    }

    /// Find an item in the full inventory.
    pub fn find(&self, name: &str) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.name == name)
    }

    pub(crate) fn set_inventory(&mut self, items: Vec<InventoryItem>) {
        self.inventory = items;
        self.filtered = filter_by_name(&self.inventory, &self.search);
    }

    pub(crate) fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.filtered = filter_by_name(&self.inventory, &self.search);
    }

    pub(crate) fn open_add(&mut self) {
        self.modal = Modal::Adding(ItemForm::default());
    }

    pub(crate) fn open_view(&mut self, item: InventoryItem) {
        self.modal = Modal::Viewing(item);
    }

    /// Close any modal, discarding the selection and form values.
    pub(crate) fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    pub(crate) fn form_mut(&mut self) -> Option<&mut ItemForm> {
        match &mut self.modal {
            Modal::Adding(form) => Some(form),
            _ => None,
        }
    }
}

/// Top-level view state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    SignedOut,
    SignedIn(Session),
}

impl ViewState {
    pub fn phase(&self) -> ViewPhase {
        match self {
            ViewState::SignedOut => ViewPhase::Unauthenticated,
            ViewState::SignedIn(session) => session.phase(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            ViewState::SignedIn(session) => Some(session),
            ViewState::SignedOut => None,
        }
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            ViewState::SignedIn(session) => Some(session),
            ViewState::SignedOut => None,
        }
    }
}
