//! Inventory view controller
//!
//! Drives the [`ViewState`] machine from user actions and identity changes.
//! The store and identity provider are injected; the controller never reaches
//! for a global client. Store results are applied only on success, so a failed
//! call leaves the previous view in place.

use std::sync::Arc;

use crate::error::{InventoryError, Result};
use crate::identity::{Identity, IdentityProvider, Subscription};
use crate::inventory::{DecrementOutcome, InventoryStore, UpsertOutcome};
use crate::view::{FormEdit, Session, ViewPhase, ViewState};

pub struct InventoryController {
    store: InventoryStore,
    identity: Arc<dyn IdentityProvider>,
    subscription: Option<Subscription>,
    state: ViewState,
}

impl InventoryController {
    pub fn new(store: InventoryStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            subscription: None,
            state: ViewState::SignedOut,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.phase()
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start listening for identity changes and apply the current identity.
    pub fn mount(&mut self) -> Result<()> {
        if self.subscription.is_some() {
            return Ok(());
        }
        self.subscription = Some(self.identity.subscribe());
        tracing::debug!("inventory view mounted");
        self.sync_identity()
    }

    /// Stop listening for identity changes. View state is kept.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::debug!("inventory view unmounted");
        }
    }

    /// Apply identity changes delivered since the last call.
    ///
    /// Every change into a signed-in identity lists the inventory once. If a
    /// listing fails the remaining events are still applied and the last
    /// error is returned.
    pub fn sync_identity(&mut self) -> Result<()> {
        let events = match &self.subscription {
            Some(subscription) => subscription.drain(),
            None => return Ok(()),
        };

        let mut result = Ok(());
        for event in events {
            if let Err(e) = self.apply_identity(event) {
                result = Err(e);
            }
        }
        result
    }

    fn apply_identity(&mut self, next: Option<Identity>) -> Result<()> {
        match next {
            None => {
                if let ViewState::SignedIn(session) = &self.state {
                    tracing::info!(uid = %session.identity().uid, "session ended");
                }
                self.state = ViewState::SignedOut;
                Ok(())
            }
            Some(identity) => {
                if let Some(session) = self.state.session() {
                    if session.identity().uid == identity.uid {
                        return Ok(());
                    }
                }
                tracing::info!(uid = %identity.uid, "session started");
                self.state = ViewState::SignedIn(Session::new(identity));
                self.refresh()
            }
        }
    }

    /// Sign in through the provider and apply the change.
    ///
    /// Fails with `NotMounted` without touching the provider when the
    /// controller is not subscribed, since the view could not follow.
    pub fn sign_in(&mut self) -> Result<()> {
        self.require_mounted()?;
        self.identity.sign_in()?;
        self.sync_identity()
    }

    /// Sign out through the provider and apply the change. Fails with
    /// `NotMounted` like [`sign_in`](Self::sign_in).
    pub fn sign_out(&mut self) -> Result<()> {
        self.require_mounted()?;
        self.identity.sign_out()?;
        self.sync_identity()
    }

    /// Re-list the inventory. On failure the previous list stays.
    pub fn refresh(&mut self) -> Result<()> {
        self.require_signed_in()?;
        let items = self.store.list_all()?;
        if let Some(session) = self.state.session_mut() {
            session.set_inventory(items);
        }
        Ok(())
    }

    pub fn set_search(&mut self, query: &str) -> Result<()> {
        self.session_in(ViewPhase::Idle, "search")?.set_search(query);
        Ok(())
    }

    pub fn open_add(&mut self) -> Result<()> {
        self.session_in(ViewPhase::Idle, "open the add form")?.open_add();
        Ok(())
    }

    pub fn view_item(&mut self, name: &str) -> Result<()> {
        let session = self.session_in(ViewPhase::Idle, "view an item")?;
        let item = session
            .find(name)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(name.to_string()))?;
        session.open_view(item);
        Ok(())
    }

    /// Close the modal and clear the form. Closing an already closed view is a no-op.
    pub fn close_modal(&mut self) -> Result<()> {
        self.session_mut()?.close_modal();
        Ok(())
    }

    pub fn update_form(&mut self, edit: FormEdit) -> Result<()> {
        let session = self.session_in(ViewPhase::AddingItem, "edit the form")?;
        if let Some(form) = session.form_mut() {
            form.apply(edit);
        }
        Ok(())
    }

    /// Add one unit of the item named in the form.
    ///
    /// The modal closes and the form clears whether or not the store call
    /// succeeds. The inventory is re-listed only on success.
    pub fn submit_add(&mut self) -> Result<UpsertOutcome> {
        let form = self
            .session_in(ViewPhase::AddingItem, "submit an item")?
            .form()
            .cloned()
            .unwrap_or_default();

        let outcome = self.store.upsert_increment(&form.name, form.to_new_item());
        self.session_mut()?.close_modal();

        let outcome = outcome?;
        self.refresh()?;
        Ok(outcome)
    }

    /// Take one unit of `name` and re-list.
    pub fn remove_item(&mut self, name: &str) -> Result<DecrementOutcome> {
        self.session_in(ViewPhase::Idle, "remove an item")?;
        let outcome = self.store.decrement_or_remove(name)?;
        self.refresh()?;
        Ok(outcome)
    }

    fn require_mounted(&self) -> Result<()> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(InventoryError::NotMounted)
        }
    }

    fn require_signed_in(&self) -> Result<()> {
        match self.state {
            ViewState::SignedIn(_) => Ok(()),
            ViewState::SignedOut => Err(InventoryError::NotSignedIn),
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.state.session_mut().ok_or(InventoryError::NotSignedIn)
    }

    fn session_in(&mut self, expected: ViewPhase, action: &'static str) -> Result<&mut Session> {
        let session = self.session_mut()?;
        let from = session.phase();
        if from != expected {
            return Err(InventoryError::InvalidTransition { from, action });
        }
        Ok(session)
    }
}

impl std::fmt::Debug for InventoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryController")
            .field("store", &self.store)
            .field("mounted", &self.is_mounted())
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LocalIdentityProvider;
    use crate::item::NewItem;
    use crate::memory_store::MemoryDocumentStore;

    fn setup() -> (
        Arc<MemoryDocumentStore>,
        Arc<LocalIdentityProvider>,
        InventoryController,
    ) {
        let backend = Arc::new(MemoryDocumentStore::new());
        let provider = Arc::new(LocalIdentityProvider::new(
            Identity::new("Tester").with_uid("tester"),
        ));
        let controller =
            InventoryController::new(InventoryStore::new(backend.clone()), provider.clone());
        (backend, provider, controller)
    }

    #[test]
    fn mount_twice_keeps_one_listener() {
        let (_, provider, mut controller) = setup();
        controller.mount().unwrap();
        controller.mount().unwrap();
        assert_eq!(provider.listener_count(), 1);

        controller.unmount();
        assert_eq!(provider.listener_count(), 0);
        assert!(!controller.is_mounted());
    }

    #[test]
    fn drop_releases_listener() {
        let (_, provider, mut controller) = setup();
        controller.mount().unwrap();
        drop(controller);
        assert_eq!(provider.listener_count(), 0);
    }

    #[test]
    fn sign_in_lists_inventory() {
        let (backend, _, mut controller) = setup();
        InventoryStore::new(backend)
            .upsert_increment("Apple", NewItem::new())
            .unwrap();

        controller.mount().unwrap();
        assert_eq!(controller.phase(), ViewPhase::Unauthenticated);
        controller.sign_in().unwrap();

        let session = controller.state().session().unwrap();
        assert_eq!(session.inventory().len(), 1);
        assert_eq!(session.filtered().len(), 1);
        assert_eq!(session.identity().uid, "tester");
    }

    #[test]
    fn wrong_phase_is_rejected() {
        let (_, _, mut controller) = setup();
        controller.mount().unwrap();
        controller.sign_in().unwrap();
        controller.open_add().unwrap();

        let err = controller.set_search("x").unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InvalidTransition {
                from: ViewPhase::AddingItem,
                ..
            }
        ));
        assert!(matches!(
            controller.open_add(),
            Err(InventoryError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn view_missing_item_keeps_state() {
        let (_, _, mut controller) = setup();
        controller.mount().unwrap();
        controller.sign_in().unwrap();
        assert!(matches!(
            controller.view_item("ghost"),
            Err(InventoryError::NotFound(_))
        ));
        assert_eq!(controller.phase(), ViewPhase::Idle);
    }

    #[test]
    fn close_when_closed_is_noop() {
        let (_, _, mut controller) = setup();
        controller.mount().unwrap();
        controller.sign_in().unwrap();
        controller.close_modal().unwrap();
        assert_eq!(controller.phase(), ViewPhase::Idle);
    }

    #[test]
    fn sign_out_discards_session() {
        let (_, _, mut controller) = setup();
        controller.mount().unwrap();
        controller.sign_in().unwrap();
        controller.open_add().unwrap();
        controller.sign_out().unwrap();
        assert_eq!(controller.state(), &ViewState::SignedOut);
    }
}
