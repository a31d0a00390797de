//! Signed-in identity and the providers that track it.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// A new identity with a freshly generated uid.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            email: None,
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Errors from an identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of the current signed-in identity.
pub trait IdentityProvider: Send + Sync {
    /// The identity signed in right now, if any.
    fn current(&self) -> Option<Identity>;

    /// Listen for identity changes. The current identity is delivered
    /// first, then every change until the subscription is dropped.
    fn subscribe(&self) -> Subscription;

    /// Start a sign-in. Completion is observed through subscriptions.
    fn sign_in(&self) -> Result<(), IdentityError>;

    /// Start a sign-out. Completion is observed through subscriptions.
    fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Scoped listener registration.
///
/// Dropping or cancelling the handle unregisters the listener; no event is
/// delivered afterwards.
pub struct Subscription {
    rx: Mutex<Receiver<Option<Identity>>>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(rx: Receiver<Option<Identity>>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            rx: Mutex::new(rx),
            release: Some(Box::new(release)),
        }
    }

    /// All events delivered since the last drain, oldest first.
    pub fn drain(&self) -> Vec<Option<Identity>> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.try_iter().collect()
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Listeners {
    current: Option<Identity>,
    senders: HashMap<u64, Sender<Option<Identity>>>,
    next_id: u64,
}

/// In-process identity provider.
///
/// `sign_in` signs in the configured account; `sign_in_as` switches it.
pub struct LocalIdentityProvider {
    account: Mutex<Identity>,
    listeners: Arc<Mutex<Listeners>>,
}

impl LocalIdentityProvider {
    pub fn new(account: Identity) -> Self {
        Self {
            account: Mutex::new(account),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Switch the configured account and sign it in.
    pub fn sign_in_as(&self, identity: Identity) -> Result<(), IdentityError> {
        *self.account.lock().unwrap_or_else(PoisonError::into_inner) = identity;
        self.sign_in()
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.state().senders.len()
    }

    fn state(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_current(&self, next: Option<Identity>) {
        let mut state = self.state();
        if state.current == next {
            return;
        }
        match &next {
            Some(identity) => tracing::info!(uid = %identity.uid, "signed in"),
            None => tracing::info!("signed out"),
        }
        state.current = next.clone();
        state.senders.retain(|_, tx| tx.send(next.clone()).is_ok());
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current(&self) -> Option<Identity> {
        self.state().current.clone()
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = {
            let mut state = self.state();
            let id = state.next_id;
            state.next_id += 1;
            // Receiver is alive, send cannot fail.
            let _ = tx.send(state.current.clone());
            state.senders.insert(id, tx);
            id
        };

        let listeners: Weak<Mutex<Listeners>> = Arc::downgrade(&self.listeners);
        Subscription::new(rx, move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .senders
                    .remove(&id);
            }
        })
    }

    fn sign_in(&self) -> Result<(), IdentityError> {
        let account = self
            .account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.set_current(Some(account));
        Ok(())
    }

    fn sign_out(&self) -> Result<(), IdentityError> {
        self.set_current(None);
        Ok(())
    }
}
