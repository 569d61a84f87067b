//! Session Provider: who is signed in and which bearer token to send.
//!
//! The identity service itself is an external collaborator behind
//! [`IdentityProvider`]. Everything else reads the current session through an
//! explicitly passed [`SessionHandle`].

mod claims;
mod local;
pub mod profile;
mod token_store;

pub use claims::{TokenClaims, decode_claims};
pub use local::LocalIdentity;
pub use token_store::{SessionTokenStore, TokenStoreError};

#[cfg(test)]
pub(crate) use claims::encode_test_token;
#[cfg(test)]
pub(crate) use token_store::KeyringDisabledGuard;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

/// Identity of the signed-in account.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    /// Free-form profile fields (`full_name`, `company`, notification flags).
    pub metadata: Map<String, Value>,
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
    /// Unix seconds after which the token is rejected.
    pub expires_at: Option<i64>,
}

impl Session {
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now_unix)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_unix())
    }
}

pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

/// Session change notifications.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
    UserUpdated(User),
}

/// Ways to authenticate against the identity collaborator.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// A bearer token issued elsewhere (pasted by the user).
    AccessToken(String),
    Password { email: String, password: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    Unsupported(&'static str),
    #[error("Access token is not valid: {0}")]
    InvalidToken(String),
    #[error("Access token has expired; sign in again")]
    Expired,
    #[error("Please sign in first")]
    NotSignedIn,
    #[error("Credential storage failed: {0}")]
    Store(#[from] TokenStoreError),
    #[error("Profile storage failed: {0}")]
    Profile(String),
    #[error("App directory unavailable: {0}")]
    AppDir(#[from] crate::app_dirs::AppDirError),
    #[error("Background task failed: {0}")]
    Crashed(String),
}

/// External identity service: session lifecycle and account management.
pub trait IdentityProvider: Send + Sync {
    /// Recover a previously established session, if any.
    fn restore(&self) -> Result<Option<Session>, IdentityError>;
    fn sign_in(&self, credentials: Credentials) -> Result<Session, IdentityError>;
    fn sign_out(&self) -> Result<(), IdentityError>;
    /// Merge `patch` into the user's metadata; `null` values remove keys.
    fn update_user_metadata(
        &self,
        session: &Session,
        patch: Map<String, Value>,
    ) -> Result<User, IdentityError>;
    fn delete_current_user(&self, session: &Session) -> Result<(), IdentityError>;
}

#[derive(Default)]
struct SessionShared {
    session: RwLock<Option<Session>>,
    subscribers: Mutex<Vec<Sender<SessionEvent>>>,
}

/// Shared, cloneable view of the current session.
#[derive(Clone, Default)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle pre-populated with `session`, without notifying anyone.
    pub fn with_session(session: Session) -> Self {
        let handle = Self::new();
        if let Ok(mut guard) = handle.shared.session.write() {
            *guard = Some(session);
        }
        handle
    }

    /// The current session, ignoring expired ones.
    pub fn current(&self) -> Option<Session> {
        self.shared
            .session
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .filter(|session| !session.is_expired())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current().map(|session| session.access_token)
    }

    pub fn user(&self) -> Option<User> {
        self.current().map(|session| session.user)
    }

    /// Install or clear the session and notify subscribers.
    pub fn replace(&self, session: Option<Session>) {
        let event = match &session {
            Some(session) => SessionEvent::SignedIn(session.user.clone()),
            None => SessionEvent::SignedOut,
        };
        if let Ok(mut guard) = self.shared.session.write() {
            *guard = session;
        }
        self.broadcast(event);
    }

    /// Swap the user of the current session (after a profile update).
    pub fn update_user(&self, user: User) {
        let updated = match self.shared.session.write() {
            Ok(mut guard) => match guard.as_mut() {
                Some(session) => {
                    session.user = user.clone();
                    true
                }
                None => false,
            },
            Err(_) => false,
        };
        if updated {
            self.broadcast(SessionEvent::UserUpdated(user));
        }
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.shared.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn broadcast(&self, event: SessionEvent) {
        if let Ok(mut subscribers) = self.shared.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

/// Account operations that keep a [`SessionHandle`] in sync with the provider.
#[derive(Clone)]
pub struct Account {
    provider: Arc<dyn IdentityProvider>,
    handle: SessionHandle,
}

impl Account {
    pub fn new(provider: Arc<dyn IdentityProvider>, handle: SessionHandle) -> Self {
        Self { provider, handle }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Restore the stored session at startup.
    pub fn restore(&self) -> Result<Option<User>, IdentityError> {
        let session = self.provider.restore()?;
        let user = session.as_ref().map(|session| session.user.clone());
        self.handle.replace(session);
        Ok(user)
    }

    pub fn sign_in(&self, credentials: Credentials) -> Result<User, IdentityError> {
        let session = self.provider.sign_in(credentials)?;
        let user = session.user.clone();
        tracing::info!(user_id = %user.id, "Signed in");
        self.handle.replace(Some(session));
        Ok(user)
    }

    pub fn sign_out(&self) -> Result<(), IdentityError> {
        self.provider.sign_out()?;
        tracing::info!("Signed out");
        self.handle.replace(None);
        Ok(())
    }

    pub fn update_profile(&self, patch: Map<String, Value>) -> Result<User, IdentityError> {
        let session = self.handle.current().ok_or(IdentityError::NotSignedIn)?;
        let user = self.provider.update_user_metadata(&session, patch)?;
        self.handle.update_user(user.clone());
        Ok(user)
    }

    /// Permanently delete the account, then drop the session.
    pub fn delete_account(&self) -> Result<(), IdentityError> {
        let session = self.handle.current().ok_or(IdentityError::NotSignedIn)?;
        self.provider.delete_current_user(&session)?;
        tracing::warn!(user_id = %session.user.id, "Account deleted");
        self.handle.replace(None);
        Ok(())
    }
}
