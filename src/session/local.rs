//! Identity provider backed by a locally stored bearer token.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::{
    Credentials, IdentityError, IdentityProvider, Session, SessionTokenStore, User, decode_claims,
    now_unix,
};
use crate::app_dirs::{self, AppFile};

/// Keeps the token in the OS keyring (or encrypted file) and profile edits
/// in `profile.json`, keyed by user id.
#[derive(Clone, Debug)]
pub struct LocalIdentity {
    store: SessionTokenStore,
    profile_path: PathBuf,
}

impl LocalIdentity {
    pub fn new() -> Result<Self, IdentityError> {
        Ok(Self {
            store: SessionTokenStore::new()?,
            profile_path: app_dirs::app_file(AppFile::Profile)?,
        })
    }

    pub fn with_paths(store: SessionTokenStore, profile_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            profile_path: profile_path.into(),
        }
    }

    fn session_from_token(&self, token: &str) -> Result<Session, IdentityError> {
        let claims = decode_claims(token)?;
        let mut user = claims.user;
        if let Some(overrides) = self.load_profiles()?.remove(&user.id) {
            user.metadata.extend(overrides);
        }
        Ok(Session {
            access_token: token.trim().to_string(),
            user,
            expires_at: claims.expires_at,
        })
    }

    fn load_profiles(&self) -> Result<BTreeMap<String, Map<String, Value>>, IdentityError> {
        if !self.profile_path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.profile_path)
            .map_err(|err| IdentityError::Profile(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| IdentityError::Profile(err.to_string()))
    }

    fn save_profiles(
        &self,
        profiles: &BTreeMap<String, Map<String, Value>>,
    ) -> Result<(), IdentityError> {
        if let Some(parent) = self.profile_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| IdentityError::Profile(err.to_string()))?;
        }
        let text = serde_json::to_string_pretty(profiles)
            .map_err(|err| IdentityError::Profile(err.to_string()))?;
        std::fs::write(&self.profile_path, text).map_err(|err| IdentityError::Profile(err.to_string()))
    }
}

impl IdentityProvider for LocalIdentity {
    fn restore(&self) -> Result<Option<Session>, IdentityError> {
        let Some(token) = self.store.get()? else {
            return Ok(None);
        };
        let session = match self.session_from_token(&token) {
            Ok(session) => session,
            Err(IdentityError::InvalidToken(reason)) => {
                tracing::warn!("Discarding stored access token: {reason}");
                self.store.delete()?;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if session.is_expired_at(now_unix()) {
            tracing::info!("Stored access token expired; sign-in required");
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn sign_in(&self, credentials: Credentials) -> Result<Session, IdentityError> {
        let token = match credentials {
            Credentials::AccessToken(token) => token,
            Credentials::Password { .. } => {
                return Err(IdentityError::Unsupported(
                    "Password sign-in needs a hosted identity provider; paste an access token instead",
                ));
            }
        };
        let session = self.session_from_token(&token)?;
        if session.is_expired_at(now_unix()) {
            return Err(IdentityError::Expired);
        }
        self.store.set(&session.access_token)?;
        Ok(session)
    }

    fn sign_out(&self) -> Result<(), IdentityError> {
        self.store.delete()?;
        Ok(())
    }

    fn update_user_metadata(
        &self,
        session: &Session,
        patch: Map<String, Value>,
    ) -> Result<User, IdentityError> {
        let mut profiles = self.load_profiles()?;
        let stored = profiles.entry(session.user.id.clone()).or_default();
        let mut user = session.user.clone();
        for (key, value) in patch {
            if value.is_null() {
                stored.remove(&key);
                user.metadata.remove(&key);
            } else {
                stored.insert(key.clone(), value.clone());
                user.metadata.insert(key, value);
            }
        }
        self.save_profiles(&profiles)?;
        Ok(user)
    }

    fn delete_current_user(&self, session: &Session) -> Result<(), IdentityError> {
        let mut profiles = self.load_profiles()?;
        if profiles.remove(&session.user.id).is_some() {
            self.save_profiles(&profiles)?;
        }
        self.store.delete()?;
        Ok(())
    }
}
