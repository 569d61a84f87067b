use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tempfile::TempDir;

use super::EguiController;
use crate::api::{Dataset, DatasetMetadata};
use crate::config::AppSettings;
use crate::session::{
    Account, Credentials, IdentityError, IdentityProvider, Session, SessionHandle, User,
};

/// Identity provider that keeps everything in memory.
#[derive(Default)]
pub(super) struct MemoryIdentity {
    stored: Mutex<Option<Session>>,
}

impl IdentityProvider for MemoryIdentity {
    fn restore(&self) -> Result<Option<Session>, IdentityError> {
        Ok(self.stored.lock().unwrap().clone())
    }

    fn sign_in(&self, credentials: Credentials) -> Result<Session, IdentityError> {
        match credentials {
            Credentials::AccessToken(token) => {
                let session = session_for(&token);
                *self.stored.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
            Credentials::Password { .. } => Err(IdentityError::Unsupported("password sign-in")),
        }
    }

    fn sign_out(&self) -> Result<(), IdentityError> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }

    fn update_user_metadata(
        &self,
        session: &Session,
        patch: Map<String, Value>,
    ) -> Result<User, IdentityError> {
        let mut user = session.user.clone();
        user.metadata.extend(patch);
        Ok(user)
    }

    fn delete_current_user(&self, _session: &Session) -> Result<(), IdentityError> {
        self.sign_out()
    }
}

pub(super) fn session_for(token: &str) -> Session {
    Session {
        access_token: token.to_string(),
        user: User {
            id: "user-1".into(),
            email: Some("ada@example.com".into()),
            metadata: Map::new(),
        },
        expires_at: None,
    }
}

pub(super) struct Harness {
    pub(super) controller: EguiController,
    pub(super) config_dir: TempDir,
}

impl Harness {
    pub(super) fn settings_path(&self) -> std::path::PathBuf {
        self.config_dir.path().join("config.toml")
    }
}

/// Controller pointed at `base_url`. A signed-in session is installed
/// without raising events, so no dataset load starts on its own.
pub(super) fn harness(base_url: &str, signed_in: bool) -> Harness {
    harness_with(base_url, signed_in, AppSettings::default())
}

pub(super) fn harness_with(base_url: &str, signed_in: bool, mut settings: AppSettings) -> Harness {
    let config_dir = tempfile::tempdir().unwrap();
    settings.api.base_url = base_url.to_string();
    let handle = if signed_in {
        SessionHandle::with_session(session_for("tok"))
    } else {
        SessionHandle::new()
    };
    let account = Account::new(Arc::new(MemoryIdentity::default()), handle);
    let controller =
        EguiController::new(settings, config_dir.path().join("config.toml"), account).unwrap();
    Harness {
        controller,
        config_dir,
    }
}

/// Drive frames until every background job has reported back.
pub(super) fn wait_for_jobs(controller: &mut EguiController) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        controller.update_frame(Instant::now());
        if !controller.jobs.has_pending() || Instant::now() > deadline {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub(super) fn dataset(id: &str, uploaded_at: &str, columns: &[&str]) -> Dataset {
    Dataset {
        id: id.into(),
        name: format!("{id}.csv"),
        uploaded_at: uploaded_at.into(),
        rows: Some(506),
        columns: Some(columns.len() as u64),
        metadata: Some(DatasetMetadata {
            feature_names: columns.iter().map(|name| name.to_string()).collect(),
            ..DatasetMetadata::default()
        }),
        ..Dataset::default()
    }
}
