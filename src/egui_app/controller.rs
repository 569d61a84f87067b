//! Maintains app state and bridges core logic to the egui UI.
//! Network and account work runs on worker threads; results come back through
//! one channel drained at the start of every frame.

mod account;
mod background_jobs;
mod datasets;
mod jobs;
mod training;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use crate::api::ApiClient;
use crate::config::{self, AppSettings, ConfigError, DashboardPage};
use crate::egui_app::state::{StatusTone, UiState};
use crate::session::{Account, SessionEvent, User};
use crate::train::{DatasetDirectory, Notification, NotificationTone, TrainingWizard};

use jobs::ControllerJobs;

/// Maintains app state and bridges core logic to the egui UI.
pub struct EguiController {
    pub ui: UiState,
    settings: AppSettings,
    settings_path: PathBuf,
    api: ApiClient,
    account: Account,
    session_events: Receiver<SessionEvent>,
    directory: DatasetDirectory,
    wizard: TrainingWizard,
    jobs: ControllerJobs,
}

impl EguiController {
    /// Build a controller around `account`. The API base URL is resolved
    /// from the environment and `settings`.
    pub fn new(
        settings: AppSettings,
        settings_path: PathBuf,
        account: Account,
    ) -> Result<Self, ConfigError> {
        let base_url = settings.resolved_base_url()?;
        let session = account.handle().clone();
        let session_events = session.subscribe();
        let mut ui = UiState::default();
        ui.page = settings.ui.last_page;
        ui.settings.api_base_url = base_url.to_string();
        tracing::info!(api = %base_url, "Dashboard controller ready");
        Ok(Self {
            ui,
            settings,
            settings_path,
            api: ApiClient::new(base_url, session),
            account,
            session_events,
            directory: DatasetDirectory::default(),
            wizard: TrainingWizard::default(),
            jobs: ControllerJobs::new(),
        })
    }

    /// Restore the stored session. Sign-in state changes are then picked up
    /// by the session event stream, which triggers the first dataset load.
    pub fn restore_session(&mut self) {
        match self.account.restore() {
            Ok(Some(user)) => {
                let name = crate::session::profile::display_name(Some(&user));
                self.set_status(format!("Signed in as {name}"), StatusTone::Info);
            }
            Ok(None) => {
                self.set_status("Sign in from Settings to load your datasets", StatusTone::Idle);
            }
            Err(err) => {
                tracing::warn!("Failed to restore session: {err}");
                self.set_status(format!("Could not restore session: {err}"), StatusTone::Warning);
            }
        }
    }

    /// Per-frame housekeeping. Returns whether another frame should follow
    /// soon even without input.
    pub fn update_frame(&mut self, now: Instant) -> bool {
        self.poll_session_events();
        self.poll_background_jobs();
        self.wizard.tick(now);
        self.ui.toasts.expire(now);
        self.needs_repaint()
    }

    pub fn needs_repaint(&self) -> bool {
        self.is_busy() || !self.ui.toasts.is_empty()
    }

    /// A background job or a training run is in flight.
    pub fn is_busy(&self) -> bool {
        self.jobs.has_pending() || self.wizard.is_training()
    }

    pub fn wizard(&self) -> &TrainingWizard {
        &self.wizard
    }

    pub fn directory(&self) -> &DatasetDirectory {
        &self.directory
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn api_base_url(&self) -> &url::Url {
        self.api.base_url()
    }

    pub fn user(&self) -> Option<User> {
        self.account.handle().user()
    }

    pub fn is_signed_in(&self) -> bool {
        self.account.handle().is_signed_in()
    }

    pub fn navigate(&mut self, page: DashboardPage) {
        if self.ui.page == page {
            return;
        }
        self.ui.page = page;
        self.settings.ui.last_page = page;
        self.persist_settings();
    }

    pub fn dismiss_toast(&mut self, id: u64) {
        self.ui.toasts.dismiss(id);
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status.set(text.into(), tone);
    }

    /// Show a toast and mirror it in the footer.
    fn notify(&mut self, notification: Notification) {
        let tone = match notification.tone {
            NotificationTone::Success => StatusTone::Info,
            NotificationTone::Warning => StatusTone::Warning,
            NotificationTone::Error => StatusTone::Error,
        };
        let text = if notification.description.is_empty() {
            notification.title.clone()
        } else {
            format!("{}: {}", notification.title, notification.description)
        };
        self.set_status(text, tone);
        self.ui.toasts.push(notification, Instant::now());
    }

    fn notify_error(&mut self, title: &str, description: impl Into<String>) {
        self.notify(Notification {
            tone: NotificationTone::Error,
            title: title.to_string(),
            description: description.into(),
        });
    }

    fn persist_settings(&mut self) {
        if let Err(err) = config::save_to_path(&self.settings, &self.settings_path) {
            tracing::warn!("Failed to save settings: {err}");
            self.set_status(format!("Failed to save settings: {err}"), StatusTone::Warning);
        }
    }

    fn poll_session_events(&mut self) {
        while let Ok(event) = self.session_events.try_recv() {
            match event {
                SessionEvent::SignedIn(user) => {
                    self.ui.settings.load_profile(Some(&user));
                    self.wizard.reset_selection();
                    self.refresh_datasets();
                }
                SessionEvent::SignedOut => {
                    self.ui.settings.load_profile(None);
                    self.ui.last_run = None;
                    self.wizard.reset_selection();
                    self.refresh_datasets();
                }
                SessionEvent::UserUpdated(user) => {
                    self.ui.settings.load_profile(Some(&user));
                }
            }
        }
    }
}
