use serde_json::{Map, Value};

use super::jobs::{AccountAction, AccountJobResult, JobMessage};
use super::*;
use crate::api::ApiClient;
use crate::session::profile::{EMAIL_NOTIFICATIONS_KEY, TRAINING_ALERTS_KEY};
use crate::session::{Credentials, IdentityError};

impl EguiController {
    /// Sign in with the bearer token typed on the settings page.
    pub fn sign_in_with_token(&mut self) {
        let token = self.ui.settings.token_input.trim().to_string();
        if token.is_empty() {
            self.ui.settings.error = Some("Paste an access token to sign in".into());
            return;
        }
        self.run_account_job(AccountAction::SignIn, move |account| {
            account.sign_in(Credentials::AccessToken(token)).map(Some)
        });
    }

    pub fn sign_out(&mut self) {
        self.run_account_job(AccountAction::SignOut, |account| {
            account.sign_out().map(|()| None)
        });
    }

    /// Store the profile fields as user metadata.
    pub fn save_profile(&mut self) {
        let mut patch = Map::new();
        patch.insert(
            "full_name".into(),
            Value::String(self.ui.settings.full_name.trim().to_string()),
        );
        patch.insert(
            "company".into(),
            Value::String(self.ui.settings.company.trim().to_string()),
        );
        self.run_account_job(AccountAction::UpdateProfile, move |account| {
            account.update_profile(patch).map(Some)
        });
    }

    /// Store the notification toggles as user metadata flags.
    pub fn save_notifications(&mut self) {
        let mut patch = Map::new();
        patch.insert(
            EMAIL_NOTIFICATIONS_KEY.into(),
            Value::Bool(self.ui.settings.email_notifications),
        );
        patch.insert(
            TRAINING_ALERTS_KEY.into(),
            Value::Bool(self.ui.settings.training_alerts),
        );
        self.run_account_job(AccountAction::UpdateNotifications, move |account| {
            account.update_profile(patch).map(Some)
        });
    }

    pub fn open_delete_account(&mut self) {
        self.ui.settings.confirm_delete_open = true;
        self.ui.settings.confirm_delete_text.clear();
    }

    pub fn close_delete_account(&mut self) {
        self.ui.settings.confirm_delete_open = false;
        self.ui.settings.confirm_delete_text.clear();
    }

    pub fn delete_account(&mut self) {
        if !self.ui.settings.delete_confirmed() {
            return;
        }
        self.close_delete_account();
        self.run_account_job(AccountAction::DeleteAccount, |account| {
            account.delete_account().map(|()| None)
        });
    }

    fn run_account_job<F>(&mut self, action: AccountAction, job: F)
    where
        F: FnOnce(&Account) -> Result<Option<User>, IdentityError> + Send + 'static,
    {
        if self.ui.settings.account_busy {
            return;
        }
        self.ui.settings.account_busy = true;
        self.ui.settings.error = None;
        let account = self.account.clone();
        self.jobs.spawn(
            move || {
                let result = job(&account);
                JobMessage::Account(AccountJobResult { action, result })
            },
            move |detail| {
                JobMessage::Account(AccountJobResult {
                    action,
                    result: Err(IdentityError::Crashed(detail)),
                })
            },
        );
    }

    pub(super) fn handle_account_result(&mut self, message: AccountJobResult) {
        self.ui.settings.account_busy = false;
        let AccountJobResult { action, result } = message;
        let user = match result {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(?action, "Account action failed: {err}");
                self.ui.settings.error = Some(err.to_string());
                self.notify_error(action_failure_title(action), err.to_string());
                return;
            }
        };
        let (title, description) = match action {
            AccountAction::SignIn => {
                self.ui.settings.token_input.clear();
                let name = crate::session::profile::display_name(user.as_ref());
                ("Signed in", format!("Welcome, {name}"))
            }
            AccountAction::SignOut => ("Signed out", String::new()),
            AccountAction::UpdateProfile => ("Profile updated", String::new()),
            AccountAction::UpdateNotifications => {
                ("Preferences saved", "Notification settings updated".to_string())
            }
            AccountAction::DeleteAccount => {
                ("Account deleted", "Your account has been removed".to_string())
            }
        };
        self.notify(Notification {
            tone: NotificationTone::Success,
            title: title.into(),
            description,
        });
    }

    /// Point the client at a new API base URL and reload.
    pub fn apply_api_base_url(&mut self) {
        let url = match config::parse_base_url(&self.ui.settings.api_base_url) {
            Ok(url) => url,
            Err(err) => {
                self.ui.settings.error = Some(err.to_string());
                return;
            }
        };
        self.ui.settings.error = None;
        if &url == self.api.base_url() {
            return;
        }
        tracing::info!(api = %url, "API base URL changed");
        self.settings.api.base_url = url.to_string();
        self.persist_settings();
        self.ui.settings.api_base_url = url.to_string();
        self.api = ApiClient::new(url, self.account.handle().clone());
        self.wizard.reset_selection();
        self.refresh_datasets();
    }
}

fn action_failure_title(action: AccountAction) -> &'static str {
    match action {
        AccountAction::SignIn => "Sign in failed",
        AccountAction::SignOut => "Sign out failed",
        AccountAction::UpdateProfile => "Profile update failed",
        AccountAction::UpdateNotifications => "Saving preferences failed",
        AccountAction::DeleteAccount => "Account deletion failed",
    }
}
