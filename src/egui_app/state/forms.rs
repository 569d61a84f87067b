use std::time::Duration;

use crate::session::{User, profile};

/// Word the user must type before the account is removed.
pub const DELETE_CONFIRMATION_WORD: &str = "DELETE";

/// Datasets page: upload and delete bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct DatasetsPageState {
    pub uploading: Option<String>,
    /// Dataset waiting for the user to confirm deletion.
    pub pending_delete: Option<PendingDelete>,
    pub deleting: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDelete {
    pub dataset_id: String,
    pub name: String,
}

/// Settings page: account and connection forms.
#[derive(Clone, Debug, Default)]
pub struct SettingsPageState {
    pub token_input: String,
    pub full_name: String,
    pub company: String,
    pub email_notifications: bool,
    pub training_alerts: bool,
    pub api_base_url: String,
    pub confirm_delete_open: bool,
    pub confirm_delete_text: String,
    pub account_busy: bool,
    pub error: Option<String>,
}

impl SettingsPageState {
    /// Reload the profile fields from the signed-in user.
    pub fn load_profile(&mut self, user: Option<&User>) {
        self.full_name = user
            .map(|user| profile::metadata_text(user, "full_name"))
            .unwrap_or_default();
        self.company = user
            .map(|user| profile::metadata_text(user, "company"))
            .unwrap_or_default();
        let flag = |key: &str| user.is_none_or(|user| profile::metadata_flag(user, key, true));
        self.email_notifications = flag(profile::EMAIL_NOTIFICATIONS_KEY);
        self.training_alerts = flag(profile::TRAINING_ALERTS_KEY);
    }

    pub fn delete_confirmed(&self) -> bool {
        self.confirm_delete_text.trim() == DELETE_CONFIRMATION_WORD
    }
}

/// Result of the last finished training run, shown on the overview page.
#[derive(Clone, Debug, PartialEq)]
pub struct LastRunSummary {
    pub dataset_name: String,
    pub target_column: String,
    pub model: String,
    pub problem_type: String,
    pub training_time: Duration,
    pub metrics: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_fields_follow_user() {
        let mut form = SettingsPageState::default();
        let mut user = User::default();
        user.metadata.insert("full_name".into(), json!("Ada Lovelace"));
        user.metadata.insert("company".into(), json!("Analytical Engines"));
        user.metadata.insert("training_alerts".into(), json!(false));
        form.load_profile(Some(&user));
        assert_eq!(form.full_name, "Ada Lovelace");
        assert_eq!(form.company, "Analytical Engines");
        assert!(form.email_notifications);
        assert!(!form.training_alerts);
        form.load_profile(None);
        assert!(form.full_name.is_empty());
        assert!(form.training_alerts);
    }

    #[test]
    fn delete_requires_exact_word() {
        let mut form = SettingsPageState::default();
        form.confirm_delete_text = "delete".into();
        assert!(!form.delete_confirmed());
        form.confirm_delete_text = " DELETE ".into();
        assert!(form.delete_confirmed());
    }
}
