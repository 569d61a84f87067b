//! Shared state types for the egui UI.

pub mod forms;
pub mod status;
pub mod toasts;

pub use forms::{
    DELETE_CONFIRMATION_WORD, DatasetsPageState, LastRunSummary, PendingDelete, SettingsPageState,
};
pub use status::{StatusBarState, StatusTone};
pub use toasts::{TOAST_TTL, Toast, ToastQueue};

use crate::config::DashboardPage;

/// Top-level UI model consumed by the egui renderer.
#[derive(Clone, Debug)]
pub struct UiState {
    pub page: DashboardPage,
    pub status: StatusBarState,
    pub toasts: ToastQueue,
    pub datasets: DatasetsPageState,
    pub settings: SettingsPageState,
    pub last_run: Option<LastRunSummary>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            page: DashboardPage::default(),
            status: StatusBarState::idle(),
            toasts: ToastQueue::default(),
            datasets: DatasetsPageState::default(),
            settings: SettingsPageState::default(),
            last_run: None,
        }
    }
}
