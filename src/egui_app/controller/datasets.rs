use std::path::PathBuf;

use super::jobs::{DatasetsLoadResult, DeleteResult, JobMessage, UploadResult};
use super::*;
use crate::api::{ApiError, Dataset};
use crate::egui_app::state::PendingDelete;

impl EguiController {
    /// Reload the dataset list for the current user.
    pub fn refresh_datasets(&mut self) {
        if !self.directory.begin_load(self.account.handle()) {
            self.jobs.next_dataset_request();
            self.sync_selection_with_directory();
            return;
        }
        let request_id = self.jobs.next_dataset_request();
        let api = self.api.clone();
        self.set_status("Loading datasets...", StatusTone::Busy);
        self.jobs.spawn(
            move || {
                JobMessage::DatasetsLoaded(DatasetsLoadResult {
                    request_id,
                    result: api.list_datasets(),
                })
            },
            move |detail| {
                JobMessage::DatasetsLoaded(DatasetsLoadResult {
                    request_id,
                    result: Err(ApiError::Crashed(detail)),
                })
            },
        );
    }

    pub(super) fn handle_datasets_loaded(&mut self, message: DatasetsLoadResult) {
        if !self.jobs.is_current_dataset_request(message.request_id) {
            tracing::debug!(request_id = message.request_id, "Dropping stale dataset list");
            return;
        }
        let failed = message.result.is_err();
        self.directory.finish_load(message.result);
        if failed {
            let error = self.directory.error().unwrap_or_default().to_string();
            self.set_status(format!("Failed to load datasets: {error}"), StatusTone::Error);
        } else {
            let count = self.directory.datasets().len();
            self.set_status(format!("Loaded {count} datasets"), StatusTone::Info);
        }
        self.sync_selection_with_directory();
    }

    /// Drop a selection that no longer exists and preselect the remembered
    /// dataset when nothing is chosen.
    fn sync_selection_with_directory(&mut self) {
        let selected = self.wizard.state().dataset().map(str::to_string);
        match selected {
            Some(id) if self.directory.find(&id).is_none() => {
                self.wizard.select_dataset(None);
            }
            Some(_) => {}
            None => {
                let remembered = self
                    .settings
                    .ui
                    .last_dataset
                    .clone()
                    .filter(|id| self.directory.find(id).is_some());
                if remembered.is_some() {
                    self.wizard.select_dataset(remembered);
                }
            }
        }
    }

    /// Ask for a CSV file and upload it.
    pub fn pick_and_upload_dataset(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Upload dataset")
            .add_filter("CSV", &["csv"])
            .pick_file();
        if let Some(path) = picked {
            self.upload_dataset(path);
        }
    }

    pub fn upload_dataset(&mut self, path: PathBuf) {
        if !self.is_signed_in() {
            self.notify_error("Upload failed", "Please sign in to upload datasets");
            return;
        }
        if self.ui.datasets.uploading.is_some() {
            return;
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.set_status(format!("Uploading {file_name}..."), StatusTone::Busy);
        self.ui.datasets.uploading = Some(file_name);
        let api = self.api.clone();
        let failed_path = path.clone();
        self.jobs.spawn(
            move || {
                let result = api.upload_dataset(&path);
                JobMessage::DatasetUploaded(UploadResult { path, result })
            },
            move |detail| {
                JobMessage::DatasetUploaded(UploadResult {
                    path: failed_path,
                    result: Err(ApiError::Crashed(detail)),
                })
            },
        );
    }

    pub(super) fn handle_dataset_uploaded(&mut self, message: UploadResult) {
        self.ui.datasets.uploading = None;
        match message.result {
            Ok(response) => {
                tracing::info!(
                    path = %message.path.display(),
                    dataset_id = ?response.dataset_id,
                    "Dataset uploaded"
                );
                self.notify(Notification {
                    tone: NotificationTone::Success,
                    title: "Dataset uploaded".into(),
                    description: response.message,
                });
                self.refresh_datasets();
            }
            Err(err) => {
                tracing::warn!(path = %message.path.display(), "Upload failed: {err}");
                self.notify_error("Upload failed", err.to_string());
            }
        }
    }

    /// Open the delete confirmation for `dataset_id`.
    pub fn request_delete(&mut self, dataset_id: &str) {
        let Some(dataset) = self.directory.find(dataset_id) else {
            return;
        };
        self.ui.datasets.pending_delete = Some(PendingDelete {
            dataset_id: dataset.id.clone(),
            name: dataset.name.clone(),
        });
    }

    pub fn cancel_delete(&mut self) {
        self.ui.datasets.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) {
        if self.ui.datasets.deleting.is_some() {
            return;
        }
        let Some(pending) = self.ui.datasets.pending_delete.take() else {
            return;
        };
        self.set_status(format!("Deleting {}...", pending.name), StatusTone::Busy);
        self.ui.datasets.deleting = Some(pending.dataset_id.clone());
        let api = self.api.clone();
        let dataset_id = pending.dataset_id;
        let failed_id = dataset_id.clone();
        self.jobs.spawn(
            move || {
                let result = api.delete_dataset(&dataset_id);
                JobMessage::DatasetDeleted(DeleteResult { dataset_id, result })
            },
            move |detail| {
                JobMessage::DatasetDeleted(DeleteResult {
                    dataset_id: failed_id,
                    result: Err(ApiError::Crashed(detail)),
                })
            },
        );
    }

    pub(super) fn handle_dataset_deleted(&mut self, message: DeleteResult) {
        self.ui.datasets.deleting = None;
        match message.result {
            Ok(response) => {
                self.directory.remove(&message.dataset_id);
                if self.wizard.state().dataset() == Some(message.dataset_id.as_str()) {
                    self.wizard.select_dataset(None);
                }
                if self.settings.ui.last_dataset.as_deref() == Some(message.dataset_id.as_str()) {
                    self.settings.ui.last_dataset = None;
                    self.persist_settings();
                }
                self.notify(Notification {
                    tone: NotificationTone::Success,
                    title: "Dataset deleted".into(),
                    description: response.message,
                });
            }
            Err(err) => {
                tracing::warn!(dataset_id = %message.dataset_id, "Delete failed: {err}");
                self.notify_error("Delete failed", err.to_string());
            }
        }
    }

    /// Dataset currently chosen in the wizard.
    pub fn selected_dataset(&self) -> Option<&Dataset> {
        self.wizard
            .state()
            .dataset()
            .and_then(|id| self.directory.find(id))
    }

    #[cfg(test)]
    pub(super) fn inject_datasets(&mut self, result: Result<Vec<Dataset>, crate::api::ApiError>) {
        let request_id = self.jobs.next_dataset_request();
        self.handle_datasets_loaded(DatasetsLoadResult { request_id, result });
    }
}
