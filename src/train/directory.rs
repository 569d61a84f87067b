use std::cmp::Ordering;

use crate::api::{ApiError, Dataset};
use crate::session::SessionHandle;

pub const SIGN_IN_REQUIRED: &str = "Please sign in to view your datasets";

/// Datasets owned by the current user, newest first.
#[derive(Clone, Debug, Default)]
pub struct DatasetDirectory {
    datasets: Vec<Dataset>,
    loading: bool,
    error: Option<String>,
}

impl DatasetDirectory {
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Prepare a reload. Returns `false` (and records the sign-in error)
    /// when nobody is signed in, in which case no request should be made.
    pub fn begin_load(&mut self, session: &SessionHandle) -> bool {
        if !session.is_signed_in() {
            self.datasets.clear();
            self.loading = false;
            self.error = Some(SIGN_IN_REQUIRED.to_string());
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    pub fn finish_load(&mut self, result: Result<Vec<Dataset>, ApiError>) {
        self.loading = false;
        match result {
            Ok(mut datasets) => {
                sort_newest_first(&mut datasets);
                self.datasets = datasets;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!("Failed to load datasets: {err}");
                self.datasets.clear();
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn find(&self, dataset_id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|dataset| dataset.id == dataset_id)
    }

    /// Target column candidates for the selected dataset.
    pub fn available_columns(&self, dataset_id: Option<&str>) -> Vec<String> {
        dataset_id
            .and_then(|id| self.find(id))
            .map(|dataset| dataset.feature_names().to_vec())
            .unwrap_or_default()
    }

    /// Drop a dataset after the API confirmed deletion.
    pub fn remove(&mut self, dataset_id: &str) -> bool {
        let before = self.datasets.len();
        self.datasets.retain(|dataset| dataset.id != dataset_id);
        before != self.datasets.len()
    }

    pub fn latest(&self) -> Option<&Dataset> {
        self.datasets.first()
    }
}

fn sort_newest_first(datasets: &mut [Dataset]) {
    datasets.sort_by(|a, b| match (a.uploaded_at_time(), b.uploaded_at_time()) {
        (Some(a_time), Some(b_time)) => b_time.cmp(&a_time),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.uploaded_at.cmp(&a.uploaded_at),
    });
}
