use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use crate::api::{
    ApiError, Dataset, DeleteResponse, TargetAnalysis, TrainingRequest, TrainingResponse,
    UploadResponse,
};
use crate::session::{IdentityError, User};
use crate::train::AnalysisTicket;

type TryRecvError = std::sync::mpsc::TryRecvError;

/// Results posted back to the UI thread by background workers.
pub(crate) enum JobMessage {
    DatasetsLoaded(DatasetsLoadResult),
    DatasetUploaded(UploadResult),
    DatasetDeleted(DeleteResult),
    TargetAnalyzed(TargetAnalysisResult),
    TrainingFinished(Result<TrainingResponse, ApiError>),
    Account(AccountJobResult),
}

#[derive(Debug)]
pub(crate) struct DatasetsLoadResult {
    pub(crate) request_id: u64,
    pub(crate) result: Result<Vec<Dataset>, ApiError>,
}

#[derive(Debug)]
pub(crate) struct UploadResult {
    pub(crate) path: PathBuf,
    pub(crate) result: Result<UploadResponse, ApiError>,
}

#[derive(Debug)]
pub(crate) struct DeleteResult {
    pub(crate) dataset_id: String,
    pub(crate) result: Result<DeleteResponse, ApiError>,
}

#[derive(Debug)]
pub(crate) struct TargetAnalysisResult {
    pub(crate) ticket: AnalysisTicket,
    pub(crate) result: Result<TargetAnalysis, ApiError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AccountAction {
    SignIn,
    SignOut,
    UpdateProfile,
    UpdateNotifications,
    DeleteAccount,
}

#[derive(Debug)]
pub(crate) struct AccountJobResult {
    pub(crate) action: AccountAction,
    pub(crate) result: Result<Option<User>, IdentityError>,
}

pub(crate) struct ControllerJobs {
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    pending: usize,
    dataset_request: u64,
    /// Request of the run in flight, kept for the overview summary.
    training_request: Option<TrainingRequest>,
}

impl ControllerJobs {
    pub(crate) fn new() -> Self {
        let (message_tx, message_rx) = mpsc::channel();
        Self {
            message_tx,
            message_rx,
            pending: 0,
            dataset_request: 0,
            training_request: None,
        }
    }

    /// Run `job` on a worker thread and post its message back. If the job
    /// panics, `on_panic` builds the failure message instead so the pending
    /// count and the page's busy state still settle.
    pub(crate) fn spawn<F, P>(&mut self, job: F, on_panic: P)
    where
        F: FnOnce() -> JobMessage + Send + 'static,
        P: FnOnce(String) -> JobMessage + Send + 'static,
    {
        self.pending += 1;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let message = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                let detail = panic_detail(payload.as_ref());
                tracing::error!("Background job panicked: {detail}");
                on_panic(detail)
            });
            let _ = tx.send(message);
        });
    }

    pub(crate) fn try_recv_message(&mut self) -> Result<JobMessage, TryRecvError> {
        let message = self.message_rx.try_recv();
        if message.is_ok() {
            self.pending = self.pending.saturating_sub(1);
        }
        message
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Start a new dataset load; earlier loads become stale.
    pub(crate) fn next_dataset_request(&mut self) -> u64 {
        self.dataset_request += 1;
        self.dataset_request
    }

    pub(crate) fn is_current_dataset_request(&self, request_id: u64) -> bool {
        self.dataset_request == request_id
    }

    pub(crate) fn set_training_request(&mut self, request: TrainingRequest) {
        self.training_request = Some(request);
    }

    pub(crate) fn take_training_request(&mut self) -> Option<TrainingRequest> {
        self.training_request.take()
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker stopped unexpectedly".to_string())
}
