use super::jobs::JobMessage;
use super::*;

impl EguiController {
    /// Apply every finished job without blocking the frame.
    pub(in crate::egui_app::controller) fn poll_background_jobs(&mut self) {
        while let Ok(message) = self.jobs.try_recv_message() {
            match message {
                JobMessage::DatasetsLoaded(loaded) => self.handle_datasets_loaded(loaded),
                JobMessage::DatasetUploaded(uploaded) => self.handle_dataset_uploaded(uploaded),
                JobMessage::DatasetDeleted(deleted) => self.handle_dataset_deleted(deleted),
                JobMessage::TargetAnalyzed(analyzed) => self.handle_target_analyzed(analyzed),
                JobMessage::TrainingFinished(result) => self.handle_training_finished(result),
                JobMessage::Account(outcome) => {
                    self.handle_account_result(outcome);
                    // Session events raised by the job are handled in the same frame.
                    self.poll_session_events();
                }
            }
        }
    }
}
