use std::time::{Duration, Instant};

use super::jobs::{JobMessage, TargetAnalysisResult};
use super::*;
use crate::api::{ApiError, TrainingRequest, TrainingResponse};
use crate::egui_app::state::LastRunSummary;
use crate::train::{AnalysisTicket, AnalysisUpdate, ProblemType, registry};

impl EguiController {
    pub fn select_dataset(&mut self, dataset_id: Option<String>) {
        if self.wizard.state().dataset() == dataset_id.as_deref() {
            return;
        }
        self.wizard.select_dataset(dataset_id.clone());
        if dataset_id.is_some() && self.settings.ui.last_dataset != dataset_id {
            self.settings.ui.last_dataset = dataset_id;
            self.persist_settings();
        }
    }

    pub fn select_target(&mut self, column: Option<String>) {
        if let Some(ticket) = self.wizard.select_target(column) {
            self.spawn_target_analysis(ticket);
        }
    }

    pub fn set_problem_type(&mut self, problem_type: ProblemType) {
        self.wizard.set_problem_type(problem_type);
    }

    pub fn select_model(&mut self, model: Option<String>) {
        self.wizard.select_model(model);
    }

    pub fn set_test_size(&mut self, test_size: f64) {
        self.wizard.set_test_size(test_size);
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.wizard.set_random_seed(seed);
    }

    pub fn set_cross_validation(&mut self, enabled: bool) {
        self.wizard.set_cross_validation(enabled);
    }

    pub fn set_cv_folds(&mut self, folds: u32) {
        self.wizard.set_cv_folds(folds);
    }

    fn spawn_target_analysis(&mut self, ticket: AnalysisTicket) {
        self.set_status(format!("Analyzing {}...", ticket.column), StatusTone::Busy);
        let api = self.api.clone();
        let failed_ticket = ticket.clone();
        self.jobs.spawn(
            move || {
                let result = api.analyze_target(&ticket.dataset_id, &ticket.column);
                JobMessage::TargetAnalyzed(TargetAnalysisResult { ticket, result })
            },
            move |detail| {
                JobMessage::TargetAnalyzed(TargetAnalysisResult {
                    ticket: failed_ticket,
                    result: Err(ApiError::Crashed(detail)),
                })
            },
        );
    }

    pub(super) fn handle_target_analyzed(&mut self, message: TargetAnalysisResult) {
        match self.wizard.apply_analysis(&message.ticket, message.result) {
            AnalysisUpdate::Stale => {}
            AnalysisUpdate::Applied { recommended } => {
                self.set_status(
                    format!("{} looks like a {recommended} target", message.ticket.column),
                    StatusTone::Info,
                );
            }
            AnalysisUpdate::Failed { message: reason } => {
                self.set_status(
                    format!("Target analysis unavailable: {reason}"),
                    StatusTone::Warning,
                );
            }
        }
    }

    /// Validate the form and send the training request.
    pub fn start_training(&mut self) {
        self.start_training_at(Instant::now());
    }

    pub(super) fn start_training_at(&mut self, now: Instant) {
        let request = match self.wizard.start(now) {
            Ok(request) => request,
            Err(err) => {
                tracing::info!("Training not started: {err}");
                self.notify(err.into());
                return;
            }
        };
        tracing::info!(
            dataset_id = %request.dataset_id,
            target = %request.target_col,
            model = %request.model_type,
            problem_type = %request.problem_type,
            "Starting training"
        );
        self.set_status("Training started", StatusTone::Busy);
        self.jobs.set_training_request(request.clone());
        let api = self.api.clone();
        self.jobs.spawn(
            move || JobMessage::TrainingFinished(api.train_model(&request)),
            |detail| JobMessage::TrainingFinished(Err(ApiError::Crashed(detail))),
        );
    }

    pub(super) fn handle_training_finished(&mut self, result: Result<TrainingResponse, ApiError>) {
        let request = self.jobs.take_training_request();
        let outcome = result.as_ref().ok().map(|response| response.data.clone());
        let Some(notification) = self.wizard.finish(result) else {
            return;
        };
        if let (Some(request), Some(outcome)) = (request, outcome) {
            self.ui.last_run = Some(self.summarize_run(
                &request,
                outcome.training_time,
                &outcome.preprocessing_metadata.problem_type,
            ));
        }
        self.notify(notification);
    }

    fn summarize_run(
        &self,
        request: &TrainingRequest,
        training_time: f64,
        problem_type: &str,
    ) -> LastRunSummary {
        let dataset_name = self
            .directory
            .find(&request.dataset_id)
            .map(|dataset| dataset.name.clone())
            .unwrap_or_else(|| request.dataset_id.clone());
        let model = match request.problem_type {
            ProblemType::Auto => ProblemType::Auto.label().to_string(),
            explicit => registry::lookup(explicit, &request.model_type)
                .map(|info| info.name.to_string())
                .unwrap_or_else(|| request.model_type.clone()),
        };
        let metrics = self
            .wizard
            .progress()
            .displayed_metrics()
            .into_iter()
            .map(|(name, value)| (name.label().to_string(), name.format(value)))
            .collect();
        LastRunSummary {
            dataset_name,
            target_column: request.target_col.clone(),
            model,
            problem_type: problem_type.to_string(),
            training_time: Duration::try_from_secs_f64(training_time).unwrap_or_default(),
            metrics,
        }
    }
}
