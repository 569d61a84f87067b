//! Training Configuration Wizard.
//!
//! A single state machine owns the form, the analysis ordering and the
//! progress display. `start` validates and produces the request, `tick`
//! replays stage labels against elapsed time, and `finish` is the only way
//! out of the training phase.

use std::time::Instant;

use crate::api::{ApiError, TargetAnalysis, TrainingRequest, TrainingResponse};

use super::analyzer::{AnalysisTicket, AnalysisUpdate, ProblemMismatch, TargetAnalyzer};
use super::progress::{TrainingProgress, map_backend_metrics, stage_at};
use super::{ProblemType, TrainState};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardPhase {
    Idle,
    Training { started_at: Instant },
    Completed,
    Failed,
}

/// Blocking validation failure raised by `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Configuration incomplete")]
    Incomplete,
    #[error("Model not selected")]
    ModelNotSelected,
    #[error("Training in progress")]
    AlreadyTraining,
}

impl ConfigurationError {
    pub fn description(self) -> &'static str {
        match self {
            Self::Incomplete => "Please select a dataset and target column",
            Self::ModelNotSelected => "Please select a model or use Auto mode",
            Self::AlreadyTraining => "Wait for the current run to finish",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationTone {
    Success,
    Warning,
    Error,
}

/// User-facing message produced by a wizard transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub tone: NotificationTone,
    pub title: String,
    pub description: String,
}

impl From<ConfigurationError> for Notification {
    fn from(err: ConfigurationError) -> Self {
        Self {
            tone: NotificationTone::Error,
            title: err.to_string(),
            description: err.description().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrainingWizard {
    state: TrainState,
    analyzer: TargetAnalyzer,
    progress: TrainingProgress,
    phase: WizardPhase,
}

impl Default for TrainingWizard {
    fn default() -> Self {
        Self {
            state: TrainState::default(),
            analyzer: TargetAnalyzer::default(),
            progress: TrainingProgress::default(),
            phase: WizardPhase::Idle,
        }
    }
}

impl TrainingWizard {
    pub fn state(&self) -> &TrainState {
        &self.state
    }

    pub fn analyzer(&self) -> &TargetAnalyzer {
        &self.analyzer
    }

    pub fn progress(&self) -> &TrainingProgress {
        &self.progress
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn is_training(&self) -> bool {
        matches!(self.phase, WizardPhase::Training { .. })
    }

    /// Start button state: a ready form and no run in flight.
    pub fn can_start(&self) -> bool {
        self.state.is_ready_to_train() && !self.is_training()
    }

    /// Change the dataset. The target column is dropped, so no analysis runs.
    pub fn select_dataset(&mut self, dataset_id: Option<String>) -> Option<AnalysisTicket> {
        if self.state.set_dataset(dataset_id) {
            self.analyzer.clear();
        }
        None
    }

    /// Change the target column; returns the analysis request to issue.
    pub fn select_target(&mut self, column: Option<String>) -> Option<AnalysisTicket> {
        if !self.state.set_target_column(column) {
            return None;
        }
        self.analyzer
            .select(self.state.dataset(), self.state.target_column())
    }

    pub fn set_problem_type(&mut self, problem_type: ProblemType) {
        self.state.set_problem_type(problem_type);
    }

    pub fn select_model(&mut self, model: Option<String>) {
        self.state.set_selected_model(model);
    }

    pub fn set_test_size(&mut self, test_size: f64) {
        self.state.set_test_size(test_size);
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.state.set_random_seed(seed);
    }

    pub fn set_cross_validation(&mut self, enabled: bool) {
        self.state.set_cross_validation(enabled);
    }

    pub fn set_cv_folds(&mut self, folds: u32) {
        self.state.set_cv_folds(folds);
    }

    /// Forget the selection (after a session change). A run in flight keeps
    /// its progress display until it resolves.
    pub fn reset_selection(&mut self) {
        self.state.set_dataset(None);
        self.analyzer.clear();
    }

    /// Store an analysis result. In auto mode the recommendation becomes the
    /// problem type.
    pub fn apply_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: Result<TargetAnalysis, ApiError>,
    ) -> AnalysisUpdate {
        let update = self.analyzer.resolve(ticket, result);
        if let AnalysisUpdate::Applied { recommended } = update {
            if self.state.problem_type() == ProblemType::Auto && recommended != ProblemType::Auto {
                tracing::info!(%recommended, "Applying recommended problem type");
                self.state.set_problem_type(recommended);
            }
        }
        update
    }

    pub fn mismatch(&self) -> Option<ProblemMismatch> {
        self.analyzer.mismatch(self.state.problem_type())
    }

    /// Validate the form and enter the training phase.
    pub fn start(&mut self, now: Instant) -> Result<TrainingRequest, ConfigurationError> {
        if self.is_training() {
            return Err(ConfigurationError::AlreadyTraining);
        }
        let (Some(dataset_id), Some(target_col)) =
            (self.state.dataset(), self.state.target_column())
        else {
            return Err(ConfigurationError::Incomplete);
        };
        let problem_type = self.state.problem_type();
        if problem_type != ProblemType::Auto && self.state.selected_model().is_none() {
            return Err(ConfigurationError::ModelNotSelected);
        }
        let request = TrainingRequest {
            dataset_id: dataset_id.to_string(),
            target_col: target_col.to_string(),
            model_type: self.state.selected_model().unwrap_or("auto").to_string(),
            problem_type,
            test_size: super::state::clamp_test_size(self.state.test_size()),
            use_polynomial: false,
            polynomial_degree: 2,
            use_target_encoder: true,
        };
        self.progress = TrainingProgress::started();
        self.phase = WizardPhase::Training { started_at: now };
        Ok(request)
    }

    /// Advance the decorative stage display. Returns whether it changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let WizardPhase::Training { started_at } = self.phase else {
            return false;
        };
        let stage = stage_at(now.saturating_duration_since(started_at));
        if stage.progress == self.progress.progress && stage.status == self.progress.status {
            return false;
        }
        self.progress.progress = stage.progress;
        self.progress.status = stage.status.to_string();
        true
    }

    /// Resolve the run with the network result. Returns `None` when no run
    /// is in flight.
    pub fn finish(
        &mut self,
        result: Result<TrainingResponse, ApiError>,
    ) -> Option<Notification> {
        if !self.is_training() {
            tracing::debug!("Ignoring training result with no run in flight");
            return None;
        }
        let notification = match result {
            Ok(response) => {
                let outcome = response.data;
                self.progress = TrainingProgress {
                    is_training: false,
                    progress: 100,
                    metrics: map_backend_metrics(&outcome.metrics),
                    status: format!("Training completed in {:.2}s!", outcome.training_time),
                };
                self.phase = WizardPhase::Completed;
                tracing::info!(
                    training_time = outcome.training_time,
                    problem_type = %outcome.preprocessing_metadata.problem_type,
                    "Training completed"
                );
                Notification {
                    tone: NotificationTone::Success,
                    title: "Training completed!".to_string(),
                    description: format!(
                        "Model trained successfully using {}",
                        outcome.preprocessing_metadata.problem_type
                    ),
                }
            }
            Err(err) => {
                self.progress = TrainingProgress::failed();
                self.phase = WizardPhase::Failed;
                tracing::warn!("Training failed: {err}");
                Notification {
                    tone: NotificationTone::Error,
                    title: "Training failed".to_string(),
                    description: failure_description(&err),
                }
            }
        };
        Some(notification)
    }
}

fn failure_description(err: &ApiError) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        UNEXPECTED_ERROR.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BackendMetrics, PreprocessingMetadata, TrainingOutcome};
    use crate::train::analyzer::analysis_for;
    use crate::train::progress::{FAILED_STATUS, MetricName, STAGE_INTERVAL};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn ready_wizard() -> TrainingWizard {
        let mut wizard = TrainingWizard::default();
        wizard.select_dataset(Some("housing".into()));
        wizard.select_target(Some("price".into()));
        wizard.select_model(Some("ridge".into()));
        wizard
    }

    fn success(metrics: BackendMetrics) -> Result<TrainingResponse, ApiError> {
        Ok(TrainingResponse {
            status: "success".into(),
            message: "Model trained successfully".into(),
            data: TrainingOutcome {
                id: Some("m1".into()),
                training_time: 3.14159,
                metrics,
                preprocessing_metadata: PreprocessingMetadata {
                    problem_type: "regression".into(),
                    train_samples: 404,
                    test_samples: 102,
                    n_processed_features: 3,
                },
            },
        })
    }

    #[test]
    fn start_guards() {
        let mut wizard = TrainingWizard::default();
        let now = Instant::now();
        let err = wizard.start(now).unwrap_err();
        assert_eq!(err, ConfigurationError::Incomplete);
        let note = Notification::from(err);
        assert_eq!(note.title, "Configuration incomplete");
        assert_eq!(note.description, "Please select a dataset and target column");

        wizard.select_dataset(Some("housing".into()));
        wizard.select_target(Some("price".into()));
        let err = wizard.start(now).unwrap_err();
        assert_eq!(err, ConfigurationError::ModelNotSelected);
        assert_eq!(err.description(), "Please select a model or use Auto mode");
        assert_eq!(wizard.phase(), WizardPhase::Idle);
        assert!(!wizard.progress().is_training);
    }

    #[test]
    fn start_builds_request_and_enters_training() {
        let mut wizard = ready_wizard();
        wizard.set_test_size(0.75);
        let request = wizard.start(Instant::now()).unwrap();
        assert_eq!(request.dataset_id, "housing");
        assert_eq!(request.model_type, "ridge");
        assert_eq!(request.problem_type, ProblemType::Regression);
        assert_eq!(request.test_size, 0.5);
        assert!(!request.use_polynomial);
        assert_eq!(request.polynomial_degree, 2);
        assert!(request.use_target_encoder);
        assert!(wizard.is_training());
        assert!(!wizard.can_start());
        assert_eq!(wizard.progress().status, "Initializing training...");
        assert_eq!(wizard.start(Instant::now()), Err(ConfigurationError::AlreadyTraining));
    }

    #[test]
    fn auto_mode_sends_auto_model() {
        let mut wizard = TrainingWizard::default();
        wizard.set_problem_type(ProblemType::Auto);
        wizard.select_dataset(Some("housing".into()));
        wizard.select_target(Some("price".into()));
        let request = wizard.start(Instant::now()).unwrap();
        assert_eq!(request.model_type, "auto");
        assert_eq!(request.problem_type, ProblemType::Auto);
    }

    #[test]
    fn success_maps_metrics_and_reports_time() {
        let mut wizard = ready_wizard();
        let started = Instant::now();
        wizard.start(started).unwrap();
        wizard.tick(started + STAGE_INTERVAL * 3);
        let note = wizard
            .finish(success(BackendMetrics {
                r2_score: Some(0.87),
                rmse: Some(12.45),
                ..BackendMetrics::default()
            }))
            .unwrap();
        let expected: BTreeMap<_, _> = [(MetricName::R2, 0.87), (MetricName::Rmse, 12.45)].into();
        assert_eq!(wizard.progress().metrics, expected);
        assert_eq!(wizard.progress().progress, 100);
        assert_eq!(wizard.progress().status, "Training completed in 3.14s!");
        assert_eq!(wizard.phase(), WizardPhase::Completed);
        assert_eq!(note.tone, NotificationTone::Success);
        assert_eq!(note.title, "Training completed!");
        assert_eq!(note.description, "Model trained successfully using regression");
    }

    #[test]
    fn failure_surfaces_detail_exactly() {
        let mut wizard = ready_wizard();
        wizard.start(Instant::now()).unwrap();
        let note = wizard
            .finish(Err(ApiError::from_status_body(
                400,
                r#"{"detail":"target column has too many nulls"}"#,
            )))
            .unwrap();
        assert_eq!(note.title, "Training failed");
        assert_eq!(note.description, "target column has too many nulls");
        assert_eq!(wizard.progress().progress, 0);
        assert!(wizard.progress().metrics.is_empty());
        assert_eq!(wizard.progress().status, FAILED_STATUS);
        assert_eq!(wizard.phase(), WizardPhase::Failed);
    }

    #[test]
    fn empty_error_text_falls_back() {
        let mut wizard = ready_wizard();
        wizard.start(Instant::now()).unwrap();
        let note = wizard.finish(Err(ApiError::Io(String::new()))).unwrap();
        assert_eq!(note.description, UNEXPECTED_ERROR);
    }

    #[test]
    fn result_is_terminal_regardless_of_ticks() {
        for fired in 0..=10u32 {
            for succeed in [true, false] {
                let mut wizard = ready_wizard();
                let started = Instant::now();
                wizard.start(started).unwrap();
                wizard.tick(started + STAGE_INTERVAL * fired);
                let result = if succeed {
                    success(BackendMetrics::default())
                } else {
                    Err(ApiError::Transport("reset".into()))
                };
                wizard.finish(result);
                let expected = if succeed { 100 } else { 0 };
                assert_eq!(wizard.progress().progress, expected);
                assert!(!wizard.tick(started + Duration::from_secs(60)));
                assert_eq!(wizard.progress().progress, expected);
            }
        }
    }

    #[test]
    fn ticks_replay_stages_and_hold() {
        let mut wizard = ready_wizard();
        let started = Instant::now();
        wizard.start(started).unwrap();
        assert!(!wizard.tick(started + Duration::from_millis(100)));
        assert!(wizard.tick(started + STAGE_INTERVAL));
        assert_eq!(wizard.progress().progress, 10);
        assert!(wizard.tick(started + Duration::from_secs(30)));
        assert_eq!(wizard.progress().progress, 95);
        assert_eq!(wizard.progress().status, "Saving model...");
        assert!(wizard.is_training());
    }

    #[test]
    fn finish_without_run_is_ignored() {
        let mut wizard = ready_wizard();
        assert!(wizard.finish(success(BackendMetrics::default())).is_none());
        assert_eq!(wizard.phase(), WizardPhase::Idle);
    }

    #[test]
    fn auto_problem_type_follows_recommendation() {
        let mut wizard = TrainingWizard::default();
        wizard.set_problem_type(ProblemType::Auto);
        wizard.select_dataset(Some("housing.csv".into()));
        let ticket = wizard.select_target(Some("price".into())).unwrap();
        wizard.apply_analysis(&ticket, Ok(analysis_for("price", ProblemType::Regression)));
        assert_eq!(wizard.state().problem_type(), ProblemType::Regression);
        assert!(wizard.mismatch().is_none());
    }

    #[test]
    fn explicit_problem_type_is_kept_and_flagged() {
        let mut wizard = ready_wizard();
        wizard.set_problem_type(ProblemType::Classification);
        wizard.select_model(Some("svc".into()));
        let ticket = wizard.select_target(Some("sqft".into())).unwrap();
        wizard.apply_analysis(&ticket, Ok(analysis_for("sqft", ProblemType::Regression)));
        assert_eq!(wizard.state().problem_type(), ProblemType::Classification);
        assert!(wizard.mismatch().is_some());
        assert!(wizard.start(Instant::now()).is_ok());
    }

    #[test]
    fn dataset_change_drops_target_and_analysis() {
        let mut wizard = TrainingWizard::default();
        wizard.select_dataset(Some("housing".into()));
        let ticket = wizard.select_target(Some("price".into())).unwrap();
        assert!(wizard.select_dataset(Some("other".into())).is_none());
        assert_eq!(wizard.state().target_column(), None);
        let update = wizard.apply_analysis(&ticket, Ok(analysis_for("price", ProblemType::Regression)));
        assert_eq!(update, AnalysisUpdate::Stale);
        assert!(wizard.analyzer().analysis().is_none());
    }
}
