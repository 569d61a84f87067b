//! Model-training workflow: form state, model catalogue, dataset directory,
//! target analysis, progress display and the wizard tying them together.

pub mod analyzer;
pub mod directory;
pub mod progress;
pub mod registry;
mod state;
pub mod wizard;

pub use analyzer::{AnalysisTicket, AnalysisUpdate, ProblemMismatch, TargetAnalyzer};
pub use directory::DatasetDirectory;
pub use progress::{MetricFamily, MetricName, TrainingProgress};
pub use registry::{ModelIcon, ModelInfo};
pub use state::{
    MAX_CV_FOLDS, MAX_TEST_SIZE, MIN_CV_FOLDS, MIN_TEST_SIZE, ProblemType, TEST_SIZE_STEP,
    TrainState, clamp_test_size,
};
pub use wizard::{
    ConfigurationError, Notification, NotificationTone, TrainingWizard, WizardPhase,
};
