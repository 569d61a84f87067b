use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest fraction of rows held out for evaluation.
pub const MIN_TEST_SIZE: f64 = 0.1;
/// Highest fraction of rows held out for evaluation.
pub const MAX_TEST_SIZE: f64 = 0.5;
/// Slider granularity for the test split.
pub const TEST_SIZE_STEP: f64 = 0.05;
pub const MIN_CV_FOLDS: u32 = 2;
pub const MAX_CV_FOLDS: u32 = 10;

/// Kind of learning task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    #[default]
    Regression,
    Classification,
    /// Let the server decide from the target column.
    Auto,
}

impl ProblemType {
    pub const ALL: [ProblemType; 3] = [Self::Regression, Self::Classification, Self::Auto];

    /// Wire name used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regression => "regression",
            Self::Classification => "classification",
            Self::Auto => "auto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Regression => "Regression",
            Self::Classification => "Classification",
            Self::Auto => "Auto Mode",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Regression => "Predict continuous values",
            Self::Classification => "Predict categories",
            Self::Auto => "Let the server decide",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form state of the training wizard.
///
/// Fields are only reachable through setters so the clamping and reset rules
/// always hold.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainState {
    dataset: Option<String>,
    target_column: Option<String>,
    problem_type: ProblemType,
    selected_model: Option<String>,
    test_size: f64,
    random_seed: u64,
    cross_validation: bool,
    cv_folds: u32,
}

impl Default for TrainState {
    fn default() -> Self {
        Self {
            dataset: None,
            target_column: None,
            problem_type: ProblemType::Regression,
            selected_model: None,
            test_size: 0.2,
            random_seed: 42,
            cross_validation: false,
            cv_folds: 5,
        }
    }
}

impl TrainState {
    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    pub fn target_column(&self) -> Option<&str> {
        self.target_column.as_deref()
    }

    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn test_size(&self) -> f64 {
        self.test_size
    }

    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    pub fn cross_validation(&self) -> bool {
        self.cross_validation
    }

    pub fn cv_folds(&self) -> u32 {
        self.cv_folds
    }

    /// Select a dataset. A different dataset always drops the target column.
    pub fn set_dataset(&mut self, dataset: Option<String>) -> bool {
        let dataset = dataset.filter(|id| !id.is_empty());
        if dataset == self.dataset {
            return false;
        }
        self.dataset = dataset;
        self.target_column = None;
        true
    }

    pub fn set_target_column(&mut self, column: Option<String>) -> bool {
        let column = column.filter(|name| !name.is_empty());
        if column == self.target_column {
            return false;
        }
        self.target_column = column;
        true
    }

    /// Switch the problem type; the chosen model belongs to the old list and
    /// is cleared.
    pub fn set_problem_type(&mut self, problem_type: ProblemType) -> bool {
        if problem_type == self.problem_type {
            return false;
        }
        self.problem_type = problem_type;
        self.selected_model = None;
        true
    }

    /// Pick a model. Ignored in auto mode, where no list applies.
    pub fn set_selected_model(&mut self, model: Option<String>) {
        if self.problem_type == ProblemType::Auto {
            self.selected_model = None;
            return;
        }
        self.selected_model = model.filter(|key| !key.is_empty());
    }

    /// Set the held-out fraction, clamped to `[0.1, 0.5]`.
    pub fn set_test_size(&mut self, test_size: f64) {
        self.test_size = clamp_test_size(test_size);
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.random_seed = seed;
    }

    pub fn set_cross_validation(&mut self, enabled: bool) {
        self.cross_validation = enabled;
    }

    pub fn set_cv_folds(&mut self, folds: u32) {
        self.cv_folds = folds.clamp(MIN_CV_FOLDS, MAX_CV_FOLDS);
    }

    /// Whether the start action may be offered.
    pub fn is_ready_to_train(&self) -> bool {
        self.dataset.is_some()
            && self.target_column.is_some()
            && (self.problem_type == ProblemType::Auto || self.selected_model.is_some())
    }
}

/// Clamp to the allowed range and round to hundredths; NaN collapses to
/// the minimum.
pub fn clamp_test_size(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_TEST_SIZE;
    }
    (value.clamp(MIN_TEST_SIZE, MAX_TEST_SIZE) * 100.0).round() / 100.0
}
