//! Training progress display: stage playback and metric families.
//!
//! Stage labels are a pure function of elapsed time. Nothing here runs on a
//! timer, so there is no callback that could outlive the request.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::BackendMetrics;

pub const READY_STATUS: &str = "Ready to train";
pub const INITIAL_STATUS: &str = "Initializing training...";
pub const FAILED_STATUS: &str = "Training failed";

/// Time between two displayed stages.
pub const STAGE_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    pub progress: u8,
    pub status: &'static str,
}

const fn stage(progress: u8, status: &'static str) -> Stage {
    Stage { progress, status }
}

pub const STAGES: [Stage; 8] = [
    stage(10, "Loading dataset..."),
    stage(25, "Analyzing target column..."),
    stage(40, "Preprocessing data..."),
    stage(55, "Splitting train/test sets..."),
    stage(65, "Initializing model..."),
    stage(80, "Training model..."),
    stage(90, "Computing metrics..."),
    stage(95, "Saving model..."),
];

/// Stage to display after `elapsed`; holds on the last one.
pub fn stage_at(elapsed: Duration) -> Stage {
    let fired = (elapsed.as_millis() / STAGE_INTERVAL.as_millis()) as usize;
    match fired {
        0 => stage(0, INITIAL_STATUS),
        n => STAGES[n.min(STAGES.len()) - 1],
    }
}

/// Metric keys shown in the progress card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricName {
    R2,
    Rmse,
    Mae,
    Accuracy,
    F1,
    Precision,
    Recall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricFamily {
    Regression,
    Classification,
}

impl MetricName {
    pub const REGRESSION: [MetricName; 3] = [Self::R2, Self::Rmse, Self::Mae];
    pub const CLASSIFICATION: [MetricName; 4] =
        [Self::Accuracy, Self::F1, Self::Precision, Self::Recall];

    pub fn key(self) -> &'static str {
        match self {
            Self::R2 => "r2",
            Self::Rmse => "rmse",
            Self::Mae => "mae",
            Self::Accuracy => "accuracy",
            Self::F1 => "f1",
            Self::Precision => "precision",
            Self::Recall => "recall",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::R2 => "R² Score",
            Self::Rmse => "RMSE",
            Self::Mae => "MAE",
            Self::Accuracy => "Accuracy",
            Self::F1 => "F1 Score",
            Self::Precision => "Precision",
            Self::Recall => "Recall",
        }
    }

    pub fn family(self) -> MetricFamily {
        match self {
            Self::R2 | Self::Rmse | Self::Mae => MetricFamily::Regression,
            _ => MetricFamily::Classification,
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            Self::Rmse | Self::Mae => format!("{value:.2}"),
            Self::Accuracy => format!("{:.2}%", value * 100.0),
            Self::R2 | Self::F1 | Self::Precision | Self::Recall => format!("{value:.4}"),
        }
    }
}

/// Copy the metrics the dashboard shows, renaming backend keys.
pub fn map_backend_metrics(metrics: &BackendMetrics) -> BTreeMap<MetricName, f64> {
    [
        (MetricName::R2, metrics.r2_score),
        (MetricName::Rmse, metrics.rmse),
        (MetricName::Mae, metrics.mae),
        (MetricName::Accuracy, metrics.accuracy),
        (MetricName::F1, metrics.f1_score),
        (MetricName::Precision, metrics.precision),
        (MetricName::Recall, metrics.recall),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|value| (name, value)))
    .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainingProgress {
    pub is_training: bool,
    /// Percentage in `0..=100`.
    pub progress: u8,
    pub metrics: BTreeMap<MetricName, f64>,
    pub status: String,
}

impl Default for TrainingProgress {
    fn default() -> Self {
        Self {
            is_training: false,
            progress: 0,
            metrics: BTreeMap::new(),
            status: READY_STATUS.to_string(),
        }
    }
}

impl TrainingProgress {
    pub(crate) fn started() -> Self {
        Self {
            is_training: true,
            status: INITIAL_STATUS.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn failed() -> Self {
        Self {
            status: FAILED_STATUS.to_string(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.is_training && self.progress == 100
    }

    pub fn is_failed(&self) -> bool {
        !self.is_training && self.status == FAILED_STATUS
    }

    /// Which family the populated metrics belong to, judged by key presence.
    pub fn metric_family(&self) -> Option<MetricFamily> {
        if MetricName::REGRESSION.iter().any(|name| self.metrics.contains_key(name)) {
            Some(MetricFamily::Regression)
        } else if MetricName::CLASSIFICATION
            .iter()
            .any(|name| self.metrics.contains_key(name))
        {
            Some(MetricFamily::Classification)
        } else {
            None
        }
    }

    /// Populated metrics of the detected family, in display order.
    pub fn displayed_metrics(&self) -> Vec<(MetricName, f64)> {
        let Some(family) = self.metric_family() else {
            return Vec::new();
        };
        self.metrics
            .iter()
            .filter(|(name, _)| name.family() == family)
            .map(|(name, value)| (*name, *value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_follows_elapsed_time() {
        assert_eq!(stage_at(Duration::ZERO).status, INITIAL_STATUS);
        assert_eq!(stage_at(Duration::from_millis(499)).progress, 0);
        assert_eq!(stage_at(Duration::from_millis(500)), STAGES[0]);
        assert_eq!(stage_at(Duration::from_millis(1_250)).status, "Analyzing target column...");
        assert_eq!(stage_at(Duration::from_millis(4_000)).progress, 95);
        assert_eq!(stage_at(Duration::from_secs(600)), STAGES[7]);
    }

    #[test]
    fn stages_increase_and_stay_below_completion() {
        assert!(STAGES.windows(2).all(|pair| pair[0].progress < pair[1].progress));
        assert!(STAGES.iter().all(|stage| stage.progress < 100));
    }

    #[test]
    fn backend_names_are_mapped() {
        let metrics = BackendMetrics {
            r2_score: Some(0.87),
            rmse: Some(12.45),
            mse: Some(155.0),
            ..BackendMetrics::default()
        };
        let mapped = map_backend_metrics(&metrics);
        let expected: BTreeMap<_, _> = [(MetricName::R2, 0.87), (MetricName::Rmse, 12.45)].into();
        assert_eq!(mapped, expected);
        assert!(!mapped.contains_key(&MetricName::Accuracy));
        assert!(!mapped.contains_key(&MetricName::F1));
    }

    #[test]
    fn family_detection_by_key_presence() {
        let mut progress = TrainingProgress::default();
        assert_eq!(progress.metric_family(), None);
        progress.metrics.insert(MetricName::F1, 0.5);
        progress.metrics.insert(MetricName::Accuracy, 0.9);
        assert_eq!(progress.metric_family(), Some(MetricFamily::Classification));
        assert_eq!(
            progress.displayed_metrics(),
            [(MetricName::Accuracy, 0.9), (MetricName::F1, 0.5)]
        );
    }

    #[test]
    fn metric_formatting() {
        assert_eq!(MetricName::Accuracy.format(0.91234), "91.23%");
        assert_eq!(MetricName::R2.format(0.87), "0.8700");
        assert_eq!(MetricName::Rmse.format(12.456), "12.46");
    }
}
