use serde::Deserialize;
use serde_json::Value;

use super::{ApiClient, ApiError, Endpoint, RequestOptions};
use crate::train::ProblemType;

/// Severity of a target-column warning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AnalysisWarning {
    #[serde(rename = "type", default)]
    pub severity: WarningSeverity,
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TargetStatistics {
    #[serde(default)]
    pub n_samples: u64,
    #[serde(default)]
    pub n_unique: u64,
    #[serde(default)]
    pub unique_ratio: f64,
    #[serde(default)]
    pub is_numeric: bool,
    #[serde(default)]
    pub has_floats: bool,
    #[serde(default)]
    pub dtype: String,
    #[serde(default)]
    pub sample_values: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProblemRecommendations {
    #[serde(default)]
    pub regression: bool,
    #[serde(default)]
    pub classification: bool,
    #[serde(default)]
    pub message: String,
}

/// Server-side classification of a candidate target column.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TargetAnalysis {
    pub target_column: String,
    pub recommended_problem_type: ProblemType,
    #[serde(default)]
    pub statistics: TargetStatistics,
    #[serde(default)]
    pub warnings: Vec<AnalysisWarning>,
    #[serde(default)]
    pub recommendations: ProblemRecommendations,
}

#[derive(Deserialize)]
struct AnalysisEnvelope {
    data: TargetAnalysis,
}

/// Parameters of one training submission.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingRequest {
    pub dataset_id: String,
    pub target_col: String,
    /// Registry key, or `auto` to let the server choose.
    pub model_type: String,
    pub problem_type: ProblemType,
    pub test_size: f64,
    pub use_polynomial: bool,
    pub polynomial_degree: u32,
    pub use_target_encoder: bool,
}

impl TrainingRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("target_col", self.target_col.clone()),
            ("model_type", self.model_type.clone()),
            ("problem_type", self.problem_type.as_str().to_string()),
            ("test_size", self.test_size.to_string()),
            ("use_polynomial", self.use_polynomial.to_string()),
            ("polynomial_degree", self.polynomial_degree.to_string()),
            ("use_target_encoder", self.use_target_encoder.to_string()),
        ]
    }

    fn endpoint(&self) -> Endpoint {
        self.query_pairs()
            .into_iter()
            .fold(Endpoint::new(["train", self.dataset_id.as_str()]), |endpoint, (key, value)| {
                endpoint.query(key, value)
            })
    }
}

/// Metric names as reported by the training service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BackendMetrics {
    pub r2_score: Option<f64>,
    pub mse: Option<f64>,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PreprocessingMetadata {
    #[serde(default)]
    pub problem_type: String,
    #[serde(default)]
    pub train_samples: u64,
    #[serde(default)]
    pub test_samples: u64,
    #[serde(default)]
    pub n_processed_features: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrainingOutcome {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub training_time: f64,
    #[serde(default)]
    pub metrics: BackendMetrics,
    #[serde(default)]
    pub preprocessing_metadata: PreprocessingMetadata,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrainingResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: TrainingOutcome,
}

impl ApiClient {
    /// `GET /train/{dataset_id}/analyze-target?target_col=...`
    pub fn analyze_target(
        &self,
        dataset_id: &str,
        target_column: &str,
    ) -> Result<TargetAnalysis, ApiError> {
        let endpoint = Endpoint::new(["train", dataset_id, "analyze-target"])
            .query("target_col", target_column);
        let envelope: AnalysisEnvelope = self.call(&endpoint, RequestOptions::get())?;
        Ok(envelope.data)
    }

    /// `POST /train/{dataset_id}?...`; never retried.
    pub fn train_model(&self, request: &TrainingRequest) -> Result<TrainingResponse, ApiError> {
        tracing::info!(
            dataset = %request.dataset_id,
            target = %request.target_col,
            model = %request.model_type,
            "Submitting training request"
        );
        self.call(&request.endpoint(), RequestOptions::post())
    }
}
