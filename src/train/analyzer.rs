//! Target-column analysis with last-selection-wins ordering.
//!
//! Each (dataset, column) selection bumps a generation counter and hands out
//! an [`AnalysisTicket`]. Only a result carrying the current generation is
//! stored, so a slow response for an older column can never overwrite the
//! analysis of the newer one.

use crate::api::{ApiError, TargetAnalysis};

use super::ProblemType;

/// Identifies one analysis request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub dataset_id: String,
    pub column: String,
}

/// What happened to a resolved analysis.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisUpdate {
    /// Superseded by a newer selection and discarded.
    Stale,
    Applied { recommended: ProblemType },
    Failed { message: String },
}

/// Advisory shown when the chosen problem type disagrees with the analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemMismatch {
    pub selected: ProblemType,
    pub recommended: ProblemType,
}

impl ProblemMismatch {
    pub fn message(&self) -> String {
        format!(
            "You selected {} but the data suggests {}. Training may fail or produce poor results. \
             Consider switching to {} or using Auto mode.",
            self.selected, self.recommended, self.recommended
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct TargetAnalyzer {
    generation: u64,
    analyzing: bool,
    analysis: Option<TargetAnalysis>,
}

impl TargetAnalyzer {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn analysis(&self) -> Option<&TargetAnalysis> {
        self.analysis.as_ref()
    }

    /// Record a new selection. Any earlier request becomes stale; a ticket is
    /// issued only when both parts are present.
    pub fn select(&mut self, dataset_id: Option<&str>, column: Option<&str>) -> Option<AnalysisTicket> {
        self.generation += 1;
        self.analysis = None;
        match (dataset_id, column) {
            (Some(dataset_id), Some(column)) => {
                self.analyzing = true;
                Some(AnalysisTicket {
                    generation: self.generation,
                    dataset_id: dataset_id.to_string(),
                    column: column.to_string(),
                })
            }
            _ => {
                self.analyzing = false;
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.select(None, None);
    }

    pub fn resolve(
        &mut self,
        ticket: &AnalysisTicket,
        result: Result<TargetAnalysis, ApiError>,
    ) -> AnalysisUpdate {
        if ticket.generation != self.generation {
            tracing::debug!(
                column = %ticket.column,
                generation = ticket.generation,
                current = self.generation,
                "Dropping stale target analysis"
            );
            return AnalysisUpdate::Stale;
        }
        self.analyzing = false;
        match result {
            Ok(analysis) => {
                let recommended = analysis.recommended_problem_type;
                self.analysis = Some(analysis);
                AnalysisUpdate::Applied { recommended }
            }
            Err(err) => {
                tracing::warn!(column = %ticket.column, "Target analysis failed: {err}");
                self.analysis = None;
                AnalysisUpdate::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Non-blocking advisory: an explicit choice that differs from the
    /// recommendation.
    pub fn mismatch(&self, selected: ProblemType) -> Option<ProblemMismatch> {
        let recommended = self.analysis.as_ref()?.recommended_problem_type;
        (selected != ProblemType::Auto && selected != recommended).then_some(ProblemMismatch {
            selected,
            recommended,
        })
    }
}

#[cfg(test)]
pub(crate) fn analysis_for(column: &str, recommended: ProblemType) -> TargetAnalysis {
    TargetAnalysis {
        target_column: column.to_string(),
        recommended_problem_type: recommended,
        statistics: Default::default(),
        warnings: Vec::new(),
        recommendations: Default::default(),
    }
}
