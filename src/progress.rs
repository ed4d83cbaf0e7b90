//! Analysis progress steps shown while a prediction runs.

use serde::{Deserialize, Serialize};

/// Stage of a running prediction, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnalysisStep {
    /// Downloading the country's case history
    FetchingData,
    /// Building lag and seasonality features
    ProcessingFeatures,
    /// Fitting the selected model
    TrainingModel,
    /// Producing the forecast
    GeneratingPredictions,
}

impl AnalysisStep {
    /// All steps in execution order.
    pub fn all() -> [AnalysisStep; 4] {
        [
            AnalysisStep::FetchingData,
            AnalysisStep::ProcessingFeatures,
            AnalysisStep::TrainingModel,
            AnalysisStep::GeneratingPredictions,
        ]
    }

    /// Get display label for this step.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStep::FetchingData => "Fetching data",
            AnalysisStep::ProcessingFeatures => "Processing features",
            AnalysisStep::TrainingModel => "Training model",
            AnalysisStep::GeneratingPredictions => "Generating predictions",
        }
    }

    /// The step after this one, if any.
    pub fn next(&self) -> Option<AnalysisStep> {
        match self {
            AnalysisStep::FetchingData => Some(AnalysisStep::ProcessingFeatures),
            AnalysisStep::ProcessingFeatures => Some(AnalysisStep::TrainingModel),
            AnalysisStep::TrainingModel => Some(AnalysisStep::GeneratingPredictions),
            AnalysisStep::GeneratingPredictions => None,
        }
    }
}

impl std::fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
