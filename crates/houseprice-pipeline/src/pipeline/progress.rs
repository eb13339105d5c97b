//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use houseprice_pipeline::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(table)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Scanning columns for inconsistent values
    Scanning,
    /// Uppercasing and trimming categorical values
    Standardizing,
    /// Counting and filling missing values
    Imputing,
    /// Dropping duplicate columns and rows
    Deduplicating,
    /// Replacing IQR outliers (optional)
    OutlierCapping,
    /// Dropping highly correlated columns (optional)
    CorrelationPruning,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Scanning => "Scanning Values",
            Self::Standardizing => "Standardizing Categories",
            Self::Imputing => "Imputing Values",
            Self::Deduplicating => "Removing Duplicates",
            Self::OutlierCapping => "Capping Outliers",
            Self::CorrelationPruning => "Pruning Correlated Features",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage (0.0 - 1.0).
    ///
    /// Weights of the processing stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Scanning => 0.10,
            Self::Standardizing => 0.15,
            Self::Imputing => 0.20,
            Self::Deduplicating => 0.30,
            Self::OutlierCapping => 0.15,
            Self::CorrelationPruning => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Scanning => 0.0,
            Self::Standardizing => 0.10,
            Self::Imputing => 0.25,
            Self::Deduplicating => 0.45,
            Self::OutlierCapping => 0.75,
            Self::CorrelationPruning => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update sent to a [`ProgressReporter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Optional sub-stage description (e.g., "Partial duplicates")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage without sub-stage info.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a new progress update with sub-stage information.
    pub fn with_sub_stage(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            sub_stage: None,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            sub_stage: None,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates during a cleaning run.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const PROCESSING_STAGES: [PipelineStage; 6] = [
        PipelineStage::Scanning,
        PipelineStage::Standardizing,
        PipelineStage::Imputing,
        PipelineStage::Deduplicating,
        PipelineStage::OutlierCapping,
        PipelineStage::CorrelationPruning,
    ];

    #[test]
    fn test_weights_sum_to_one() {
        let total: f32 = PROCESSING_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0;
        for stage in PROCESSING_STAGES {
            assert!((stage.base_progress() - expected).abs() < 0.001, "{:?}", stage);
            expected += stage.weight();
        }
    }

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(PipelineStage::Imputing, 0.5, "Filling");
        assert_eq!(update.stage, PipelineStage::Imputing);
        assert!((update.progress - 0.35).abs() < 0.001);
        assert!(update.sub_stage.is_none());
    }

    #[test]
    fn test_progress_clamped() {
        let update = ProgressUpdate::new(PipelineStage::CorrelationPruning, 5.0, "Too far");
        assert_eq!(update.progress, 1.0);
        assert_eq!(update.stage_progress, 1.0);
    }

    #[test]
    fn test_with_sub_stage() {
        let update = ProgressUpdate::with_sub_stage(
            PipelineStage::Deduplicating,
            "Partial duplicates",
            0.5,
            "Dropping rows",
        );
        assert_eq!(update.sub_stage.as_deref(), Some("Partial duplicates"));
    }

    #[test]
    fn test_terminal_updates() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.stage, PipelineStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("Boom");
        assert_eq!(failed.stage, PipelineStage::Failed);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::OutlierCapping).unwrap();
        assert_eq!(json, "\"outlier_capping\"");
    }

    #[test]
    fn test_closure_reporter() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Scanning, 0.0, "start"));
        reporter.report(ProgressUpdate::complete("end"));

        assert_eq!(
            *received.lock().unwrap(),
            vec![PipelineStage::Scanning, PipelineStage::Complete]
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PipelineStage::Deduplicating.display_name(), "Removing Duplicates");
    }
}
