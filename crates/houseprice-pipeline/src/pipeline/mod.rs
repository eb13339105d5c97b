//! Pipeline module.
//!
//! This module provides the cleaning pipeline and its optional stages.

mod builder;
pub mod correlation;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use correlation::CorrelationAnalyzer;
pub use outliers::{OutlierBounds, OutlierHandler};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
