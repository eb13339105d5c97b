//! House-price Cleaning Pipeline Library
//!
//! A tabular cleaning and feature-preparation library built with Rust and Polars.
//!
//! # Overview
//!
//! The library runs a linear pipe of stages over one [`Table`]:
//!
//! - **Inconsistency scan**: distinct values per column, before and after cleaning
//! - **Category standardization**: uppercase and trim every categorical value
//! - **Imputation**: missing cells become `-1` (numeric) or `"UNKNOWN"` (categorical)
//! - **Deduplication**: duplicate columns, duplicate rows, then rows duplicated on
//!   every column except the target
//! - **Optional stages**: IQR outlier capping and correlated-feature pruning
//! - **Feature encoding**: binary maps, one-hot encoding and min-max scaling with
//!   pre-fitted transformers
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use houseprice_pipeline::{io, EncodingConfig, FeatureEncoder, Pipeline, PipelineConfig, Table};
//! use houseprice_pipeline::{MinMaxScaler, OneHotEncoder};
//!
//! let config = PipelineConfig::default();
//! let df = io::load_csv("data/train.csv", &config)?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(Table::new(df))?;
//!
//! println!("Removed {} rows", result.summary.rows_removed());
//!
//! // Encoding uses transformers fitted beforehand
//! let encoder: OneHotEncoder = io::load_json("artifacts/encoder.json")?;
//! let scaler: MinMaxScaler = io::load_json("artifacts/scaler.json")?;
//! let features = FeatureEncoder::encode_features(
//!     result.table.data(),
//!     &EncodingConfig::default(),
//!     &encoder,
//!     &scaler,
//! )?;
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to enable the optional stages or change sentinels:
//!
//! ```rust,ignore
//! use houseprice_pipeline::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .target_column("SalePrice")
//!     .enable_outlier_capping(true)       // Replace IQR outliers with -1
//!     .enable_correlation_pruning(true)   // Drop columns with |r| > 0.9
//!     .correlation_threshold(0.9)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod encoding;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, DuplicateDetector};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use encoding::{
    BinaryMapping, EncodingConfig, FeatureEncoder, FittedTransformer, HandleUnknown,
    MinMaxScaler, OneHotEncoder,
};
pub use error::{PipelineError, ResultExt};
pub use imputers::SentinelImputer;
pub use pipeline::{
    ClosureProgressReporter, CorrelationAnalyzer, OutlierBounds, OutlierHandler, Pipeline,
    PipelineBuilder, PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reporting::{CleaningReport, ReportGenerator};
pub use table::{ColumnKind, Table};
pub use types::{
    CleaningSummary, ColumnInconsistency, ColumnMissing, ImputationSummary, InconsistencyReport,
    MissingValueReport, PipelineResult,
};
