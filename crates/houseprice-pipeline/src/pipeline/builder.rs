//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running the cleaning stages in order.

use crate::cleaner::{DataCleaner, DuplicateDetector};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::imputers::SentinelImputer;
use crate::pipeline::correlation::CorrelationAnalyzer;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::table::Table;
use crate::types::{CleaningSummary, PipelineResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use houseprice_pipeline::{Pipeline, PipelineConfig, Table};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().enable_outlier_capping(true).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(Table::new(dataframe))?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Pipeline can be moved to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every cleaning stage over a table.
    ///
    /// Returns the cleaned table and a summary of what each stage did. Any
    /// error aborts the run.
    pub fn process(&self, table: Table) -> Result<PipelineResult> {
        match self.process_internal(table) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, table: Table) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;

        info!("Starting cleaning pipeline...");
        let mut summary = CleaningSummary::new();
        summary.rows_before = table.height();
        summary.columns_before = table.width();

        // Step 1: Inconsistency scan
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Scanning,
            0.0,
            "Scanning for inconsistent values...",
        ));
        info!("Step 1: Scanning for inconsistent values...");
        summary.inconsistencies_before = DataProfiler::scan_inconsistencies(&table);

        // Step 2: Standardize categorical values
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Standardizing,
            0.0,
            "Standardizing categorical values...",
        ));
        info!("Step 2: Standardizing categorical values...");
        let table = DataCleaner::standardize_categories(table)?;
        summary.inconsistencies_after = DataProfiler::scan_inconsistencies(&table);
        summary.step(format!(
            "Standardized {} categorical columns",
            table.categorical_columns().len()
        ));

        // Step 3: Missing values
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputing,
            0.0,
            "Imputing missing values...",
        ));
        info!("Step 3: Imputing missing values...");
        summary.missing_values = DataProfiler::check_missing(&table);
        let (table, imputation) = SentinelImputer::impute_with(
            table,
            config.numeric_sentinel,
            &config.categorical_sentinel,
        )?;
        summary.step(format!(
            "Filled {} numeric cells with {} and {} categorical cells with '{}'",
            imputation.numeric_cells_filled,
            config.numeric_sentinel,
            imputation.categorical_cells_filled,
            config.categorical_sentinel
        ));
        summary.imputation = imputation;

        // Step 4: Duplicates
        self.report_progress(ProgressUpdate::with_sub_stage(
            PipelineStage::Deduplicating,
            "Columns",
            0.0,
            "Removing duplicate columns...",
        ));
        info!("Step 4: Removing duplicates...");
        let duplicate_columns = DuplicateDetector::find_duplicate_columns(&table);
        let table = DuplicateDetector::drop_columns(table, &duplicate_columns)?;
        summary.step(format!("Dropped {} duplicate columns", duplicate_columns.len()));
        summary.duplicate_columns = duplicate_columns;

        self.report_progress(ProgressUpdate::with_sub_stage(
            PipelineStage::Deduplicating,
            "Rows",
            0.4,
            "Removing duplicate rows...",
        ));
        summary.duplicate_rows = DuplicateDetector::count_duplicate_rows(&table);
        let table = DuplicateDetector::drop_duplicate_rows(table)?;
        summary.step(format!("Dropped {} duplicate rows", summary.duplicate_rows));

        self.report_progress(ProgressUpdate::with_sub_stage(
            PipelineStage::Deduplicating,
            "Partial duplicates",
            0.7,
            format!("Removing rows duplicated except for '{}'...", config.target_column),
        ));
        summary.partial_duplicate_rows =
            DuplicateDetector::count_partial_duplicates(&table, &config.target_column);
        let table = DuplicateDetector::drop_partial_duplicates(table, &config.target_column)?;
        summary.partial_duplicate_rows_after =
            DuplicateDetector::count_partial_duplicates(&table, &config.target_column);
        summary.step(format!(
            "Dropped {} rows duplicated on every column except '{}'",
            summary.partial_duplicate_rows, config.target_column
        ));

        // Step 5: Optional outlier capping
        let table = if config.enable_outlier_capping {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::OutlierCapping,
                0.0,
                "Capping outliers...",
            ));
            info!("Step 5: Capping outliers...");
            let columns: Vec<String> = OutlierHandler::detect_outliers(&table, config.iqr_multiplier)
                .into_iter()
                .map(|bounds| bounds.column)
                .collect();
            let (table, capped) = OutlierHandler::cap_outliers(
                table,
                &columns,
                config.iqr_multiplier,
                config.outlier_sentinel,
            )?;
            summary.step(format!(
                "Replaced {} outliers in {} columns with {}",
                capped,
                columns.len(),
                config.outlier_sentinel
            ));
            summary.outlier_columns = columns;
            summary.outlier_cells_capped = capped;
            table
        } else {
            info!("Step 5: Skipping outlier capping (disabled)");
            table
        };

        // Step 6: Optional correlation pruning
        let table = if config.enable_correlation_pruning {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::CorrelationPruning,
                0.0,
                "Pruning correlated features...",
            ));
            info!("Step 6: Pruning correlated features...");
            let correlated =
                CorrelationAnalyzer::find_highly_correlated(&table, config.correlation_threshold);
            let table = DuplicateDetector::drop_columns(table, &correlated)?;
            summary.step(format!(
                "Dropped {} columns correlated above {}",
                correlated.len(),
                config.correlation_threshold
            ));
            summary.correlated_columns = correlated;
            table
        } else {
            info!("Step 6: Skipping correlation pruning (disabled)");
            table
        };

        summary.rows_after = table.height();
        summary.columns_after = table.width();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete: {} -> {} rows, {} -> {} columns in {}ms",
            summary.rows_before,
            summary.rows_after,
            summary.columns_before,
            summary.columns_after,
            summary.duration_ms
        );

        Ok(PipelineResult { table, summary })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Table {
        Table::new(
            df![
                "Id" => [1i64, 1, 2, 3],
                "MSZoning" => [Some("rl"), Some("rl"), Some(" RM"), None],
                "LotArea" => [Some(8450i64), Some(8450), None, Some(9600)],
                "LotAreaCopy" => [Some(8450i64), Some(8450), None, Some(9600)],
                "SalePrice" => [208500i64, 208500, 181500, 223500],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.correlation_threshold = 2.0;
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_runs_every_stage() {
        let result = Pipeline::builder().build().unwrap().process(sample()).unwrap();
        let summary = &result.summary;

        assert_eq!(summary.rows_before, 4);
        assert_eq!(summary.rows_after, 3);
        assert_eq!(summary.columns_before, 5);
        assert_eq!(summary.columns_after, 4);
        assert_eq!(summary.duplicate_columns, vec!["LotAreaCopy"]);
        assert_eq!(summary.duplicate_rows, 1);
        assert_eq!(summary.partial_duplicate_rows, 0);
        assert_eq!(summary.partial_duplicate_rows_after, 0);
        assert_eq!(summary.missing_values.total(), 3);
        assert_eq!(result.table.null_count(), 0);
        assert!(summary.outlier_columns.is_empty());
        assert!(summary.correlated_columns.is_empty());
        assert!(!summary.processing_steps.is_empty());

        let zoning = summary.inconsistencies_after.column("MSZoning").unwrap();
        assert_eq!(zoning.distinct_values, vec!["RL", "RM"]);
    }

    #[test]
    fn test_partial_duplicates_use_target_column() {
        let table = Table::new(
            df![
                "GrLivArea" => [1710i64, 1710, 1262],
                "SalePrice" => [208500i64, 210000, 181500],
            ]
            .unwrap(),
        );
        let result = Pipeline::builder().build().unwrap().process(table).unwrap();
        assert_eq!(result.summary.partial_duplicate_rows, 1);
        assert_eq!(result.table.height(), 2);
    }

    #[test]
    fn test_optional_stages_when_enabled() {
        let table = Table::new(
            df![
                "LotArea" => [1.0, 2.0, 2.0, 3.0, 100.0],
                "LotAreaDoubled" => [2.0, 4.0, 4.0, 6.5, 200.0],
                "SalePrice" => [1.0, 2.0, 3.0, 4.0, 5.0],
            ]
            .unwrap(),
        );
        let config = PipelineConfig::builder()
            .enable_outlier_capping(true)
            .outlier_sentinel(-999.0)
            .enable_correlation_pruning(true)
            .build()
            .unwrap();

        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(table)
            .unwrap();

        assert_eq!(result.summary.outlier_columns, vec!["LotArea", "LotAreaDoubled"]);
        assert_eq!(result.summary.outlier_cells_capped, 2);
        assert_eq!(result.summary.correlated_columns, vec!["LotAreaDoubled"]);
        assert_eq!(result.table.column_names(), vec!["LotArea", "SalePrice"]);
    }

    #[test]
    fn test_progress_reported_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut stages = sink.lock().unwrap();
                if stages.last() != Some(&update.stage) {
                    stages.push(update.stage);
                }
            })
            .build()
            .unwrap();
        pipeline.process(sample()).unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                PipelineStage::Scanning,
                PipelineStage::Standardizing,
                PipelineStage::Imputing,
                PipelineStage::Deduplicating,
                PipelineStage::Complete,
            ]
        );
        assert!(count.load(Ordering::SeqCst) >= 5);
    }

    #[test]
    fn test_failure_reported() {
        let failed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failed);

        // Text tagged numeric cannot be imputed with a number
        let table = Table::new(df!["Street" => [Some("PAVE"), None]].unwrap())
            .with_column_kind("Street", crate::table::ColumnKind::Numeric)
            .unwrap();

        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                if update.stage == PipelineStage::Failed {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        assert!(pipeline.process(table).is_err());
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }
}
