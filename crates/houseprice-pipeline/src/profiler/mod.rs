//! Read-only reporting over a table.
//!
//! This module provides:
//! - Distinct value scans used to spot inconsistent categories
//! - Missing value counts per column
//!
//! Nothing here mutates the table or returns an error; the functions are
//! safe to call any number of times between stages.

use crate::table::Table;
use crate::types::{ColumnInconsistency, ColumnMissing, InconsistencyReport, MissingValueReport};
use crate::utils::string_values;
use tracing::{debug, info, warn};

/// Reporting helpers for tables.
pub struct DataProfiler;

impl DataProfiler {
    /// Count and list the distinct values of every column.
    ///
    /// Values are listed in order of first appearance; missing cells are
    /// not counted as a value but flagged through `has_missing`.
    pub fn scan_inconsistencies(table: &Table) -> InconsistencyReport {
        let df = table.data();
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let distinct_values = series
                .drop_nulls()
                .unique_stable()
                .and_then(|unique| string_values(&unique))
                .map(|values| values.into_iter().flatten().collect::<Vec<String>>())
                .unwrap_or_else(|e| {
                    warn!("Could not list distinct values of '{}': {}", col.name(), e);
                    Vec::new()
                });

            debug!(
                "{}: {} unique values {:?}",
                col.name(),
                distinct_values.len(),
                distinct_values
            );

            columns.push(ColumnInconsistency {
                column: col.name().to_string(),
                distinct_count: distinct_values.len(),
                distinct_values,
                has_missing: series.null_count() > 0,
            });
        }

        info!("Scanned {} columns for distinct values", columns.len());
        InconsistencyReport { columns }
    }

    /// Count missing cells per column.
    pub fn check_missing(table: &Table) -> MissingValueReport {
        let columns: Vec<ColumnMissing> = table
            .data()
            .get_columns()
            .iter()
            .map(|col| ColumnMissing {
                column: col.name().to_string(),
                missing: col.null_count(),
            })
            .collect();

        let report = MissingValueReport { columns };
        for column in report.columns.iter().filter(|c| c.missing > 0) {
            debug!("{}: {} missing values", column.column, column.missing);
        }
        info!(
            "Found {} missing values across {} columns",
            report.total(),
            report.columns_with_missing().len()
        );
        report
    }
}
