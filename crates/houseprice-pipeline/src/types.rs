use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Distinct values found in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInconsistency {
    pub column: String,
    /// Number of distinct non-missing values.
    pub distinct_count: usize,
    /// Distinct non-missing values, in order of first appearance.
    pub distinct_values: Vec<String>,
    /// Whether the column contains missing cells.
    pub has_missing: bool,
}

/// Per-column distinct value report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InconsistencyReport {
    pub columns: Vec<ColumnInconsistency>,
}

impl InconsistencyReport {
    /// Entry for one column.
    pub fn column(&self, name: &str) -> Option<&ColumnInconsistency> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Missing cell count for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Missing cell counts per column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub columns: Vec<ColumnMissing>,
}

impl MissingValueReport {
    /// Missing count for one column.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.column == name)
            .map(|c| c.missing)
    }

    /// Missing cells across all columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    /// Columns with at least one missing cell.
    pub fn columns_with_missing(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.missing > 0)
            .map(|c| c.column.as_str())
            .collect()
    }
}

/// Outcome of the imputation stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationSummary {
    /// Numeric cells filled with the numeric sentinel.
    pub numeric_cells_filled: usize,
    /// Categorical cells filled with the categorical sentinel.
    pub categorical_cells_filled: usize,
    /// Columns where the sentinel already occurred before imputation.
    pub sentinel_collisions: Vec<String>,
}

/// Human-readable summary of what a cleaning run did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Distinct values per column before standardization.
    pub inconsistencies_before: InconsistencyReport,
    /// Distinct values per column after standardization.
    pub inconsistencies_after: InconsistencyReport,

    /// Missing cells per column before imputation.
    pub missing_values: MissingValueReport,
    pub imputation: ImputationSummary,

    /// Columns dropped because an earlier column had the same values.
    pub duplicate_columns: Vec<String>,
    /// Fully duplicated rows removed.
    pub duplicate_rows: usize,
    /// Rows duplicated on every column except the target, removed after
    /// full deduplication.
    pub partial_duplicate_rows: usize,
    /// Partial duplicates remaining after removal (expected 0).
    pub partial_duplicate_rows_after: usize,

    /// Columns where outliers were capped, empty when capping is disabled.
    pub outlier_columns: Vec<String>,
    /// Cells replaced by the outlier sentinel.
    pub outlier_cells_capped: usize,
    /// Columns dropped for high correlation, empty when pruning is disabled.
    pub correlated_columns: Vec<String>,

    /// Ordered log of processing steps.
    pub processing_steps: Vec<String>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn columns_removed(&self) -> usize {
        self.columns_before.saturating_sub(self.columns_after)
    }

    pub(crate) fn step(&mut self, message: impl Into<String>) {
        self.processing_steps.push(message.into());
    }
}

/// Result of a cleaning run: the cleaned table and what happened to it.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub table: Table,
    pub summary: CleaningSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_report_helpers() {
        let report = MissingValueReport {
            columns: vec![
                ColumnMissing {
                    column: "LotFrontage".to_string(),
                    missing: 3,
                },
                ColumnMissing {
                    column: "Street".to_string(),
                    missing: 0,
                },
                ColumnMissing {
                    column: "Alley".to_string(),
                    missing: 5,
                },
            ],
        };

        assert_eq!(report.total(), 8);
        assert_eq!(report.get("Street"), Some(0));
        assert_eq!(report.get("Nope"), None);
        assert_eq!(report.columns_with_missing(), vec!["LotFrontage", "Alley"]);
    }

    #[test]
    fn test_summary_removed_counts() {
        let summary = CleaningSummary {
            rows_before: 10,
            rows_after: 7,
            columns_before: 5,
            columns_after: 5,
            ..CleaningSummary::new()
        };
        assert_eq!(summary.rows_removed(), 3);
        assert_eq!(summary.columns_removed(), 0);
    }

    #[test]
    fn test_summary_serializes() {
        let mut summary = CleaningSummary::new();
        summary.duplicate_columns.push("LotArea2".to_string());
        summary.step("Dropped 1 duplicate column");

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"duplicate_columns\":[\"LotArea2\"]"));
        assert!(json.contains("Dropped 1 duplicate column"));
    }
}
