//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Standardizing categorical values (uppercase + trim)
//! - Finding and dropping duplicate columns
//! - Finding and dropping duplicate and partial duplicate rows

mod duplicates;
mod sanitizers;

pub use duplicates::DuplicateDetector;

use crate::error::{Result, ResultExt};
use crate::table::Table;
use polars::prelude::*;
use tracing::{debug, info};

/// Cleaner for categorical value normalization.
pub struct DataCleaner;

impl DataCleaner {
    /// Replace every non-missing value of every categorical column with its
    /// uppercased, whitespace-trimmed form.
    ///
    /// Missing cells are left alone. Applying this twice gives the same table
    /// as applying it once.
    pub fn standardize_categories(table: Table) -> Result<Table> {
        let mut table = table;
        let columns = table.categorical_columns();
        let mut total_changed = 0;

        info!("Standardizing {} categorical columns...", columns.len());

        for col_name in &columns {
            let (cleaned, changed) = {
                let series = table.series(col_name)?;
                sanitizers::standardize_series(series)
                    .context(format!("Standardizing column '{}'", col_name))?
            };
            if changed > 0 {
                debug!("Standardized {} values in '{}'", changed, col_name);
            }
            total_changed += changed;
            table.data_mut().replace(col_name, cleaned)?;
        }

        debug!("Standardization changed {} values", total_changed);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            df![
                "Street" => [Some(" Pave"), Some("grvl "), None, Some("PAVE")],
                "CentralAir" => [Some("y"), Some("N"), Some(" n "), Some("Y")],
                "LotArea" => [8450i64, 9600, 11250, 9550],
            ]
            .unwrap(),
        )
    }

    fn street(table: &Table) -> Vec<Option<String>> {
        table
            .series("Street")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(String::from))
            .collect()
    }

    #[test]
    fn test_standardize_categories() {
        let table = DataCleaner::standardize_categories(sample()).unwrap();
        assert_eq!(
            street(&table),
            vec![
                Some("PAVE".to_string()),
                Some("GRVL".to_string()),
                None,
                Some("PAVE".to_string())
            ]
        );
    }

    #[test]
    fn test_standardize_is_idempotent() {
        let once = DataCleaner::standardize_categories(sample()).unwrap();
        let twice = DataCleaner::standardize_categories(once.clone()).unwrap();

        for name in once.column_names() {
            assert!(
                once.series(&name)
                    .unwrap()
                    .equals_missing(twice.series(&name).unwrap()),
                "column {} changed on second pass",
                name
            );
        }
    }

    #[test]
    fn test_numeric_columns_untouched() {
        let table = DataCleaner::standardize_categories(sample()).unwrap();
        let area = table.series("LotArea").unwrap();
        assert_eq!(area.dtype(), &DataType::Int64);
        assert!(area.equals_missing(sample().series("LotArea").unwrap()));
    }

    #[test]
    fn test_numeric_column_tagged_categorical_is_standardized_as_text() {
        let table = Table::new(df!["MSSubClass" => [60i64, 20]].unwrap())
            .with_column_kind("MSSubClass", crate::table::ColumnKind::Categorical)
            .unwrap();
        let table = DataCleaner::standardize_categories(table).unwrap();
        assert_eq!(table.series("MSSubClass").unwrap().dtype(), &DataType::String);
    }
}
