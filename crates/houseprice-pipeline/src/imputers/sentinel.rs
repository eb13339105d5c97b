//! Sentinel imputation.
//!
//! Missing numeric cells become the numeric sentinel and missing categorical
//! cells become the categorical sentinel. The sentinels are not
//! distinguishable from natural values afterwards, so collisions are
//! counted and logged.

use crate::config::{DEFAULT_CATEGORICAL_SENTINEL, DEFAULT_NUMERIC_SENTINEL};
use crate::error::{Result, ResultExt};
use crate::table::{ColumnKind, Table};
use crate::types::ImputationSummary;
use crate::utils::{contains_sentinel, replace_with_sentinel, string_values};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Fills missing cells with fixed sentinel values.
pub struct SentinelImputer;

impl SentinelImputer {
    /// Fill missing cells with `-1` (numeric) and `"UNKNOWN"` (categorical).
    pub fn impute_missing(table: Table) -> Result<Table> {
        let (table, _) = Self::impute_with(
            table,
            DEFAULT_NUMERIC_SENTINEL,
            DEFAULT_CATEGORICAL_SENTINEL,
        )?;
        Ok(table)
    }

    /// Fill missing cells with the given sentinels.
    ///
    /// Column kinds decide which sentinel a column receives. Columns without
    /// missing cells are left untouched. Numeric columns are filled on their
    /// own dtype: integers stay integer when the sentinel is integral and
    /// unsigned columns widen to `Int64`. Returns the table and what was
    /// filled.
    pub fn impute_with(
        table: Table,
        numeric_sentinel: f64,
        categorical_sentinel: &str,
    ) -> Result<(Table, ImputationSummary)> {
        let mut table = table;
        let mut summary = ImputationSummary::default();

        for col_name in table.column_names() {
            let series = table.series(&col_name)?;
            let missing = series.null_count();
            if missing == 0 {
                continue;
            }

            let filled = match table.kind(&col_name) {
                Some(ColumnKind::Numeric) => {
                    let (filled, collided) = fill_numeric(series, numeric_sentinel)
                        .context(format!("Imputing numeric column '{}'", col_name))?;
                    if collided {
                        summary.sentinel_collisions.push(col_name.clone());
                    }
                    summary.numeric_cells_filled += missing;
                    filled
                }
                _ => {
                    let (filled, collided) = fill_categorical(series, categorical_sentinel)
                        .context(format!("Imputing categorical column '{}'", col_name))?;
                    if collided {
                        summary.sentinel_collisions.push(col_name.clone());
                    }
                    summary.categorical_cells_filled += missing;
                    filled
                }
            };

            debug!("Filled {} missing values in '{}'", missing, col_name);
            table.data_mut().replace(&col_name, filled)?;
        }

        for col_name in &summary.sentinel_collisions {
            warn!(
                "Column '{}' already contained the sentinel value before imputation",
                col_name
            );
        }
        info!(
            "Imputed {} numeric and {} categorical cells",
            summary.numeric_cells_filled, summary.categorical_cells_filled
        );

        Ok((table, summary))
    }
}

/// Fill nulls with `sentinel`, reporting whether a natural value equals it.
fn fill_numeric(series: &Series, sentinel: f64) -> PolarsResult<(Series, bool)> {
    let filled = replace_with_sentinel(series, &series.is_null(), sentinel)?;
    let collided = contains_sentinel(series, sentinel)?;
    Ok((filled, collided))
}

fn fill_categorical(series: &Series, sentinel: &str) -> PolarsResult<(Series, bool)> {
    let values = string_values(series)?;
    let collided = values.iter().any(|v| v.as_deref() == Some(sentinel));
    let filled: Vec<String> = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| sentinel.to_string()))
        .collect();
    Ok((Series::new(series.name().clone(), filled), collided))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::new(
            df![
                "LotFrontage" => [Some(65i64), None, Some(80)],
                "MasVnrArea" => [Some(196.0f64), None, None],
                "Alley" => [None, Some("GRVL"), None],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_impute_missing_leaves_no_nulls() {
        let table = SentinelImputer::impute_missing(sample()).unwrap();
        assert_eq!(table.null_count(), 0);
    }

    #[test]
    fn test_sentinel_values() {
        let table = SentinelImputer::impute_missing(sample()).unwrap();

        let frontage: Vec<Option<i64>> = table
            .series("LotFrontage")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(frontage, vec![Some(65), Some(-1), Some(80)]);

        let area: Vec<Option<f64>> = table
            .series("MasVnrArea")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(area, vec![Some(196.0), Some(-1.0), Some(-1.0)]);

        let alley: Vec<Option<&str>> = table
            .series("Alley")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(alley, vec![Some("UNKNOWN"), Some("GRVL"), Some("UNKNOWN")]);
    }

    #[test]
    fn test_summary_counts() {
        let (_, summary) = SentinelImputer::impute_with(sample(), -1.0, "UNKNOWN").unwrap();
        assert_eq!(summary.numeric_cells_filled, 3);
        assert_eq!(summary.categorical_cells_filled, 2);
        assert!(summary.sentinel_collisions.is_empty());
    }

    #[test]
    fn test_sentinel_collision_reported() {
        let table = Table::new(
            df![
                "Fireplaces" => [Some(-1i64), None],
                "PoolQC" => [Some("UNKNOWN"), None],
                "Clean" => [Some(-1i64), Some(2)],
            ]
            .unwrap(),
        );
        let (table, summary) = SentinelImputer::impute_with(table, -1.0, "UNKNOWN").unwrap();
        assert_eq!(summary.sentinel_collisions, vec!["Fireplaces", "PoolQC"]);
        assert_eq!(table.null_count(), 0);
    }

    #[test]
    fn test_unsigned_column_widens() {
        let table = Table::new(df!["Rooms" => [Some(3u32), None]].unwrap());
        let table = SentinelImputer::impute_missing(table).unwrap();
        assert_eq!(table.series("Rooms").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_fractional_sentinel_turns_integers_to_float() {
        let table = Table::new(df!["Rooms" => [Some(3i64), None]].unwrap());
        let (table, _) = SentinelImputer::impute_with(table, -0.5, "UNKNOWN").unwrap();
        assert_eq!(table.series("Rooms").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_complete_columns_untouched() {
        let table = Table::new(
            df![
                "Id" => [9_007_199_254_740_993i64, 9_007_199_254_740_995],
                "Rooms" => [Some(3u32), Some(4)],
                "Street" => ["PAVE", "GRVL"],
            ]
            .unwrap(),
        );
        let before = table.data().clone();
        let (table, summary) = SentinelImputer::impute_with(table, -1.0, "UNKNOWN").unwrap();

        assert!(table.data().equals_missing(&before));
        assert_eq!(table.series("Rooms").unwrap().dtype(), &DataType::UInt32);
        assert_eq!(summary.numeric_cells_filled, 0);
    }

    #[test]
    fn test_large_integers_kept_when_filling() {
        let table = Table::new(
            df!["Id" => [Some(9_007_199_254_740_993i64), None, Some(9_007_199_254_740_995)]]
                .unwrap(),
        );
        let table = SentinelImputer::impute_missing(table).unwrap();
        let ids: Vec<Option<i64>> = table.series("Id").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(
            ids,
            vec![Some(9_007_199_254_740_993), Some(-1), Some(9_007_199_254_740_995)]
        );
    }

    #[test]
    fn test_kind_kept_after_imputation() {
        let table = Table::new(df!["Alley" => [None::<&str>, None]].unwrap());
        let table = SentinelImputer::impute_missing(table).unwrap();
        assert_eq!(table.kind("Alley"), Some(ColumnKind::Categorical));
    }
}
