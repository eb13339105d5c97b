//! Outlier handling module.
//!
//! Contains functions for detecting and capping IQR outliers in numeric
//! columns.

use crate::error::{PipelineError, Result, ResultExt};
use crate::table::{ColumnKind, Table};
use crate::utils::{numeric_values, replace_with_sentinel};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// IQR bounds of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl OutlierBounds {
    /// Compute bounds from the non-missing values of a column.
    ///
    /// Returns `None` when there are no finite values.
    pub fn compute(column: &str, values: &[f64], iqr_multiplier: f64) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;

        Some(Self {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower: q1 - iqr_multiplier * iqr,
            upper: q3 + iqr_multiplier * iqr,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }

    /// Whether `value` lies outside the bounds.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    /// Whether any observed value lies outside the bounds.
    pub fn has_outliers(&self) -> bool {
        self.min < self.lower || self.max > self.upper
    }
}

/// Linear-interpolated quantile of sorted values (position `(n - 1) * q`).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Handles outlier detection and treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Numeric columns with at least one value outside their IQR bounds.
    ///
    /// Columns with an IQR of zero are skipped.
    pub fn detect_outliers(table: &Table, iqr_multiplier: f64) -> Vec<OutlierBounds> {
        let mut flagged = Vec::new();

        for col_name in table.numeric_columns() {
            let Some(bounds) = Self::column_bounds(table, &col_name, iqr_multiplier) else {
                continue;
            };
            if bounds.iqr == 0.0 {
                debug!("Skipping '{}': IQR is zero", col_name);
                continue;
            }
            if bounds.has_outliers() {
                info!(
                    "Outliers in '{}': bounds [{}, {}], observed [{}, {}]",
                    col_name, bounds.lower, bounds.upper, bounds.min, bounds.max
                );
                flagged.push(bounds);
            }
        }

        info!("Found outliers in {} columns", flagged.len());
        flagged
    }

    /// Replace values outside each listed column's IQR bounds with
    /// `sentinel`.
    ///
    /// Bounds are recomputed from the current values. Returns the table and
    /// the number of cells replaced.
    pub fn cap_outliers(
        table: Table,
        columns: &[String],
        iqr_multiplier: f64,
        sentinel: f64,
    ) -> Result<(Table, usize)> {
        let mut table = table;
        let mut total_capped = 0;

        for col_name in columns {
            match table.kind(col_name) {
                None => return Err(PipelineError::ColumnNotFound(col_name.clone())),
                Some(ColumnKind::Categorical) => {
                    return Err(PipelineError::schema_mismatch(
                        "OutlierHandler",
                        format!("column '{}' is not numeric", col_name),
                    ));
                }
                Some(ColumnKind::Numeric) => {}
            }

            let series = table.series(col_name)?;
            let values = numeric_values(series)
                .context(format!("Reading column '{}'", col_name))?;
            let observed: Vec<f64> = values.iter().flatten().copied().collect();
            let Some(bounds) = OutlierBounds::compute(col_name, &observed, iqr_multiplier) else {
                continue;
            };

            let mask: BooleanChunked = values
                .iter()
                .map(|v| v.is_some_and(|val| bounds.is_outlier(val)))
                .collect();
            let capped = mask.num_trues();
            if capped == 0 {
                continue;
            }

            let new_series = replace_with_sentinel(series, &mask, sentinel)
                .context(format!("Capping column '{}'", col_name))?;
            table.data_mut().replace(col_name, new_series)?;
            debug!(
                "Capped {} values in '{}' outside [{}, {}]",
                capped, col_name, bounds.lower, bounds.upper
            );
            total_capped += capped;
        }

        info!("Capped {} outlier values", total_capped);
        Ok((table, total_capped))
    }

    fn column_bounds(table: &Table, column: &str, iqr_multiplier: f64) -> Option<OutlierBounds> {
        let series = table.series(column).ok()?;
        let values = numeric_values(series).ok()?;
        let observed: Vec<f64> = values.into_iter().flatten().collect();
        OutlierBounds::compute(column, &observed, iqr_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(table: &Table, column: &str) -> Vec<Option<f64>> {
        numeric_values(table.series(column).unwrap()).unwrap()
    }

    #[test]
    fn test_bounds_from_quartiles() {
        let bounds = OutlierBounds::compute("x", &[1.0, 2.0, 2.0, 3.0, 100.0], 1.5).unwrap();
        assert_eq!(bounds.q1, 2.0);
        assert_eq!(bounds.q3, 3.0);
        assert_eq!(bounds.iqr, 1.0);
        assert_eq!(bounds.lower, 0.5);
        assert_eq!(bounds.upper, 4.5);
        assert!(bounds.is_outlier(100.0));
        assert!(!bounds.is_outlier(1.0));
        assert!(bounds.has_outliers());
    }

    #[test]
    fn test_quantile_interpolates() {
        // pos = 3 * 0.25 = 0.75 -> 1 + 0.75 * (2 - 1)
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25), 1.75);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.75), 3.25);
        assert_eq!(quantile(&[7.0], 0.25), 7.0);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(OutlierBounds::compute("x", &[], 1.5).is_none());
    }

    #[test]
    fn test_detect_outliers() {
        let table = Table::new(
            df![
                "LotArea" => [1.0, 2.0, 2.0, 3.0, 100.0],
                "Flat" => [5.0, 5.0, 5.0, 5.0, 50.0],
                "Tame" => [1.0, 2.0, 3.0, 4.0, 5.0],
                "Street" => ["A", "B", "C", "D", "E"],
            ]
            .unwrap(),
        );

        let flagged = OutlierHandler::detect_outliers(&table, 1.5);
        let names: Vec<&str> = flagged.iter().map(|b| b.column.as_str()).collect();
        // "Flat" has IQR 0 and is skipped
        assert_eq!(names, vec!["LotArea"]);
    }

    #[test]
    fn test_detect_ignores_nulls() {
        let table = Table::new(df!["x" => [None, Some(1.0), Some(2.0), Some(3.0)]].unwrap());
        assert!(OutlierHandler::detect_outliers(&table, 1.5).is_empty());
    }

    #[test]
    fn test_cap_outliers_replaces_with_sentinel() {
        let table = Table::new(df!["LotArea" => [1i64, 2, 2, 3, 100]].unwrap());
        let (table, capped) =
            OutlierHandler::cap_outliers(table, &["LotArea".to_string()], 1.5, -1.0).unwrap();

        assert_eq!(capped, 1);
        assert_eq!(table.series("LotArea").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            values(&table, "LotArea"),
            vec![Some(1.0), Some(2.0), Some(2.0), Some(3.0), Some(-1.0)]
        );
        assert_eq!(table.height(), 5);
    }

    #[test]
    fn test_cap_outliers_keeps_nulls() {
        let table = Table::new(df!["x" => [None, Some(1.0), Some(2.0), Some(2.0), Some(3.0), Some(100.0)]].unwrap());
        let (table, capped) =
            OutlierHandler::cap_outliers(table, &["x".to_string()], 1.5, -999.0).unwrap();
        assert_eq!(capped, 1);
        let v = values(&table, "x");
        assert_eq!(v[0], None);
        assert_eq!(v[5], Some(-999.0));
    }

    #[test]
    fn test_cap_outliers_keeps_other_cells_exact() {
        let table = Table::new(
            df![
                "Id" => [
                    9_007_199_254_740_993i64,
                    9_007_199_254_740_994,
                    9_007_199_254_740_995,
                    9_007_199_254_740_996,
                    0,
                ],
            ]
            .unwrap(),
        );
        let (table, capped) =
            OutlierHandler::cap_outliers(table, &["Id".to_string()], 1.5, -1.0).unwrap();

        assert_eq!(capped, 1);
        let ids: Vec<Option<i64>> = table.series("Id").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(
            ids,
            vec![
                Some(9_007_199_254_740_993),
                Some(9_007_199_254_740_994),
                Some(9_007_199_254_740_995),
                Some(9_007_199_254_740_996),
                Some(-1),
            ]
        );
    }

    #[test]
    fn test_cap_outliers_errors() {
        let table = Table::new(df!["Street" => ["A", "B"]].unwrap());
        let err = OutlierHandler::cap_outliers(table.clone(), &["Nope".to_string()], 1.5, -1.0)
            .unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");

        let err =
            OutlierHandler::cap_outliers(table, &["Street".to_string()], 1.5, -1.0).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_cap_outliers_empty_list() {
        let table = Table::new(df!["x" => [1.0, 100.0]].unwrap());
        let (table, capped) = OutlierHandler::cap_outliers(table, &[], 1.5, -1.0).unwrap();
        assert_eq!(capped, 0);
        assert_eq!(values(&table, "x"), vec![Some(1.0), Some(100.0)]);
    }
}
