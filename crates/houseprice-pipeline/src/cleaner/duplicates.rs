//! Duplicate column and row detection.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Finds and drops duplicate columns and rows.
pub struct DuplicateDetector;

impl DuplicateDetector {
    /// Columns whose values equal an earlier column, cell by cell.
    ///
    /// Missing cells must line up and the dtypes must match: an integer
    /// column never duplicates a float column. The earliest column among
    /// equals is kept; every later one is reported once, in column order.
    pub fn find_duplicate_columns(table: &Table) -> Vec<String> {
        let columns = table.data().get_columns();

        let mut duplicates = Vec::new();
        for (j, col_j) in columns.iter().enumerate().skip(1) {
            let earlier = columns[..j].iter().find(|col_i| {
                col_i.dtype() == col_j.dtype()
                    && col_i
                        .as_materialized_series()
                        .equals_missing(col_j.as_materialized_series())
            });
            if let Some(col_i) = earlier {
                debug!("Column '{}' duplicates '{}'", col_j.name(), col_i.name());
                duplicates.push(col_j.name().to_string());
            }
        }

        info!("Found {} duplicate columns", duplicates.len());
        duplicates
    }

    /// Drop the named columns.
    pub fn drop_columns(table: Table, columns: &[String]) -> Result<Table> {
        if columns.is_empty() {
            return Ok(table);
        }
        for name in columns {
            if table.kind(name).is_none() {
                return Err(PipelineError::ColumnNotFound(name.clone()));
            }
        }

        let to_drop: Vec<PlSmallStr> = columns.iter().map(|s| s.as_str().into()).collect();
        let df = table.data().drop_many(to_drop);
        info!("Dropped {} columns: {:?}", columns.len(), columns);
        Ok(table.with_data(df))
    }

    /// Number of rows identical to an earlier row on every column.
    pub fn count_duplicate_rows(table: &Table) -> usize {
        Self::count_repeats(table, None)
    }

    /// Drop rows identical to an earlier row, keeping first occurrences in
    /// their original order.
    pub fn drop_duplicate_rows(table: Table) -> Result<Table> {
        Self::drop_repeats(table, None)
    }

    /// Number of rows identical to an earlier row on every column except
    /// `excluded`.
    pub fn count_partial_duplicates(table: &Table, excluded: &str) -> usize {
        match Self::compared_columns(table, excluded) {
            Some(subset) => Self::count_repeats(table, Some(&subset)),
            None => 0,
        }
    }

    /// Drop rows identical to an earlier row on every column except
    /// `excluded`, keeping first occurrences.
    ///
    /// Run this after [`DuplicateDetector::drop_duplicate_rows`].
    pub fn drop_partial_duplicates(table: Table, excluded: &str) -> Result<Table> {
        match Self::compared_columns(&table, excluded) {
            Some(subset) => Self::drop_repeats(table, Some(&subset)),
            None => Ok(table),
        }
    }

    /// Columns compared for partial duplicates, or `None` when nothing is
    /// left once `excluded` is removed.
    fn compared_columns(table: &Table, excluded: &str) -> Option<Vec<String>> {
        let names = table.column_names();
        if !names.iter().any(|n| n == excluded) {
            warn!(
                "Column '{}' not found, comparing rows on all columns",
                excluded
            );
            return Some(names);
        }

        let subset: Vec<String> = names.into_iter().filter(|n| n != excluded).collect();
        if subset.is_empty() {
            warn!(
                "'{}' is the only column, skipping partial duplicate check",
                excluded
            );
            return None;
        }
        Some(subset)
    }

    /// First occurrence of every row key over `subset` (all columns when
    /// `None`), in original row order.
    fn first_occurrences(table: &Table, subset: Option<&[String]>) -> Result<Option<DataFrame>> {
        let df = table.data();
        if df.width() == 0 || df.height() == 0 {
            return Ok(None);
        }
        Ok(Some(df.unique_stable(subset, UniqueKeepStrategy::First, None)?))
    }

    fn count_repeats(table: &Table, subset: Option<&[String]>) -> usize {
        match Self::first_occurrences(table, subset) {
            Ok(unique) => unique.map(|u| table.height() - u.height()).unwrap_or(0),
            Err(e) => {
                warn!("Could not count duplicate rows: {}", e);
                0
            }
        }
    }

    fn drop_repeats(table: Table, subset: Option<&[String]>) -> Result<Table> {
        let Some(unique) = Self::first_occurrences(&table, subset)? else {
            return Ok(table);
        };
        let removed = table.height() - unique.height();
        if removed == 0 {
            return Ok(table);
        }

        info!("Removed {} duplicate rows", removed);
        Ok(table.with_data(unique))
    }
}
