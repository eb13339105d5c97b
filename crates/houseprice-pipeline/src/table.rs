//! In-memory table with column kinds fixed at construction.
//!
//! A [`Table`] wraps a polars [`DataFrame`] and tags each column as
//! [`ColumnKind::Categorical`] or [`ColumnKind::Numeric`] once, when the table
//! is built. Stages consult the tag instead of the current dtype, so a column
//! keeps its kind after imputation or casting.

use crate::error::{PipelineError, Result};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a column for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// String-like values (imputed with the categorical sentinel)
    Categorical,
    /// Integer or float values (imputed with the numeric sentinel)
    Numeric,
}

impl ColumnKind {
    /// Kind implied by a dtype: numeric dtypes are numeric, everything else
    /// is categorical.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

/// A DataFrame plus the column kinds decided when it was constructed.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    kinds: HashMap<String, ColumnKind>,
}

impl Table {
    /// Wrap a DataFrame, deriving every column's kind from its dtype.
    pub fn new(df: DataFrame) -> Self {
        let kinds = df
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), ColumnKind::from_dtype(col.dtype())))
            .collect();
        Self { df, kinds }
    }

    /// Override the kind of one column.
    pub fn with_column_kind(mut self, column: &str, kind: ColumnKind) -> Result<Self> {
        if self.df.column(column).is_err() {
            return Err(PipelineError::ColumnNotFound(column.to_string()));
        }
        self.kinds.insert(column.to_string(), kind);
        Ok(self)
    }

    /// Replace the underlying data, keeping the kinds of surviving columns.
    ///
    /// Columns that did not exist before are tagged from their dtype.
    pub(crate) fn with_data(self, df: DataFrame) -> Self {
        let mut kinds = self.kinds;
        kinds.retain(|name, _| df.column(name).is_ok());
        for col in df.get_columns() {
            kinds
                .entry(col.name().to_string())
                .or_insert_with(|| ColumnKind::from_dtype(col.dtype()));
        }
        Self { df, kinds }
    }

    /// The underlying DataFrame.
    pub fn data(&self) -> &DataFrame {
        &self.df
    }

    /// Mutable access to the underlying DataFrame.
    ///
    /// Column replacements must keep the same names; use the stage
    /// operations to add or drop columns.
    pub(crate) fn data_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }

    /// Consume the table, returning the DataFrame.
    pub fn into_data(self) -> DataFrame {
        self.df
    }

    /// Kind of a column, if the column exists.
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        crate::utils::column_names(&self.df)
    }

    /// Names of the columns of the given kind, in table order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| self.kind(name) == Some(kind))
            .collect()
    }

    /// Categorical column names, in table order.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    /// Numeric column names, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Materialized Series for a column.
    pub fn series(&self, column: &str) -> Result<&Series> {
        self.df
            .column(column)
            .map(|col| col.as_materialized_series())
            .map_err(|_| PipelineError::ColumnNotFound(column.to_string()))
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Total number of missing cells.
    pub fn null_count(&self) -> usize {
        self.df.get_columns().iter().map(|col| col.null_count()).sum()
    }
}

impl From<DataFrame> for Table {
    fn from(df: DataFrame) -> Self {
        Table::new(df)
    }
}
