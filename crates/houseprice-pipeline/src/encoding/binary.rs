//! Binary mapping of two-valued categorical columns.

use crate::error::{PipelineError, Result, ResultExt};
use crate::utils::string_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Explicit value table for one two-valued column: `positive` maps to `1`,
/// `negative` to `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryMapping {
    pub column: String,
    pub positive: String,
    pub negative: String,
}

impl BinaryMapping {
    pub fn new(
        column: impl Into<String>,
        positive: impl Into<String>,
        negative: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// Integer code for a value, if the value is in the domain.
    pub fn encode(&self, value: &str) -> Option<i64> {
        if value == self.positive {
            Some(1)
        } else if value == self.negative {
            Some(0)
        } else {
            None
        }
    }

    fn domain(&self) -> Vec<String> {
        vec![self.positive.clone(), self.negative.clone()]
    }

    /// Map a Series to `Int64` codes.
    ///
    /// Missing cells and values outside the domain are encoding errors.
    fn apply(&self, series: &Series) -> Result<Series> {
        let values = string_values(series)
            .context(format!("Reading binary column '{}'", self.column))?;

        let mut codes = Vec::with_capacity(values.len());
        for value in values {
            let value = value.unwrap_or_else(|| "null".to_string());
            let code = self.encode(&value).ok_or_else(|| PipelineError::Encoding {
                column: self.column.clone(),
                value,
                expected: self.domain(),
            })?;
            codes.push(code);
        }

        Ok(Series::new(self.column.as_str().into(), codes))
    }
}

/// Replace every mapped column with its `0`/`1` codes.
///
/// A mapped column absent from the table is a schema mismatch.
pub fn apply_binary_mappings(df: &DataFrame, mappings: &[BinaryMapping]) -> Result<DataFrame> {
    let mut df = df.clone();

    for mapping in mappings {
        let column = df.column(&mapping.column).map_err(|_| {
            PipelineError::schema_mismatch(
                "BinaryMapping",
                format!("missing column '{}'", mapping.column),
            )
        })?;
        let codes = mapping.apply(column.as_materialized_series())?;
        df.replace(&mapping.column, codes)?;
        debug!(
            "Mapped '{}' ({} -> 1, {} -> 0)",
            mapping.column, mapping.positive, mapping.negative
        );
    }

    Ok(df)
}
