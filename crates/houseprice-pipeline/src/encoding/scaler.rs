//! Min-max feature scaling.

use super::FittedTransformer;
use crate::error::{PipelineError, Result, ResultExt};
use crate::utils::{column_names, is_numeric_dtype, numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fitted min-max scaler.
///
/// Maps each column into `feature_range` with
/// `x * scale + min`, where `scale = (range_max - range_min) / (data_max -
/// data_min)` and `min = range_min - data_min * scale`. A constant column
/// uses a data range of `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    feature_names_in: Vec<String>,
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl MinMaxScaler {
    /// Record the minimum and maximum of every column, in table order.
    ///
    /// Every column must be numeric.
    pub fn fit(df: &DataFrame) -> Result<Self> {
        let mut data_min = Vec::with_capacity(df.width());
        let mut data_max = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            ensure_numeric(series)?;
            let values = numeric_values(series)
                .context(format!("Reading column '{}'", col.name()))?;

            let observed: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
            if observed.is_empty() {
                warn!("Column '{}' has no values to fit, using range [0, 0]", col.name());
                data_min.push(0.0);
                data_max.push(0.0);
                continue;
            }
            data_min.push(observed.iter().copied().fold(f64::INFINITY, f64::min));
            data_max.push(observed.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        }

        Ok(Self {
            feature_names_in: column_names(df),
            data_min,
            data_max,
            feature_range: default_feature_range(),
        })
    }

    /// Set the target range.
    pub fn with_feature_range(mut self, min: f64, max: f64) -> Result<Self> {
        if !(min < max) {
            return Err(PipelineError::InvalidConfig(format!(
                "feature range min {} must be below max {}",
                min, max
            )));
        }
        self.feature_range = (min, max);
        Ok(self)
    }

    pub fn feature_range(&self) -> (f64, f64) {
        self.feature_range
    }

    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    /// `(scale, min)` for the column at `index`.
    fn params(&self, index: usize) -> (f64, f64) {
        let (range_min, range_max) = self.feature_range;
        let mut data_range = self.data_max[index] - self.data_min[index];
        if data_range == 0.0 {
            data_range = 1.0;
        }
        let scale = (range_max - range_min) / data_range;
        (scale, range_min - self.data_min[index] * scale)
    }

    /// A loaded artifact must hold one minimum and one maximum per column.
    fn check_artifact(&self) -> Result<()> {
        let expected = self.feature_names_in.len();
        if self.data_min.len() != expected || self.data_max.len() != expected {
            return Err(PipelineError::schema_mismatch(
                self.name(),
                format!(
                    "{} columns but {} minimums and {} maximums",
                    expected,
                    self.data_min.len(),
                    self.data_max.len()
                ),
            ));
        }
        let (range_min, range_max) = self.feature_range;
        if !(range_min < range_max) {
            return Err(PipelineError::schema_mismatch(
                self.name(),
                format!("feature range [{}, {}] is empty", range_min, range_max),
            ));
        }
        Ok(())
    }

    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        self.check_artifact()?;
        let names = column_names(df);
        if names == self.feature_names_in {
            return Ok(());
        }
        Err(PipelineError::schema_mismatch(
            self.name(),
            format!(
                "expected columns [{}], got [{}]",
                self.feature_names_in.join(", "),
                names.join(", ")
            ),
        ))
    }
}

fn ensure_numeric(series: &Series) -> Result<()> {
    if is_numeric_dtype(series.dtype()) {
        Ok(())
    } else {
        Err(PipelineError::schema_mismatch(
            "MinMaxScaler",
            format!(
                "column '{}' is not numeric ({})",
                series.name(),
                series.dtype()
            ),
        ))
    }
}

impl FittedTransformer for MinMaxScaler {
    fn name(&self) -> &'static str {
        "MinMaxScaler"
    }

    fn input_columns(&self) -> &[String] {
        &self.feature_names_in
    }

    fn output_columns(&self) -> Vec<String> {
        self.feature_names_in.clone()
    }

    /// Scale every column to `Float64`. Column names and order must match
    /// the fitted ones exactly; nulls stay null.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.check_schema(df)?;

        let mut columns: Vec<Column> = Vec::with_capacity(df.width());
        for (index, col) in df.get_columns().iter().enumerate() {
            let series = col.as_materialized_series();
            ensure_numeric(series)?;
            let (scale, min) = self.params(index);

            let scaled: Float64Chunked = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| x * scale + min))
                .collect();
            columns.push(scaled.with_name(col.name().clone()).into_series().into());
        }

        Ok(DataFrame::new(columns)?)
    }
}
