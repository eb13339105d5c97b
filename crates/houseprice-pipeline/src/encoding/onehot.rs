//! One-hot encoding of nominal columns.

use super::{EncodingConfig, FittedTransformer};
use crate::error::{PipelineError, Result, ResultExt};
use crate::utils::string_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// What to do with a category the encoder was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Fail with an encoding error.
    #[default]
    Error,
    /// Emit an all-zero row for that column.
    Ignore,
}

/// Fitted one-hot encoder.
///
/// Holds the sorted categories of each nominal column and the
/// [`EncodingConfig`] it was fitted with, so a saved encoder carries the
/// whole encoding contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    #[serde(default)]
    handle_unknown: HandleUnknown,
    #[serde(default)]
    config: EncodingConfig,
}

impl OneHotEncoder {
    /// Learn the categories of `config.nominal_columns`.
    ///
    /// Missing cells are not categories.
    pub fn fit(df: &DataFrame, config: EncodingConfig) -> Result<Self> {
        let mut categories = Vec::with_capacity(config.nominal_columns.len());

        for col_name in &config.nominal_columns {
            let column = df.column(col_name).map_err(|_| {
                PipelineError::schema_mismatch(
                    "OneHotEncoder",
                    format!("missing column '{}'", col_name),
                )
            })?;
            let values = string_values(column.as_materialized_series())
                .context(format!("Reading nominal column '{}'", col_name))?;
            let distinct: BTreeSet<String> = values.into_iter().flatten().collect();
            debug!("'{}': {} categories", col_name, distinct.len());
            categories.push(distinct.into_iter().collect());
        }

        Ok(Self {
            columns: config.nominal_columns.clone(),
            categories,
            handle_unknown: HandleUnknown::default(),
            config,
        })
    }

    /// Set the unknown-category policy.
    pub fn with_handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }

    /// Encoding configuration the encoder was fitted with.
    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    /// Sorted categories of one input column.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.categories.get(i))
            .map(|cats| cats.as_slice())
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }

    /// A loaded artifact must hold one category list per column.
    fn check_artifact(&self) -> Result<()> {
        if self.categories.len() == self.columns.len() {
            return Ok(());
        }
        Err(PipelineError::schema_mismatch(
            self.name(),
            format!(
                "{} columns but {} category lists",
                self.columns.len(),
                self.categories.len()
            ),
        ))
    }

    fn encode_column(&self, column: &str, categories: &[String], series: &Series) -> Result<Vec<Series>> {
        let values = string_values(series).context(format!("Reading nominal column '{}'", column))?;

        let mut indicators = vec![vec![0.0f64; values.len()]; categories.len()];
        for (row, value) in values.iter().enumerate() {
            let position = value
                .as_deref()
                .and_then(|v| categories.iter().position(|c| c == v));
            match (position, self.handle_unknown) {
                (Some(i), _) => indicators[i][row] = 1.0,
                (None, HandleUnknown::Ignore) => {}
                (None, HandleUnknown::Error) => {
                    return Err(PipelineError::Encoding {
                        column: column.to_string(),
                        value: value.clone().unwrap_or_else(|| "null".to_string()),
                        expected: categories.to_vec(),
                    });
                }
            }
        }

        Ok(categories
            .iter()
            .zip(indicators)
            .map(|(category, values)| {
                Series::new(format!("{}_{}", column, category).into(), values)
            })
            .collect())
    }
}

impl FittedTransformer for OneHotEncoder {
    fn name(&self) -> &'static str {
        "OneHotEncoder"
    }

    fn input_columns(&self) -> &[String] {
        &self.columns
    }

    fn output_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |c| format!("{}_{}", column, c)))
            .collect()
    }

    /// Indicator columns only, `Float64` 0/1, named `<column>_<category>`.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.check_artifact()?;
        self.check_columns_present(df)?;

        let mut columns: Vec<Column> = Vec::with_capacity(self.output_columns().len());
        for (col_name, cats) in self.columns.iter().zip(&self.categories) {
            let series = df.column(col_name)?.as_materialized_series();
            for indicator in self.encode_column(col_name, cats, series)? {
                columns.push(indicator.into());
            }
        }

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> EncodingConfig {
        EncodingConfig {
            binary_mappings: vec![],
            nominal_columns: vec!["MSZoning".to_string(), "Electrical".to_string()],
        }
    }

    fn sample() -> DataFrame {
        df![
            "MSZoning" => ["RL", "RM", "RL"],
            "Electrical" => ["SBRKR", "FUSEA", "SBRKR"],
            "LotArea" => [1i64, 2, 3],
        ]
        .unwrap()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_fit_sorted_categories() {
        let encoder = OneHotEncoder::fit(&sample(), config()).unwrap();
        assert_eq!(encoder.categories("MSZoning").unwrap(), ["RL", "RM"]);
        assert_eq!(encoder.categories("Electrical").unwrap(), ["FUSEA", "SBRKR"]);
        assert_eq!(
            encoder.output_columns(),
            vec!["MSZoning_RL", "MSZoning_RM", "Electrical_FUSEA", "Electrical_SBRKR"]
        );
    }

    #[test]
    fn test_transform() {
        let encoder = OneHotEncoder::fit(&sample(), config()).unwrap();
        let out = encoder.transform(&sample()).unwrap();

        assert_eq!(out.width(), 4);
        assert_eq!(floats(&out, "MSZoning_RL"), vec![Some(1.0), Some(0.0), Some(1.0)]);
        assert_eq!(floats(&out, "Electrical_FUSEA"), vec![Some(0.0), Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_unknown_category() {
        let encoder = OneHotEncoder::fit(&sample(), config()).unwrap();
        let unseen = df![
            "MSZoning" => ["FV"],
            "Electrical" => ["SBRKR"],
        ]
        .unwrap();

        let err = encoder.transform(&unseen).unwrap_err();
        assert_eq!(err.error_code(), "ENCODING_ERROR");

        let encoder = encoder.with_handle_unknown(HandleUnknown::Ignore);
        let out = encoder.transform(&unseen).unwrap();
        assert_eq!(floats(&out, "MSZoning_RL"), vec![Some(0.0)]);
        assert_eq!(floats(&out, "MSZoning_RM"), vec![Some(0.0)]);
    }

    #[test]
    fn test_missing_input_column() {
        let encoder = OneHotEncoder::fit(&sample(), config()).unwrap();
        let df = df!["MSZoning" => ["RL"]].unwrap();
        let err = encoder.transform(&df).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
        assert!(err.to_string().contains("Electrical"));
    }

    #[test]
    fn test_truncated_artifact_rejected() {
        let encoder: OneHotEncoder = serde_json::from_str(
            r#"{"columns": ["MSZoning", "Electrical"], "categories": [["RL", "RM"]]}"#,
        )
        .unwrap();
        assert_eq!(encoder.categories("Electrical"), None);

        let err = encoder.transform(&sample()).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_json_artifact() {
        let encoder = OneHotEncoder::fit(&sample(), config()).unwrap();
        let json = serde_json::to_string(&encoder).unwrap();
        assert!(json.contains("\"handle_unknown\":\"error\""));

        let loaded: OneHotEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, encoder);
    }
}
