//! Feature encoding and scaling.
//!
//! Turns a cleaned table into a fully numeric one:
//! 1. binary columns are mapped to `0`/`1` ([`binary`])
//! 2. nominal columns are one-hot encoded with a fitted [`OneHotEncoder`]
//! 3. every column is min-max scaled with a fitted [`MinMaxScaler`]
//!
//! The encoder and scaler are fitted once (see
//! [`FeatureEncoder::fit_transformers`]), saved as JSON and loaded read-only
//! for every later run.

mod binary;
mod onehot;
mod scaler;

pub use binary::{BinaryMapping, apply_binary_mappings};
pub use onehot::{HandleUnknown, OneHotEncoder};
pub use scaler::MinMaxScaler;

use crate::error::{PipelineError, Result, ResultExt};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A transformer fitted elsewhere and applied read-only.
///
/// Every implementation carries its schema contract: the input columns it
/// was fitted on, in order, and the columns it produces.
pub trait FittedTransformer {
    /// Name used in error messages.
    fn name(&self) -> &'static str;

    /// Columns the transformer reads, in fitted order.
    fn input_columns(&self) -> &[String];

    /// Columns the transformer produces, in output order.
    fn output_columns(&self) -> Vec<String>;

    /// Apply the fitted transformation.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    /// Fail with a schema mismatch unless every input column is present.
    fn check_columns_present(&self, df: &DataFrame) -> Result<()> {
        let missing: Vec<&str> = self
            .input_columns()
            .iter()
            .filter(|name| df.column(name.as_str()).is_err())
            .map(|s| s.as_str())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::schema_mismatch(
                self.name(),
                format!("missing columns: {}", missing.join(", ")),
            ))
        }
    }
}

/// Which columns get which encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Two-valued columns mapped to `0`/`1`.
    pub binary_mappings: Vec<BinaryMapping>,
    /// Columns one-hot encoded, in encoder order.
    pub nominal_columns: Vec<String>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            binary_mappings: vec![
                BinaryMapping::new("Street", "PAVE", "GRVL"),
                BinaryMapping::new("Utilities", "ALLPUB", "NOSEWA"),
                BinaryMapping::new("CentralAir", "Y", "N"),
            ],
            nominal_columns: ["MSZoning", "LandContour", "HouseStyle", "Electrical"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Applies binary mapping, one-hot encoding and min-max scaling in order.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Encode and scale a cleaned table.
    ///
    /// `config` is the encoding the caller expects. The encoder must have
    /// been fitted on exactly that nominal column list, in that order, and
    /// with the same binary mappings. The output holds the one-hot columns
    /// first, then the remaining columns, all scaled. Any mismatch between
    /// the table, the expected config and the fitted transformers aborts
    /// with an error.
    pub fn encode_features(
        df: &DataFrame,
        config: &EncodingConfig,
        encoder: &OneHotEncoder,
        scaler: &MinMaxScaler,
    ) -> Result<DataFrame> {
        if encoder.input_columns() != config.nominal_columns.as_slice() {
            return Err(PipelineError::schema_mismatch(
                encoder.name(),
                format!(
                    "encoder columns [{}] do not match nominal columns [{}]",
                    encoder.input_columns().join(", "),
                    config.nominal_columns.join(", ")
                ),
            ));
        }
        if encoder.config().binary_mappings != config.binary_mappings {
            return Err(PipelineError::schema_mismatch(
                encoder.name(),
                "encoder was fitted with different binary mappings",
            ));
        }

        let mapped = apply_binary_mappings(df, &config.binary_mappings)?;
        let combined = Self::one_hot(&mapped, encoder)?;
        let scaled = scaler.transform(&combined).context("Scaling features")?;

        info!(
            "Encoded {} rows into {} feature columns",
            scaled.height(),
            scaled.width()
        );
        Ok(scaled)
    }

    /// Fit an encoder and a scaler on a cleaned table.
    ///
    /// The scaler is fitted on the binary-mapped, one-hot encoded table so
    /// that [`FeatureEncoder::encode_features`] can apply both to the same
    /// kind of input.
    pub fn fit_transformers(
        df: &DataFrame,
        config: EncodingConfig,
    ) -> Result<(OneHotEncoder, MinMaxScaler)> {
        let mapped = apply_binary_mappings(df, &config.binary_mappings)?;
        let encoder = OneHotEncoder::fit(&mapped, config)?;
        let combined = Self::one_hot(&mapped, &encoder)?;
        let scaler = MinMaxScaler::fit(&combined)?;

        info!(
            "Fitted encoder on {} columns and scaler on {} columns",
            encoder.input_columns().len(),
            scaler.input_columns().len()
        );
        Ok((encoder, scaler))
    }

    /// One-hot columns followed by every non-nominal column.
    fn one_hot(df: &DataFrame, encoder: &OneHotEncoder) -> Result<DataFrame> {
        let encoded = encoder.transform(df).context("One-hot encoding")?;

        let mut columns: Vec<Column> = encoded.get_columns().to_vec();
        columns.extend(
            df.get_columns()
                .iter()
                .filter(|col| {
                    !encoder
                        .input_columns()
                        .iter()
                        .any(|name| name.as_str() == col.name().as_str())
                })
                .cloned(),
        );

        Ok(DataFrame::new(columns)?)
    }
}
