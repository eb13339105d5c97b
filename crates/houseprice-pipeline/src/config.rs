//! Configuration types for the cleaning and encoding pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::error::{PipelineError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default target column excluded from partial-duplicate comparisons.
pub const DEFAULT_TARGET_COLUMN: &str = "SalePrice";

/// Default sentinel for missing numeric cells.
pub const DEFAULT_NUMERIC_SENTINEL: f64 = -1.0;

/// Default sentinel for missing categorical cells.
pub const DEFAULT_CATEGORICAL_SENTINEL: &str = "UNKNOWN";

/// Tokens read as missing cells when loading CSV input.
pub const DEFAULT_NULL_VALUES: [&str; 8] = ["NA", "N/A", "NaN", "nan", "NULL", "null", "#N/A", "<NA>"];

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use houseprice_pipeline::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .target_column("SalePrice")
///     .enable_outlier_capping(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column ignored when looking for partial duplicate rows.
    /// Default: "SalePrice"
    pub target_column: String,

    /// Value written into missing numeric cells.
    /// Default: -1.0
    pub numeric_sentinel: f64,

    /// Value written into missing categorical cells.
    /// Default: "UNKNOWN"
    pub categorical_sentinel: String,

    /// Whether to cap IQR outliers in numeric columns.
    /// Default: false
    pub enable_outlier_capping: bool,

    /// Multiplier applied to the IQR when computing outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Value written over capped outliers.
    /// Default: -1.0
    pub outlier_sentinel: f64,

    /// Whether to drop numeric columns highly correlated with an earlier column.
    /// Default: false
    pub enable_correlation_pruning: bool,

    /// Absolute Pearson correlation above which a column is flagged.
    /// Default: 0.90
    pub correlation_threshold: f64,

    /// Tokens read as missing cells when loading CSV input.
    pub null_values: Vec<String>,

    /// Field delimiter for CSV input and output.
    /// Default: ','
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            numeric_sentinel: DEFAULT_NUMERIC_SENTINEL,
            categorical_sentinel: DEFAULT_CATEGORICAL_SENTINEL.to_string(),
            enable_outlier_capping: false,
            iqr_multiplier: 1.5,
            outlier_sentinel: DEFAULT_NUMERIC_SENTINEL,
            enable_correlation_pruning: false,
            correlation_threshold: 0.90,
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Fields missing from the file keep their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Reading config file {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(self.correlation_threshold > 0.0 && self.correlation_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "correlation_threshold".to_string(),
                value: self.correlation_threshold,
            });
        }

        if !(self.iqr_multiplier > 0.0 && self.iqr_multiplier.is_finite()) {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyValue("target_column".to_string()));
        }

        if self.categorical_sentinel.is_empty() {
            return Err(ConfigValidationError::EmptyValue(
                "categorical_sentinel".to_string(),
            ));
        }

        if !self.delimiter.is_ascii() {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        Ok(())
    }

    /// Delimiter as the single byte the CSV reader and writer expect.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be in (0.0, 1.0])")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid IQR multiplier: {0} (must be a positive number)")]
    InvalidMultiplier(f64),

    #[error("'{0}' must not be empty")]
    EmptyValue(String),

    #[error("Invalid delimiter {0:?} (must be a single ASCII character)")]
    InvalidDelimiter(char),
}

impl From<ConfigValidationError> for PipelineError {
    fn from(e: ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    target_column: Option<String>,
    numeric_sentinel: Option<f64>,
    categorical_sentinel: Option<String>,
    enable_outlier_capping: Option<bool>,
    iqr_multiplier: Option<f64>,
    outlier_sentinel: Option<f64>,
    enable_correlation_pruning: Option<bool>,
    correlation_threshold: Option<f64>,
    null_values: Option<Vec<String>>,
    delimiter: Option<char>,
}

impl PipelineConfigBuilder {
    /// Set the column excluded from partial-duplicate comparisons.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the sentinel written into missing numeric cells.
    pub fn numeric_sentinel(mut self, value: f64) -> Self {
        self.numeric_sentinel = Some(value);
        self
    }

    /// Set the sentinel written into missing categorical cells.
    pub fn categorical_sentinel(mut self, value: impl Into<String>) -> Self {
        self.categorical_sentinel = Some(value.into());
        self
    }

    /// Enable or disable the outlier capping stage.
    pub fn enable_outlier_capping(mut self, enable: bool) -> Self {
        self.enable_outlier_capping = Some(enable);
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the value written over capped outliers.
    ///
    /// Pick something other than the numeric sentinel to keep capped and
    /// imputed cells distinguishable.
    pub fn outlier_sentinel(mut self, value: f64) -> Self {
        self.outlier_sentinel = Some(value);
        self
    }

    /// Enable or disable dropping highly correlated numeric columns.
    pub fn enable_correlation_pruning(mut self, enable: bool) -> Self {
        self.enable_correlation_pruning = Some(enable);
        self
    }

    /// Set the absolute correlation threshold.
    ///
    /// # Arguments
    /// * `threshold` - Value in (0.0, 1.0] (e.g., 0.9)
    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = Some(threshold);
        self
    }

    /// Replace the tokens read as missing cells.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the CSV field delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            target_column: self.target_column.unwrap_or(defaults.target_column),
            numeric_sentinel: self.numeric_sentinel.unwrap_or(defaults.numeric_sentinel),
            categorical_sentinel: self
                .categorical_sentinel
                .unwrap_or(defaults.categorical_sentinel),
            enable_outlier_capping: self
                .enable_outlier_capping
                .unwrap_or(defaults.enable_outlier_capping),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            outlier_sentinel: self.outlier_sentinel.unwrap_or(defaults.outlier_sentinel),
            enable_correlation_pruning: self
                .enable_correlation_pruning
                .unwrap_or(defaults.enable_correlation_pruning),
            correlation_threshold: self
                .correlation_threshold
                .unwrap_or(defaults.correlation_threshold),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
        };

        config.validate()?;
        Ok(config)
    }
}
