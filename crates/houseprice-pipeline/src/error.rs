//! Error types for the cleaning and encoding pipeline.
//!
//! Every failure is terminal for a run: nothing here is recovered locally.
//! Reporting operations (inconsistency scan, missing counts, duplicate
//! counts) never produce these errors.
//!
//! Errors are serializable as `{code, message}` so the CLI can emit them as
//! JSON next to successful summaries.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A table does not have the columns (or column order) a fitted
    /// transformer expects.
    #[error("Schema mismatch for {transformer}: {reason}")]
    SchemaMismatch { transformer: String, reason: String },

    /// A categorical value is outside the domain an encoder knows about.
    #[error("Cannot encode value '{value}' in column '{column}' (expected one of: {})", .expected.join(", "))]
    Encoding {
        column: String,
        value: String,
        expected: Vec<String>,
    },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Shorthand for a [`PipelineError::SchemaMismatch`].
    pub fn schema_mismatch(transformer: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::SchemaMismatch {
            transformer: transformer.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through [`PipelineError::with_context`].
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::Encoding { .. } => "ENCODING_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, with all context layers removed.
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Json(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::schema_mismatch("MinMaxScaler", "order differs").error_code(),
            "SCHEMA_MISMATCH"
        );
        assert_eq!(
            PipelineError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_encoding_error_message() {
        let error = PipelineError::Encoding {
            column: "Street".to_string(),
            value: "DIRT".to_string(),
            expected: vec!["PAVE".to_string(), "GRVL".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("DIRT"));
        assert!(message.contains("PAVE, GRVL"));
        assert_eq!(error.error_code(), "ENCODING_ERROR");
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::ColumnNotFound("SalePrice".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("SalePrice"));
    }

    #[test]
    fn test_with_context() {
        let error = PipelineError::schema_mismatch("OneHotEncoder", "missing column")
            .with_context("While encoding features");
        assert!(error.to_string().contains("While encoding features"));
        assert_eq!(error.error_code(), "SCHEMA_MISMATCH");
        assert!(matches!(error.root(), PipelineError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_io_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let error = result.context("Reading data.csv").unwrap_err();
        assert_eq!(error.error_code(), "IO_ERROR");
        assert!(error.to_string().starts_with("Reading data.csv"));
    }
}
