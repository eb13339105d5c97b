//! Shared utilities for the pipeline stages.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Column names of a DataFrame as owned strings, in column order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Read a Series as optional `f64` values (nulls stay `None`).
///
/// Fails when a non-missing value cannot be read as a number.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    if float_series.null_count() != series.null_count() {
        return Err(PolarsError::InvalidOperation(
            format!("column '{}' holds non-numeric values", series.name()).into(),
        ));
    }
    Ok(float_series.f64()?.into_iter().collect())
}

/// Read a Series as optional strings (nulls stay `None`).
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Dtype a numeric column takes once `sentinel` is written into it.
///
/// Unsigned integer columns widen to `Int64` so negative sentinels fit.
/// Integer columns receiving a fractional sentinel become `Float64`.
pub fn sentinel_dtype(original: &DataType, sentinel: f64) -> DataType {
    if original.is_integer() && sentinel.fract() != 0.0 {
        DataType::Float64
    } else if original.is_unsigned_integer() {
        DataType::Int64
    } else if original.is_signed_integer() || matches!(original, DataType::Float32) {
        original.clone()
    } else {
        DataType::Float64
    }
}

/// Write `sentinel` into the cells of `series` selected by `mask`.
///
/// Unselected cells keep their exact value; the result dtype follows
/// [`sentinel_dtype`].
pub fn replace_with_sentinel(
    series: &Series,
    mask: &BooleanChunked,
    sentinel: f64,
) -> PolarsResult<Series> {
    let dtype = sentinel_dtype(series.dtype(), sentinel);
    let base = series.cast(&dtype)?;
    if base.null_count() != series.null_count() {
        return Err(PolarsError::InvalidOperation(
            format!("column '{}' holds non-numeric values", series.name()).into(),
        ));
    }
    let fill = Series::new(series.name().clone(), [sentinel])
        .cast(&dtype)?
        .new_from_index(0, series.len());
    fill.zip_with(mask, &base)
}

/// Whether a non-missing cell of `series` equals `sentinel`, compared on the
/// dtype the column takes after the sentinel is written.
pub fn contains_sentinel(series: &Series, sentinel: f64) -> PolarsResult<bool> {
    let dtype = sentinel_dtype(series.dtype(), sentinel);
    let base = series.cast(&dtype)?;
    let fill = Series::new(series.name().clone(), [sentinel]).cast(&dtype)?;
    Ok(base.equal(&fill)?.any())
}

// =============================================================================
// Tests
// =============================================================================
