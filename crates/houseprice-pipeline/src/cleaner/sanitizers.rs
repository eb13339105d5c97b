//! Value sanitization for categorical columns.

use crate::utils::string_values;
use polars::prelude::*;

/// Canonical form of a categorical value: trimmed and uppercased.
pub(crate) fn standardize_value(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Standardize every non-missing value of a Series.
///
/// Returns the new Series and the number of values that changed.
pub(crate) fn standardize_series(series: &Series) -> PolarsResult<(Series, usize)> {
    let values = string_values(series)?;
    let mut changed = 0;
    let mut cleaned_values = Vec::with_capacity(values.len());

    for opt_val in values {
        match opt_val {
            Some(val) => {
                let cleaned = standardize_value(&val);
                if cleaned != val {
                    changed += 1;
                }
                cleaned_values.push(Some(cleaned));
            }
            None => cleaned_values.push(None),
        }
    }

    Ok((Series::new(series.name().clone(), cleaned_values), changed))
}
