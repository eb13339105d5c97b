//! Correlated feature identification.

use crate::table::Table;
use crate::utils::numeric_values;
use tracing::{debug, info};

/// Finds numeric columns that are highly correlated with an earlier column.
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Numeric columns whose absolute Pearson correlation with any earlier
    /// numeric column exceeds `threshold`, in column order.
    ///
    /// Correlations use pairwise-complete rows. Undefined correlations
    /// (fewer than two complete rows, or zero variance) never flag.
    pub fn find_highly_correlated(table: &Table, threshold: f64) -> Vec<String> {
        let columns: Vec<(String, Vec<Option<f64>>)> = table
            .numeric_columns()
            .into_iter()
            .filter_map(|name| {
                let series = table.series(&name).ok()?;
                let values = numeric_values(series).ok()?;
                Some((name, values))
            })
            .collect();

        let mut flagged = Vec::new();
        for j in 1..columns.len() {
            let (name_j, values_j) = &columns[j];
            for (name_i, values_i) in &columns[..j] {
                let Some(r) = pearson(values_i, values_j) else {
                    continue;
                };
                if r.abs() > threshold {
                    debug!("'{}' ~ '{}': |r| = {:.4}", name_j, name_i, r.abs());
                    flagged.push(name_j.clone());
                    break;
                }
            }
        }

        info!(
            "Found {} columns correlated above {}: {:?}",
            flagged.len(),
            threshold,
            flagged
        );
        flagged
    }

    /// Pearson correlation of two columns over their pairwise-complete rows.
    pub fn correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
        pearson(x, y)
    }
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let x_mean = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let y_mean = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for (xi, yi) in &pairs {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some(sum_xy / denom)
    }
}
