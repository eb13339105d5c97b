//! Imputation module for handling missing values.
//!
//! Missing cells are replaced by fixed sentinels rather than statistics, so
//! downstream consumers can recognize them.

mod sentinel;

pub use sentinel::SentinelImputer;
