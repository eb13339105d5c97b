//! Report generation module.
//!
//! A [`CleaningReport`] bundles the run's inputs, configuration and
//! [`CleaningSummary`](crate::types::CleaningSummary). It is used both for
//! `--json` output on stdout and for the `--report` file.
//!
//! # Example
//!
//! ```rust,ignore
//! use houseprice_pipeline::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report(
//!     "data/train.csv",
//!     Some("output/clean.csv"),
//!     pipeline.config(),
//!     &result.summary,
//! );
//! ReportGenerator::write_report(&report, "output/report.json")?;
//! ```

mod generator;

pub use generator::{CleaningReport, ReportGenerator};
