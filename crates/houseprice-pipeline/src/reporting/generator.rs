use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::types::CleaningSummary;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Report of one cleaning run, written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the output file (if written)
    pub output_file: Option<String>,
    /// Configuration the run used
    pub config: PipelineConfig,
    /// What each stage did
    pub summary: CleaningSummary,
}

/// Builds and writes cleaning reports.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Build a report stamped with the current local time.
    pub fn build_report(
        input_file: &str,
        output_file: Option<&str>,
        config: &PipelineConfig,
        summary: &CleaningSummary,
    ) -> CleaningReport {
        CleaningReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            config: config.clone(),
            summary: summary.clone(),
        }
    }

    /// Write a report as pretty JSON, creating parent directories as needed.
    pub fn write_report(report: &CleaningReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
        }

        let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())
            .context(format!("Writing {}", path.display()))?;

        info!("Report saved: {}", path.display());
        Ok(())
    }
}
