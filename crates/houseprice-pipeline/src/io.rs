//! CSV and JSON artifact I/O.

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use polars::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Read a delimited file with a header row.
///
/// The schema is inferred from the whole file. Empty fields and the
/// configured null tokens become missing cells.
pub fn load_csv(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).context(format!("Opening {}", path.display()))?;

    let null_values: Vec<PlSmallStr> = config.null_values.iter().map(|s| s.as_str().into()).collect();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(config.delimiter_byte())
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .into_reader_with_file_handle(file)
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Write a DataFrame as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(delimiter)
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    info!("Saved {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Load a JSON artifact such as a fitted encoder or scaler.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
    serde_json::from_str(&content).context(format!("Parsing {}", path.display()))
}

/// Save a value as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).context(format!("Writing {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("houseprice_io_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_load_csv_null_tokens() {
        let path = temp_path("nulls.csv");
        std::fs::write(&path, "Id,Alley,LotFrontage\n1,NA,65\n2,Grvl,\n3,,NA\n").unwrap();

        let df = load_csv(&path, &PipelineConfig::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("Alley").unwrap().null_count(), 2);
        assert_eq!(df.column("LotFrontage").unwrap().null_count(), 2);
        assert_eq!(df.column("LotFrontage").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_load_csv_custom_delimiter() {
        let path = temp_path("semicolon.csv");
        std::fs::write(&path, "a;b\n1;x\n2;y\n").unwrap();

        let config = PipelineConfig::builder().delimiter(';').build().unwrap();
        let df = load_csv(&path, &config).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv("/nonexistent/train.csv", &PipelineConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("/nonexistent/train.csv"));
    }

    #[test]
    fn test_write_then_read_csv() {
        let path = temp_path("out.csv");
        let mut df = df!["Street" => ["PAVE", "GRVL"], "LotArea" => [8450i64, 9600]].unwrap();
        write_csv(&mut df, &path, b',').unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(content.starts_with("Street,LotArea\n"));
        assert!(content.contains("GRVL,9600"));
    }

    #[test]
    fn test_json_round_trip() {
        let path = temp_path("config.json");
        let config = PipelineConfig::default();
        save_json(&config, &path).unwrap();
        let loaded: PipelineConfig = load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_json_invalid() {
        let path = temp_path("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_json::<PipelineConfig>(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.error_code(), "JSON_ERROR");
    }
}
