//! CLI entry point for the house-price cleaning pipeline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use houseprice_pipeline::{
    CleaningReport, EncodingConfig, FeatureEncoder, MinMaxScaler, OneHotEncoder, Pipeline,
    PipelineConfig, PipelineError, ReportGenerator, Table, io,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "House-price data cleaning and feature preparation",
    long_about = "Cleans a house-price CSV and prepares model features.\n\n\
                  EXAMPLES:\n  \
                  # Clean a raw dataset\n  \
                  houseprice-pipeline clean -i train.csv -o clean.csv\n\n  \
                  # Clean with the optional stages and a JSON report\n  \
                  houseprice-pipeline clean -i train.csv -o clean.csv --cap-outliers --prune-correlated --report report.json\n\n  \
                  # Fit transformers on a cleaned table\n  \
                  houseprice-pipeline fit -i clean.csv --encoder encoder.json --scaler scaler.json\n\n  \
                  # Encode a cleaned table with fitted transformers\n  \
                  houseprice-pipeline encode -i clean.csv -o features.csv --encoder encoder.json --scaler scaler.json\n\n  \
                  # Read a semicolon-separated table\n  \
                  houseprice-pipeline encode -i clean.csv -o features.csv --encoder encoder.json --scaler scaler.json --config config.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; prints the result or the error as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the cleaning pipeline over a raw CSV
    Clean(CleanArgs),
    /// Encode and scale a cleaned CSV with fitted transformers
    Encode(EncodeArgs),
    /// Fit the one-hot encoder and min-max scaler on a cleaned CSV
    Fit(FitArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Path to the raw CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the cleaned CSV to write
    #[arg(short, long)]
    output: PathBuf,

    /// Column ignored when looking for partial duplicate rows
    #[arg(short, long)]
    target: Option<String>,

    /// Replace IQR outliers in numeric columns with the outlier sentinel
    #[arg(long)]
    cap_outliers: bool,

    /// Drop numeric columns highly correlated with an earlier column
    #[arg(long)]
    prune_correlated: bool,

    /// Absolute correlation above which a column is dropped
    #[arg(long)]
    correlation_threshold: Option<f64>,

    /// Write a JSON cleaning report to this path
    #[arg(short = 'r', long)]
    report: Option<PathBuf>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Path to the cleaned CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the encoded CSV to write
    #[arg(short, long)]
    output: PathBuf,

    /// Fitted one-hot encoder (JSON)
    #[arg(long)]
    encoder: PathBuf,

    /// Fitted min-max scaler (JSON)
    #[arg(long)]
    scaler: PathBuf,

    /// Encoding configuration the encoder must have been fitted with (JSON);
    /// defaults to the house-price columns
    #[arg(long)]
    encoding_config: Option<PathBuf>,

    /// JSON configuration file (delimiter and null tokens)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FitArgs {
    /// Path to the cleaned CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the fitted one-hot encoder (JSON)
    #[arg(long)]
    encoder: PathBuf,

    /// Where to write the fitted min-max scaler (JSON)
    #[arg(long)]
    scaler: PathBuf,

    /// Encoding configuration (JSON); defaults to the house-price columns
    #[arg(long)]
    encoding_config: Option<PathBuf>,

    /// JSON configuration file (delimiter and null tokens)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Machine-readable result of `encode` and `fit`.
#[derive(Debug, Serialize)]
struct ArtifactSummary {
    input_file: String,
    outputs: Vec<String>,
    rows: usize,
    columns: usize,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, cli.json);

    let outcome = match &cli.command {
        Command::Clean(args) => run_clean(args, &cli),
        Command::Encode(args) => run_encode(args, &cli),
        Command::Fit(args) => run_fit(args, &cli),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) if cli.json => {
            println!("{}", error_json(&e));
            std::process::exit(1);
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}

/// `{"error": {code, message}}` for an error chain.
fn error_json(e: &anyhow::Error) -> String {
    let body = match e.downcast_ref::<PipelineError>() {
        Some(pipeline_error) => serde_json::to_value(pipeline_error)
            .unwrap_or_else(|_| serde_json::json!({ "code": "ERROR", "message": format!("{:#}", e) })),
        None => serde_json::json!({ "code": "ERROR", "message": format!("{:#}", e) }),
    };
    serde_json::json!({ "error": body }).to_string()
}

/// Encoding configuration from a JSON file, or the house-price defaults.
fn load_encoding_config(path: Option<&PathBuf>) -> Result<EncodingConfig> {
    Ok(match path {
        Some(path) => io::load_json(path)?,
        None => EncodingConfig::default(),
    })
}

/// Build the run configuration: JSON file (or defaults), then CLI overrides.
fn build_config(args: &CleanArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_optional_file(args.config.as_deref())?;

    if let Some(ref target) = args.target {
        config.target_column = target.clone();
    }
    if args.cap_outliers {
        config.enable_outlier_capping = true;
    }
    if args.prune_correlated {
        config.enable_correlation_pruning = true;
    }
    if let Some(threshold) = args.correlation_threshold {
        config.correlation_threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

fn run_clean(args: &CleanArgs, cli: &Cli) -> Result<()> {
    let config = build_config(args)?;
    let delimiter = config.delimiter_byte();

    info!("Loading dataset from: {}", args.input.display());
    let data = io::load_csv(&args.input, &config)?;
    let original_shape = data.shape();

    let mut builder = Pipeline::builder().config(config);
    if !cli.quiet && !cli.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let result = pipeline
        .process(Table::new(data))
        .with_context(|| format!("Cleaning {}", args.input.display()))?;

    let mut cleaned = result.table.into_data();
    ensure_parent_dir(&args.output)?;
    io::write_csv(&mut cleaned, &args.output, delimiter)?;

    let report = ReportGenerator::build_report(
        &args.input.display().to_string(),
        Some(&args.output.display().to_string()),
        pipeline.config(),
        &result.summary,
    );

    if let Some(ref path) = args.report {
        ReportGenerator::write_report(&report, path)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_clean_summary(&report, original_shape, args.report.is_some());
    Ok(())
}

fn run_encode(args: &EncodeArgs, cli: &Cli) -> Result<()> {
    let config = PipelineConfig::from_optional_file(args.config.as_deref())?;
    let encoding_config = load_encoding_config(args.encoding_config.as_ref())?;

    let encoder: OneHotEncoder = io::load_json(&args.encoder)?;
    let scaler: MinMaxScaler = io::load_json(&args.scaler)?;
    let data = io::load_csv(&args.input, &config)?;

    let mut features = FeatureEncoder::encode_features(&data, &encoding_config, &encoder, &scaler)
        .with_context(|| format!("Encoding {}", args.input.display()))?;

    ensure_parent_dir(&args.output)?;
    io::write_csv(&mut features, &args.output, config.delimiter_byte())?;

    emit_artifact_summary(
        cli,
        &args.input,
        &[&args.output],
        &features,
        "ENCODING COMPLETE",
    )
}

fn run_fit(args: &FitArgs, cli: &Cli) -> Result<()> {
    let config = PipelineConfig::from_optional_file(args.config.as_deref())?;
    let encoding_config = load_encoding_config(args.encoding_config.as_ref())?;

    let data = io::load_csv(&args.input, &config)?;
    let (encoder, scaler) = FeatureEncoder::fit_transformers(&data, encoding_config)
        .with_context(|| format!("Fitting transformers on {}", args.input.display()))?;

    ensure_parent_dir(&args.encoder)?;
    ensure_parent_dir(&args.scaler)?;
    io::save_json(&encoder, &args.encoder)?;
    io::save_json(&scaler, &args.scaler)?;

    emit_artifact_summary(
        cli,
        &args.input,
        &[&args.encoder, &args.scaler],
        &data,
        "FITTING COMPLETE",
    )
}

/// Create the parent directory of an output path if needed.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating output directory {}", parent.display()))?;
            info!("Created output directory: {}", parent.display());
        }
    }
    Ok(())
}

fn emit_artifact_summary(
    cli: &Cli,
    input: &Path,
    outputs: &[&PathBuf],
    df: &DataFrame,
    title: &str,
) -> Result<()> {
    let summary = ArtifactSummary {
        input_file: input.display().to_string(),
        outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
        rows: df.height(),
        columns: df.width(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
    println!(
        "Input:  {} ({} rows x {} columns)",
        summary.input_file, summary.rows, summary.columns
    );
    for output in &summary.outputs {
        println!("Output: {}", output);
    }
    println!("{}", "=".repeat(80));
    Ok(())
}

/// Print a human-readable summary of a cleaning run.
///
/// Uses `println!` rather than logging: this is the command's primary output
/// and must show regardless of log level.
fn print_clean_summary(report: &CleaningReport, original_shape: (usize, usize), wrote_report: bool) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, original_shape.0, original_shape.1
    );
    if let Some(ref output_file) = report.output_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            output_file, summary.rows_after, summary.columns_after
        );
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed()
    );
    println!(
        "  Columns: {} -> {} ({} removed)",
        summary.columns_before,
        summary.columns_after,
        summary.columns_removed()
    );
    println!("  Missing cells filled: {}", summary.missing_values.total());
    println!("  Duplicate rows: {}", summary.duplicate_rows);
    println!("  Partial duplicate rows: {}", summary.partial_duplicate_rows);
    if !summary.duplicate_columns.is_empty() {
        println!("  Duplicate columns: {}", summary.duplicate_columns.join(", "));
    }
    if !summary.outlier_columns.is_empty() {
        println!(
            "  Outliers capped: {} cells in {}",
            summary.outlier_cells_capped,
            summary.outlier_columns.join(", ")
        );
    }
    if !summary.correlated_columns.is_empty() {
        println!(
            "  Correlated columns dropped: {}",
            summary.correlated_columns.join(", ")
        );
    }
    println!();

    if !summary.processing_steps.is_empty() {
        println!("Actions Taken:");
        for step in &summary.processing_steps {
            println!("  - {}", step);
        }
        println!();
    }

    if !summary.imputation.sentinel_collisions.is_empty() {
        println!("Warnings:");
        println!(
            "  ! Sentinel values already present before imputation in: {}",
            summary.imputation.sentinel_collisions.join(", ")
        );
        println!();
    }

    println!("Use --json for machine-readable output");
    if !wrote_report {
        println!("Use --report <path> to save a JSON cleaning report");
    }
    println!("{}", "=".repeat(80));
}
