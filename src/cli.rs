//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// drugtox - ChEMBL cytotoxicity lookup and drug candidate ranking
///
/// Reads a JSON list of drugs (`[{"term": "aspirin"}, ...]`), fetches their
/// toxicity assays from ChEMBL, and writes a cytotoxicity table. With
/// --scores (`[{"term": "aspirin", "zscore": 0.5}, ...]`) it instead writes
/// candidates ranked by confidence z-score.
///
/// Examples:
///   drugtox --drugs drugs.json
///   drugtox --drugs drugs.json --scores scores.json --format csv -o ranked.csv
///   drugtox --drugs drugs.json --dry-run
///   drugtox --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON file with the drugs to query
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub drugs: Option<PathBuf>,

    /// JSON file with confidence scores; switches output to ranked candidates
    #[arg(short, long, value_name = "FILE")]
    pub scores: Option<PathBuf>,

    /// Output file path (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, csv, markdown) [default: from config or json]
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Number of drug names per ChEMBL query [default: from config or 100]
    #[arg(long, value_name = "COUNT")]
    pub batch_size: Option<usize>,

    /// ChEMBL host (scheme and authority only)
    #[arg(long, value_name = "URL", env = "DRUGTOX_CHEMBL_HOST")]
    pub host: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .drugtox.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the batches and query URLs without calling ChEMBL
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .drugtox.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of records (default)
    #[default]
    Json,
    /// CSV with a header row
    Csv,
    /// Markdown table with run metadata
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.batch_size == Some(0) {
            return Err("Batch size must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref host) = self.host {
            if !host.starts_with("http://") && !host.starts_with("https://") {
                return Err("ChEMBL host must start with 'http://' or 'https://'".to_string());
            }
        }

        for path in [&self.drugs, &self.scores].into_iter().flatten() {
            if !path.is_file() {
                return Err(format!("Input file does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
