//! Configuration file handling.
//!
//! This module handles loading `.drugtox.toml` and merging it with
//! command-line arguments.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".drugtox.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// ChEMBL API settings.
    #[serde(default)]
    pub chembl: ChemblConfig,

    /// Batching settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// ChEMBL endpoint and query filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemblConfig {
    /// Scheme and host of the ChEMBL web services.
    #[serde(default = "default_host")]
    pub host: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Page size requested per activity query.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Minimum pChEMBL value.
    /// pChEMBL >= 5 (10 uM) is the usual cut-off for real binding activity;
    /// 1 keeps nearly everything.
    #[serde(default = "default_pchembl_min")]
    pub pchembl_min: f64,

    /// Assay type code ("T" = toxicity).
    #[serde(default = "default_assay_type")]
    pub assay_type: String,
}

impl Default for ChemblConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_seconds: default_timeout(),
            page_limit: default_page_limit(),
            pchembl_min: default_pchembl_min(),
            assay_type: default_assay_type(),
        }
    }
}

fn default_host() -> String {
    crate::chembl::client::DEFAULT_CHEMBL_HOST.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_page_limit() -> usize {
    1000
}

fn default_pchembl_min() -> f64 {
    1.0
}

fn default_assay_type() -> String {
    "T".to_string()
}

/// Batching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Drug names per ChEMBL query.
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    crate::batch::DEFAULT_BATCH_SIZE
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.drugtox.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(size) = args.batch_size {
            self.batch.size = size;
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
        if let Some(ref host) = args.host {
            self.chembl.host = host.clone();
        }
        if let Some(timeout) = args.timeout {
            self.chembl.timeout_seconds = timeout;
        }
    }

    /// Check merged settings that the file may set but clap never sees.
    pub fn validate(&self) -> Result<()> {
        if self.chembl.timeout_seconds == 0 {
            anyhow::bail!("chembl.timeout_seconds must be at least 1 second");
        }
        if self.batch.size == 0 {
            anyhow::bail!("batch.size must be at least 1");
        }
        if !self.chembl.host.starts_with("http://") && !self.chembl.host.starts_with("https://") {
            anyhow::bail!("chembl.host must start with 'http://' or 'https://'");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
