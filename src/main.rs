//! drugtox - ChEMBL cytotoxicity lookup and drug candidate ranking
//!
//! Fetches toxicity assay activities from ChEMBL for a list of drugs,
//! following pagination batch by batch, and writes either the cleaned
//! activity table or a candidate list ranked by external confidence scores.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments or runtime error (network, malformed data, I/O)

mod analysis;
mod batch;
mod chembl;
mod cli;
mod config;
mod error;
mod input;
mod models;
mod report;

use anyhow::{Context, Result};
use chembl::{ChemblClient, QuerySettings};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use models::{DrugQuery, Report, ReportMetadata, ReportRows};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("drugtox v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .drugtox.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    eprintln!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging on stderr; stdout is reserved for report output.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one fetch-and-transform pass.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    // validate() guarantees --drugs unless --init-config
    let drugs_path = args
        .drugs
        .as_deref()
        .context("--drugs is required")?;
    let drugs = input::load_drug_queries(drugs_path)?;
    let scores = args
        .scores
        .as_deref()
        .map(input::load_scores)
        .transpose()?;

    let settings = QuerySettings::from(&config.chembl);

    if args.dry_run {
        return handle_dry_run(&drugs, &settings, config.batch.size);
    }

    let client = ChemblClient::new(
        settings,
        Duration::from_secs(config.chembl.timeout_seconds),
    )?;

    let outcome = client
        .fetch_all(&drugs, config.batch.size, !args.quiet)
        .await
        .context("Failed to fetch cytotoxicity data from ChEMBL")?;
    let activities_fetched = outcome.activities.len();

    let records = analysis::normalize_cytotoxicity(outcome.activities)?;
    for summary in analysis::summarize_cytotoxicity(&records) {
        match summary.cytotoxicity_mean {
            Some(mean) => debug!(
                "{}: mean standard_value {:.3} over {} activities",
                summary.drug_name, mean, summary.record_count
            ),
            None => debug!("{}: no numeric standard_value", summary.drug_name),
        }
    }

    let rows = match scores {
        Some(scores) => {
            let ranked = analysis::rank_candidates(&scores, &records);
            info!(
                "Ranked {} of {} scored drugs ({} without cytotoxicity data)",
                ranked.len(),
                scores.len(),
                scores.len().saturating_sub(ranked.len())
            );
            ReportRows::Ranked(ranked)
        }
        None => ReportRows::Cytotoxicity(records),
    };

    let report = Report {
        metadata: ReportMetadata {
            generated_at: Utc::now(),
            chembl_host: client.settings().host.clone(),
            drugs_queried: drugs.len(),
            batches: outcome.batches,
            activities_fetched,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        rows,
    };

    let content = report::render_report(&report, config.output.format)?;
    report::write_output(&content, args.output.as_deref())?;

    info!(
        "Wrote {} rows ({:?}) in {:.1}s",
        report.rows.len(),
        config.output.format,
        report.metadata.duration_seconds
    );
    if let Some(ref path) = args.output {
        info!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Handle --dry-run: print batches and their first-page URLs, no network.
fn handle_dry_run(drugs: &[DrugQuery], settings: &QuerySettings, batch_size: usize) -> Result<()> {
    let names: Vec<String> = drugs.iter().map(|q| q.term.clone()).collect();

    println!(
        "Dry run: {} drugs in {} batches of up to {}\n",
        names.len(),
        batch::batch_count(names.len(), batch_size),
        batch_size
    );

    for (index, chunk) in batch::batch(&names, batch_size)?.enumerate() {
        let url = chembl::query_url(settings, chunk)?;
        println!("Batch {} ({} drugs)", index + 1, chunk.len());
        println!("  {}", url);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
