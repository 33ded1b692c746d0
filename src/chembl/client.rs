//! Paginated cytotoxicity queries against the ChEMBL activity endpoint.
//!
//! One call to [`ChemblClient::fetch_cytotoxicity`] issues the filtered
//! activity search for a batch of drug names and then follows
//! `page_meta.next` until the server reports no further page. Pages are
//! fetched one at a time and any failure aborts the batch.

use crate::batch::{batch, batch_count};
use crate::chembl::fetcher::{HttpFetcher, PageFetcher};
use crate::chembl::response::ActivityPage;
use crate::error::{DrugtoxError, Result};
use crate::models::{DrugQuery, RawActivity};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CHEMBL_HOST: &str = "https://www.ebi.ac.uk";
pub const ACTIVITY_PATH: &str = "/chembl/api/data/activity";

/// Fixed filters applied to every activity search.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    /// Scheme and host; `page_meta.next` paths are resolved against it.
    pub host: String,
    /// Minimum pChEMBL value (`pchembl_value__gte`).
    pub pchembl_min: f64,
    /// ChEMBL assay type code; `T` is toxicity.
    pub assay_type: String,
    /// Page size requested from the server.
    pub page_limit: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_CHEMBL_HOST.to_string(),
            pchembl_min: 1.0,
            assay_type: "T".to_string(),
            page_limit: 1000,
        }
    }
}

impl From<&crate::config::ChemblConfig> for QuerySettings {
    fn from(config: &crate::config::ChemblConfig) -> Self {
        Self {
            host: config.host.trim_end_matches('/').to_string(),
            pchembl_min: config.pchembl_min,
            assay_type: config.assay_type.clone(),
            page_limit: config.page_limit,
        }
    }
}

/// Activities gathered across every batch of a run.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub activities: Vec<RawActivity>,
    pub batches: usize,
}

/// ChEMBL activity client, generic over its transport.
pub struct ChemblClient<F = HttpFetcher> {
    fetcher: F,
    settings: QuerySettings,
}

impl ChemblClient<HttpFetcher> {
    /// Create a client that talks HTTP with the given request timeout.
    pub fn new(settings: QuerySettings, timeout: Duration) -> Result<Self> {
        info!(
            "Initializing ChEMBL client for {} (timeout {}s)",
            settings.host,
            timeout.as_secs()
        );
        Ok(Self::with_fetcher(HttpFetcher::new(timeout)?, settings))
    }
}

impl<F: PageFetcher> ChemblClient<F> {
    pub fn with_fetcher(fetcher: F, settings: QuerySettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// URL of the first result page for a batch of drug names.
    pub fn query_url(&self, drug_names: &[String]) -> Result<Url> {
        query_url(&self.settings, drug_names)
    }

    /// Fetch every toxicity-assay activity for `drug_names`, following
    /// pagination to the last page.
    pub async fn fetch_cytotoxicity(&self, drug_names: &[String]) -> Result<Vec<RawActivity>> {
        if drug_names.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.query_url(drug_names)?.to_string();
        let mut results = Vec::new();
        let mut pages = 0usize;

        loop {
            let body = self.fetcher.fetch_page(&url).await?;
            let page = ActivityPage::parse(&url, &body)?;
            pages += 1;

            debug!(
                "Page {} returned {} activities (total_count: {:?})",
                pages,
                page.activities.len(),
                page.page_meta.total_count
            );

            let next = page
                .page_meta
                .next_path()
                .map(|next| format!("{}{}", self.settings.host, next));
            results.extend(page.activities);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        debug!(
            "Fetched {} activities over {} pages for {} drugs",
            results.len(),
            pages,
            drug_names.len()
        );

        Ok(results)
    }

    /// Query every batch of `queries` in order and concatenate the results.
    pub async fn fetch_all(
        &self,
        queries: &[DrugQuery],
        batch_size: usize,
        show_progress: bool,
    ) -> Result<FetchOutcome> {
        let names: Vec<String> = queries.iter().map(|q| q.term.clone()).collect();
        let total = batch_count(names.len(), batch_size);

        let progress_bar = if show_progress {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut outcome = FetchOutcome::default();

        for (index, chunk) in batch(&names, batch_size)?.enumerate() {
            info!("Querying batch {}/{} ({} drugs)", index + 1, total, chunk.len());

            let activities = self.fetch_cytotoxicity(chunk).await?;
            outcome.activities.extend(activities);
            outcome.batches += 1;
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        info!(
            "Collected {} activities from {} batches",
            outcome.activities.len(),
            outcome.batches
        );

        Ok(outcome)
    }
}

/// Build the activity search URL for `drug_names` under `settings`.
pub fn query_url(settings: &QuerySettings, drug_names: &[String]) -> Result<Url> {
    let names = drug_names
        .iter()
        .map(|name| name.trim().to_uppercase())
        .collect::<Vec<_>>()
        .join(",");

    let base = format!("{}{}", settings.host, ACTIVITY_PATH);
    let pchembl_min = settings.pchembl_min.to_string();
    let limit = settings.page_limit.to_string();

    Url::parse_with_params(
        &base,
        &[
            ("molecule_pref_name__in", names.as_str()),
            ("pchembl_value__gte", pchembl_min.as_str()),
            ("assay_type", settings.assay_type.as_str()),
            ("format", "json"),
            ("limit", limit.as_str()),
        ],
    )
    .map_err(|e| DrugtoxError::InvalidUrl(format!("{}: {}", base, e)))
}
