//! Typed schema for one page of the ChEMBL activity endpoint.

use crate::error::{DrugtoxError, Result};
use crate::models::RawActivity;
use serde::Deserialize;

/// `GET /chembl/api/data/activity?format=json` response body.
///
/// Both keys are required; a page missing either is rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPage {
    pub activities: Vec<RawActivity>,
    pub page_meta: PageMeta,
}

/// Pagination block. `next` is a path relative to the API host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl PageMeta {
    /// The relative URL of the next page, if there is one.
    pub fn next_path(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

impl ActivityPage {
    /// Parse a response body fetched from `url`.
    pub fn parse(url: &str, body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| DrugtoxError::ResponseFormat {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
