//! Error types for the fetch-and-rank pipeline.
//!
//! Every failure is fatal for the pass that produced it; nothing in the
//! core retries or recovers locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrugtoxError {
    /// Connection failure, timeout, or a non-success HTTP status.
    #[error("ChEMBL request failed: {0}")]
    Transport(String),

    /// Response body was not the expected `{activities, page_meta}` shape.
    #[error("Malformed ChEMBL response from {url}: {reason}")]
    ResponseFormat { url: String, reason: String },

    /// A field that must be numeric held something else.
    #[error("Non-numeric {field} for activity {activity_id}: {value}")]
    DataFormat {
        field: &'static str,
        activity_id: String,
        value: String,
    },

    #[error("Invalid ChEMBL URL {0}")]
    InvalidUrl(String),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

impl From<reqwest::Error> for DrugtoxError {
    fn from(err: reqwest::Error) -> Self {
        DrugtoxError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DrugtoxError>;
