//! Data models for the cytotoxicity pipeline.
//!
//! Wire-facing types (`DrugQuery`, `RawActivity`, `DrugScore`) mirror the
//! JSON shapes the tool consumes; `ActivityRecord`, `CytotoxicitySummary`
//! and `RankedCandidate` are the typed rows it produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single drug identifier to look up.
///
/// Matching against ChEMBL is case-insensitive; the term is uppercased
/// when the query string is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugQuery {
    pub term: String,
}

impl DrugQuery {
    #[allow(dead_code)] // Constructor used by tests and library callers
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }
}

/// One activity row as ChEMBL returns it, restricted to the columns we keep.
///
/// Numeric columns stay untyped here: ChEMBL serializes `standard_value`
/// as a decimal string and `pchembl_value` as either string or number.
/// Every other field of the API row is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default)]
    pub activity_id: Option<u64>,
    #[serde(default)]
    pub assay_description: Option<String>,
    #[serde(default)]
    pub assay_type: Option<String>,
    #[serde(default)]
    pub molecule_pref_name: Option<String>,
    #[serde(default)]
    pub standard_type: Option<String>,
    #[serde(default)]
    pub standard_units: Option<String>,
    #[serde(default)]
    pub standard_value: Option<Value>,
    #[serde(default)]
    pub target_pref_name: Option<String>,
    #[serde(default)]
    pub pchembl_value: Option<Value>,
}

/// A normalized cytotoxicity row with numeric columns coerced to `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_id: Option<u64>,
    pub assay_description: Option<String>,
    pub assay_type: Option<String>,
    pub molecule_pref_name: Option<String>,
    pub standard_type: Option<String>,
    pub standard_units: Option<String>,
    pub standard_value: Option<f64>,
    pub target_pref_name: Option<String>,
    pub pchembl_value: Option<f64>,
}

impl From<ActivityRecord> for RawActivity {
    fn from(record: ActivityRecord) -> Self {
        Self {
            activity_id: record.activity_id,
            assay_description: record.assay_description,
            assay_type: record.assay_type,
            molecule_pref_name: record.molecule_pref_name,
            standard_type: record.standard_type,
            standard_units: record.standard_units,
            standard_value: record.standard_value.map(Value::from),
            target_pref_name: record.target_pref_name,
            pchembl_value: record.pchembl_value.map(Value::from),
        }
    }
}

/// Mean cytotoxicity for one drug (name lowercased).
///
/// `cytotoxicity_mean` is `None` when every `standard_value` of the drug
/// was null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CytotoxicitySummary {
    pub drug_name: String,
    pub cytotoxicity_mean: Option<f64>,
    /// Number of non-null `standard_value`s that went into the mean.
    pub record_count: usize,
}

/// Externally supplied confidence score for a drug.
///
/// Accepts the scorer's `{term, zscore}` shape as well as the renamed
/// `{drug_name, confidence_zscore}` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugScore {
    #[serde(alias = "term")]
    pub drug_name: String,
    #[serde(alias = "zscore")]
    pub confidence_zscore: f64,
}

/// A drug present in both the cytotoxicity data and the score data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub drug_name: String,
    pub confidence_zscore: f64,
    pub cytotoxicity_mean: Option<f64>,
}

/// Which table a report carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    Cytotoxicity(Vec<ActivityRecord>),
    Ranked(Vec<RankedCandidate>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::Cytotoxicity(rows) => rows.len(),
            ReportRows::Ranked(rows) => rows.len(),
        }
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRows::Cytotoxicity(_) => ReportKind::Cytotoxicity,
            ReportRows::Ranked(_) => ReportKind::Ranked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Cytotoxicity,
    Ranked,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Cytotoxicity => write!(f, "Drug Cytotoxicity (ChEMBL)"),
            ReportKind::Ranked => write!(f, "Ranked Drug Candidates"),
        }
    }
}

/// Metadata about one fetch-and-transform pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub chembl_host: String,
    pub drugs_queried: usize,
    pub batches: usize,
    pub activities_fetched: usize,
    pub duration_seconds: f64,
}

/// A finished report ready to be rendered.
#[derive(Debug, Clone)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub rows: ReportRows,
}
