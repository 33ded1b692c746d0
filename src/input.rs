//! Loading drug lists and confidence scores from JSON files.

use crate::models::{DrugQuery, DrugScore};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `[{"term": ...}]` records, dropping blank terms.
pub fn load_drug_queries(path: &Path) -> Result<Vec<DrugQuery>> {
    let queries: Vec<DrugQuery> = read_json_list(path)?;
    let total = queries.len();

    let queries: Vec<DrugQuery> = queries
        .into_iter()
        .filter(|q| !q.term.trim().is_empty())
        .collect();

    if queries.len() < total {
        warn!("Skipped {} blank drug terms in {}", total - queries.len(), path.display());
    }
    debug!("Loaded {} drug queries from {}", queries.len(), path.display());

    Ok(queries)
}

/// Load `[{"term": ..., "zscore": ...}]` confidence scores.
///
/// Names are kept as given; ranking only matches lowercase names.
pub fn load_scores(path: &Path) -> Result<Vec<DrugScore>> {
    let scores: Vec<DrugScore> = read_json_list(path)?;

    let mixed_case = scores
        .iter()
        .filter(|s| s.drug_name != s.drug_name.to_lowercase())
        .count();
    if mixed_case > 0 {
        warn!(
            "{} score entries are not lowercase and will not match any drug",
            mixed_case
        );
    }
    debug!("Loaded {} scores from {}", scores.len(), path.display());

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_load_drug_queries() {
        let file = write_temp(r#"[{"term": "DrugA"}, {"term": "  "}, {"term": "DrugB", "extra": 1}]"#);
        let queries = load_drug_queries(file.path()).unwrap();
        assert_eq!(queries, vec![DrugQuery::new("DrugA"), DrugQuery::new("DrugB")]);
    }

    #[test]
    fn test_load_scores() {
        let file = write_temp(r#"[{"term": "aspirin", "zscore": 0.5}, {"term": "Caffeine", "zscore": -1}]"#);
        let scores = load_scores(file.path()).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].drug_name, "aspirin");
        assert_eq!(scores[1].confidence_zscore, -1.0);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let file = write_temp(r#"{"term": "not a list"}"#);
        assert!(load_drug_queries(file.path()).is_err());

        let file = write_temp(r#"[{"term": "aspirin", "zscore": "high"}]"#);
        assert!(load_scores(file.path()).is_err());
    }
}
