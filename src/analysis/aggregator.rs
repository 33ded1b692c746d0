//! Cytotoxicity normalization, per-drug aggregation and candidate ranking.
//!
//! This module turns raw ChEMBL activity rows into the two tables the
//! tool reports: a cleaned cytotoxicity table and a ranked candidate list
//! that joins per-drug cytotoxicity means with external confidence scores.

use crate::error::{DrugtoxError, Result};
use crate::models::{ActivityRecord, CytotoxicitySummary, DrugScore, RankedCandidate, RawActivity};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Project raw activities onto the reported columns, coerce numeric
/// columns, and sort by molecule name.
///
/// Null or missing numbers become `None`; any other non-numeric value is a
/// `DataFormat` error. Rows without a molecule name sort last.
pub fn normalize_cytotoxicity(records: Vec<RawActivity>) -> Result<Vec<ActivityRecord>> {
    let mut normalized = records
        .into_iter()
        .map(normalize_record)
        .collect::<Result<Vec<_>>>()?;

    sort_by_molecule(&mut normalized);
    Ok(normalized)
}

fn normalize_record(raw: RawActivity) -> Result<ActivityRecord> {
    let activity_id = raw
        .activity_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());

    let standard_value = coerce_numeric("standard_value", raw.standard_value.as_ref(), &activity_id)?;
    let pchembl_value = coerce_numeric("pchembl_value", raw.pchembl_value.as_ref(), &activity_id)?;

    Ok(ActivityRecord {
        activity_id: raw.activity_id,
        assay_description: raw.assay_description,
        assay_type: raw.assay_type,
        molecule_pref_name: raw.molecule_pref_name,
        standard_type: raw.standard_type,
        standard_units: raw.standard_units,
        standard_value,
        target_pref_name: raw.target_pref_name,
        pchembl_value,
    })
}

/// Coerce a JSON number or numeric string to `f64`.
fn coerce_numeric(field: &'static str, value: Option<&Value>, activity_id: &str) -> Result<Option<f64>> {
    let invalid = |v: &Value| DrugtoxError::DataFormat {
        field,
        activity_id: activity_id.to_string(),
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
                _ => Err(invalid(v)),
            }
        }
        Some(v) => Err(invalid(v)),
    }
}

/// Stable ascending sort on `molecule_pref_name`, unnamed rows last.
pub fn sort_by_molecule(records: &mut [ActivityRecord]) {
    records.sort_by(|a, b| match (&a.molecule_pref_name, &b.molecule_pref_name) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Group records by exact molecule name. Rows without a name are skipped.
pub fn group_by_molecule(records: &[ActivityRecord]) -> BTreeMap<&str, Vec<&ActivityRecord>> {
    let mut grouped: BTreeMap<&str, Vec<&ActivityRecord>> = BTreeMap::new();

    for record in records {
        if let Some(ref name) = record.molecule_pref_name {
            grouped.entry(name.as_str()).or_default().push(record);
        }
    }

    grouped
}

/// Mean `standard_value` per molecule name, then lowercased.
///
/// Null values count toward neither the sum nor the denominator. A drug
/// whose values are all null keeps its row with no mean. Names that differ
/// only in case stay separate rows.
pub fn summarize_cytotoxicity(records: &[ActivityRecord]) -> Vec<CytotoxicitySummary> {
    let mut summaries: Vec<CytotoxicitySummary> = group_by_molecule(records)
        .into_iter()
        .map(|(name, group)| {
            let values: Vec<f64> = group.iter().filter_map(|r| r.standard_value).collect();
            let cytotoxicity_mean = if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            };
            CytotoxicitySummary {
                drug_name: name.to_lowercase(),
                cytotoxicity_mean,
                record_count: values.len(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.drug_name.cmp(&b.drug_name));
    summaries
}

/// Join confidence scores with per-drug cytotoxicity means.
///
/// Score names are matched as given, so callers must supply them in
/// lowercase. Drugs missing from either side are dropped; every matching
/// pair yields a row. The result is sorted ascending by
/// `confidence_zscore` and ties keep score order.
pub fn rank_candidates(scores: &[DrugScore], cytotoxicity: &[ActivityRecord]) -> Vec<RankedCandidate> {
    let mut means: HashMap<String, Vec<Option<f64>>> = HashMap::new();
    for summary in summarize_cytotoxicity(cytotoxicity) {
        means
            .entry(summary.drug_name)
            .or_default()
            .push(summary.cytotoxicity_mean);
    }

    let mut ranked: Vec<RankedCandidate> = scores
        .iter()
        .flat_map(|score| {
            means
                .get(&score.drug_name)
                .into_iter()
                .flatten()
                .map(move |&mean| RankedCandidate {
                    drug_name: score.drug_name.clone(),
                    confidence_zscore: score.confidence_zscore,
                    cytotoxicity_mean: mean,
                })
        })
        .collect();

    ranked.sort_by(|a, b| a.confidence_zscore.total_cmp(&b.confidence_zscore));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(id: u64, name: Option<&str>, standard_value: Value, pchembl_value: Value) -> RawActivity {
        RawActivity {
            activity_id: Some(id),
            assay_description: Some("Cytotoxicity against human cell line".to_string()),
            assay_type: Some("T".to_string()),
            molecule_pref_name: name.map(String::from),
            standard_type: Some("IC50".to_string()),
            standard_units: Some("nM".to_string()),
            standard_value: Some(standard_value),
            target_pref_name: Some("Homo sapiens".to_string()),
            pchembl_value: Some(pchembl_value),
        }
    }

    fn record(name: &str, value: Option<f64>) -> ActivityRecord {
        ActivityRecord {
            activity_id: Some(1),
            assay_description: None,
            assay_type: Some("T".to_string()),
            molecule_pref_name: Some(name.to_string()),
            standard_type: Some("IC50".to_string()),
            standard_units: Some("nM".to_string()),
            standard_value: value,
            target_pref_name: None,
            pchembl_value: Some(5.0),
        }
    }

    fn score(name: &str, zscore: f64) -> DrugScore {
        DrugScore {
            drug_name: name.to_string(),
            confidence_zscore: zscore,
        }
    }

    #[test]
    fn test_normalize_coerces_numeric_strings() {
        let records = vec![raw(7, Some("ASPIRIN"), json!("1500.5"), json!(5.82))];
        let normalized = normalize_cytotoxicity(records).unwrap();

        assert_eq!(normalized[0].standard_value, Some(1500.5));
        assert_eq!(normalized[0].pchembl_value, Some(5.82));
    }

    #[test]
    fn test_normalize_tolerates_null() {
        let records = vec![raw(7, Some("ASPIRIN"), Value::Null, json!(""))];
        let normalized = normalize_cytotoxicity(records).unwrap();

        assert_eq!(normalized[0].standard_value, None);
        assert_eq!(normalized[0].pchembl_value, None);
    }

    #[test]
    fn test_normalize_rejects_non_numeric() {
        let records = vec![raw(42, Some("ASPIRIN"), json!("inactive"), json!(5.0))];

        match normalize_cytotoxicity(records) {
            Err(DrugtoxError::DataFormat { field, activity_id, .. }) => {
                assert_eq!(field, "standard_value");
                assert_eq!(activity_id, "42");
            }
            other => panic!("expected DataFormat error, got {:?}", other),
        }

        let records = vec![raw(43, Some("ASPIRIN"), json!(1.0), json!(true))];
        assert!(matches!(
            normalize_cytotoxicity(records),
            Err(DrugtoxError::DataFormat { field: "pchembl_value", .. })
        ));
    }

    #[test]
    fn test_normalize_sorts_by_molecule() {
        let records = vec![
            raw(1, Some("IBUPROFEN"), json!(1), json!(5)),
            raw(2, None, json!(2), json!(5)),
            raw(3, Some("ASPIRIN"), json!(3), json!(5)),
            raw(4, Some("CAFFEINE"), json!(4), json!(5)),
            raw(5, Some("ASPIRIN"), json!(5), json!(5)),
        ];

        let normalized = normalize_cytotoxicity(records).unwrap();
        let ids: Vec<u64> = normalized.iter().filter_map(|r| r.activity_id).collect();
        assert_eq!(ids, vec![3, 5, 4, 1, 2]);

        for pair in normalized.windows(2) {
            if let (Some(a), Some(b)) = (&pair[0].molecule_pref_name, &pair[1].molecule_pref_name) {
                assert!(a <= b);
            }
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let records = vec![
            raw(1, Some("IBUPROFEN"), json!("12.5"), json!("6.1")),
            raw(2, Some("ASPIRIN"), Value::Null, json!(4)),
            raw(3, Some("ASPIRIN"), json!(30), Value::Null),
        ];

        let once = normalize_cytotoxicity(records).unwrap();
        let twice =
            normalize_cytotoxicity(once.iter().cloned().map(RawActivity::from).collect()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_summarize_excludes_nulls_from_mean() {
        let records = vec![
            record("ASPIRIN", Some(10.0)),
            record("ASPIRIN", None),
            record("ASPIRIN", Some(20.0)),
            record("CAFFEINE", None),
        ];

        let summaries = summarize_cytotoxicity(&records);
        assert_eq!(
            summaries,
            vec![
                CytotoxicitySummary {
                    drug_name: "aspirin".to_string(),
                    cytotoxicity_mean: Some(15.0),
                    record_count: 2,
                },
                CytotoxicitySummary {
                    drug_name: "caffeine".to_string(),
                    cytotoxicity_mean: None,
                    record_count: 0,
                },
            ]
        );
    }

    #[test]
    fn test_group_by_exact_name_then_lowercase() {
        let records = vec![record("ASPIRIN", Some(1.0)), record("Aspirin", Some(3.0))];
        let grouped = group_by_molecule(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get("ASPIRIN").map(|g| g.len()), Some(1));

        let summaries = summarize_cytotoxicity(&records);
        let means: Vec<(&str, Option<f64>)> = summaries
            .iter()
            .map(|s| (s.drug_name.as_str(), s.cytotoxicity_mean))
            .collect();
        assert_eq!(means, vec![("aspirin", Some(1.0)), ("aspirin", Some(3.0))]);

        let ranked = rank_candidates(&[score("aspirin", 0.4)], &records);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_single_match() {
        let cytotoxicity = vec![record("ASPIRIN", Some(10.0)), record("ASPIRIN", Some(20.0))];
        let ranked = rank_candidates(&[score("aspirin", 0.5)], &cytotoxicity);

        assert_eq!(
            ranked,
            vec![RankedCandidate {
                drug_name: "aspirin".to_string(),
                confidence_zscore: 0.5,
                cytotoxicity_mean: Some(15.0),
            }]
        );
    }

    #[test]
    fn test_rank_keeps_drug_with_only_null_values() {
        let cytotoxicity = vec![
            record("ASPIRIN", None),
            record("ASPIRIN", None),
            record("CAFFEINE", Some(3.0)),
        ];
        let scores = vec![score("aspirin", 0.1), score("caffeine", 0.2)];

        let ranked = rank_candidates(&scores, &cytotoxicity);
        assert_eq!(
            ranked,
            vec![
                RankedCandidate {
                    drug_name: "aspirin".to_string(),
                    confidence_zscore: 0.1,
                    cytotoxicity_mean: None,
                },
                RankedCandidate {
                    drug_name: "caffeine".to_string(),
                    confidence_zscore: 0.2,
                    cytotoxicity_mean: Some(3.0),
                },
            ]
        );
    }

    #[test]
    fn test_rank_is_inner_join() {
        let cytotoxicity = vec![
            record("IBUPROFEN", Some(10.0)),
            record("IBUPROFEN", Some(20.0)),
            record("IBUPROFEN", Some(30.0)),
            record("ASPIRIN", Some(5.0)),
        ];
        let scores = vec![score("aspirin", 1.0), score("metformin", 2.0)];

        let ranked = rank_candidates(&scores, &cytotoxicity);
        let names: Vec<&str> = ranked.iter().map(|c| c.drug_name.as_str()).collect();
        assert_eq!(names, vec!["aspirin"]);
    }

    #[test]
    fn test_rank_score_names_are_not_lowercased() {
        let cytotoxicity = vec![record("ASPIRIN", Some(5.0))];
        let ranked = rank_candidates(&[score("Aspirin", 1.0)], &cytotoxicity);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_sorted_by_zscore() {
        let cytotoxicity = vec![
            record("ASPIRIN", Some(1.0)),
            record("CAFFEINE", Some(2.0)),
            record("IBUPROFEN", Some(3.0)),
            record("METFORMIN", Some(4.0)),
        ];
        let scores = vec![
            score("ibuprofen", 2.5),
            score("aspirin", -1.0),
            score("metformin", 0.3),
            score("caffeine", 0.3),
        ];

        let ranked = rank_candidates(&scores, &cytotoxicity);
        let names: Vec<&str> = ranked.iter().map(|c| c.drug_name.as_str()).collect();
        assert_eq!(names, vec!["aspirin", "metformin", "caffeine", "ibuprofen"]);

        for pair in ranked.windows(2) {
            assert!(pair[0].confidence_zscore <= pair[1].confidence_zscore);
        }
    }
}
