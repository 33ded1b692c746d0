//! Report rendering.
//!
//! JSON and CSV carry only the record rows so they can be fed to other
//! tools; Markdown adds a metadata header for humans.

use crate::cli::OutputFormat;
use crate::models::{ActivityRecord, RankedCandidate, Report, ReportMetadata, ReportRows};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const CYTOTOXICITY_COLUMNS: [&str; 9] = [
    "activity_id",
    "assay_description",
    "assay_type",
    "molecule_pref_name",
    "standard_type",
    "standard_units",
    "standard_value",
    "target_pref_name",
    "pchembl_value",
];

const RANKED_COLUMNS: [&str; 3] = ["drug_name", "confidence_zscore", "cytotoxicity_mean"];

/// Render a report in the requested format.
pub fn render_report(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => generate_json_report(&report.rows),
        OutputFormat::Csv => generate_csv_report(&report.rows),
        OutputFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

/// Generate a JSON array of the report rows.
pub fn generate_json_report(rows: &ReportRows) -> Result<String> {
    let json = match rows {
        ReportRows::Cytotoxicity(records) => serde_json::to_string_pretty(records),
        ReportRows::Ranked(candidates) => serde_json::to_string_pretty(candidates),
    };
    json.context("Failed to serialize report rows")
}

/// Generate CSV with a header row, even when there are no rows.
pub fn generate_csv_report(rows: &ReportRows) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    match rows {
        ReportRows::Cytotoxicity(records) => {
            writer.write_record(CYTOTOXICITY_COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
        }
        ReportRows::Ranked(candidates) => {
            writer.write_record(RANKED_COLUMNS)?;
            for candidate in candidates {
                writer.serialize(candidate)?;
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Generate a Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.rows.kind()));
    output.push_str(&generate_metadata_section(&report.metadata, report.rows.len()));

    match &report.rows {
        ReportRows::Cytotoxicity(records) => output.push_str(&generate_cytotoxicity_table(records)),
        ReportRows::Ranked(candidates) => output.push_str(&generate_ranked_table(candidates)),
    }

    output.push_str(&generate_footer());
    output
}

fn generate_metadata_section(metadata: &ReportMetadata, row_count: usize) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **ChEMBL Host:** {}\n", metadata.chembl_host));
    section.push_str(&format!("- **Drugs Queried:** {}\n", metadata.drugs_queried));
    section.push_str(&format!("- **Batches:** {}\n", metadata.batches));
    section.push_str(&format!(
        "- **Activities Fetched:** {}\n",
        metadata.activities_fetched
    ));
    section.push_str(&format!("- **Rows:** {}\n", row_count));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_cytotoxicity_table(records: &[ActivityRecord]) -> String {
    if records.is_empty() {
        return "## Activities\n\nNo toxicity assays found.\n\n".to_string();
    }

    let mut table = String::new();
    table.push_str("## Activities\n\n");
    table.push_str("| Drug Name | pChEMBL Value | Activity ID | Assay | Standard Type | Standard Value | Standard Units | Target |\n");
    table.push_str("|---|---|---|---|---|---|---|---|\n");

    for record in records {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            cell(record.molecule_pref_name.as_deref()),
            number(record.pchembl_value),
            record
                .activity_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            cell(record.assay_description.as_deref()),
            cell(record.standard_type.as_deref()),
            number(record.standard_value),
            cell(record.standard_units.as_deref()),
            cell(record.target_pref_name.as_deref()),
        ));
    }

    table.push('\n');
    table
}

fn generate_ranked_table(candidates: &[RankedCandidate]) -> String {
    if candidates.is_empty() {
        return "## Candidates\n\nNo drug had both a confidence score and cytotoxicity data.\n\n"
            .to_string();
    }

    let mut table = String::new();
    table.push_str("## Candidates\n\n");
    table.push_str("| Rank | Drug Name | Confidence Z-Score | Cytotoxicity Mean |\n");
    table.push_str("|---|---|---|---|\n");

    for (index, candidate) in candidates.iter().enumerate() {
        table.push_str(&format!(
            "| {} | {} | {:.4} | {} |\n",
            index + 1,
            cell(Some(&candidate.drug_name)),
            candidate.confidence_zscore,
            candidate
                .cytotoxicity_mean
                .map(|mean| format!("{:.4}", mean))
                .unwrap_or_default()
        ));
    }

    table.push('\n');
    table
}

/// Escape a value for use inside a Markdown table cell.
fn cell(value: Option<&str>) -> String {
    value
        .map(|v| v.replace('|', "\\|").replace('\n', " "))
        .unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn generate_footer() -> String {
    "---\n\n*Data from the ChEMBL database (https://www.ebi.ac.uk/chembl/)*\n".to_string()
}

/// Write rendered output to `path`, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
            Ok(())
        }
    }
}
