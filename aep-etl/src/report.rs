//! Artifact and report files
//!
//! Intermediate artifacts let later stages rerun without refetching:
//! per-country raw JSON under `raw_json/`, the combined canonical array
//! under `formatted/`, the CSV validation report, and a flat CSV export of
//! the stored collection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::validate::{ValidationIssue, YearGap};
use aep_common::constants::SUPPORTED_YEARS;
use aep_common::types::{CanonicalDocument, RawMetricRow};

const RAW_DIR: &str = "raw_json";
const FORMATTED_FILE: &str = "formatted/formatted_data.json";
const VALIDATION_FILE: &str = "validation_report.csv";

/// Path of the validation report within a reports directory.
pub fn validation_report_path(reports_dir: &Path) -> PathBuf {
    reports_dir.join(VALIDATION_FILE)
}

/// Write one raw JSON artifact per country (grouped by slug).
pub fn write_raw_artifacts(reports_dir: &Path, rows: &[RawMetricRow]) -> Result<Vec<PathBuf>> {
    let raw_dir = reports_dir.join(RAW_DIR);
    fs::create_dir_all(&raw_dir)
        .with_context(|| format!("Failed to create {}", raw_dir.display()))?;

    let mut by_slug: BTreeMap<&str, Vec<&RawMetricRow>> = BTreeMap::new();
    for row in rows {
        by_slug.entry(row.country_slug.as_str()).or_default().push(row);
    }

    let mut written = Vec::with_capacity(by_slug.len());
    for (slug, country_rows) in by_slug {
        let path = raw_dir.join(format!("{}.json", slug));
        let json = serde_json::to_string_pretty(&country_rows)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    info!(files = written.len(), dir = %raw_dir.display(), "Raw artifacts saved");
    Ok(written)
}

/// Load every per-country raw artifact. Unreadable files are skipped with a
/// warning so one corrupt artifact does not block a reformat run.
pub fn load_raw_rows(reports_dir: &Path) -> Result<Vec<RawMetricRow>> {
    let raw_dir = reports_dir.join(RAW_DIR);
    let entries = fs::read_dir(&raw_dir)
        .with_context(|| format!("Raw artifact directory missing: {}", raw_dir.display()))?;

    let mut rows = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str::<Vec<RawMetricRow>>(&content)?))
        {
            Ok(mut file_rows) => rows.append(&mut file_rows),
            Err(err) => warn!(file = %path.display(), error = %err, "Skipping unreadable raw artifact"),
        }
    }

    info!(rows = rows.len(), dir = %raw_dir.display(), "Raw artifacts loaded");
    Ok(rows)
}

/// Write the combined canonical document array.
pub fn write_formatted(reports_dir: &Path, docs: &[CanonicalDocument]) -> Result<PathBuf> {
    let path = reports_dir.join(FORMATTED_FILE);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(docs)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(docs = docs.len(), file = %path.display(), "Formatted artifact saved");
    Ok(path)
}

/// Load the combined canonical document array from a previous run.
pub fn load_formatted(reports_dir: &Path) -> Result<Vec<CanonicalDocument>> {
    let path = reports_dir.join(FORMATTED_FILE);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Formatted artifact missing: {}", path.display()))?;
    let docs = serde_json::from_str(&content)
        .with_context(|| format!("Formatted artifact corrupt: {}", path.display()))?;
    Ok(docs)
}

/// Write the CSV validation report:
/// `issue_type, country, metric, details`.
pub fn write_validation_report(reports_dir: &Path, issues: &[ValidationIssue]) -> Result<PathBuf> {
    let path = validation_report_path(reports_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    writer.write_record(["issue_type", "country", "metric", "details"])?;
    for issue in issues {
        writer.write_record(issue_record(issue))?;
    }
    writer.flush()?;

    info!(issues = issues.len(), file = %path.display(), "Validation report written");
    Ok(path)
}

fn issue_record(issue: &ValidationIssue) -> [String; 4] {
    match issue {
        ValidationIssue::MissingYearsOrError { country, metric, years } => {
            let details = match years {
                YearGap::All => "ALL".to_string(),
                YearGap::Years(list) => list
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(";"),
            };
            [
                "MISSING_YEARS_OR_ERROR".to_string(),
                country.clone(),
                metric.clone(),
                details,
            ]
        }
        ValidationIssue::UnitInconsistency { metric, units } => [
            "UNIT_INCONSISTENCY".to_string(),
            "*ALL*".to_string(),
            metric.clone(),
            units.join(";"),
        ],
        ValidationIssue::NoDataForCountry { country } => [
            "NO_DATA_FOR_COUNTRY".to_string(),
            country.clone(),
            "*".to_string(),
            "NO_ROWS".to_string(),
        ],
    }
}

/// Flat CSV export of stored documents: fixed columns then one column per
/// supported year (empty cell for the missing marker).
pub fn export_metrics_csv(path: &Path, docs: &[CanonicalDocument]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut header = vec![
        "country".to_string(),
        "country_slug".to_string(),
        "metric".to_string(),
        "unit".to_string(),
        "sector".to_string(),
        "sub_sector".to_string(),
        "sub_sub_sector".to_string(),
        "source_link".to_string(),
        "source".to_string(),
    ];
    header.extend(SUPPORTED_YEARS.map(|y| y.to_string()));
    writer.write_record(&header)?;

    for doc in docs {
        let mut record = vec![
            doc.country.clone(),
            doc.country_slug.clone(),
            doc.metric.clone(),
            doc.unit.clone(),
            doc.sector.clone(),
            doc.sub_sector.clone().unwrap_or_default(),
            doc.sub_sub_sector.clone().unwrap_or_default(),
            doc.source_link.clone(),
            doc.source.clone(),
        ];
        for year in SUPPORTED_YEARS {
            let cell = doc
                .yearly
                .get(&year)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(docs = docs.len(), file = %path.display(), "Metrics exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aep_common::types::densify_years;
    use std::collections::BTreeMap;

    fn sample_doc() -> CanonicalDocument {
        let mut sparse = BTreeMap::new();
        sparse.insert(2010, Some(95.5));
        CanonicalDocument {
            country: "Kenya".to_string(),
            country_slug: "kenya".to_string(),
            metric: "Electricity Access".to_string(),
            unit: "%".to_string(),
            sector: "Power".to_string(),
            sub_sector: None,
            sub_sub_sector: None,
            source_link: "https://portal.test".to_string(),
            source: "World Bank".to_string(),
            yearly: densify_years(&sparse),
        }
    }

    fn sample_row() -> RawMetricRow {
        RawMetricRow {
            country: "Kenya".to_string(),
            country_slug: "kenya".to_string(),
            metric: Some("Electricity Access".to_string()),
            unit: "%".to_string(),
            sector: "Power".to_string(),
            sub_sector: None,
            sub_sub_sector: None,
            source_link: "https://portal.test".to_string(),
            source: "World Bank".to_string(),
            yearly: BTreeMap::new(),
        }
    }

    #[test]
    fn raw_artifacts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![sample_row()];

        let written = write_raw_artifacts(dir.path(), &rows).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("raw_json/kenya.json"));

        let loaded = load_raw_rows(dir.path()).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn formatted_artifact_round_trips_dense_years() {
        let dir = tempfile::tempdir().unwrap();
        let docs = vec![sample_doc()];

        write_formatted(dir.path(), &docs).unwrap();
        let loaded = load_formatted(dir.path()).unwrap();

        assert_eq!(loaded, docs);
        assert_eq!(loaded[0].yearly.len(), 25);
    }

    #[test]
    fn validation_report_rows_match_issue_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let issues = vec![
            ValidationIssue::MissingYearsOrError {
                country: "Kenya".to_string(),
                metric: "Electricity Access".to_string(),
                years: YearGap::Years(vec![2000, 2001]),
            },
            ValidationIssue::MissingYearsOrError {
                country: "Chad".to_string(),
                metric: "__SCRAPE_ERROR__".to_string(),
                years: YearGap::All,
            },
            ValidationIssue::UnitInconsistency {
                metric: "Electricity Access".to_string(),
                units: vec!["%".to_string(), "percent".to_string()],
            },
            ValidationIssue::NoDataForCountry { country: "Togo".to_string() },
        ];

        let path = write_validation_report(dir.path(), &issues).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "issue_type,country,metric,details");
        assert_eq!(lines[1], "MISSING_YEARS_OR_ERROR,Kenya,Electricity Access,2000;2001");
        assert_eq!(lines[2], "MISSING_YEARS_OR_ERROR,Chad,__SCRAPE_ERROR__,ALL");
        assert_eq!(lines[3], "UNIT_INCONSISTENCY,*ALL*,Electricity Access,%;percent");
        assert_eq!(lines[4], "NO_DATA_FOR_COUNTRY,Togo,*,NO_ROWS");
    }

    #[test]
    fn export_includes_year_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports/energy_metrics.csv");

        export_metrics_csv(&path, &[sample_doc()]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert!(lines[0].starts_with("country,country_slug,metric"));
        assert!(lines[0].ends_with("2023,2024"));
        assert!(lines[1].contains("95.5"));
    }
}
