//! Validator: data-quality issues over a run's canonical documents
//!
//! Pure read-side pass; it never fails, whatever the data looks like.
//! Output ordering is deterministic for reproducible reports: gap issues in
//! input order, then unit inconsistencies by metric, then missing countries
//! in universe order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::info;

use aep_common::constants::SCRAPE_ERROR_MARKER;
use aep_common::types::CanonicalDocument;

/// Year detail of a gap issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum YearGap {
    /// The document is an exhausted-extraction placeholder; every year is
    /// missing by construction.
    All,
    /// Specific missing years, ascending.
    Years(Vec<u16>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue_type")]
pub enum ValidationIssue {
    /// Document has missing years, or is an error placeholder.
    MissingYearsOrError {
        country: String,
        metric: String,
        years: YearGap,
    },
    /// One metric reported under more than one non-empty unit
    /// (units sorted lexicographically).
    UnitInconsistency { metric: String, units: Vec<String> },
    /// Country from the authoritative universe with no documents at all.
    NoDataForCountry { country: String },
}

/// Summary counts for quick reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub rows_with_gaps: usize,
    pub unit_conflicts: usize,
    pub missing_countries: usize,
    pub total_docs_checked: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

/// Validate a run's documents against the authoritative country universe.
pub fn validate_documents(docs: &[CanonicalDocument], universe: &[&str]) -> ValidationReport {
    let mut gaps = Vec::new();
    let mut countries_with_data: HashSet<&str> = HashSet::new();
    let mut units_by_metric: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for doc in docs {
        countries_with_data.insert(doc.country.as_str());

        if !doc.unit.is_empty() {
            units_by_metric
                .entry(doc.metric.as_str())
                .or_default()
                .insert(doc.unit.as_str());
        }

        if doc.is_error_placeholder() {
            gaps.push(ValidationIssue::MissingYearsOrError {
                country: doc.country.clone(),
                metric: doc.metric.clone(),
                years: YearGap::All,
            });
            continue;
        }

        let missing = doc.missing_years();
        if !missing.is_empty() {
            gaps.push(ValidationIssue::MissingYearsOrError {
                country: doc.country.clone(),
                metric: doc.metric.clone(),
                years: YearGap::Years(missing),
            });
        }
    }

    let unit_issues: Vec<ValidationIssue> = units_by_metric
        .iter()
        .filter(|(metric, units)| **metric != SCRAPE_ERROR_MARKER && units.len() > 1)
        .map(|(metric, units)| ValidationIssue::UnitInconsistency {
            metric: metric.to_string(),
            units: units.iter().map(|u| u.to_string()).collect(),
        })
        .collect();

    let missing_country_issues: Vec<ValidationIssue> = universe
        .iter()
        .filter(|c| !countries_with_data.contains(*c))
        .map(|c| ValidationIssue::NoDataForCountry {
            country: c.to_string(),
        })
        .collect();

    let summary = ValidationSummary {
        rows_with_gaps: gaps.len(),
        unit_conflicts: unit_issues.len(),
        missing_countries: missing_country_issues.len(),
        total_docs_checked: docs.len(),
    };

    info!(
        rows_with_gaps = summary.rows_with_gaps,
        unit_conflicts = summary.unit_conflicts,
        missing_countries = summary.missing_countries,
        total_docs_checked = summary.total_docs_checked,
        "Validation complete"
    );

    let mut issues = gaps;
    issues.extend(unit_issues);
    issues.extend(missing_country_issues);

    ValidationReport { issues, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aep_common::types::{densify_years, RawMetricRow};
    use std::collections::BTreeMap;

    fn doc(country: &str, metric: &str, unit: &str, values: &[(u16, f64)]) -> CanonicalDocument {
        let mut sparse = BTreeMap::new();
        for (year, value) in values {
            sparse.insert(*year, Some(*value));
        }
        CanonicalDocument {
            country: country.to_string(),
            country_slug: country.to_lowercase(),
            metric: metric.to_string(),
            unit: unit.to_string(),
            sector: "Power".to_string(),
            sub_sector: None,
            sub_sub_sector: None,
            source_link: String::new(),
            source: "World Bank".to_string(),
            yearly: densify_years(&sparse),
        }
    }

    fn full_doc(country: &str, metric: &str, unit: &str) -> CanonicalDocument {
        let values: Vec<(u16, f64)> = (2000..=2024).map(|y| (y, 1.0)).collect();
        doc(country, metric, unit, &values)
    }

    #[test]
    fn gap_issue_lists_missing_years_sorted() {
        let d = doc("Kenya", "Electricity Access", "%", &[(2010, 95.5)]);
        let report = validate_documents(&[d], &["Kenya"]);

        assert_eq!(report.summary.rows_with_gaps, 1);
        match &report.issues[0] {
            ValidationIssue::MissingYearsOrError { country, metric, years } => {
                assert_eq!(country, "Kenya");
                assert_eq!(metric, "Electricity Access");
                match years {
                    YearGap::Years(list) => {
                        assert_eq!(list.len(), 24);
                        assert!(list.windows(2).all(|w| w[0] < w[1]));
                        assert!(!list.contains(&2010));
                    }
                    YearGap::All => panic!("expected specific years"),
                }
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn complete_document_yields_no_gap_issue() {
        let report = validate_documents(&[full_doc("Kenya", "Generation", "GWh")], &["Kenya"]);
        assert_eq!(report.summary.rows_with_gaps, 0);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn placeholder_reports_all_detail() {
        let placeholder = RawMetricRow::error_placeholder("Chad", "https://portal.test");
        let docs = crate::normalize::normalize_rows(vec![placeholder]);
        let report = validate_documents(&docs, &["Chad"]);

        assert_eq!(report.summary.rows_with_gaps, 1);
        match &report.issues[0] {
            ValidationIssue::MissingYearsOrError { country, years, .. } => {
                assert_eq!(country, "Chad");
                assert_eq!(*years, YearGap::All);
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn unit_inconsistency_lists_units_sorted() {
        let docs = vec![
            full_doc("Kenya", "Electricity Access", "percent"),
            full_doc("Ghana", "Electricity Access", "%"),
        ];
        let report = validate_documents(&docs, &["Kenya", "Ghana"]);

        assert_eq!(report.summary.unit_conflicts, 1);
        match report.issues.last().unwrap() {
            ValidationIssue::UnitInconsistency { metric, units } => {
                assert_eq!(metric, "Electricity Access");
                assert_eq!(units, &["%".to_string(), "percent".to_string()]);
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn empty_units_do_not_conflict() {
        let docs = vec![
            full_doc("Kenya", "Generation", ""),
            full_doc("Ghana", "Generation", "GWh"),
        ];
        let report = validate_documents(&docs, &["Kenya", "Ghana"]);
        assert_eq!(report.summary.unit_conflicts, 0);
    }

    #[test]
    fn missing_country_count_is_universe_minus_covered() {
        let docs = vec![full_doc("Kenya", "Generation", "GWh")];
        let universe = ["Kenya", "Ghana", "Chad", "Togo"];
        let report = validate_documents(&docs, &universe);

        assert_eq!(report.summary.missing_countries, 3);
        let missing: Vec<&str> = report
            .issues
            .iter()
            .filter_map(|i| match i {
                ValidationIssue::NoDataForCountry { country } => Some(country.as_str()),
                _ => None,
            })
            .collect();
        // Universe order preserved
        assert_eq!(missing, vec!["Ghana", "Chad", "Togo"]);
    }

    #[test]
    fn issue_ordering_is_gaps_then_units_then_missing() {
        let docs = vec![
            doc("Kenya", "Electricity Access", "%", &[(2010, 1.0)]),
            full_doc("Ghana", "Electricity Access", "percent"),
        ];
        let report = validate_documents(&docs, &["Kenya", "Ghana", "Chad"]);

        assert!(matches!(
            report.issues[0],
            ValidationIssue::MissingYearsOrError { .. }
        ));
        assert!(matches!(
            report.issues[1],
            ValidationIssue::UnitInconsistency { .. }
        ));
        assert!(matches!(
            report.issues[2],
            ValidationIssue::NoDataForCountry { .. }
        ));
    }

    #[test]
    fn validation_never_fails_on_empty_input() {
        let report = validate_documents(&[], &["Kenya"]);
        assert_eq!(report.summary.total_docs_checked, 0);
        assert_eq!(report.summary.missing_countries, 1);
    }
}
