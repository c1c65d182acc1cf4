//! Core data model: raw metric rows and canonical documents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{ERROR_SOURCE_MARKER, SCRAPE_ERROR_MARKER, SUPPORTED_YEARS};
use crate::slug::country_slug;

/// One metric observation for one country from one source, prior to schema
/// normalization.
///
/// The `yearly` map is sparse: only years the provider reported appear, and
/// all keys lie within the supported year range (the parser filters stray
/// years at construction time). A value of `None` records an explicit
/// non-numeric data point ("n/a", null) for that year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetricRow {
    pub country: String,
    pub country_slug: String,
    /// Metric name; `None` when the payload item carried no identifier.
    /// Downstream validation reports this, the parser does not fail on it.
    pub metric: Option<String>,
    pub unit: String,
    pub sector: String,
    pub sub_sector: Option<String>,
    pub sub_sub_sector: Option<String>,
    pub source_link: String,
    pub source: String,
    pub yearly: BTreeMap<u16, Option<f64>>,
}

impl RawMetricRow {
    /// Sentinel row emitted when extraction for a country exhausted its
    /// retry budget. Flows through normalization and validation like any
    /// other row so the failure appears in the final report.
    pub fn error_placeholder(country: &str, source_link: &str) -> Self {
        Self {
            country: country.to_string(),
            country_slug: country_slug(country),
            metric: Some(SCRAPE_ERROR_MARKER.to_string()),
            unit: String::new(),
            sector: SCRAPE_ERROR_MARKER.to_string(),
            sub_sector: None,
            sub_sub_sector: None,
            source_link: source_link.to_string(),
            source: ERROR_SOURCE_MARKER.to_string(),
            yearly: BTreeMap::new(),
        }
    }

    /// Whether this row is the exhausted-extraction sentinel.
    pub fn is_error_placeholder(&self) -> bool {
        self.metric.as_deref() == Some(SCRAPE_ERROR_MARKER)
    }
}

/// The unit of storage: one metric for one country with guaranteed year
/// coverage.
///
/// Invariant: `yearly` holds exactly one entry per supported year, each
/// either a numeric value or an explicit `None` missing marker. Identity
/// key is `(country, metric, source)`; the store enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    pub country: String,
    pub country_slug: String,
    pub metric: String,
    pub unit: String,
    pub sector: String,
    pub sub_sector: Option<String>,
    pub sub_sub_sector: Option<String>,
    pub source_link: String,
    pub source: String,
    pub yearly: BTreeMap<u16, Option<f64>>,
}

impl CanonicalDocument {
    /// Whether this document came from an exhausted-extraction sentinel.
    pub fn is_error_placeholder(&self) -> bool {
        self.metric == SCRAPE_ERROR_MARKER
    }

    /// Years whose value is the explicit missing marker, ascending.
    pub fn missing_years(&self) -> Vec<u16> {
        self.yearly
            .iter()
            .filter_map(|(year, value)| value.is_none().then_some(*year))
            .collect()
    }
}

/// Dense yearly map: every supported year present, initialized to the
/// missing marker, then overlaid with the sparse values.
pub fn densify_years(sparse: &BTreeMap<u16, Option<f64>>) -> BTreeMap<u16, Option<f64>> {
    let mut dense: BTreeMap<u16, Option<f64>> =
        SUPPORTED_YEARS.map(|year| (year, None)).collect();
    for (year, value) in sparse {
        if SUPPORTED_YEARS.contains(year) {
            dense.insert(*year, *value);
        }
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_error_markers_and_empty_years() {
        let row = RawMetricRow::error_placeholder("Chad", "https://example.org/get-country-data");
        assert!(row.is_error_placeholder());
        assert_eq!(row.sector, SCRAPE_ERROR_MARKER);
        assert_eq!(row.source, ERROR_SOURCE_MARKER);
        assert_eq!(row.country_slug, "chad");
        assert!(row.yearly.is_empty());
    }

    #[test]
    fn densify_fills_every_supported_year() {
        let mut sparse = BTreeMap::new();
        sparse.insert(2010, Some(42.0));
        sparse.insert(2011, None);

        let dense = densify_years(&sparse);
        assert_eq!(dense.len(), 25);
        assert_eq!(dense[&2010], Some(42.0));
        assert_eq!(dense[&2011], None);
        assert_eq!(dense[&2000], None);
        assert_eq!(dense[&2024], None);
    }

    #[test]
    fn densify_drops_out_of_range_years() {
        let mut sparse = BTreeMap::new();
        sparse.insert(1999, Some(1.0));
        sparse.insert(2025, Some(2.0));

        let dense = densify_years(&sparse);
        assert_eq!(dense.len(), 25);
        assert!(!dense.contains_key(&1999));
        assert!(!dense.contains_key(&2025));
    }

    #[test]
    fn missing_years_lists_none_values_ascending() {
        let mut yearly = densify_years(&BTreeMap::new());
        yearly.insert(2005, Some(3.5));
        let doc = CanonicalDocument {
            country: "Kenya".into(),
            country_slug: "kenya".into(),
            metric: "Electricity Access".into(),
            unit: "%".into(),
            sector: "Power".into(),
            sub_sector: None,
            sub_sub_sector: None,
            source_link: String::new(),
            source: "World Bank".into(),
            yearly,
        };

        let missing = doc.missing_years();
        assert_eq!(missing.len(), 24);
        assert!(!missing.contains(&2005));
        assert!(missing.windows(2).all(|w| w[0] < w[1]));
    }
}
