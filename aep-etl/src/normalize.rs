//! Normalizer: raw metric rows -> canonical documents
//!
//! One document per input row, no cross-row aggregation. Duplicate
//! `(country, metric, source)` triples are deliberately left in place here;
//! the store's upsert key collapses them. The densification step is what
//! upgrades the sparse raw map into the guaranteed full year range.

use aep_common::constants::UNKNOWN_MARKER;
use aep_common::slug::country_slug;
use aep_common::types::{densify_years, CanonicalDocument, RawMetricRow};

/// Normalize a batch of raw rows (ordinary rows and error placeholders
/// alike) into canonical documents.
pub fn normalize_rows(rows: Vec<RawMetricRow>) -> Vec<CanonicalDocument> {
    rows.into_iter().map(normalize_row).collect()
}

fn normalize_row(row: RawMetricRow) -> CanonicalDocument {
    CanonicalDocument {
        country_slug: country_slug(&row.country),
        metric: row
            .metric
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_MARKER.to_string()),
        unit: row.unit,
        sector: if row.sector.is_empty() {
            UNKNOWN_MARKER.to_string()
        } else {
            row.sector
        },
        sub_sector: row.sub_sector,
        sub_sub_sector: row.sub_sub_sector,
        source_link: row.source_link,
        source: row.source,
        yearly: densify_years(&row.yearly),
        country: row.country,
    }
}
