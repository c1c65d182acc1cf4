//! Portal payload parser
//!
//! Pure transform from the provider's nested `/get-country-data` payload to
//! flat `RawMetricRow`s. Defaulting rules live in small named helpers so
//! each fallback chain is auditable and testable on its own. Malformed
//! items degrade (missing metric, `Unknown` sector) rather than failing;
//! data quality is the validator's concern, not the parser's.

use std::collections::BTreeMap;

use serde_json::Value;

use aep_common::constants::{SUPPORTED_YEARS, UNKNOWN_MARKER};
use aep_common::slug::country_slug;
use aep_common::types::RawMetricRow;

/// Parse one country's payload (a sequence of metric items) into raw rows.
pub fn parse_portal_payload(items: &[Value], country: &str, source_link: &str) -> Vec<RawMetricRow> {
    items
        .iter()
        .map(|item| parse_item(item, country, source_link))
        .collect()
}

fn parse_item(item: &Value, country: &str, source_link: &str) -> RawMetricRow {
    let id = item.get("_id");

    let metric = id
        .and_then(|id| nonempty_str(id.get("indicator")))
        .or_else(|| id.and_then(|id| nonempty_str(id.get("title"))))
        .map(str::to_string);

    let sector = id
        .and_then(|id| nonempty_str(id.get("pillar")))
        .unwrap_or(UNKNOWN_MARKER)
        .to_string();

    let unit = id
        .and_then(|id| nonempty_str(id.get("unit")))
        .unwrap_or("")
        .to_string();

    RawMetricRow {
        country: country.to_string(),
        country_slug: country_slug(country),
        metric,
        unit,
        sector,
        sub_sector: None,
        sub_sub_sector: None,
        source_link: source_link.to_string(),
        source: join_sources(item.get("source")),
        yearly: parse_data_points(item.get("data")),
    }
}

/// Join all non-empty strings in the item's `source` list with ", ",
/// defaulting to the unknown marker when nothing remains.
fn join_sources(sources: Option<&Value>) -> String {
    let joined = sources
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    if joined.is_empty() {
        UNKNOWN_MARKER.to_string()
    } else {
        joined
    }
}

/// Sparse year -> value map from the item's data-point list. One entry per
/// supported year; years outside the range are dropped, non-numeric values
/// become the explicit missing marker.
fn parse_data_points(data: Option<&Value>) -> BTreeMap<u16, Option<f64>> {
    let mut yearly = BTreeMap::new();

    let Some(points) = data.and_then(Value::as_array) else {
        return yearly;
    };

    for point in points {
        let Some(year) = coerce_year(point.get("year")) else {
            continue;
        };
        if !SUPPORTED_YEARS.contains(&year) {
            continue;
        }
        yearly.insert(year, coerce_value(point.get("value")));
    }

    yearly
}

/// Year fields arrive as numbers or numeric strings.
fn coerce_year(value: Option<&Value>) -> Option<u16> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric coercion with comma-formatted strings allowed ("1,234.5").
/// Anything non-numeric (null, "n/a", absent) is the missing marker.
fn coerce_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Non-empty string field access; empty strings fall through to the next
/// link of the caller's fallback chain.
fn nonempty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
