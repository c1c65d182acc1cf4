//! Fixed pipeline constants: supported years, country universe, markers

use std::ops::RangeInclusive;

/// Years of interest, inclusive. Every canonical document carries exactly
/// these year keys.
pub const SUPPORTED_YEARS: RangeInclusive<u16> = 2000..=2024;

/// Metric/sector marker for rows emitted after extraction exhausted its
/// retry budget. Carried through the pipeline so the failure shows up in
/// the validation report instead of being dropped.
pub const SCRAPE_ERROR_MARKER: &str = "__SCRAPE_ERROR__";

/// Source label used on error placeholder rows.
pub const ERROR_SOURCE_MARKER: &str = "__ERROR__";

/// Default for absent sector/metric/source fields.
pub const UNKNOWN_MARKER: &str = "Unknown";

/// All African countries tracked by the portal (World Bank / UN naming).
pub const AFRICAN_COUNTRIES: &[&str] = &[
    "Algeria",
    "Angola",
    "Benin",
    "Botswana",
    "Burkina Faso",
    "Burundi",
    "Cabo Verde",
    "Cameroon",
    "Central African Republic",
    "Chad",
    "Comoros",
    "Congo",
    "Congo, Dem. Rep.",
    "Côte d’Ivoire",
    "Djibouti",
    "Egypt",
    "Equatorial Guinea",
    "Eritrea",
    "Eswatini",
    "Ethiopia",
    "Gabon",
    "Gambia",
    "Ghana",
    "Guinea",
    "Guinea-Bissau",
    "Kenya",
    "Lesotho",
    "Liberia",
    "Libya",
    "Madagascar",
    "Malawi",
    "Mali",
    "Mauritania",
    "Mauritius",
    "Morocco",
    "Mozambique",
    "Namibia",
    "Niger",
    "Nigeria",
    "Rwanda",
    "São Tomé and Príncipe",
    "Senegal",
    "Seychelles",
    "Sierra Leone",
    "Somalia",
    "South Africa",
    "South Sudan",
    "Sudan",
    "Tanzania",
    "Togo",
    "Tunisia",
    "Uganda",
    "Zambia",
    "Zimbabwe",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_is_2000_through_2024() {
        assert_eq!(SUPPORTED_YEARS.clone().count(), 25);
        assert_eq!(*SUPPORTED_YEARS.start(), 2000);
        assert_eq!(*SUPPORTED_YEARS.end(), 2024);
    }

    #[test]
    fn country_universe_has_54_entries() {
        assert_eq!(AFRICAN_COUNTRIES.len(), 54);
    }
}
