//! Country slug derivation
//!
//! Slugs are used for raw-artifact filenames, portal page URLs, and the
//! `country_slug` column of stored documents. Derivation must be
//! deterministic: the same country name always yields the same slug.

/// Normalize a country name into a slug-friendly identifier.
///
/// Lowercases, transliterates common Latin diacritics to ASCII, drops
/// punctuation (apostrophes, commas, periods), keeps hyphens, and joins
/// whitespace-separated words with `_`.
///
/// Examples:
/// - "Côte d’Ivoire" -> "cote_divoire"
/// - "Congo, Dem. Rep." -> "congo_dem_rep"
/// - "São Tomé and Príncipe" -> "sao_tome_and_principe"
pub fn country_slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars() {
        let ch = fold_diacritic(ch);

        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_sep = true;
            }
            continue;
        }

        let mapped = match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' => Some(ch.to_ascii_lowercase()),
            '-' => Some('-'),
            _ => None,
        };

        if let Some(c) = mapped {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(c);
        }
    }

    out
}

/// URL path segment for a country page (hyphen-separated variant of the slug).
pub fn country_url_segment(name: &str) -> String {
    country_slug(name).replace('_', "-")
}

/// Transliterate the Latin diacritics that occur in the country universe
/// (and their common neighbors) to plain ASCII.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name() {
        assert_eq!(country_slug("Kenya"), "kenya");
    }

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(country_slug("South Africa"), "south_africa");
        assert_eq!(country_slug("Burkina Faso"), "burkina_faso");
    }

    #[test]
    fn diacritics_and_apostrophes() {
        assert_eq!(country_slug("Côte d’Ivoire"), "cote_divoire");
        assert_eq!(country_slug("São Tomé and Príncipe"), "sao_tome_and_principe");
    }

    #[test]
    fn commas_and_periods_dropped() {
        assert_eq!(country_slug("Congo, Dem. Rep."), "congo_dem_rep");
    }

    #[test]
    fn hyphens_kept() {
        assert_eq!(country_slug("Guinea-Bissau"), "guinea-bissau");
    }

    #[test]
    fn url_segment_uses_hyphens() {
        assert_eq!(country_url_segment("South Africa"), "south-africa");
    }

    #[test]
    fn deterministic() {
        let a = country_slug("Côte d’Ivoire");
        let b = country_slug("Côte d’Ivoire");
        assert_eq!(a, b);
    }
}
