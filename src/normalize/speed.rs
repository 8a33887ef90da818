use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::table::Record;

pub const KMH_TO_KNOTS: f64 = 0.539956803;

static PRE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.|\d+").unwrap());
static KMH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:,\d+)?)\s*km/h").unwrap());
static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:,\d+)?)").unwrap());

/// Decimal-separator pre-pass: periods become commas, and so does any run
/// of exactly four digits. Narrow and admittedly fragile (a four-digit
/// year inside a speed field is eaten), so it is kept separate and tested
/// on its own.
pub fn preprocess(raw: &str) -> String {
    PRE_RE
        .replace_all(raw, |caps: &Captures| {
            let m = &caps[0];
            if m == "." || m.len() == 4 {
                ",".to_string()
            } else {
                m.to_string()
            }
        })
        .into_owned()
}

pub fn normalize(record: &Record) -> Option<String> {
    record.text("Ship_speed").map(normalize_text)
}

/// Knots as a comma-decimal numeric string. A km/h figure is converted;
/// otherwise a bare leading numeric token is taken verbatim; otherwise the
/// pre-processed text falls through.
pub fn normalize_text(raw: &str) -> String {
    let pre = preprocess(raw);
    if let Some(caps) = KMH_RE.captures(&pre) {
        if let Ok(kmh) = caps[1].replace(',', ".").parse::<f64>() {
            return format!("{:.2}", kmh * KMH_TO_KNOTS).replace('.', ",");
        }
    }
    if let Some(caps) = LEADING_NUMBER_RE.captures(&pre) {
        return caps[1].to_string();
    }
    pre
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_unifies_decimal_separators() {
        assert_eq!(preprocess("13.5 knots"), "13,5 knots");
    }

    #[test]
    fn preprocess_eats_exactly_four_digit_runs() {
        // The known sharp edge: an embedded year collapses to a comma.
        assert_eq!(preprocess("13.5 knots (1898 trial)"), "13,5 knots (, trial)");
        // Shorter and longer runs survive.
        assert_eq!(preprocess("460 km/h"), "460 km/h");
        assert_eq!(preprocess("12345"), "12345");
    }

    #[test]
    fn kmh_converted_to_knots_with_comma_separator() {
        // 46 km/h × 0.539956803 = 24.838...
        assert_eq!(normalize_text("46 km/h"), "24,84");
    }

    #[test]
    fn kmh_wins_over_leading_token() {
        assert_eq!(normalize_text("25 km/h maximum"), "13,50");
    }

    #[test]
    fn decimal_kmh_parses_after_preprocessing() {
        // 20.5 km/h → 20,5 km/h → 11.069... knots
        assert_eq!(normalize_text("20.5 km/h"), "11,07");
    }

    #[test]
    fn bare_leading_token_used_verbatim() {
        assert_eq!(normalize_text("14 knots"), "14");
        assert_eq!(normalize_text("13.5 knots"), "13,5");
    }

    #[test]
    fn unmatched_text_falls_back_to_preprocessed() {
        assert_eq!(normalize_text("unknown"), "unknown");
        assert_eq!(normalize_text("approx. twelve"), "approx, twelve");
    }
}
