use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::resolve::DisplacementResolver;
use crate::table::Record;

/// Short tons to metric-equivalent long tons.
pub const SHORT_TO_LONG_TONS: f64 = 1.0160469088;

static CONVERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{\s*convert").unwrap());
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{3,}").unwrap());
static LOOSE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3,}|\d+(?:\.\d+)?").unwrap());

#[derive(Debug, Default, PartialEq)]
pub struct Normalized {
    pub standard: Option<i64>,
    pub full_load: Option<i64>,
    /// More numbers than sub-fields and the resolver declined; the record
    /// keeps no displacement fields and is left for manual review.
    pub unresolved: bool,
}

pub fn normalize(record: &Record, resolver: &mut dyn DisplacementResolver) -> Normalized {
    // Non-textual or absent source values are skipped without error.
    match record.text("Ship_displacement") {
        Some(raw) => normalize_text(raw, resolver),
        None => Normalized::default(),
    }
}

/// One or two long-ton figures out of free displacement text.
///
/// Under a convert construct only 3+-digit runs count and values are short
/// tons, converted and truncated. Plain text uses the looser number pattern
/// verbatim. One number goes to full-load when the text says "full",
/// otherwise standard; two numbers are standard then full-load by position;
/// more than two are handed to the resolver, the conversion applying to
/// whatever it supplies.
pub fn normalize_text(raw: &str, resolver: &mut dyn DisplacementResolver) -> Normalized {
    let convert = CONVERT_RE.is_match(raw);
    let pattern = if convert { &DIGIT_RUN_RE } else { &LOOSE_NUMBER_RE };
    let numbers: Vec<f64> = pattern
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    let to_long_tons = |value: f64| -> i64 {
        if convert {
            (value * SHORT_TO_LONG_TONS) as i64
        } else {
            value as i64
        }
    };

    match numbers.as_slice() {
        [] => Normalized::default(),
        [only] => {
            if raw.to_lowercase().contains("full") {
                Normalized {
                    full_load: Some(to_long_tons(*only)),
                    ..Normalized::default()
                }
            } else {
                Normalized {
                    standard: Some(to_long_tons(*only)),
                    ..Normalized::default()
                }
            }
        }
        [standard, full_load] => Normalized {
            standard: Some(to_long_tons(*standard)),
            full_load: Some(to_long_tons(*full_load)),
            unresolved: false,
        },
        _ => match resolver.resolve(raw) {
            Some(resolution) => Normalized {
                standard: Some(to_long_tons(resolution.standard)),
                full_load: resolution.full_load.map(to_long_tons),
                unresolved: false,
            },
            None => Normalized {
                unresolved: true,
                ..Normalized::default()
            },
        },
    }
}

// ── Tests ──
