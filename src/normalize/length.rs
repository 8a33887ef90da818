use std::sync::LazyLock;

use regex::Regex;

use crate::table::{Record, Value};

pub const FEET_TO_METRES: f64 = 0.3048;

// Unit marker between number and unit: non-breaking-space entity, plain
// space, or a convert-template pipe. Pattern order is fixed; first match
// wins, not best match.
static METRES_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)(?:&nbsp;| |\|)m").unwrap());
static FEET_DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)(?:&nbsp;| |\|)ft").unwrap());
static FEET_INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:&nbsp;| |\|)ft").unwrap());
static METRES_INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:&nbsp;| |\|)m").unwrap());

pub fn normalize(record: &Record) -> Option<Value> {
    record.text("Ship_length").map(normalize_text)
}

/// Length in metres when one of the four unit patterns matches; otherwise
/// the raw text unchanged, so downstream consumers can tell "could not
/// parse" from a genuine value.
pub fn normalize_text(raw: &str) -> Value {
    if let Some(metres) = captured_number(&METRES_DECIMAL_RE, raw) {
        Value::Float(metres)
    } else if let Some(feet) = captured_number(&FEET_DECIMAL_RE, raw) {
        Value::Float(feet * FEET_TO_METRES)
    } else if let Some(feet) = captured_number(&FEET_INTEGER_RE, raw) {
        Value::Float(feet * FEET_TO_METRES)
    } else if let Some(metres) = captured_number(&METRES_INTEGER_RE, raw) {
        Value::Float(metres)
    } else {
        Value::Text(raw.to_string())
    }
}

fn captured_number(re: &Regex, raw: &str) -> Option<f64> {
    re.captures(raw).and_then(|c| c[1].parse().ok())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn metres(raw: &str) -> f64 {
        match normalize_text(raw) {
            Value::Float(m) => m,
            other => panic!("expected metres for {:?}, got {:?}", raw, other),
        }
    }

    #[test]
    fn decimal_metres_used_as_is() {
        assert!((metres("127.4&nbsp;m") - 127.4).abs() < 1e-6);
        assert!((metres("99.9 m (327 ft)") - 99.9).abs() < 1e-6);
    }

    #[test]
    fn decimal_feet_converted() {
        assert!((metres("120.5 ft") - 36.7284).abs() < 1e-6);
    }

    #[test]
    fn integer_feet_converted() {
        assert!((metres("380&nbsp;ft") - 115.824).abs() < 1e-6);
    }

    #[test]
    fn integer_metres_with_pipe_marker() {
        assert!((metres("40|m") - 40.0).abs() < 1e-6);
    }

    #[test]
    fn decimal_metres_preferred_over_integer_reading() {
        // "127.4 m" must not be read as the integer pattern "4 m".
        assert!((metres("127.4 m") - 127.4).abs() < 1e-6);
    }

    #[test]
    fn unmatched_text_passes_through_unchanged() {
        assert_eq!(
            normalize_text("unknown"),
            Value::Text("unknown".to_string())
        );
        assert_eq!(
            normalize_text("about 300 feet"),
            Value::Text("about 300 feet".to_string())
        );
    }
}
