use std::sync::LazyLock;

use regex::Regex;

use crate::table::Record;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Career fields that may carry the construction year, in priority order.
pub const SOURCE_FIELDS: &[&str] = &[
    "Ship_laid_down",
    "Ship_ordered",
    "Ship_launched",
    "Ship_completed",
    "Ship_christened",
];

/// First four-digit run in the highest-priority field that is present as
/// text. Only that one field is scanned: a present field with no four-digit
/// run ends the search empty-handed rather than falling through to the next
/// candidate. Long-standing behavior that downstream counts were built on;
/// keep it.
pub fn normalize(record: &Record) -> Option<i32> {
    let text = SOURCE_FIELDS.iter().find_map(|field| record.text(field))?;
    YEAR_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (k, v) in fields {
            r.set(k, Value::Text(v.to_string()));
        }
        r
    }

    #[test]
    fn year_from_highest_priority_field() {
        let r = record(&[
            ("Ship_laid_down", "25 May 1859"),
            ("Ship_launched", "launched 1860"),
        ]);
        assert_eq!(normalize(&r), Some(1859));
    }

    #[test]
    fn lower_priority_field_used_when_higher_absent() {
        let r = record(&[("Ship_ordered", "Ship ordered 1871")]);
        assert_eq!(normalize(&r), Some(1871));
    }

    #[test]
    fn present_field_without_year_stops_the_search() {
        // Ship_laid_down is present but has no four-digit run; Ship_ordered
        // would match, yet must not be consulted.
        let r = record(&[
            ("Ship_laid_down", "no year here"),
            ("Ship_ordered", "Ship ordered 1871"),
        ]);
        assert_eq!(normalize(&r), None);
    }

    #[test]
    fn absent_everywhere_is_none() {
        assert_eq!(normalize(&Record::new()), None);
    }

    #[test]
    fn embedded_markup_does_not_matter() {
        let r = record(&[("Ship_laid_down", "[[1859]]&nbsp;May")]);
        assert_eq!(normalize(&r), Some(1859));
    }
}
