use std::sync::LazyLock;

use regex::Regex;

use crate::table::{columns, Record};

// Stripping order matters: piped-link targets first, then the trailing
// comma clause, then parentheticals (twice, for sequential/nested ones),
// then stray markup characters.
static PIPED_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]|]*\|").unwrap());
static TRAILING_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",.*").unwrap());
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(.*\)").unwrap());

/// A clean manufacturer label is used verbatim; otherwise the free-text
/// builder field is stripped of link/parenthetical/list markup. Absent
/// both, no result.
pub fn normalize(record: &Record) -> Option<String> {
    if let Some(label) = record.text(columns::MANUFACTURER_LABEL) {
        return Some(label.to_string());
    }
    let builder = record.text("Ship_builder")?;
    Some(clean_builder(builder))
}

fn clean_builder(builder: &str) -> String {
    let s = PIPED_LINK_RE.replace_all(builder, "");
    let s = TRAILING_CLAUSE_RE.replace_all(&s, "");
    let s = PAREN_RE.replace_all(&s, "");
    let s = PAREN_RE.replace_all(&s, "");
    let s: String = s
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '*'))
        .collect();
    s.trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn builder_record(builder: &str) -> Record {
        let mut r = Record::new();
        r.set("Ship_builder", Value::Text(builder.to_string()));
        r
    }

    #[test]
    fn label_wins_over_builder_text() {
        let mut r = builder_record("[[Vulcan AG|Vulcan]]");
        r.set(columns::MANUFACTURER_LABEL, Value::Text("AG Vulcan Stettin".into()));
        assert_eq!(normalize(&r).as_deref(), Some("AG Vulcan Stettin"));
    }

    #[test]
    fn piped_link_keeps_display_text_and_drops_parenthetical() {
        let r = builder_record("[[Thames Iron Works|Thames Ironworks]] (London)");
        assert_eq!(normalize(&r).as_deref(), Some("Thames Ironworks"));
    }

    #[test]
    fn plain_link_brackets_are_stripped() {
        let r = builder_record("[[Blackwall Yard]]");
        assert_eq!(normalize(&r).as_deref(), Some("Blackwall Yard"));
    }

    #[test]
    fn trailing_comma_clause_is_dropped() {
        let r = builder_record("Samuda Brothers, Cubitt Town, London");
        assert_eq!(normalize(&r).as_deref(), Some("Samuda Brothers"));
    }

    #[test]
    fn asterisk_list_markup_is_stripped() {
        let r = builder_record("*[[Pembroke Dockyard|Pembroke]] (hull)");
        assert_eq!(normalize(&r).as_deref(), Some("Pembroke"));
    }

    #[test]
    fn absent_sources_give_none() {
        assert_eq!(normalize(&Record::new()), None);
    }
}
