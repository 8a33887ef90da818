use std::collections::BTreeMap;

use anyhow::Result;

use crate::table::{columns, Table};

/// manufacturer → year → ships laid down that year. Dense within the
/// window for every manufacturer present.
pub type Counts = BTreeMap<String, BTreeMap<i32, u32>>;

/// Bucket normalized (manufacturer, year) pairs over `[start_year,
/// end_year)`. A manufacturer with at least one qualifying record gets a
/// zero-filled entry for every window year; one with none does not appear
/// at all. Rows without a string-typed manufacturer or an in-window year
/// are skipped.
pub fn aggregate(table: &Table, start_year: i32, end_year: i32) -> Result<Counts> {
    table.require_column(columns::NORMALIZED_DATE)?;
    table.require_column(columns::NORMALIZED_MANUFACTURER)?;

    let mut counts = Counts::new();
    for record in table.rows() {
        let Some(year) = record.year() else { continue };
        if year < start_year || year >= end_year {
            continue;
        }
        let Some(manufacturer) = record.manufacturer() else {
            continue;
        };
        let per_year = counts
            .entry(manufacturer.to_string())
            .or_insert_with(|| (start_year..end_year).map(|y| (y, 0)).collect());
        *per_year.entry(year).or_insert(0) += 1;
    }
    Ok(counts)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Record, Value};

    fn ship(manufacturer: Option<&str>, year: Option<i32>) -> Record {
        let mut r = Record::new();
        if let Some(m) = manufacturer {
            r.set(columns::NORMALIZED_MANUFACTURER, Value::Text(m.to_string()));
        }
        if let Some(y) = year {
            r.set(columns::NORMALIZED_DATE, Value::Int(y as i64));
        }
        r
    }

    fn table(records: Vec<Record>) -> Table {
        let mut t = Table::new(vec![
            columns::NORMALIZED_DATE.to_string(),
            columns::NORMALIZED_MANUFACTURER.to_string(),
        ]);
        for r in records {
            t.push(r);
        }
        t
    }

    #[test]
    fn dense_counts_for_qualifying_manufacturers_only() {
        let t = table(vec![
            ship(Some("A"), Some(1860)),
            ship(Some("A"), Some(1860)),
            ship(Some("A"), Some(1862)),
            // B has no record in range at all.
            ship(Some("B"), Some(1890)),
        ]);
        let counts = aggregate(&t, 1860, 1863).unwrap();

        let a = counts.get("A").unwrap();
        assert_eq!(a.get(&1860), Some(&2));
        assert_eq!(a.get(&1861), Some(&0));
        assert_eq!(a.get(&1862), Some(&1));
        assert_eq!(a.len(), 3);
        assert!(!counts.contains_key("B"));
    }

    #[test]
    fn window_end_is_exclusive() {
        let t = table(vec![
            ship(Some("A"), Some(1862)),
            ship(Some("A"), Some(1863)),
        ]);
        let counts = aggregate(&t, 1860, 1863).unwrap();
        assert_eq!(counts.get("A").unwrap().get(&1862), Some(&1));
        assert!(!counts.get("A").unwrap().contains_key(&1863));
    }

    #[test]
    fn rows_without_manufacturer_or_year_are_skipped() {
        let t = table(vec![
            ship(None, Some(1860)),
            ship(Some("A"), None),
            ship(Some("A"), Some(1861)),
        ]);
        let counts = aggregate(&t, 1860, 1863).unwrap();
        assert_eq!(counts.len(), 1);
        let total: u32 = counts.get("A").unwrap().values().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn years_parse_after_a_table_round_trip() {
        let mut r = Record::new();
        r.set(columns::NORMALIZED_MANUFACTURER, Value::Text("A".into()));
        r.set(columns::NORMALIZED_DATE, Value::Text("1861".into()));
        let counts = aggregate(&table(vec![r]), 1860, 1863).unwrap();
        assert_eq!(counts.get("A").unwrap().get(&1861), Some(&1));
    }

    #[test]
    fn missing_normalized_columns_are_fatal() {
        let t = Table::new(vec!["shipLabel".to_string()]);
        let err = aggregate(&t, 1860, 1863).unwrap_err();
        assert!(err.to_string().contains(columns::NORMALIZED_DATE));
    }
}
