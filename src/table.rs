use std::collections::BTreeMap;
use std::fs;
use std::mem::take;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Column names shared across pipeline stages.
pub mod columns {
    pub const MANUFACTURER_LABEL: &str = "manufacturerLabel";
    pub const SITELINK: &str = "sitelink";
    pub const NORMALIZED_DATE: &str = "normalized_date";
    pub const NORMALIZED_MANUFACTURER: &str = "normalized_manufacturer";
    pub const NORMALIZED_LENGTH: &str = "normalized_length";
    pub const NORMALIZED_SPEED: &str = "normalized_speed";
    pub const STANDARD_DISPLACEMENT: &str = "standard_displacement";
    pub const FULL_LOAD_DISPLACEMENT: &str = "full_load_displacement";
}

/// A tagged cell value. Absence of a field is represented by the field
/// not being in the record at all, which is distinct from `Text("")`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
        }
    }
}

/// One ship. An open field map plus typed accessors for the normalized
/// columns the later stages depend on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The field's text, only when it is string-typed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_text)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Normalized construction year. Int in-process; parsed from text after
    /// a table round-trip.
    pub fn year(&self) -> Option<i32> {
        match self.fields.get(columns::NORMALIZED_DATE)? {
            Value::Int(n) => Some(*n as i32),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Float(_) => None,
        }
    }

    /// Normalized manufacturer, only when string-typed.
    pub fn manufacturer(&self) -> Option<&str> {
        self.text(columns::NORMALIZED_MANUFACTURER)
    }
}

/// Ordered columns + ordered rows. Row identity is table position, so
/// read/write must never permute rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn push(&mut self, record: Record) {
        for name in record.field_names() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
        self.rows.push(record);
    }

    /// Add the column if it is new; existing rows simply lack the field.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }

    /// Fatal structural check: later stages depend on columns an earlier
    /// stage should have produced.
    pub fn require_column(&self, name: &str) -> Result<()> {
        if !self.columns.iter().any(|c| c == name) {
            bail!(
                "table is missing required column {:?}; run the earlier pipeline stage first",
                name
            );
        }
        Ok(())
    }

    /// Set one cell, growing the column list if needed. `row` must be in
    /// range; the table never grows rows implicitly.
    pub fn set(&mut self, row: usize, column: &str, value: Value) {
        debug_assert!(row < self.rows.len(), "row {} out of range", row);
        self.ensure_column(column);
        self.rows[row].set(column, value);
    }

    /// Read a delimited table. `.tsv` means tab-separated, anything else
    /// comma-separated. First row is the header. Empty cells are absent
    /// fields; all populated cells come back as Text.
    pub fn read(path: &Path) -> Result<Table> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read table {}", path.display()))?;
        let sep = delimiter_for(path);
        let mut raw = parse_rows(&text, sep);
        if raw.is_empty() {
            bail!("table {} has no header row", path.display());
        }
        let columns = raw.remove(0);
        let mut rows = Vec::with_capacity(raw.len());
        for cells in raw {
            let mut record = Record::new();
            for (name, cell) in columns.iter().zip(cells) {
                if !cell.is_empty() {
                    record.set(name, Value::Text(cell));
                }
            }
            rows.push(record);
        }
        Ok(Table { columns, rows })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let sep = delimiter_for(path);
        let mut out = String::new();
        write_row(&mut out, self.columns.iter().map(String::as_str), sep);
        for record in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| record.get(c).map(Value::render).unwrap_or_default())
                .collect();
            write_row(&mut out, cells.iter().map(String::as_str), sep);
        }
        fs::write(path, out)
            .with_context(|| format!("failed to write table {}", path.display()))?;
        Ok(())
    }
}

fn delimiter_for(path: &Path) -> char {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") => '\t',
        _ => ',',
    }
}

/// Quote-aware delimited parser, CRLF tolerant.
fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                // A lone empty cell is a blank line, not a row.
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, sep: char) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(sep);
        }
        first = false;
        if cell.contains(sep) || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

// ── Tests ──
