pub mod date;
pub mod displacement;
pub mod length;
pub mod manufacturer;
pub mod resolve;
pub mod speed;

use anyhow::Result;
use rayon::prelude::*;
use tracing::info;

use crate::table::{columns, Table, Value};
use resolve::DisplacementResolver;

#[derive(Debug, Default)]
pub struct NormalizeCounts {
    pub dates: usize,
    pub manufacturers: usize,
    pub lengths: usize,
    pub speeds: usize,
    pub displacements: usize,
    pub unresolved: usize,
}

impl NormalizeCounts {
    pub fn print(&self) {
        println!(
            "Normalized {} dates, {} manufacturers, {} lengths, {} speeds, {} displacements ({} left for manual review).",
            self.dates, self.manufacturers, self.lengths, self.speeds, self.displacements, self.unresolved,
        );
    }
}

/// Run the five normalization passes over the whole table. The four pure
/// passes are computed row-parallel and written back in row order; the
/// displacement pass runs sequentially so at most one resolution prompt is
/// ever outstanding.
pub fn run(table: &mut Table, resolver: &mut dyn DisplacementResolver) -> Result<NormalizeCounts> {
    let mut counts = NormalizeCounts::default();
    counts.dates = normalize_dates(table);
    counts.manufacturers = normalize_manufacturers(table);
    counts.lengths = normalize_lengths(table);
    counts.speeds = normalize_speeds(table);
    let (displacements, unresolved) = normalize_displacements(table, resolver);
    counts.displacements = displacements;
    counts.unresolved = unresolved;
    info!(
        "Normalization pass complete over {} rows",
        table.len()
    );
    Ok(counts)
}

pub fn normalize_dates(table: &mut Table) -> usize {
    let years: Vec<Option<i32>> = table.rows().par_iter().map(date::normalize).collect();
    write_back(table, columns::NORMALIZED_DATE, years, |y| {
        Value::Int(y as i64)
    })
}

pub fn normalize_manufacturers(table: &mut Table) -> usize {
    let names: Vec<Option<String>> = table
        .rows()
        .par_iter()
        .map(manufacturer::normalize)
        .collect();
    write_back(table, columns::NORMALIZED_MANUFACTURER, names, Value::Text)
}

pub fn normalize_lengths(table: &mut Table) -> usize {
    let lengths: Vec<Option<Value>> = table.rows().par_iter().map(length::normalize).collect();
    write_back(table, columns::NORMALIZED_LENGTH, lengths, |v| v)
}

pub fn normalize_speeds(table: &mut Table) -> usize {
    let speeds: Vec<Option<String>> = table.rows().par_iter().map(speed::normalize).collect();
    write_back(table, columns::NORMALIZED_SPEED, speeds, Value::Text)
}

pub fn normalize_displacements(
    table: &mut Table,
    resolver: &mut dyn DisplacementResolver,
) -> (usize, usize) {
    table.ensure_column(columns::STANDARD_DISPLACEMENT);
    table.ensure_column(columns::FULL_LOAD_DISPLACEMENT);
    let mut set = 0;
    let mut unresolved = 0;
    for i in 0..table.len() {
        let normalized = displacement::normalize(&table.rows()[i], resolver);
        if normalized.unresolved {
            unresolved += 1;
        }
        if normalized.standard.is_some() || normalized.full_load.is_some() {
            set += 1;
        }
        if let Some(standard) = normalized.standard {
            table.set(i, columns::STANDARD_DISPLACEMENT, Value::Int(standard));
        }
        if let Some(full_load) = normalized.full_load {
            table.set(i, columns::FULL_LOAD_DISPLACEMENT, Value::Int(full_load));
        }
    }
    (set, unresolved)
}

fn write_back<T>(
    table: &mut Table,
    column: &str,
    values: Vec<Option<T>>,
    into_value: impl Fn(T) -> Value,
) -> usize {
    // The column exists after the pass even when nothing normalized.
    table.ensure_column(column);
    let mut set = 0;
    for (i, value) in values.into_iter().enumerate() {
        if let Some(v) = value {
            table.set(i, column, into_value(v));
            set += 1;
        }
    }
    set
}

// ── Tests ──
