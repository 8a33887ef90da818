use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::infobox;
use crate::source::{FetchError, WikiSource};
use crate::table::{columns, Table, Value};
use crate::wikitext;

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub template: String,
    pub parameters: Vec<String>,
    pub language: String,
    pub limit: Option<usize>,
    pub concurrency: usize,
}

#[derive(Debug, Default)]
pub struct EnrichStats {
    pub attempted: usize,
    pub enriched: usize,
    pub missing: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl EnrichStats {
    pub fn print(&self) {
        println!(
            "Enriched {} of {} linked rows ({} articles missing, {} errors; {} rows without sitelink).",
            self.enriched, self.attempted, self.missing, self.errors, self.skipped,
        );
    }
}

/// Fetch each row's article and merge the extracted infobox parameters into
/// the table. Rows without a usable sitelink are left untouched; a fetch or
/// parse failure costs only its own row. Output row order is the table's
/// own, whatever order fetches complete in.
pub async fn enrich_table(
    table: &mut Table,
    source: &WikiSource,
    options: &EnrichOptions,
) -> Result<EnrichStats> {
    table.require_column(columns::SITELINK)?;

    let mut stats = EnrichStats::default();
    let mut jobs: Vec<(usize, String)> = Vec::new();
    for (i, record) in table.rows().iter().enumerate() {
        match record.text(columns::SITELINK).and_then(article_title) {
            Some(title) => jobs.push((i, title)),
            None => stats.skipped += 1,
        }
    }
    if let Some(limit) = options.limit {
        jobs.truncate(limit);
    }
    stats.attempted = jobs.len();
    if jobs.is_empty() {
        return Ok(stats);
    }

    info!(
        "Fetching {} articles ({} parameters of {:?})",
        jobs.len(),
        options.parameters.len(),
        options.template
    );

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let concurrency = options.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (tx, mut rx) =
        tokio::sync::mpsc::channel::<(usize, Result<String, FetchError>)>(concurrency * 2);

    for (row, title) in jobs {
        let source = source.clone();
        let language = options.language.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let result = source.fetch_document(&title, &language).await;
            let _ = tx.send((row, result)).await;
        });
    }
    drop(tx);

    let mut fetched: Vec<(usize, Result<String, FetchError>)> = Vec::new();
    while let Some(item) = rx.recv().await {
        fetched.push(item);
        pb.inc(1);
    }
    pb.finish_and_clear();

    merge_fetched(table, fetched, options, &mut stats);
    Ok(stats)
}

/// Merge fetch results into the table in row order, so column creation
/// order does not depend on completion order. A failed fetch costs only
/// its own row.
fn merge_fetched(
    table: &mut Table,
    mut fetched: Vec<(usize, Result<String, FetchError>)>,
    options: &EnrichOptions,
    stats: &mut EnrichStats,
) {
    fetched.sort_by_key(|(row, _)| *row);
    for (row, result) in fetched {
        match result {
            Ok(document) => {
                let templates = wikitext::parse_templates(&document);
                let fields =
                    infobox::extract(&templates, &options.template, &options.parameters);
                if !fields.is_empty() {
                    stats.enriched += 1;
                }
                for (name, value) in fields {
                    table.set(row, &name, Value::Text(value));
                }
            }
            Err(FetchError::NotFound { title }) => {
                debug!("No article for row {}: {}", row, title);
                stats.missing += 1;
            }
            Err(e) => {
                warn!("Fetch failed for row {}: {}", row, e);
                stats.errors += 1;
            }
        }
    }
}

/// Article title from the trailing path segment of a sitelink URL,
/// percent-decoded the way the wiki API expects it.
fn article_title(sitelink: &str) -> Option<String> {
    let segment = sitelink.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment.starts_with("http") {
        return None;
    }
    Some(percent_decode(segment))
}

fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ── Tests ──
