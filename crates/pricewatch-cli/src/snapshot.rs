//! Append-only price history: one `(date, sku, site, price)` row per
//! successful extraction, accumulated across runs for parity reporting.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use pricewatch_core::{ProductRow, ResultsTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub date: NaiveDate,
    pub sku: String,
    pub site: String,
    pub price: String,
}

/// Turn this run's results into history rows. Only successful extractions
/// qualify; `"N/A"` and `"Error"` cells carry no price worth comparing
/// against later.
pub fn collect_snapshots(
    rows: &[ProductRow],
    site_columns: &[(&str, &str)],
    results: &ResultsTable,
    date: NaiveDate,
) -> Vec<SnapshotRow> {
    let mut entries = Vec::new();
    for (row_idx, row) in rows.iter().enumerate() {
        for (column, site) in site_columns {
            let Some(value) = results.get(row_idx, column) else {
                continue;
            };
            if value == pricewatch_core::NOT_FOUND_MARKER || value == pricewatch_core::ERROR_MARKER
            {
                continue;
            }
            entries.push(SnapshotRow {
                date,
                sku: row.sku.clone(),
                site: (*site).to_string(),
                price: value.to_string(),
            });
        }
    }
    entries
}

/// Append `entries` to the history file, creating it (with a header row)
/// on first use.
pub fn append_snapshots(path: &Path, entries: &[SnapshotRow]) -> anyhow::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    tracing::info!(count = entries.len(), path = %path.display(), "snapshots appended");
    Ok(())
}

/// Read the full history. A history file that does not exist yet is an
/// empty history, not an error.
pub fn read_snapshots(path: &Path) -> anyhow::Result<Vec<SnapshotRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;
    let mut entries = Vec::new();
    for record in reader.deserialize() {
        let entry: SnapshotRow =
            record.with_context(|| format!("malformed history row in {}", path.display()))?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_core::ScrapeOutcome;
    use std::collections::BTreeMap;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn product(sku: &str) -> ProductRow {
        ProductRow {
            sku: sku.to_string(),
            urls: BTreeMap::new(),
        }
    }

    #[test]
    fn only_successful_cells_become_snapshots() {
        let rows = vec![product("SKU1"), product("SKU2")];
        let site_columns = vec![("SiteA", "sitea"), ("SiteB", "siteb")];

        let mut results = ResultsTable::new();
        results.record(0, "SiteA", &ScrapeOutcome::Success("1234.00".to_string()));
        results.record(0, "SiteB", &ScrapeOutcome::NotFound);
        results.record(1, "SiteA", &ScrapeOutcome::Error("boom".to_string()));

        let entries = collect_snapshots(&rows, &site_columns, &results, date("2026-08-29"));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sku, "SKU1");
        assert_eq!(entries[0].site, "sitea");
        assert_eq!(entries[0].price, "1234.00");
    }

    #[test]
    fn appends_accumulate_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price_history.csv");

        let first = vec![SnapshotRow {
            date: date("2026-08-28"),
            sku: "SKU1".to_string(),
            site: "sitea".to_string(),
            price: "100".to_string(),
        }];
        let second = vec![SnapshotRow {
            date: date("2026-08-29"),
            sku: "SKU1".to_string(),
            site: "sitea".to_string(),
            price: "120".to_string(),
        }];

        append_snapshots(&path, &first).unwrap();
        append_snapshots(&path, &second).unwrap();

        let all = read_snapshots(&path).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].price, "100");
        assert_eq!(all[1].price, "120");

        // Header written exactly once.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("date,sku,site,price").count(), 1);
    }

    #[test]
    fn missing_history_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let entries = read_snapshots(&dir.path().join("absent.csv")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn empty_append_does_not_create_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("price_history.csv");
        append_snapshots(&path, &[]).unwrap();
        assert!(!path.exists());
    }
}
