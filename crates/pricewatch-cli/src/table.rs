//! CSV input/output: one row per product in, the same shape out with site
//! columns overwritten by extraction results.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use pricewatch_core::{ProductRow, ResultsTable};

/// The parsed input file: raw headers and records for mirroring into the
/// output, plus the per-row URL maps the orchestrator consumes.
pub struct InputTable {
    pub headers: csv::StringRecord,
    pub records: Vec<csv::StringRecord>,
    pub rows: Vec<ProductRow>,
}

/// Read the product spreadsheet.
///
/// The identifier column is matched case-insensitively; rows without one get
/// an ordinal identifier so logging stays traceable. Every non-identifier
/// column is carried into the row's URL map; validation of what is actually
/// a URL happens at scrape time, per cell.
pub fn read_input(path: &Path, sku_column: &str) -> anyhow::Result<InputTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let sku_index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(sku_column));
    if sku_index.is_none() {
        tracing::warn!(
            column = sku_column,
            "identifier column not found; using row ordinals"
        );
    }

    let mut records = Vec::new();
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("failed to read row {} of {}", idx + 1, path.display()))?;

        let sku = sku_index
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| format!("Row {}", idx + 1), str::to_string);

        let urls: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(col_idx, (_, value))| {
                Some(*col_idx) != sku_index && !value.trim().is_empty()
            })
            .map(|(_, (header, value))| (header.to_string(), value.trim().to_string()))
            .collect();

        rows.push(ProductRow { sku, urls });
        records.push(record);
    }

    Ok(InputTable {
        headers,
        records,
        rows,
    })
}

/// Write the results file: the input mirrored with every attempted site cell
/// replaced by its price / `"N/A"` / `"Error"` marker. Cells that were never
/// attempted (missing URL, unconfigured column) pass through untouched.
///
/// The filename embeds the capture date so daily runs accumulate instead of
/// overwriting each other.
pub fn write_output(
    input: &InputTable,
    results: &ResultsTable,
    output_dir: &Path,
    date: NaiveDate,
) -> anyhow::Result<PathBuf> {
    let path = output_dir.join(format!("scraped_prices_{date}.csv"));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;

    writer.write_record(&input.headers)?;
    for (idx, record) in input.records.iter().enumerate() {
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        for (col_idx, header) in input.headers.iter().enumerate() {
            if let Some(value) = results.get(idx, header) {
                cells[col_idx] = value.to_string();
            }
        }
        writer.write_record(&cells)?;
    }
    writer.flush()?;

    Ok(path)
}
