use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Output-cell marker for a page that was reached but held no price.
pub const NOT_FOUND_MARKER: &str = "N/A";
/// Output-cell marker for a transport or automation fault.
pub const ERROR_MARKER: &str = "Error";

/// One input product: an identifier plus the product-page URL per site
/// column. Immutable once read; a site absent from `urls` is simply not
/// tracked on that site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    pub sku: String,
    pub urls: BTreeMap<String, String>,
}

/// Classified result of a single (product, site) extraction attempt.
///
/// Exactly one outcome is produced per attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Normalized price text: digits and at most one decimal separator.
    Success(String),
    /// Page reached, but no locator in the chain matched.
    NotFound,
    /// Transport or automation fault; detail is for the log, not the sheet.
    Error(String),
}

impl ScrapeOutcome {
    /// The value written into the results-table cell for this outcome.
    #[must_use]
    pub fn cell_value(&self) -> String {
        match self {
            ScrapeOutcome::Success(price) => price.clone(),
            ScrapeOutcome::NotFound => NOT_FOUND_MARKER.to_string(),
            ScrapeOutcome::Error(_) => ERROR_MARKER.to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success(_))
    }
}

/// Accumulated per-run results: one cell per attempted (row, site) pair.
///
/// Mutated only by the orchestrator; adapters never touch it.
#[derive(Debug, Default)]
pub struct ResultsTable {
    cells: BTreeMap<(usize, String), String>,
}

impl ResultsTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a (row, site) cell. Each cell is written at
    /// most once per run; a second write for the same cell is a logic error
    /// and panics in debug builds.
    pub fn record(&mut self, row: usize, site: &str, outcome: &ScrapeOutcome) {
        let previous = self
            .cells
            .insert((row, site.to_string()), outcome.cell_value());
        debug_assert!(
            previous.is_none(),
            "cell ({row}, {site}) classified more than once"
        );
    }

    #[must_use]
    pub fn get(&self, row: usize, site: &str) -> Option<&str> {
        self.cells
            .get(&(row, site.to_string()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.cells
            .iter()
            .map(|((row, site), value)| (*row, site.as_str(), value.as_str()))
    }
}
