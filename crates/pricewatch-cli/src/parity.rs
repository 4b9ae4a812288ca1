//! Price parity: compare the two most recent snapshots per `(sku, site)`
//! pair and report which direction the price moved.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::snapshot::SnapshotRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityStatus {
    Increased,
    Decreased,
    Constant,
    /// One of the two prices did not parse as a number.
    FormatError,
}

impl fmt::Display for ParityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increased => write!(f, "Increased"),
            Self::Decreased => write!(f, "Decreased"),
            Self::Constant => write!(f, "Constant"),
            Self::FormatError => write!(f, "format error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityReport {
    pub sku: String,
    pub site: String,
    pub status: ParityStatus,
    pub previous: String,
    pub latest: String,
}

/// Compare the last two snapshots of every `(sku, site)` pair. Pairs with
/// fewer than two snapshots are silently skipped; they have nothing to
/// compare yet. Ordering within a pair follows snapshot date, with file
/// order breaking ties for same-day captures.
pub fn check_parity(snapshots: &[SnapshotRow]) -> Vec<ParityReport> {
    let mut groups: BTreeMap<(&str, &str), Vec<&SnapshotRow>> = BTreeMap::new();
    for row in snapshots {
        groups
            .entry((row.sku.as_str(), row.site.as_str()))
            .or_default()
            .push(row);
    }

    let mut reports = Vec::new();
    for ((sku, site), mut entries) in groups {
        if entries.len() < 2 {
            continue;
        }
        entries.sort_by_key(|row| row.date);

        let latest = entries[entries.len() - 1];
        let previous = entries[entries.len() - 2];
        let status = compare_prices(&previous.price, &latest.price);

        reports.push(ParityReport {
            sku: sku.to_string(),
            site: site.to_string(),
            status,
            previous: previous.price.clone(),
            latest: latest.price.clone(),
        });
    }
    reports
}

fn compare_prices(previous: &str, latest: &str) -> ParityStatus {
    let (Ok(prev), Ok(cur)) = (previous.parse::<Decimal>(), latest.parse::<Decimal>()) else {
        return ParityStatus::FormatError;
    };

    match cur.cmp(&prev) {
        Ordering::Greater => ParityStatus::Increased,
        Ordering::Less => ParityStatus::Decreased,
        Ordering::Equal => ParityStatus::Constant,
    }
}
