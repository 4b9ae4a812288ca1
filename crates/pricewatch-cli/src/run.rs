//! Sequential scrape loop: every product row crossed with every configured
//! site adapter, with randomized pacing between attempts.

use pricewatch_core::{ProductRow, ResultsTable};
use pricewatch_scraper::SiteAdapter;
use rand::Rng;

/// Visit each row's URL for each adapter, in input order, and collect one
/// classified outcome per attempted cell.
///
/// Adapter columns are matched against input headers case-insensitively,
/// the same rule the unconfigured-column warning uses; outcomes are keyed
/// by the input's own header so output cells line up. A row that has no
/// URL for an adapter's column, or whose cell holds something that is not
/// an http(s) URL, is skipped without recording anything; its cell passes
/// through to the output untouched. A failing cell never aborts the run.
pub async fn run_scrape(
    rows: &[ProductRow],
    adapters: &[SiteAdapter],
    pacing_ms: (u64, u64),
) -> ResultsTable {
    let mut results = ResultsTable::new();

    for (row_idx, row) in rows.iter().enumerate() {
        tracing::info!(sku = %row.sku, "scraping product");

        for adapter in adapters {
            let Some((column, url)) = row
                .urls
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(adapter.column()))
            else {
                tracing::debug!(sku = %row.sku, site = adapter.site_name(), "no URL; skipping");
                continue;
            };
            if !is_http_url(url) {
                tracing::warn!(
                    sku = %row.sku,
                    site = adapter.site_name(),
                    cell = %url,
                    "cell is not an http(s) URL; skipping"
                );
                continue;
            }

            let outcome = adapter.extract(url).await;
            tracing::info!(
                sku = %row.sku,
                site = adapter.site_name(),
                result = %outcome.cell_value(),
                "cell recorded"
            );
            results.record(row_idx, column, &outcome);

            pace(pacing_ms).await;
        }
    }

    results
}

fn is_http_url(candidate: &str) -> bool {
    match reqwest::Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Sleep a uniformly random interval within the configured window. A zero
/// upper bound disables pacing, which keeps tests fast.
async fn pace((min_ms, max_ms): (u64, u64)) {
    if max_ms == 0 {
        return;
    }
    let delay = rand::rng().random_range(min_ms..=max_ms);
    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
}
