mod parity;
mod run;
mod snapshot;
mod table;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use pricewatch_core::AppConfig;
use pricewatch_scraper::{PageFetcher, SiteAdapter};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Retail price tracker across configured e-commerce sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch current prices for every product row and write a dated results file.
    Scrape,
    /// Compare the two most recent snapshots per product and report price direction.
    Parity,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pricewatch_core::load_app_config_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape => scrape(&config).await,
        Commands::Parity => parity_report(&config),
    }
}

async fn scrape(config: &AppConfig) -> anyhow::Result<()> {
    let sites = pricewatch_core::load_sites(&config.sites_path)?;
    let input = table::read_input(&config.input_path, &config.sku_column)?;

    warn_unconfigured_columns(&input, &sites.sites, &config.sku_column);

    let fetcher = Arc::new(PageFetcher::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.proxy.as_ref(),
    )?);
    let adapters: Vec<SiteAdapter> = sites
        .sites
        .into_iter()
        .map(|site| SiteAdapter::new(site, config, Arc::clone(&fetcher)))
        .collect();

    let results = run::run_scrape(
        &input.rows,
        &adapters,
        (config.pacing_min_ms, config.pacing_max_ms),
    )
    .await;

    let today = chrono::Local::now().date_naive();
    let output_path = table::write_output(&input, &results, &config.output_dir, today)?;

    // Results are keyed by the input's own headers, so resolve each adapter
    // column to its matching header before collecting snapshots.
    let site_columns: Vec<(&str, &str)> = adapters
        .iter()
        .filter_map(|a| {
            input
                .headers
                .iter()
                .find(|h| h.eq_ignore_ascii_case(a.column()))
                .map(|header| (header, a.site_name()))
        })
        .collect();
    let entries = snapshot::collect_snapshots(&input.rows, &site_columns, &results, today);
    snapshot::append_snapshots(&config.snapshot_path, &entries)?;

    println!(
        "Scraping complete: {} cells recorded, results saved to {}",
        results.len(),
        output_path.display()
    );
    Ok(())
}

/// A URL column with no configured site adapter is skipped, not failed; say
/// so once up front rather than silently ignoring the data.
fn warn_unconfigured_columns(
    input: &table::InputTable,
    sites: &[pricewatch_core::SiteConfig],
    sku_column: &str,
) {
    for header in input.headers.iter() {
        if header.eq_ignore_ascii_case(sku_column) {
            continue;
        }
        if sites.iter().any(|s| s.column.eq_ignore_ascii_case(header)) {
            continue;
        }
        let holds_urls = input
            .rows
            .iter()
            .any(|row| row.urls.get(header).is_some_and(|v| v.starts_with("http")));
        if holds_urls {
            tracing::warn!(
                column = header,
                "input column holds URLs but no site adapter is configured; skipping it"
            );
        }
    }
}

fn parity_report(config: &AppConfig) -> anyhow::Result<()> {
    let snapshots = snapshot::read_snapshots(&config.snapshot_path)?;
    let reports = parity::check_parity(&snapshots);

    if reports.is_empty() {
        println!("no products with two or more snapshots yet");
        return Ok(());
    }

    for report in &reports {
        println!(
            "{} [{}]: {} ({} -> {})",
            report.sku, report.site, report.status, report.previous, report.latest
        );
    }
    Ok(())
}
