//! Integration tests for static-mode extraction through `SiteAdapter`.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. Browser-mode paths need a provisioned Chromium
//! and are exercised against live sites, not here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch_core::{
    AppConfig, ExtractionMode, LocatorSpec, ScrapeOutcome, SiteConfig,
};
use pricewatch_scraper::{PageFetcher, SiteAdapter};

fn test_app_config(timeout_secs: u64) -> AppConfig {
    AppConfig {
        log_level: "info".to_string(),
        sites_path: PathBuf::from("./config/sites.yaml"),
        input_path: PathBuf::from("./products.csv"),
        output_dir: PathBuf::from("."),
        snapshot_path: PathBuf::from("./price_history.csv"),
        sku_column: "sku".to_string(),
        headless: true,
        artifact_dir: None,
        user_agent: "pricewatch-test/0.1".to_string(),
        locale: "en-IN".to_string(),
        timezone: "Asia/Kolkata".to_string(),
        request_timeout_secs: timeout_secs,
        page_load_timeout_secs: 30,
        element_wait_secs: 1,
        pacing_min_ms: 0,
        pacing_max_ms: 0,
        proxy: None,
    }
}

fn static_site(selectors: &[&str]) -> SiteConfig {
    SiteConfig {
        name: "sitea".to_string(),
        column: "SiteA".to_string(),
        mode: ExtractionMode::Static,
        locators: selectors
            .iter()
            .map(|s| LocatorSpec {
                selector: (*s).to_string(),
                attribute: None,
            })
            .collect(),
        pre_steps: vec![],
        element_wait_secs: None,
    }
}

fn adapter_for(site: SiteConfig, timeout_secs: u64) -> SiteAdapter {
    let config = test_app_config(timeout_secs);
    let fetcher = Arc::new(
        PageFetcher::new(timeout_secs, &config.user_agent, None)
            .expect("failed to build test PageFetcher"),
    );
    SiteAdapter::new(site, &config, fetcher)
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extracts_normalized_price_from_static_markup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><span class="price">₹1,234.00</span></body></html>"#,
        ))
        .mount(&server)
        .await;

    let adapter = adapter_for(static_site(&["span.price"]), 5);
    let outcome = adapter.extract(&format!("{}/a", server.uri())).await;

    assert_eq!(outcome, ScrapeOutcome::Success("1234.00".to_string()));
}

#[tokio::test]
async fn second_chain_entry_used_when_first_misses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><span class="price-v2">₹899</span></body></html>"#,
        ))
        .mount(&server)
        .await;

    let adapter = adapter_for(static_site(&["span.price-v1", "span.price-v2"]), 5);
    let outcome = adapter.extract(&format!("{}/a", server.uri())).await;

    assert_eq!(outcome, ScrapeOutcome::Success("899".to_string()));
}

// ---------------------------------------------------------------------------
// NotFound classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_without_price_element_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>currently unavailable</p></body></html>"),
        )
        .mount(&server)
        .await;

    let adapter = adapter_for(static_site(&["span.price"]), 5);
    let outcome = adapter.extract(&format!("{}/a", server.uri())).await;

    assert_eq!(outcome, ScrapeOutcome::NotFound);
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_error_classified_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = adapter_for(static_site(&["span.price"]), 5);
    let outcome = adapter.extract(&format!("{}/a", server.uri())).await;

    match outcome {
        ScrapeOutcome::Error(detail) => assert!(
            detail.contains("500"),
            "error detail should name the status, got: {detail}"
        ),
        other => panic!("expected Error outcome, got: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_status_classified_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = adapter_for(static_site(&["span.price"]), 5);
    let outcome = adapter.extract(&format!("{}/a", server.uri())).await;

    assert!(
        matches!(outcome, ScrapeOutcome::Error(_)),
        "non-2xx is a transport fault, got: {outcome:?}"
    );
}

#[tokio::test]
async fn fetch_timeout_classified_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<span class="price">₹1</span>"#)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let adapter = adapter_for(static_site(&["span.price"]), 1);
    let outcome = adapter.extract(&format!("{}/a", server.uri())).await;

    assert!(
        matches!(outcome, ScrapeOutcome::Error(_)),
        "timed-out fetch must classify as Error, got: {outcome:?}"
    );
}

#[tokio::test]
async fn unreachable_host_classified_as_error() {
    // Nothing listens on this port; connection is refused immediately.
    let adapter = adapter_for(static_site(&["span.price"]), 2);
    let outcome = adapter.extract("http://127.0.0.1:9/a").await;

    assert!(matches!(outcome, ScrapeOutcome::Error(_)));
}
