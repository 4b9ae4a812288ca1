//! Per-site extraction: binds a site's configuration to a transport and a
//! locator chain, and classifies every attempt into a [`ScrapeOutcome`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Page;
use pricewatch_core::{AppConfig, ExtractionMode, PreStep, ScrapeOutcome, SiteConfig};

use crate::artifact::capture_html;
use crate::browser::{BrowserSession, EvasionConfig};
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::locate::LocatorChain;

/// Pause after each pre-step so triggered reflows/lazy loads settle.
const PRE_STEP_SETTLE: Duration = Duration::from_millis(500);

/// One configured site: extraction mode, locator chain, pre-steps, timeouts.
///
/// `extract` never propagates a failure to the caller — every exit path
/// produces exactly one classified outcome, and a browser session acquired
/// for the attempt is released on all of them.
pub struct SiteAdapter {
    site: SiteConfig,
    chain: LocatorChain,
    fetcher: Arc<PageFetcher>,
    evasion: EvasionConfig,
    page_load_timeout_secs: u64,
    element_wait: Duration,
    artifact_dir: Option<PathBuf>,
}

impl SiteAdapter {
    #[must_use]
    pub fn new(site: SiteConfig, config: &AppConfig, fetcher: Arc<PageFetcher>) -> Self {
        let chain = LocatorChain::from_specs(&site.locators);
        let element_wait =
            Duration::from_secs(site.element_wait_secs.unwrap_or(config.element_wait_secs));

        Self {
            chain,
            fetcher,
            evasion: EvasionConfig::from_app_config(config),
            page_load_timeout_secs: config.page_load_timeout_secs,
            element_wait,
            artifact_dir: config.artifact_dir.clone(),
            site,
        }
    }

    #[must_use]
    pub fn site_name(&self) -> &str {
        &self.site.name
    }

    /// The input-spreadsheet column this adapter reads URLs from.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.site.column
    }

    /// Extract the displayed price from `url`, classified as exactly one of
    /// `Success` / `NotFound` / `Error`.
    pub async fn extract(&self, url: &str) -> ScrapeOutcome {
        match self.site.mode {
            ExtractionMode::Static => self.extract_static(url).await,
            ExtractionMode::Browser => self.extract_browser(url).await,
        }
    }

    /// Cheap path: one direct GET, no script execution. Chosen by adapter
    /// configuration, not discovered dynamically.
    async fn extract_static(&self, url: &str) -> ScrapeOutcome {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(site = %self.site.name, url, error = %e, "static fetch failed");
                return ScrapeOutcome::Error(e.to_string());
            }
        };

        match self.chain.resolve_static(&body) {
            Some(price) => ScrapeOutcome::Success(price),
            None => {
                tracing::info!(site = %self.site.name, url, "no locator matched");
                ScrapeOutcome::NotFound
            }
        }
    }

    async fn extract_browser(&self, url: &str) -> ScrapeOutcome {
        let session = match BrowserSession::acquire(&self.evasion).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(site = %self.site.name, url, error = %e, "browser acquisition failed");
                return ScrapeOutcome::Error(e.to_string());
            }
        };

        let outcome = self.browser_attempt(&session, url).await;

        if let Some(dir) = &self.artifact_dir {
            let category = match &outcome {
                ScrapeOutcome::Success(_) => "success",
                ScrapeOutcome::NotFound => "not-found",
                ScrapeOutcome::Error(_) => "error",
            };
            capture_html(dir, &self.site.name, category, session.page()).await;
        }

        session.close().await;
        outcome
    }

    async fn browser_attempt(&self, session: &BrowserSession, url: &str) -> ScrapeOutcome {
        if let Err(e) = self.navigate(session.page(), url).await {
            tracing::error!(site = %self.site.name, url, error = %e, "navigation failed");
            return ScrapeOutcome::Error(e.to_string());
        }

        self.run_pre_steps(session.page()).await;

        match self.chain.resolve_browser(session.page(), self.element_wait).await {
            Some(price) => ScrapeOutcome::Success(price),
            None => {
                tracing::info!(site = %self.site.name, url, "no locator matched");
                ScrapeOutcome::NotFound
            }
        }
    }

    async fn navigate(&self, page: &Page, url: &str) -> Result<(), ScrapeError> {
        let timeout = Duration::from_secs(self.page_load_timeout_secs);
        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), ScrapeError>(())
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::NavigationTimeout {
                url: url.to_owned(),
                timeout_secs: self.page_load_timeout_secs,
            }),
        }
    }

    /// Run the site's configured pre-steps best-effort. Pre-steps exist
    /// purely to improve locator success odds; each failure is swallowed and
    /// the remaining steps still run.
    async fn run_pre_steps(&self, page: &Page) {
        for step in &self.site.pre_steps {
            let result = match step {
                PreStep::DismissConsent { selector }
                | PreStep::BypassInterstitial { selector } => click(page, selector).await,
                PreStep::ScrollToLoad { pixels } => page
                    .evaluate(format!("window.scrollTo(0, {pixels})"))
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = result {
                tracing::debug!(site = %self.site.name, step = ?step, error = %e, "pre-step failed; continuing");
            }
            tokio::time::sleep(PRE_STEP_SETTLE).await;
        }
    }
}

async fn click(page: &Page, selector: &str) -> Result<(), chromiumoxide::error::CdpError> {
    let element = page.find_element(selector).await?;
    element.click().await?;
    Ok(())
}
