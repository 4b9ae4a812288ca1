//! Automated browser transport for sites that render price via scripts.
//!
//! One session per extraction attempt. Acquisition applies the full evasion
//! configuration before any navigation happens; release terminates the
//! underlying Chromium process regardless of how the attempt ended.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use pricewatch_core::AppConfig;

use crate::error::ScrapeError;

const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Injected via CDP before any page script runs, so detection code that
/// executes at document-start still sees the spoofed values.
const STEALTH_SCRIPT: &str = r"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    window.chrome = { runtime: {} };
";

/// Anti-detection settings applied at session acquisition.
///
/// Evasion is a property of session acquisition, not of the locator chain:
/// every browser-mode attempt gets the same regional identity and the same
/// automation-flag suppression.
#[derive(Debug, Clone)]
pub struct EvasionConfig {
    pub headless: bool,
    pub user_agent: String,
    pub locale: String,
    pub timezone: String,
    /// `scheme://host:port` for Chromium's `--proxy-server` flag. Only set
    /// for unauthenticated proxies; credentials cannot ride along here.
    pub proxy_server: Option<String>,
}

impl EvasionConfig {
    /// Derive the evasion settings from app configuration. Authenticated
    /// proxies are withheld from the browser and stay on the direct-fetch
    /// transport.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let proxy_server = config
            .proxy
            .as_ref()
            .filter(|p| !p.is_authenticated())
            .map(pricewatch_core::ProxyConfig::server_url);

        Self {
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            locale: config.locale.clone(),
            timezone: config.timezone.clone(),
            proxy_server,
        }
    }
}

/// An owned Chromium process plus one page, scoped to a single extraction
/// attempt. Never shared across attempts.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Launches a Chromium instance with the evasion configuration applied
    /// and a blank page ready for navigation.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Launch`] — the browser config was rejected.
    /// - [`ScrapeError::Browser`] — the process failed to start or the
    ///   initial page could not be created.
    pub async fn acquire(config: &EvasionConfig) -> Result<Self, ScrapeError> {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--window-size={VIEWPORT_WIDTH},{VIEWPORT_HEIGHT}"),
            format!("--user-agent={}", config.user_agent),
            format!("--lang={}", config.locale),
        ];
        if let Some(proxy_server) = &config.proxy_server {
            args.push(format!("--proxy-server={proxy_server}"));
        }

        let mut builder = BrowserConfig::builder()
            .viewport(Some(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }))
            .args(args);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(ScrapeError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(browser_config).await?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        // If page setup fails the half-built session must still be torn down,
        // or the Chromium process outlives the attempt.
        match Self::open_page(&browser, config).await {
            Ok(page) => Ok(Self {
                browser,
                page,
                handler_task,
            }),
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    tracing::debug!(error = %close_err, "browser close failed during aborted acquire");
                }
                let _ = browser.wait().await;
                handler_task.abort();
                Err(e)
            }
        }
    }

    async fn open_page(browser: &Browser, config: &EvasionConfig) -> Result<Page, ScrapeError> {
        let page = browser.new_page("about:blank").await?;

        // Stealth must land before the first real navigation.
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await?;

        // Timezone override is best-effort: an unsupported runtime should not
        // block the attempt, it just presents a less consistent identity.
        if let Err(e) = page
            .execute(SetTimezoneOverrideParams::new(config.timezone.clone()))
            .await
        {
            tracing::debug!(timezone = %config.timezone, error = %e, "timezone override failed");
        }

        Ok(page)
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Terminates the session: graceful close, then process reap, then
    /// handler-task abort. Consumes the session so it cannot be reused, and
    /// never fails — teardown problems are logged and swallowed.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!(error = %e, "browser close failed; process will be reaped");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "browser process reap failed");
        }
        self.handler_task.abort();
    }
}
