//! Direct HTTP transport for sites that render price in static markup.

use std::time::Duration;

use pricewatch_core::ProxyConfig;
use reqwest::Client;

use crate::error::ScrapeError;

/// Single-request page fetcher with a realistic header set and optional
/// upstream proxy.
///
/// This is the cheap path: one bounded GET, no script execution, no retry.
/// Retry policy, if any, belongs to the orchestrator. Authenticated proxies
/// are applied here and only here — browser-level proxy configuration cannot
/// reliably carry credentials.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with configured timeout, `User-Agent`, and
    /// optional proxy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid proxy URL or TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Self, ScrapeError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent);

        if let Some(proxy_config) = proxy {
            let mut upstream = reqwest::Proxy::all(proxy_config.server_url())?;
            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                upstream = upstream.basic_auth(username, password);
            }
            builder = builder.proxy(upstream);
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Fetches the HTML body of `url` with a single bounded-timeout request.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::UnexpectedStatus`] — any non-2xx response.
    /// - [`ScrapeError::Http`] — network, DNS, proxy, or timeout fault.
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}
