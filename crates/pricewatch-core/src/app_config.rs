use std::path::PathBuf;

/// Upstream forward proxy settings.
///
/// An authenticated proxy (username/password present) is only safe to use
/// with the direct HTTP transport; browser-level proxy configuration cannot
/// reliably carry credentials, so the browser only receives unauthenticated
/// proxies.
#[derive(Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    /// The `scheme://host:port` form accepted by both reqwest and Chromium's
    /// `--proxy-server` flag.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username.as_ref().map(|_| "[redacted]"))
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sites_path: PathBuf,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub sku_column: String,
    pub headless: bool,
    pub artifact_dir: Option<PathBuf>,
    pub user_agent: String,
    pub locale: String,
    pub timezone: String,
    pub request_timeout_secs: u64,
    pub page_load_timeout_secs: u64,
    pub element_wait_secs: u64,
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,
    pub proxy: Option<ProxyConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("sites_path", &self.sites_path)
            .field("input_path", &self.input_path)
            .field("output_dir", &self.output_dir)
            .field("snapshot_path", &self.snapshot_path)
            .field("sku_column", &self.sku_column)
            .field("headless", &self.headless)
            .field("artifact_dir", &self.artifact_dir)
            .field("user_agent", &self.user_agent)
            .field("locale", &self.locale)
            .field("timezone", &self.timezone)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_load_timeout_secs", &self.page_load_timeout_secs)
            .field("element_wait_secs", &self.element_wait_secs)
            .field("pacing_min_ms", &self.pacing_min_ms)
            .field("pacing_max_ms", &self.pacing_max_ms)
            .field("proxy", &self.proxy)
            .finish()
    }
}
