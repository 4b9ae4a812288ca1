pub mod app_config;
pub mod config;
pub mod sites;
pub mod types;

pub use app_config::{AppConfig, ProxyConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use sites::{load_sites, ExtractionMode, LocatorSpec, PreStep, SiteConfig, SitesFile};
pub use types::{ProductRow, ResultsTable, ScrapeOutcome, ERROR_MARKER, NOT_FOUND_MARKER};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file at {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
