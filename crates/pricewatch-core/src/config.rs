use crate::app_config::{AppConfig, ProxyConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got \"{other}\""),
            }),
        }
    };

    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("PRICEWATCH_SITES_PATH", "./config/sites.yaml"));
    let input_path = PathBuf::from(or_default("PRICEWATCH_INPUT_PATH", "./products.csv"));
    let output_dir = PathBuf::from(or_default("PRICEWATCH_OUTPUT_DIR", "."));
    let snapshot_path = PathBuf::from(or_default(
        "PRICEWATCH_SNAPSHOT_PATH",
        "./price_history.csv",
    ));
    let sku_column = or_default("PRICEWATCH_SKU_COLUMN", "sku");
    let headless = parse_bool("PRICEWATCH_HEADLESS", "true")?;
    let artifact_dir = lookup("PRICEWATCH_ARTIFACT_DIR").ok().map(PathBuf::from);
    let user_agent = or_default("PRICEWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let locale = or_default("PRICEWATCH_LOCALE", "en-IN");
    let timezone = or_default("PRICEWATCH_TIMEZONE", "Asia/Kolkata");

    let request_timeout_secs = parse_u64("PRICEWATCH_REQUEST_TIMEOUT_SECS", "10")?;
    let page_load_timeout_secs = parse_u64("PRICEWATCH_PAGE_LOAD_TIMEOUT_SECS", "30")?;
    let element_wait_secs = parse_u64("PRICEWATCH_ELEMENT_WAIT_SECS", "10")?;
    let pacing_min_ms = parse_u64("PRICEWATCH_PACING_MIN_MS", "1000")?;
    let pacing_max_ms = parse_u64("PRICEWATCH_PACING_MAX_MS", "2000")?;

    if pacing_min_ms > pacing_max_ms {
        return Err(ConfigError::Validation(format!(
            "PRICEWATCH_PACING_MIN_MS ({pacing_min_ms}) must not exceed PRICEWATCH_PACING_MAX_MS ({pacing_max_ms})"
        )));
    }

    let proxy = build_proxy_config(&lookup)?;

    Ok(AppConfig {
        log_level,
        sites_path,
        input_path,
        output_dir,
        snapshot_path,
        sku_column,
        headless,
        artifact_dir,
        user_agent,
        locale,
        timezone,
        request_timeout_secs,
        page_load_timeout_secs,
        element_wait_secs,
        pacing_min_ms,
        pacing_max_ms,
        proxy,
    })
}

/// Absence of `PRICEWATCH_PROXY_HOST` disables proxying entirely; the other
/// proxy vars are ignored in that case.
fn build_proxy_config<F>(lookup: &F) -> Result<Option<ProxyConfig>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let Ok(host) = lookup("PRICEWATCH_PROXY_HOST") else {
        return Ok(None);
    };

    let port_raw = lookup("PRICEWATCH_PROXY_PORT").unwrap_or_else(|_| "8080".to_string());
    let port = port_raw
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_PROXY_PORT".to_string(),
            reason: e.to_string(),
        })?;

    let username = lookup("PRICEWATCH_PROXY_USERNAME").ok();
    let password = lookup("PRICEWATCH_PROXY_PASSWORD").ok();

    if username.is_none() && password.is_some() {
        return Err(ConfigError::Validation(
            "PRICEWATCH_PROXY_PASSWORD set without PRICEWATCH_PROXY_USERNAME".to_string(),
        ));
    }

    Ok(Some(ProxyConfig {
        host,
        port,
        username,
        password,
    }))
}
