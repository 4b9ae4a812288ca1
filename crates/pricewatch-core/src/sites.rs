use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a site's price is extracted: parsed out of the initial HTML response,
/// or located in a script-rendered page via an automated browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Static,
    Browser,
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMode::Static => write!(f, "static"),
            ExtractionMode::Browser => write!(f, "browser"),
        }
    }
}

/// One entry in a site's locator chain: a CSS selector plus the extraction
/// rule applied to the matched element. When `attribute` is absent the
/// element's text content is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorSpec {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

/// A site-specific interaction performed before walking the locator chain.
/// Pre-steps exist purely to improve locator success odds; their failures
/// are swallowed, never escalated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PreStep {
    /// Click a consent/cookie banner's accept button.
    DismissConsent { selector: String },
    /// Scroll down to trigger lazy-loaded content.
    ScrollToLoad { pixels: u32 },
    /// Click through an interstitial "continue to site" page.
    BypassInterstitial { selector: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Input-spreadsheet column holding this site's product URLs.
    pub column: String,
    pub mode: ExtractionMode,
    pub locators: Vec<LocatorSpec>,
    #[serde(default)]
    pub pre_steps: Vec<PreStep>,
    /// Per-locator element wait override; falls back to the app-wide setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_wait_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

/// Load and validate the site registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sites_file: SitesFile = serde_yaml::from_str(&content)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_columns = HashSet::new();

    for site in &sites_file.sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }

        if site.column.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty column name",
                site.name
            )));
        }

        if site.locators.is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty locator chain; at least one selector is required",
                site.name
            )));
        }

        for locator in &site.locators {
            if locator.selector.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "site '{}' has an empty selector in its locator chain",
                    site.name
                )));
            }
        }

        // Pre-steps only run in browser mode; configuring them on a static
        // site is a mistake that would otherwise be silently ignored.
        if site.mode == ExtractionMode::Static && !site.pre_steps.is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' uses static mode but declares pre-steps; pre-steps require browser mode",
                site.name
            )));
        }

        if !seen_names.insert(site.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name: '{}'",
                site.name
            )));
        }

        if !seen_columns.insert(site.column.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site column: '{}' (from site '{}')",
                site.column, site.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, column: &str, selectors: &[&str]) -> SiteConfig {
        SiteConfig {
            name: name.to_string(),
            column: column.to_string(),
            mode: ExtractionMode::Browser,
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

    #[test]
    fn validate_accepts_valid_sites() {
        let file = SitesFile {
            sites: vec![
                site("amazon", "Amazon Link", &["#priceblock_ourprice"]),
                site("nykaa", "Nykaa Link", &[".css-14y2xde span"]),
            ],
        };
        assert!(validate_sites(&file).is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let file = SitesFile {
            sites: vec![site("  ", "Col", &["span.price"])],
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_empty_locator_chain() {
        let file = SitesFile {
            sites: vec![site("amazon", "Amazon Link", &[])],
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(err.to_string().contains("empty locator chain"));
    }

    #[test]
    fn validate_rejects_blank_selector() {
        let file = SitesFile {
            sites: vec![site("amazon", "Amazon Link", &["  "])],
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(err.to_string().contains("empty selector"));
    }

    #[test]
    fn validate_rejects_pre_steps_on_static_site() {
        let mut static_site = site("nykaa", "Nykaa Link", &["span.price"]);
        static_site.mode = ExtractionMode::Static;
        static_site.pre_steps = vec![PreStep::ScrollToLoad { pixels: 400 }];
        let file = SitesFile {
            sites: vec![static_site],
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(err.to_string().contains("pre-steps"));
    }

    #[test]
    fn validate_rejects_duplicate_name() {
        let file = SitesFile {
            sites: vec![
                site("Amazon", "Amazon Link", &["span.a"]),
                site("amazon", "Amazon Alt", &["span.b"]),
            ],
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate site name"));
    }

    #[test]
    fn validate_rejects_duplicate_column() {
        let file = SitesFile {
            sites: vec![
                site("amazon", "Amazon Link", &["span.a"]),
                site("amazon-in", "amazon link", &["span.b"]),
            ],
        };
        let err = validate_sites(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate site column"));
    }

    #[test]
    fn yaml_round_trip_with_pre_steps() {
        let yaml = r##"
sites:
  - name: amazon
    column: "Amazon Link"
    mode: browser
    locators:
      - selector: "#priceblock_ourprice"
      - selector: "#centerCol .a-price-whole"
    pre_steps:
      - action: dismiss_consent
        selector: "#sp-cc-accept"
      - action: scroll_to_load
        pixels: 800
  - name: nykaa
    column: "Nykaa Link"
    mode: static
    locators:
      - selector: ".css-14y2xde span.css-1jczs19"
"##;
        let file: SitesFile = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_sites(&file).is_ok());
        assert_eq!(file.sites.len(), 2);
        assert_eq!(file.sites[0].mode, ExtractionMode::Browser);
        assert_eq!(file.sites[0].locators.len(), 2);
        assert!(matches!(
            file.sites[0].pre_steps[0],
            PreStep::DismissConsent { ref selector } if selector == "#sp-cc-accept"
        ));
        assert!(matches!(
            file.sites[0].pre_steps[1],
            PreStep::ScrollToLoad { pixels: 800 }
        ));
        assert_eq!(file.sites[1].mode, ExtractionMode::Static);
        assert!(file.sites[1].pre_steps.is_empty());
    }
}
