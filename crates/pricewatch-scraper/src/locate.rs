//! Declarative locator chains.
//!
//! Retail sites A/B-test and regionalize their markup, so a single selector
//! rots quickly. A chain holds every known historical variant for one price
//! value in priority order; the walk routine is generic and adding a variant
//! is a data change in `sites.yaml`, not a new code path.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use pricewatch_core::LocatorSpec;
use scraper::{Html, Selector};

use crate::normalize::normalize_price;

/// How long to sleep between element polls when waiting on a live page.
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Extraction rule applied to a located element.
#[derive(Debug, Clone)]
pub enum Extract {
    /// The element's text content.
    Text,
    /// A named attribute, e.g. `content` on a meta tag.
    Attr(String),
}

/// One (selector, extraction rule) pair.
#[derive(Debug, Clone)]
pub struct LocatorEntry {
    pub selector: String,
    pub extract: Extract,
}

/// Ordered fallback list of locators for a single price value.
///
/// Entries are tried strictly in declared order; the chain short-circuits on
/// the first non-empty normalized result. A locate miss is not an error — it
/// is a known site-markup variant that happens not to be live for this page.
#[derive(Debug, Clone)]
pub struct LocatorChain {
    entries: Vec<LocatorEntry>,
}

impl LocatorChain {
    #[must_use]
    pub fn new(entries: Vec<LocatorEntry>) -> Self {
        Self { entries }
    }

    /// Build a chain from the site-registry representation.
    #[must_use]
    pub fn from_specs(specs: &[LocatorSpec]) -> Self {
        let entries = specs
            .iter()
            .map(|spec| LocatorEntry {
                selector: spec.selector.clone(),
                extract: spec
                    .attribute
                    .as_ref()
                    .map_or(Extract::Text, |name| Extract::Attr(name.clone())),
            })
            .collect();
        Self { entries }
    }

    /// Walk the chain over a static HTML document.
    ///
    /// Returns the first entry's non-empty normalized text, or `None` when
    /// every entry misses (the caller maps this to `NotFound`). Selectors
    /// that fail to parse are soft misses, logged at debug.
    #[must_use]
    pub fn resolve_static(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        for entry in &self.entries {
            let Ok(selector) = Selector::parse(&entry.selector) else {
                tracing::debug!(selector = %entry.selector, "unparseable selector; trying next");
                continue;
            };

            for element in document.select(&selector) {
                let raw = match &entry.extract {
                    Extract::Text => element.text().collect::<String>(),
                    Extract::Attr(name) => {
                        element.value().attr(name).unwrap_or_default().to_string()
                    }
                };
                let normalized = normalize_price(&raw);
                if !normalized.is_empty() {
                    tracing::debug!(selector = %entry.selector, "locator hit");
                    return Some(normalized);
                }
            }
            tracing::debug!(selector = %entry.selector, "locator miss; trying next");
        }

        None
    }

    /// Walk the chain against a live page.
    ///
    /// Each entry is polled until located or `entry_wait` elapses; element
    /// absence within the wait is a soft miss and the next entry is tried.
    /// No entry is retried within the same attempt.
    pub async fn resolve_browser(&self, page: &Page, entry_wait: Duration) -> Option<String> {
        for entry in &self.entries {
            let deadline = Instant::now() + entry_wait;
            loop {
                if let Ok(element) = page.find_element(entry.selector.as_str()).await {
                    let raw = match &entry.extract {
                        Extract::Text => element.inner_text().await.ok().flatten(),
                        Extract::Attr(name) => element.attribute(name).await.ok().flatten(),
                    };
                    let normalized = normalize_price(raw.as_deref().unwrap_or_default());
                    if !normalized.is_empty() {
                        tracing::debug!(selector = %entry.selector, "locator hit");
                        return Some(normalized);
                    }
                    // Located but empty: the variant is present without a
                    // rendered price. Keep polling until the wait elapses;
                    // lazy-rendered text often fills in late.
                }

                if Instant::now() >= deadline {
                    tracing::debug!(selector = %entry.selector, "locator miss; trying next");
                    break;
                }
                tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
            }
        }

        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
