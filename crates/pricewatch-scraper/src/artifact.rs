//! Diagnostic artifact capture for offline debugging of selector drift.

use std::path::Path;

use chromiumoxide::Page;

/// Capture the rendered markup of `page` into `dir`, keyed by site name and
/// outcome category.
///
/// Capture exists purely for offline debugging and must never affect the
/// attempt: every failure path logs and returns.
pub(crate) async fn capture_html(dir: &Path, site: &str, category: &str, page: &Page) {
    let content = match page.content().await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(site, category, error = %e, "artifact capture failed; continuing");
            return;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        tracing::warn!(site, category, error = %e, "artifact directory creation failed; continuing");
        return;
    }

    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
    let path = dir.join(format!("{site}-{category}-{timestamp}.html"));
    match tokio::fs::write(&path, content).await {
        Ok(()) => tracing::debug!(site, category, path = %path.display(), "artifact captured"),
        Err(e) => {
            tracing::warn!(site, category, error = %e, "artifact write failed; continuing");
        }
    }
}
