use crate::error::ResolutionError;
use crate::extractor::Extractor;
use crate::models::ResolutionResult;
use tracing::{error, info};

/// Title used when the service reports none.
pub const PLACEHOLDER_TITLE: &str = "video";

/// Asks the extraction service which variants exist for `url`.
///
/// No local validation happens here; the service decides what a usable URL is.
pub async fn resolve(extractor: &dyn Extractor, url: &str) -> Result<ResolutionResult, ResolutionError> {
    info!("Fetching formats for URL: {}", url);

    let info = extractor.resolve_metadata(url).await.map_err(|e| {
        error!("Error fetching video info for {}: {}", url, e);
        e
    })?;

    let title = info
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());

    info!("Resolved {} formats for '{}'", info.formats.len(), title);
    Ok(ResolutionResult {
        title,
        variants: info.formats,
        thumbnail: info.thumbnail,
    })
}
