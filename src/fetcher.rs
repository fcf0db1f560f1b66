use crate::extractor::Extractor;
use crate::models::{DownloadOutcome, DownloadRequest};
use crate::resolver::PLACEHOLDER_TITLE;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Extension given to every produced file.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Makes a reported title safe to use as a single file name.
///
/// Separators, characters Windows rejects, `%` (yt-dlp template syntax) and
/// control characters become `_`. Surrounding whitespace and dots are trimmed.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<dir>/<sanitized title>.mp4`
pub fn destination_for(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}.{}", sanitize_title(title), OUTPUT_EXTENSION))
}

/// Whether `name` is a file name `destination_for` could have produced.
///
/// Only such names are ever served back from the download directory.
pub fn is_output_name(name: &str) -> bool {
    match name.strip_suffix(&format!(".{}", OUTPUT_EXTENSION)) {
        Some(stem) => !stem.is_empty() && sanitize_title(stem) == stem,
        None => false,
    }
}

/// Makes exactly one attempt to write the requested variant to disk.
///
/// A partially written file is left in place on failure.
pub async fn download(extractor: &dyn Extractor, request: &DownloadRequest) -> DownloadOutcome {
    info!(
        "Downloading format {} of {} to {}",
        request.format_id,
        request.url,
        request.destination.display()
    );

    if let Some(parent) = request.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!("Cannot create {}: {}", parent.display(), e);
            return DownloadOutcome::Failed {
                reason: format!("Download failed: {}", e),
            };
        }
    }

    match extractor
        .download_variant(&request.url, &request.format_id, &request.destination)
        .await
    {
        Ok(()) => {
            info!("Video downloaded as '{}'", request.destination.display());
            DownloadOutcome::Delivered {
                path: request.destination.clone(),
            }
        }
        Err(e) => {
            error!("Download failed for {}: {}", request.url, e);
            DownloadOutcome::Failed {
                reason: format!("Download failed: {}", e),
            }
        }
    }
}
