//! One interaction cycle of the download form as an explicit state machine.
//!
//! ```text
//! Idle --url--> Resolving --options--> Ready --download--> Downloading --ok--> Delivered
//!                   |                    ^                      |
//!                   +--none--> IdleWithWarning                  +--err--> Ready (with error)
//! ```
//!
//! `Resolving` and `Downloading` only exist while the corresponding call is
//! awaited, so they never appear as values. Nothing is kept between requests:
//! the page echoes the URL and selection back, and each request rebuilds its
//! state from them.

use crate::extractor::Extractor;
use crate::fetcher::{self, destination_for};
use crate::models::{DownloadOutcome, DownloadRequest, SelectableOption};
use crate::resolver;
use crate::selector::selectable;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const WARN_UNRESOLVED: &str = "Couldn't retrieve video info. Check the URL.";
pub const WARN_NO_FORMATS: &str = "No valid video formats found.";
pub const STALE_SELECTION: &str =
    "The selected quality is no longer offered for this video. Pick one again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    /// Terminal for the cycle; the user has to change the URL.
    IdleWithWarning {
        url: String,
        warning: &'static str,
        error: Option<String>,
    },
    Ready(ReadyState),
    Delivered {
        url: String,
        path: PathBuf,
        file_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyState {
    pub url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub options: Vec<SelectableOption>,
    /// Label of the preselected option.
    pub selected: String,
    /// Message from the last failed download, if any.
    pub error: Option<String>,
}

pub struct Session<'a> {
    extractor: &'a dyn Extractor,
    download_dir: &'a Path,
}

impl<'a> Session<'a> {
    pub fn new(extractor: &'a dyn Extractor, download_dir: &'a Path) -> Self {
        Self { extractor, download_dir }
    }

    /// Idle → Resolving → Ready | IdleWithWarning.
    pub async fn submit_url(&self, url: &str) -> SessionState {
        let url = url.trim();
        if url.is_empty() {
            return SessionState::Idle;
        }

        let resolution = match resolver::resolve(self.extractor, url).await {
            Ok(resolution) => resolution,
            Err(e) => {
                return SessionState::IdleWithWarning {
                    url: url.to_string(),
                    warning: WARN_UNRESOLVED,
                    error: Some(format!("Error fetching video info: {}", e)),
                };
            }
        };

        if resolution.variants.is_empty() {
            warn!("Service reported no formats for {}", url);
            return SessionState::IdleWithWarning {
                url: url.to_string(),
                warning: WARN_UNRESOLVED,
                error: None,
            };
        }

        let options = selectable(&resolution.variants);
        let Some(first) = options.first() else {
            warn!("No combined audio+video format among {} for {}", resolution.variants.len(), url);
            return SessionState::IdleWithWarning {
                url: url.to_string(),
                warning: WARN_NO_FORMATS,
                error: None,
            };
        };

        info!("Offering {} of {} formats for {}", options.len(), resolution.variants.len(), url);
        SessionState::Ready(ReadyState {
            url: url.to_string(),
            title: resolution.title,
            thumbnail: resolution.thumbnail,
            selected: first.label.clone(),
            options,
            error: None,
        })
    }

    /// Ready → Downloading → Delivered | Ready.
    ///
    /// `quality` is the label the user picked. The URL is resolved again and
    /// the label is looked up in the fresh option list, because identifiers
    /// are only meaningful within the resolution that produced them.
    pub async fn download(&self, url: &str, quality: &str) -> SessionState {
        let mut ready = match self.submit_url(url).await {
            SessionState::Ready(ready) => ready,
            other => return other,
        };

        // Identical labels describe identical encodings, so the first match is as good as any.
        let Some(format_id) = ready
            .options
            .iter()
            .find(|o| o.label == quality)
            .map(|o| o.format_id.clone())
        else {
            warn!("Quality '{}' is not among the current options for {}", quality, ready.url);
            ready.error = Some(STALE_SELECTION.to_string());
            return SessionState::Ready(ready);
        };

        let request = DownloadRequest {
            url: ready.url.clone(),
            format_id,
            destination: destination_for(self.download_dir, &ready.title),
        };

        match fetcher::download(self.extractor, &request).await {
            DownloadOutcome::Delivered { path } => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                SessionState::Delivered { url: ready.url, path, file_name }
            }
            DownloadOutcome::Failed { reason } => {
                ready.selected = quality.to_string();
                ready.error = Some(reason);
                SessionState::Ready(ready)
            }
        }
    }
}
