use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// === Extraction Service Models ===

/// The subset of `yt-dlp --dump-json` output this service reads.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub formats: Vec<FormatVariant>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// One encoding option reported by the extraction service.
///
/// A codec field holding the literal `"none"` marks the stream as absent;
/// a missing codec field is taken as present, which matches how yt-dlp
/// reports progressive formats whose codecs it could not identify.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FormatVariant {
    pub format_id: String,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
}

impl FormatVariant {
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    /// A single file carrying both streams, playable without muxing.
    pub fn is_combined(&self) -> bool {
        self.has_video() && self.has_audio()
    }

    pub fn container(&self) -> &str {
        self.ext.as_deref().unwrap_or("mp4")
    }
}

// === Pipeline Models ===

/// What the resolver hands to the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub title: String,
    pub variants: Vec<FormatVariant>,
    pub thumbnail: Option<String>,
}

/// A display-ready quality choice.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectableOption {
    pub label: String,
    pub format_id: String,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: String,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Delivered { path: PathBuf },
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Delivered { .. })
    }
}

// === HTTP Request/Response Models ===

/// Query string of `GET /` and `GET /formats`.
#[derive(Deserialize, Debug, Default)]
pub struct UrlQuery {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of the `POST /download` form.
///
/// `quality` is the option label, not a format identifier: identifiers may
/// differ between the resolution that rendered the form and the one that
/// serves the download.
#[derive(Deserialize, Debug)]
pub struct DownloadForm {
    pub url: String,
    pub quality: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FormatsResponse {
    pub title: String,
    pub options: Vec<SelectableOption>,
}
