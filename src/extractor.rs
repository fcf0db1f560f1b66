//! The extraction service seam.
//!
//! Everything that knows how to turn a page URL into media lives behind
//! [`Extractor`]. Production code talks to the `yt-dlp` binary through
//! [`YtDlp`]; tests substitute a double that returns fixed variant lists.

use crate::error::{DownloadError, ResolutionError};
use crate::models::VideoInfo;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing::{debug, error, info};

static PROGRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[download\]\s+(?P<progress>[\d\.]+)%\s+of\s+~?\s*(?P<size>[\d\.\w/]+)(?:\s+at\s+(?P<speed>[\d\.\w/]+))?\s+ETA\s+(?P<eta>[\d:]+)").unwrap()
});

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetches metadata and the list of available variants without downloading.
    async fn resolve_metadata(&self, url: &str) -> Result<VideoInfo, ResolutionError>;

    /// Writes the variant named by `format_id` to exactly `output`.
    async fn download_variant(
        &self,
        url: &str,
        format_id: &str,
        output: &Path,
    ) -> Result<(), DownloadError>;
}

/// A progress line printed by yt-dlp while downloading.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: f64,
    pub size: String,
    pub speed: Option<String>,
    pub eta: String,
}

pub fn parse_progress(line: &str) -> Option<Progress> {
    let caps = PROGRESS_REGEX.captures(line)?;
    Some(Progress {
        percent: caps.name("progress").and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0),
        size: caps.name("size").map_or_else(String::new, |m| m.as_str().to_string()),
        speed: caps.name("speed").map(|m| m.as_str().to_string()),
        eta: caps.name("eta").map_or_else(String::new, |m| m.as_str().to_string()),
    })
}

/// Reduces yt-dlp stderr to the line worth showing a user (the last one).
pub fn stderr_summary(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .unwrap_or("the extraction service exited without a message")
        .to_string()
}

async fn log_progress(stdout: Option<ChildStdout>) {
    let Some(stdout) = stdout else { return };
    let mut lines = LinesStream::new(BufReader::new(stdout).lines());
    while let Some(Ok(line)) = lines.next().await {
        if let Some(progress) = parse_progress(&line) {
            debug!(
                percent = progress.percent,
                size = %progress.size,
                speed = progress.speed.as_deref().unwrap_or("-"),
                eta = %progress.eta,
                "download progress"
            );
        }
    }
}

async fn read_all(stderr: Option<ChildStderr>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stderr) = stderr {
        stderr.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Extraction service backed by the `yt-dlp` command line tool.
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn resolve_metadata(&self, url: &str) -> Result<VideoInfo, ResolutionError> {
        let output = Command::new(&self.binary)
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
            .output()
            .await
            .map_err(ResolutionError::Spawn)?;

        if !output.status.success() {
            error!("yt-dlp metadata fetch failed: {}", String::from_utf8_lossy(&output.stderr));
            return Err(ResolutionError::Service(stderr_summary(&output.stderr)));
        }

        // Multi-entry URLs print one JSON document per line; the first entry wins.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
        let info: VideoInfo = serde_json::from_str(first)?;
        Ok(info)
    }

    async fn download_variant(
        &self,
        url: &str,
        format_id: &str,
        output: &Path,
    ) -> Result<(), DownloadError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-f").arg(format_id)
           .arg("-o").arg(output)
           .arg("--newline")
           .arg("--no-warnings")
           .arg(url)
           .stdout(Stdio::piped())
           .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(DownloadError::Spawn)?;

        // Both pipes are drained together; a chatty stderr must not stall the child.
        let ((), stderr) = tokio::join!(
            log_progress(child.stdout.take()),
            read_all(child.stderr.take())
        );
        let stderr = stderr?;
        let status = child.wait().await?;

        if !status.success() {
            error!("yt-dlp download failed for {}: {}", url, String::from_utf8_lossy(&stderr));
            return Err(DownloadError::Service(stderr_summary(&stderr)));
        }

        if tokio::fs::metadata(output).await.is_err() {
            return Err(DownloadError::Missing(output.to_path_buf()));
        }

        info!("yt-dlp wrote {}", output.display());
        Ok(())
    }
}
