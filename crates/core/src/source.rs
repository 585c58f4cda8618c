//! Video metadata and caption access.
//!
//! [`VideoSource`] is the seam between the pipeline and the outside world;
//! [`YtDlpSource`] implements it on top of the `yt-dlp` executable.

use std::collections::HashMap;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VloglineError};

/// A raw search hit. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub duration: Option<f64>,
    /// `YYYYMMDD`
    pub upload_date: Option<String>,
    pub thumbnails: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SearchPlaylist {
    #[serde(default)]
    entries: Vec<SearchEntry>,
}

/// One downloadable format of a caption track.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackFormat {
    pub ext: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub subtitles: HashMap<String, Vec<TrackFormat>>,
    #[serde(default)]
    pub automatic_captions: HashMap<String, Vec<TrackFormat>>,
}

pub trait VideoSource {
    /// Search for up to `limit` videos.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchEntry>>;

    /// Caption track listing for a single video.
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo>;

    /// Download a caption payload.
    async fn fetch_track(&self, url: &str) -> Result<String>;
}

pub struct YtDlpSource {
    binary: String,
    http: reqwest::Client,
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpSource {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn dump_json(
        &self,
        target: &str,
        extra: &[&str],
    ) -> std::result::Result<Vec<u8>, String> {
        let output = Command::new(&self.binary)
            .arg(target)
            .args(extra)
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .output()
            .await
            .map_err(|e| e.to_string())?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }

        Ok(output.stdout)
    }
}

impl VideoSource for YtDlpSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchEntry>> {
        let target = format!("ytsearch{limit}:{query}");
        debug!(%target, "searching");
        let stdout = self
            .dump_json(&target, &["--flat-playlist"])
            .await
            .map_err(|reason| VloglineError::SearchFailed {
                query: query.to_string(),
                reason,
            })?;

        let playlist: SearchPlaylist = serde_json::from_slice(&stdout)?;
        Ok(playlist.entries)
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        debug!(%url, "fetching caption listing");
        let stdout = self
            .dump_json(
                url,
                &[
                    "--skip-download",
                    "--extractor-args",
                    "youtube:player_client=android,web",
                ],
            )
            .await
            .map_err(|reason| VloglineError::InfoFetchFailed {
                url: url.to_string(),
                reason,
            })?;

        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn fetch_track(&self, url: &str) -> Result<String> {
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
