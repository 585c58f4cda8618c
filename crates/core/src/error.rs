use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VloglineError {
    #[error("Search failed for {query}: {reason}")]
    SearchFailed { query: String, reason: String },

    #[error("Video info fetch failed for {url}: {reason}")]
    InfoFetchFailed { url: String, reason: String },

    #[error("Invalid API response: {reason}")]
    InvalidApiResponse { reason: String },

    #[error("Checkpoint write failed for {path}: {source}")]
    CheckpointFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

pub type Result<T> = std::result::Result<T, VloglineError>;

/// Why a candidate produced no usable transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("no caption track in any preferred language")]
    NoTrack,

    #[error("caption track has no json3 format")]
    NoStructuredFormat,

    #[error("caption track has no text")]
    Empty,

    #[error("malformed caption payload: {0}")]
    Malformed(String),
}

/// Why the analysis step did not yield an accepted result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("analysis service unavailable: {0}")]
    Upstream(String),

    #[error("malformed analysis response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("analysis returned no timeline")]
    EmptyTimeline,

    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),
}
