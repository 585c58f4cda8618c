//! Vlogline Core Library
//!
//! Finds recent travel vlogs for a location, pulls their time-coded captions,
//! asks a language model for a timeline of each video, and checkpoints every
//! accepted result to disk as it arrives.

pub mod analyzer;
pub mod checkpoint;
pub mod config;
pub mod discovery;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod provider;
pub mod source;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{ChatCompletionClient, Completer, enrich};
pub use checkpoint::CheckpointStore;
pub use config::{PipelineConfig, TrackKind, TrackPreference, preference_for};
pub use discovery::discover;
pub use error::{AnalysisError, Result, TranscriptError, VloglineError};
pub use format::{format_result_readable, format_timestamp, format_transcript_with_timestamps};
pub use pipeline::{
    CandidateOutcome, CandidateReport, KeywordSummary, NoopObserver, Pacer, Pipeline,
    PipelineObserver, RandomDelay, RunSummary,
};
pub use provider::{Provider, ProviderConfig};
pub use source::{SearchEntry, TrackFormat, VideoInfo, VideoSource, YtDlpSource};
pub use transcript::extract;
pub use types::{
    AiContext, CandidateVideo, EnrichedResult, ResultSet, TimelineEntry, Transcript,
    TranscriptLine,
};
