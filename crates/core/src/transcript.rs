//! Caption extraction: pick a track, parse its json3 payload, normalize.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::{PipelineConfig, TrackKind, TrackPreference},
    error::TranscriptError,
    format::{format_transcript_with_timestamps, truncate_chars},
    source::{TrackFormat, VideoInfo, VideoSource},
    types::{Transcript, TranscriptLine},
};

const STRUCTURED_EXT: &str = "json3";

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Fetch and normalize the transcript of `video_url`.
#[instrument(skip_all, fields(%video_id))]
pub async fn extract<S: VideoSource>(
    source: &S,
    video_id: &str,
    video_url: &str,
    config: &PipelineConfig,
) -> Result<Transcript, TranscriptError> {
    let info = source
        .fetch_info(video_url)
        .await
        .map_err(|e| TranscriptError::Upstream(e.to_string()))?;

    let (pref, formats) =
        select_track(&info, &config.track_preference).ok_or(TranscriptError::NoTrack)?;
    let track = formats
        .iter()
        .find(|f| f.ext == STRUCTURED_EXT)
        .ok_or(TranscriptError::NoStructuredFormat)?;
    debug!(lang = %pref.lang, kind = ?pref.kind, "selected caption track");

    let payload = source
        .fetch_track(&track.url)
        .await
        .map_err(|e| TranscriptError::Upstream(e.to_string()))?;

    let lines = parse_json3(&payload)?;
    if lines.is_empty() {
        return Err(TranscriptError::Empty);
    }

    let text = truncate_chars(
        &format_transcript_with_timestamps(&lines),
        config.transcript_char_budget,
    );

    Ok(Transcript {
        video_id: video_id.to_string(),
        language: pref.lang.clone(),
        lines,
        text,
    })
}

/// First preference with a non-empty track wins; later ones are never merged in.
pub fn select_track<'a>(
    info: &'a VideoInfo,
    preference: &'a [TrackPreference],
) -> Option<(&'a TrackPreference, &'a [TrackFormat])> {
    preference.iter().find_map(|pref| {
        let tracks = match pref.kind {
            TrackKind::Manual => &info.subtitles,
            TrackKind::Automatic => &info.automatic_captions,
        };
        tracks
            .get(&pref.lang)
            .filter(|formats| !formats.is_empty())
            .map(|formats| (pref, formats.as_slice()))
    })
}

/// Flatten json3 events into lines. Segments are concatenated, line breaks
/// become spaces, and events with no text are dropped.
pub fn parse_json3(payload: &str) -> Result<Vec<TranscriptLine>, TranscriptError> {
    let doc: Json3 =
        serde_json::from_str(payload).map_err(|e| TranscriptError::Malformed(e.to_string()))?;

    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let joined: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = joined
                .split(['\n', '\r'])
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (!text.is_empty()).then_some(TranscriptLine {
                offset_ms: event.t_start_ms,
                text,
            })
        })
        .collect())
}
