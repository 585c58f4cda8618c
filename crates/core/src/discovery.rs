//! Candidate discovery: one bounded search, newest first, then filtering.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::PipelineConfig,
    source::{SearchEntry, VideoSource},
    types::CandidateVideo,
};

pub fn build_query(keyword: &str, config: &PipelineConfig) -> String {
    [
        keyword,
        config.topic_modifier.as_str(),
        config.exclusion_modifier.as_str(),
    ]
    .iter()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Search for `keyword` and return ranked, filtered candidates.
///
/// A failing search yields an empty list; the error is only logged.
#[instrument(skip_all, fields(%keyword, pool = config.pool_size))]
pub async fn discover<S: VideoSource>(
    source: &S,
    keyword: &str,
    config: &PipelineConfig,
    excluded: &HashSet<String>,
) -> Vec<CandidateVideo> {
    let query = build_query(keyword, config);
    let entries = match source.search(&query, config.pool_size).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "search failed, continuing with no candidates");
            return Vec::new();
        }
    };

    let raw = entries.len();
    let candidates = rank_and_filter(entries, config, excluded);
    info!(raw, kept = candidates.len(), "discovery finished");
    candidates
}

/// Sort newest first (undated last) and drop entries that cannot be used.
///
/// Filters run in this order: missing id, duration below the minimum
/// (unknown counts as zero), short-form title marker, excluded id.
pub fn rank_and_filter(
    mut entries: Vec<SearchEntry>,
    config: &PipelineConfig,
    excluded: &HashSet<String>,
) -> Vec<CandidateVideo> {
    entries.sort_by_key(|e| std::cmp::Reverse(parse_upload_date(e.upload_date.as_deref())));

    entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry.id.clone().filter(|id| !id.trim().is_empty())?;
            let title = entry.title.clone().unwrap_or_default();
            let duration = duration_secs(entry.duration);

            if duration < config.min_duration_secs {
                debug!(%id, duration, "too short");
                return None;
            }
            if is_short_form(&title, &config.short_form_markers) {
                debug!(%id, %title, "short-form title");
                return None;
            }
            if excluded.contains(&id) {
                debug!(%id, "excluded");
                return None;
            }

            Some(to_candidate(id, title, duration, &entry))
        })
        .collect()
}

fn to_candidate(id: String, title: String, duration: u64, entry: &SearchEntry) -> CandidateVideo {
    let url = entry
        .url
        .clone()
        .filter(|u| u.starts_with("http"))
        .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={id}"));
    let thumbnail = entry
        .thumbnails
        .as_ref()
        .and_then(|t| t.first())
        .map(|t| t.url.clone())
        .or_else(|| Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")));

    CandidateVideo {
        upload_date: parse_upload_date(entry.upload_date.as_deref()),
        id,
        title,
        duration,
        url,
        thumbnail,
    }
}

fn duration_secs(raw: Option<f64>) -> u64 {
    match raw {
        Some(d) if d.is_finite() && d > 0.0 => d as u64,
        _ => 0,
    }
}

fn parse_upload_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y%m%d").ok())
}

fn is_short_form(title: &str, markers: &[String]) -> bool {
    let title = title.to_lowercase();
    markers.iter().any(|m| title.contains(&m.to_lowercase()))
}
