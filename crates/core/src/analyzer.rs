//! Timeline analysis of a transcript through a chat-completions model.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    config::PipelineConfig,
    error::{AnalysisError, Result, VloglineError},
    format::{is_timestamp, truncate_chars},
    provider::Provider,
    types::{AiContext, CandidateVideo, EnrichedResult, TimelineEntry, Transcript},
};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)```").expect("code fence pattern is valid")
});

const RAW_PREVIEW_CHARS: usize = 200;

/// Text completion capability.
pub trait Completer {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl ChatCompletionClient {
    /// Build a client for `provider`, failing fast when its API key is missing.
    pub fn from_provider(provider: &Provider) -> Result<Self> {
        let config = provider.config();
        let api_key = provider.validate_api_key()?;
        Ok(Self::with_endpoint(config.api_url, config.model, api_key))
    }

    pub fn with_endpoint(
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

impl Completer for ChatCompletionClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let response = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
                "temperature": temperature,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| VloglineError::InvalidApiResponse {
                reason: format!("no message content in {response}"),
            })?;

        Ok(content.to_string())
    }
}

pub fn build_prompt(
    location: &str,
    video: &CandidateVideo,
    transcript: &Transcript,
    config: &PipelineConfig,
) -> String {
    format!(
        r##"You are a travel content editor. Below is the time-coded transcript of a real travel video about {location}.

Video title: {title}

TRANSCRIPT (format: [MM:SS] text):
{transcript}

TASK: Build a timeline of the places and moments shown in this video.

RULES:
- The timeline must have between {min} and {max} entries, in chronological order.
- Every "time" must be MM:SS and must come from a transcript timestamp.
- "place" is a short label for the spot or activity; "desc" is at most {desc_max} characters.
- "best_moment" must be a copy of one of the timeline entries (same "time" and "place"). Do not invent a separate moment.
- Use only information found in the transcript. Do not add anything the transcript does not support.
- "summary" is 2-3 sentences; "tags" are 3-5 hashtags.

Output ONLY a single JSON object with this exact structure, nothing else:
{{
  "summary": "...",
  "tags": ["#tag1", "#tag2"],
  "best_moment": {{"time": "MM:SS", "place": "...", "desc": "..."}},
  "timeline": [
    {{"time": "MM:SS", "place": "...", "desc": "..."}}
  ]
}}"##,
        location = location,
        title = video.title,
        transcript = transcript.text,
        min = config.timeline_min,
        max = config.timeline_max,
        desc_max = config.desc_max_chars,
    )
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    tags: Vec<String>,
    best_moment: Option<TimelineEntry>,
    #[serde(default)]
    timeline: Vec<TimelineEntry>,
}

/// Decode and validate a model response into an [`AiContext`].
pub fn parse_analysis(
    raw: &str,
    config: &PipelineConfig,
) -> std::result::Result<AiContext, AnalysisError> {
    let body = strip_code_fence(raw);
    let mut value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string(), raw))?;

    // Accept the full record shape too, where the analysis sits under `ai_context`.
    if let Some(inner) = value.get_mut("ai_context").map(serde_json::Value::take) {
        value = inner;
    }

    let payload: AnalysisPayload =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string(), raw))?;

    validate(payload, config)
}

fn malformed(reason: String, raw: &str) -> AnalysisError {
    AnalysisError::MalformedResponse {
        reason,
        raw: truncate_chars(raw, RAW_PREVIEW_CHARS),
    }
}

fn validate(
    payload: AnalysisPayload,
    config: &PipelineConfig,
) -> std::result::Result<AiContext, AnalysisError> {
    if payload.timeline.is_empty() {
        return Err(AnalysisError::EmptyTimeline);
    }

    let len = payload.timeline.len();
    if len < config.timeline_min || len > config.timeline_max {
        return Err(AnalysisError::InvalidTimeline(format!(
            "{len} entries, expected {}-{}",
            config.timeline_min, config.timeline_max
        )));
    }

    let timeline: Vec<TimelineEntry> = payload
        .timeline
        .into_iter()
        .map(|entry| clamp_desc(entry, config.desc_max_chars))
        .collect();

    if let Some(bad) = timeline.iter().find(|e| !is_timestamp(&e.time)) {
        return Err(AnalysisError::InvalidTimeline(format!(
            "bad time {:?} for {:?}",
            bad.time, bad.place
        )));
    }

    let best = payload
        .best_moment
        .ok_or_else(|| AnalysisError::InvalidTimeline("missing best_moment".into()))?;
    let mut matches = timeline.iter().filter(|e| e.same_moment(&best));
    let matched = match (matches.next(), matches.next()) {
        (Some(entry), None) => entry,
        (None, _) => {
            return Err(AnalysisError::InvalidTimeline(format!(
                "best_moment [{}] {} is not in the timeline",
                best.time, best.place
            )));
        }
        (Some(_), Some(_)) => {
            return Err(AnalysisError::InvalidTimeline(format!(
                "best_moment [{}] {} matches more than one entry",
                best.time, best.place
            )));
        }
    };

    let best_moment = if best.desc.trim().is_empty() {
        matched.clone()
    } else {
        clamp_desc(best, config.desc_max_chars)
    };

    Ok(AiContext {
        summary: payload.summary.trim().to_string(),
        tags: payload.tags,
        best_moment,
        timeline,
    })
}

fn clamp_desc(mut entry: TimelineEntry, max: usize) -> TimelineEntry {
    entry.desc = truncate_chars(entry.desc.trim(), max);
    entry
}

/// Run the analysis for one video. Every failure comes back as an [`AnalysisError`].
#[instrument(skip_all, fields(video_id = %video.id))]
pub async fn enrich<C: Completer>(
    completer: &C,
    location: &str,
    video: &CandidateVideo,
    transcript: &Transcript,
    config: &PipelineConfig,
) -> std::result::Result<EnrichedResult, AnalysisError> {
    let prompt = build_prompt(location, video, transcript, config);
    debug!(prompt_chars = prompt.chars().count(), "requesting analysis");

    let raw = completer
        .complete(&prompt, config.temperature)
        .await
        .map_err(|e| {
            warn!(error = %e, "analysis request failed");
            AnalysisError::Upstream(e.to_string())
        })?;

    let ai_context = parse_analysis(&raw, config)?;

    Ok(EnrichedResult {
        id: video.id.clone(),
        title: video.title.clone(),
        kind: "video".to_string(),
        url: video.url.clone(),
        thumbnail: video.thumbnail.clone(),
        duration: video.duration,
        location_keyword: location.to_string(),
        ai_context,
    })
}
