use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A search hit that passed discovery filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVideo {
    pub id: String,
    pub title: String,
    /// Seconds. Zero means the provider did not report a duration.
    pub duration: u64,
    pub upload_date: Option<NaiveDate>,
    pub url: String,
    pub thumbnail: Option<String>,
}

/// One timed caption event, already flattened to a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub offset_ms: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub lines: Vec<TranscriptLine>,
    /// `[MM:SS] text` lines joined by newlines, cut to the character budget.
    pub text: String,
}

/// Serialized with the label under both `place` and `title`; either key is
/// accepted on input, `place` winning when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimelineEntryRepr", into = "TimelineEntryRepr")]
pub struct TimelineEntry {
    pub time: String,
    pub place: String,
    pub desc: String,
}

#[derive(Serialize, Deserialize)]
struct TimelineEntryRepr {
    time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    desc: String,
}

impl TryFrom<TimelineEntryRepr> for TimelineEntry {
    type Error = String;

    fn try_from(repr: TimelineEntryRepr) -> Result<Self, Self::Error> {
        let place = repr
            .place
            .or(repr.title)
            .ok_or_else(|| "missing field `place`".to_string())?;
        Ok(Self {
            time: repr.time,
            place,
            desc: repr.desc,
        })
    }
}

impl From<TimelineEntry> for TimelineEntryRepr {
    fn from(entry: TimelineEntry) -> Self {
        Self {
            time: entry.time,
            title: Some(entry.place.clone()),
            place: Some(entry.place),
            desc: entry.desc,
        }
    }
}

impl TimelineEntry {
    pub fn same_moment(&self, other: &TimelineEntry) -> bool {
        self.time == other.time && self.place == other.place
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiContext {
    pub summary: String,
    pub tags: Vec<String>,
    pub best_moment: TimelineEntry,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub duration: u64,
    pub location_keyword: String,
    pub ai_context: AiContext,
}

fn default_kind() -> String {
    "video".to_string()
}

/// Accepted results in completion order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<EnrichedResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: EnrichedResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.results.iter().any(|r| r.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.id.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedResult> {
        self.results.iter()
    }

    pub fn last(&self) -> Option<&EnrichedResult> {
        self.results.last()
    }
}

impl From<Vec<EnrichedResult>> for ResultSet {
    fn from(results: Vec<EnrichedResult>) -> Self {
        Self { results }
    }
}
