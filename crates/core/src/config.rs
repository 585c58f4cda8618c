use std::{collections::HashSet, path::PathBuf, time::Duration};

/// Caption track kind, in the order they are tried for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Manual,
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPreference {
    pub lang: String,
    pub kind: TrackKind,
}

/// Everything a run needs. Built once by the caller and handed to the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub keywords: Vec<String>,
    pub output_path: PathBuf,
    /// Accepted results per keyword before moving on.
    pub target: usize,
    pub pool_size: usize,
    pub min_duration_secs: u64,
    pub excluded_ids: HashSet<String>,
    pub topic_modifier: String,
    pub exclusion_modifier: String,
    /// Lowercase title substrings that mark short-form clips.
    pub short_form_markers: Vec<String>,
    pub track_preference: Vec<TrackPreference>,
    pub transcript_char_budget: usize,
    pub timeline_min: usize,
    pub timeline_max: usize,
    pub desc_max_chars: usize,
    pub temperature: f32,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            output_path: PathBuf::from("travel_video_data.json"),
            target: 5,
            pool_size: 30,
            min_duration_secs: 300,
            excluded_ids: HashSet::new(),
            topic_modifier: "travel vlog".to_string(),
            exclusion_modifier: "-shorts".to_string(),
            short_form_markers: vec!["#shorts".to_string(), "shorts".to_string()],
            track_preference: preference_for(&["ko", "en"]),
            transcript_char_budget: 25_000,
            timeline_min: 5,
            timeline_max: 10,
            desc_max_chars: 80,
            temperature: 0.2,
            delay_min: Duration::from_secs(2),
            delay_max: Duration::from_secs(4),
        }
    }
}

/// Manual captions before automatic ones, for each language in turn.
pub fn preference_for(langs: &[&str]) -> Vec<TrackPreference> {
    langs
        .iter()
        .flat_map(|lang| {
            [TrackKind::Manual, TrackKind::Automatic].map(|kind| TrackPreference {
                lang: lang.to_string(),
                kind,
            })
        })
        .collect()
}
