#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use vlogline_core::{
    Completer, Pacer, Result, SearchEntry, TrackFormat, VideoInfo, VideoSource, VloglineError,
};

/// In-memory stand-in for yt-dlp.
#[derive(Default)]
pub struct FakeSource {
    pub entries: Vec<SearchEntry>,
    pub search_fails: bool,
    pub infos: HashMap<String, VideoInfo>,
    pub tracks: HashMap<String, String>,
    pub queries: Mutex<Vec<String>>,
    pub info_requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_entries(entries: Vec<SearchEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    /// Give `id` a json3 caption track in `lang`.
    pub fn captions(mut self, id: &str, lang: &str, manual: bool, payload: &str) -> Self {
        let track_url = format!("https://captions.test/{id}/{lang}.json3");
        let formats = vec![
            TrackFormat {
                ext: "vtt".into(),
                url: format!("https://captions.test/{id}/{lang}.vtt"),
            },
            TrackFormat {
                ext: "json3".into(),
                url: track_url.clone(),
            },
        ];
        let info = self.infos.entry(watch_url(id)).or_default();
        if manual {
            info.subtitles.insert(lang.into(), formats);
        } else {
            info.automatic_captions.insert(lang.into(), formats);
        }
        self.tracks.insert(track_url, payload.into());
        self
    }

    pub fn info_requests(&self) -> Vec<String> {
        self.info_requests.lock().unwrap().clone()
    }
}

impl VideoSource for FakeSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchEntry>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.search_fails {
            return Err(VloglineError::SearchFailed {
                query: query.into(),
                reason: "HTTP Error 429".into(),
            });
        }
        Ok(self.entries.iter().take(limit).cloned().collect())
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        self.info_requests.lock().unwrap().push(url.to_string());
        self.infos
            .get(url)
            .cloned()
            .ok_or_else(|| VloglineError::InfoFetchFailed {
                url: url.into(),
                reason: "Video unavailable".into(),
            })
    }

    async fn fetch_track(&self, url: &str) -> Result<String> {
        self.tracks
            .get(url)
            .cloned()
            .ok_or_else(|| VloglineError::InvalidApiResponse {
                reason: format!("no track at {url}"),
            })
    }
}

/// Answers with the first scripted response whose marker appears in the prompt.
#[derive(Default)]
pub struct ScriptedCompleter {
    pub script: Vec<(String, Option<String>)>,
    pub calls: AtomicUsize,
}

impl ScriptedCompleter {
    pub fn reply(mut self, marker: &str, response: impl Into<String>) -> Self {
        self.script.push((marker.into(), Some(response.into())));
        self
    }

    pub fn fail(mut self, marker: &str) -> Self {
        self.script.push((marker.into(), None));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Completer for ScriptedCompleter {
    async fn complete(&self, prompt: &str, _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.iter().find(|(marker, _)| prompt.contains(marker.as_str())) {
            Some((_, Some(response))) => Ok(response.clone()),
            _ => Err(VloglineError::InvalidApiResponse {
                reason: "service unavailable".into(),
            }),
        }
    }
}

#[derive(Default, Clone)]
pub struct CountingPacer {
    pauses: Arc<AtomicUsize>,
}

impl CountingPacer {
    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

impl Pacer for CountingPacer {
    async fn pause(&mut self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

pub fn entry(id: &str, title: &str, duration: Option<f64>, date: Option<&str>) -> SearchEntry {
    SearchEntry {
        id: Some(id.into()),
        title: Some(title.into()),
        url: Some(watch_url(id)),
        duration,
        upload_date: date.map(String::from),
        thumbnails: None,
    }
}

pub fn json3(lines: &[(u64, &str)]) -> String {
    let events: Vec<serde_json::Value> = lines
        .iter()
        .map(|(ms, text)| serde_json::json!({"tStartMs": ms, "segs": [{"utf8": text}]}))
        .collect();
    serde_json::json!({ "events": events }).to_string()
}

/// A well-formed analysis with `n` timeline entries; the best moment is entry 2.
pub fn analysis(n: usize) -> String {
    let timeline: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "time": format!("{:02}:{:02}", i, 30),
                "place": format!("Stop {i}"),
                "desc": format!("What happens at stop {i}"),
            })
        })
        .collect();
    let body = serde_json::json!({
        "summary": "A day among the rock-cut tombs.",
        "tags": ["#petra", "#jordan"],
        "best_moment": {"time": "02:30", "place": "Stop 2", "desc": "The big reveal"},
        "timeline": timeline,
    });
    format!("```json\n{body}\n```")
}
