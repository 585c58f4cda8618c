mod common;

use common::{FakeSource, json3, watch_url};
use vlogline_core::{PipelineConfig, TrackFormat, TranscriptError, VideoInfo, extract};

#[tokio::test]
async fn long_transcripts_are_cut_to_the_exact_budget() {
    let lines: Vec<(u64, String)> = (0..200)
        .map(|i| (i * 4_000, format!("line number {i} about the Monastery trail")))
        .collect();
    let borrowed: Vec<(u64, &str)> = lines.iter().map(|(t, s)| (*t, s.as_str())).collect();
    let source = FakeSource::default().captions("v1", "ko", true, &json3(&borrowed));
    let config = PipelineConfig {
        transcript_char_budget: 500,
        ..Default::default()
    };

    let transcript = extract(&source, "v1", &watch_url("v1"), &config).await.unwrap();

    assert_eq!(transcript.text.chars().count(), 500);
    assert!(transcript.text.starts_with("[00:00] line number 0"));
    assert_eq!(transcript.lines.len(), 200);
    assert_eq!(transcript.language, "ko");
}

#[tokio::test]
async fn short_transcripts_are_untouched() {
    let source = FakeSource::default().captions("v1", "en", false, &json3(&[(61_000, "hi")]));
    let transcript = extract(&source, "v1", &watch_url("v1"), &PipelineConfig::default())
        .await
        .unwrap();
    assert_eq!(transcript.text, "[01:01] hi");
}

#[tokio::test]
async fn track_without_json3_is_not_used() {
    let mut source = FakeSource::default();
    let mut info = VideoInfo::default();
    info.subtitles.insert(
        "ko".into(),
        vec![TrackFormat {
            ext: "vtt".into(),
            url: "https://captions.test/v1.vtt".into(),
        }],
    );
    info.automatic_captions.insert(
        "en".into(),
        vec![TrackFormat {
            ext: "json3".into(),
            url: "https://captions.test/v1.json3".into(),
        }],
    );
    source.infos.insert(watch_url("v1"), info);

    let err = extract(&source, "v1", &watch_url("v1"), &PipelineConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err, TranscriptError::NoStructuredFormat);
}

#[tokio::test]
async fn blank_track_counts_as_empty() {
    let source = FakeSource::default().captions("v1", "ko", true, &json3(&[(0, "\n"), (10, "  ")]));
    let err = extract(&source, "v1", &watch_url("v1"), &PipelineConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err, TranscriptError::Empty);
}

#[tokio::test]
async fn unreachable_video_is_upstream_error() {
    let source = FakeSource::default();
    let err = extract(&source, "nope", &watch_url("nope"), &PipelineConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranscriptError::Upstream(_)));
}
