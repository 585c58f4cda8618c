use crate::types::{EnrichedResult, TranscriptLine};

/// Format seconds as MM:SS timestamp. Minutes keep counting past 59.
pub fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// True for the `MM:SS` shape [`format_timestamp`] produces: at least two
/// minute digits, exactly two second digits below 60. No hour field.
pub fn is_timestamp(s: &str) -> bool {
    let Some((minutes, seconds)) = s.split_once(':') else {
        return false;
    };
    let digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    digits(minutes)
        && minutes.len() >= 2
        && digits(seconds)
        && seconds.len() == 2
        && seconds.parse::<u8>().is_ok_and(|v| v < 60)
}

/// Format caption lines as `[MM:SS] text`, one per line
pub fn format_transcript_with_timestamps(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|line| format!("[{}] {}", format_timestamp(line.offset_ms / 1000), line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` to at most `budget` characters, never splitting a char.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub fn format_result_readable(result: &EnrichedResult) -> String {
    let ctx = &result.ai_context;
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", result.title));
    output.push_str(&format!(
        "**Duration:** {} | **Location:** {} | {}\n\n",
        format_timestamp(result.duration),
        result.location_keyword,
        result.url
    ));

    output.push_str(&ctx.summary);
    output.push_str("\n\n");
    if !ctx.tags.is_empty() {
        output.push_str(&ctx.tags.join(" "));
        output.push_str("\n\n");
    }

    output.push_str(&format!(
        "**Best moment:** [{}] {} - {}\n\n",
        ctx.best_moment.time, ctx.best_moment.place, ctx.best_moment.desc
    ));

    output.push_str("## Timeline\n\n");
    for entry in &ctx.timeline {
        output.push_str(&format!("• [{}] {}: {}\n", entry.time, entry.place, entry.desc));
    }

    output
}
