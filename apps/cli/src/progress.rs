use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use vlogline_core::{
    CandidateOutcome, CandidateVideo, EnrichedResult, KeywordSummary, PipelineObserver,
    format_result_readable,
};

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Renders pipeline progress as one spinner line per candidate.
pub struct CliProgress {
    show_results: bool,
    spinner: Option<ProgressBar>,
    started: Instant,
}

impl CliProgress {
    pub fn new(show_results: bool) -> Self {
        Self {
            show_results,
            spinner: None,
            started: Instant::now(),
        }
    }

    fn finish(&mut self, line: String) {
        match self.spinner.take() {
            Some(pb) => pb.finish_with_message(line),
            None => println!("{line}"),
        }
    }
}

impl PipelineObserver for CliProgress {
    fn on_discovered(&mut self, keyword: &str, candidates: usize) {
        println!(
            "\n{} {} {}",
            style("▶").cyan().bold(),
            style(keyword).bold(),
            style(format!("({candidates} candidates)")).dim()
        );
    }

    fn on_candidate(&mut self, video: &CandidateVideo) {
        self.started = Instant::now();
        self.spinner = Some(create_spinner(&format!("Analyzing {}...", video.title)));
    }

    fn on_outcome(
        &mut self,
        video: &CandidateVideo,
        outcome: &CandidateOutcome,
        result: Option<&EnrichedResult>,
    ) {
        let elapsed = style(format!("[{}]", format_duration(self.started.elapsed()))).dim();
        let line = match outcome {
            CandidateOutcome::Accepted => format!(
                "{} {} {}",
                style("✓").green().bold(),
                video.title,
                elapsed
            ),
            CandidateOutcome::SkippedDuplicate => format!(
                "{} {} {}",
                style("·").dim(),
                style(&video.title).dim(),
                style("(already processed)").dim()
            ),
            CandidateOutcome::SkippedNoTranscript(reason) => format!(
                "{} {} {} {}",
                style("✗").yellow().bold(),
                video.title,
                style(format!("no transcript: {reason}")).yellow(),
                elapsed
            ),
            CandidateOutcome::SkippedInvalidAnalysis(reason) => format!(
                "{} {} {} {}",
                style("✗").red().bold(),
                video.title,
                style(format!("analysis rejected: {reason}")).red(),
                elapsed
            ),
        };
        self.finish(line);

        if let (true, Some(result)) = (self.show_results, result) {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}", format_result_readable(result));
        }
    }

    fn on_keyword_done(&mut self, summary: &KeywordSummary) {
        if summary.reached_target() {
            println!(
                "{} {}: {}/{} accepted",
                style("✓").green().bold(),
                summary.keyword,
                summary.accepted,
                summary.target
            );
        } else {
            println!(
                "{} {}: {}/{} accepted, {} short after {} candidates",
                style("⚠").yellow().bold(),
                summary.keyword,
                summary.accepted,
                summary.target,
                summary.shortfall(),
                summary.discovered
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_switch_to_minutes() {
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
