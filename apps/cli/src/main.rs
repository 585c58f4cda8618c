use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use vlogline_core::{
    ChatCompletionClient, CheckpointStore, Pipeline, PipelineConfig, Provider, ResultSet,
    YtDlpSource, preference_for,
};

use crate::progress::{CliProgress, create_spinner};

mod progress;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    Grok,
    Openai,
    #[default]
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "vlogline")]
#[command(about = "Find travel vlogs, pull their captions, and build AI-powered timelines")]
struct Cli {
    /// Locations to search for (e.g., "Petra" "Cape Town")
    #[arg(required = true)]
    keywords: Vec<String>,

    /// Output JSON file, rewritten after every accepted video
    #[arg(short, long, default_value = "travel_video_data.json")]
    output: PathBuf,

    /// Accepted videos to collect per keyword
    #[arg(short = 'n', long, default_value_t = 5)]
    target: usize,

    /// Search results to consider per keyword
    #[arg(long, default_value_t = 30)]
    pool_size: usize,

    /// Minimum video length in seconds
    #[arg(long, default_value_t = 300)]
    min_duration: u64,

    /// Video ids to skip (repeatable)
    #[arg(long = "exclude", value_name = "ID")]
    excluded: Vec<String>,

    /// Caption languages in order of preference (manual before automatic per language)
    #[arg(long, value_delimiter = ',', default_value = "ko,en")]
    langs: Vec<String>,

    /// Transcript characters sent to the model
    #[arg(long, default_value_t = 25_000)]
    max_chars: usize,

    /// AI provider for timeline analysis
    #[arg(short, long, default_value = "gemini")]
    provider: CliProvider,

    /// Minimum pause between videos, in seconds
    #[arg(long, default_value_t = 2.0)]
    delay_min: f64,

    /// Maximum pause between videos, in seconds
    #[arg(long, default_value_t = 4.0)]
    delay_max: f64,

    /// Keep results already in the output file and skip their videos
    #[arg(short, long)]
    resume: bool,

    /// Print each accepted timeline
    #[arg(short, long)]
    show: bool,

    /// Path to the yt-dlp executable
    #[arg(long, default_value = "yt-dlp")]
    yt_dlp: String,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let langs: Vec<&str> = self
            .langs
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        PipelineConfig {
            keywords: self.keywords.clone(),
            output_path: self.output.clone(),
            target: self.target,
            pool_size: self.pool_size,
            min_duration_secs: self.min_duration,
            excluded_ids: self.excluded.iter().cloned().collect(),
            track_preference: preference_for(&langs),
            transcript_char_budget: self.max_chars,
            delay_min: seconds(self.delay_min),
            delay_max: seconds(self.delay_max),
            ..Default::default()
        }
    }
}

fn seconds(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0).min(3600.0))
}

/// Skips are already shown as progress lines, so core warnings stay quiet
/// unless `-v` is given.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "vlogline=warn,vlogline_core=error",
        1 => "vlogline=info,vlogline_core=info",
        _ => "vlogline=debug,vlogline_core=debug",
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose)));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    let provider: Provider = cli.provider.clone().into();

    // Validate API key early
    let client = match ChatCompletionClient::from_provider(&provider) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let config = cli.pipeline_config();

    println!(
        "\n{}  {}\n",
        style("vlogline").cyan().bold(),
        style("Travel Timeline Builder").dim()
    );

    let previous = if cli.resume {
        let spinner = create_spinner("Loading previous results...");
        let previous = CheckpointStore::new(&config.output_path).load().await?;
        spinner.finish_with_message(format!(
            "{} Resuming with {} saved videos",
            style("✓").green().bold(),
            previous.len()
        ));
        previous
    } else {
        ResultSet::new()
    };

    println!(
        "{} {} via {}, target {} per keyword",
        style("✓").green().bold(),
        config.keywords.join(", "),
        provider.name(),
        config.target
    );
    println!("{}", style("─".repeat(60)).dim());

    let output = config.output_path.clone();
    let mut pipeline =
        Pipeline::new(config, YtDlpSource::new(cli.yt_dlp.clone()), client).resume_from(previous);
    let mut progress = CliProgress::new(cli.show);

    let summary = match pipeline.run(&mut progress).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!(
                "\n{} {} {}",
                style("Error:").red().bold(),
                e,
                style("(results saved so far are intact)").dim()
            );
            return Err(e.into());
        }
    };

    println!("{}", style("─".repeat(60)).dim());
    if summary.reached_all_targets() {
        println!(
            "{} All targets reached: {} new videos",
            style("✓").green().bold(),
            summary.accepted()
        );
    } else {
        let missing: usize = summary.keywords.iter().map(|k| k.shortfall()).sum();
        println!(
            "{} Candidates exhausted: {} new videos, {} short of target",
            style("⚠").yellow().bold(),
            summary.accepted(),
            missing
        );
    }

    if summary.total_results > 0 {
        println!(
            "\n{} {} {}\n",
            style("Saved:").dim(),
            style(output.display()).cyan(),
            style(format!("({} videos)", summary.total_results)).dim()
        );
    } else {
        println!("\n{}\n", style("Nothing to save.").dim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;
    use vlogline_core::TrackKind;

    #[test]
    fn flags_map_onto_pipeline_config() {
        let cli = Cli::try_parse_from([
            "vlogline", "Petra", "Wadi Rum", "-n", "3", "--exclude", "abc", "--langs", "en, ja",
            "--delay-min", "0", "--delay-max", "0.5",
        ])
        .unwrap();
        let config = cli.pipeline_config();

        assert_eq!(config.keywords, vec!["Petra", "Wadi Rum"]);
        assert_eq!(config.target, 3);
        assert!(config.excluded_ids.contains("abc"));
        assert_eq!(config.track_preference.len(), 4);
        assert_eq!(config.track_preference[0].lang, "en");
        assert_eq!(config.track_preference[3].lang, "ja");
        assert_eq!(config.track_preference[3].kind, TrackKind::Automatic);
        assert_eq!(config.delay_max, Duration::from_millis(500));
        assert_eq!(config.min_duration_secs, 300);
    }

    #[test]
    fn keyword_is_required() {
        assert!(Cli::try_parse_from(["vlogline"]).is_err());
    }

    #[test]
    fn core_skip_warnings_need_verbose() {
        assert!(default_filter(0).contains("vlogline_core=error"));
        assert!(default_filter(1).contains("vlogline_core=info"));
        assert!(default_filter(3).contains("vlogline_core=debug"));
        assert!(EnvFilter::try_new(default_filter(0)).is_ok());
    }

    #[test]
    fn negative_delays_clamp_to_zero() {
        assert_eq!(seconds(-3.0), Duration::ZERO);
    }
}
