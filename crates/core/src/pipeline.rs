//! The run controller: discover, then extract, enrich and checkpoint one
//! candidate at a time until the per-keyword target is met.

use std::{collections::HashSet, time::Duration};

use rand::Rng;
use tracing::{Instrument, info, info_span, warn};

use crate::{
    analyzer::{self, Completer},
    checkpoint::CheckpointStore,
    config::PipelineConfig,
    discovery,
    error::{AnalysisError, Result, TranscriptError},
    source::VideoSource,
    transcript,
    types::{CandidateVideo, EnrichedResult, ResultSet},
};

/// What happened to a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Accepted,
    SkippedDuplicate,
    SkippedNoTranscript(TranscriptError),
    SkippedInvalidAnalysis(AnalysisError),
}

impl CandidateOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CandidateOutcome::Accepted)
    }
}

#[derive(Debug, Clone)]
pub struct CandidateReport {
    pub video_id: String,
    pub title: String,
    pub outcome: CandidateOutcome,
}

#[derive(Debug, Clone)]
pub struct KeywordSummary {
    pub keyword: String,
    pub discovered: usize,
    pub target: usize,
    pub accepted: usize,
    pub reports: Vec<CandidateReport>,
}

impl KeywordSummary {
    fn new(keyword: &str, discovered: usize, target: usize) -> Self {
        Self {
            keyword: keyword.to_string(),
            discovered,
            target,
            accepted: 0,
            reports: Vec::new(),
        }
    }

    pub fn reached_target(&self) -> bool {
        self.accepted >= self.target
    }

    pub fn shortfall(&self) -> usize {
        self.target.saturating_sub(self.accepted)
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub keywords: Vec<KeywordSummary>,
    /// Size of the persisted set, including results carried over on resume.
    pub total_results: usize,
}

impl RunSummary {
    pub fn accepted(&self) -> usize {
        self.keywords.iter().map(|k| k.accepted).sum()
    }

    pub fn reached_all_targets(&self) -> bool {
        self.keywords.iter().all(KeywordSummary::reached_target)
    }
}

/// Progress hooks. All methods default to doing nothing.
pub trait PipelineObserver {
    fn on_discovered(&mut self, _keyword: &str, _candidates: usize) {}
    fn on_candidate(&mut self, _video: &CandidateVideo) {}
    fn on_outcome(
        &mut self,
        _video: &CandidateVideo,
        _outcome: &CandidateOutcome,
        _result: Option<&EnrichedResult>,
    ) {
    }
    fn on_keyword_done(&mut self, _summary: &KeywordSummary) {}
}

pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Pause between processed candidates.
pub trait Pacer {
    async fn pause(&mut self);
}

/// Sleeps for a random duration in `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn pick(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span_ms = u64::try_from((self.max - self.min).as_millis()).unwrap_or(u64::MAX);
        self.min + Duration::from_millis(rand::rng().random_range(0..=span_ms))
    }
}

impl Pacer for RandomDelay {
    async fn pause(&mut self) {
        tokio::time::sleep(self.pick()).await;
    }
}

pub struct Pipeline<S, C, P = RandomDelay> {
    config: PipelineConfig,
    source: S,
    completer: C,
    store: CheckpointStore,
    pacer: P,
    results: ResultSet,
    attempted: HashSet<String>,
    processed_any: bool,
}

impl<S: VideoSource, C: Completer> Pipeline<S, C, RandomDelay> {
    pub fn new(config: PipelineConfig, source: S, completer: C) -> Self {
        let pacer = RandomDelay::new(config.delay_min, config.delay_max);
        let store = CheckpointStore::new(&config.output_path);
        Self {
            config,
            source,
            completer,
            store,
            pacer,
            results: ResultSet::new(),
            attempted: HashSet::new(),
            processed_any: false,
        }
    }
}

impl<S: VideoSource, C: Completer, P: Pacer> Pipeline<S, C, P> {
    pub fn with_pacer<Q: Pacer>(self, pacer: Q) -> Pipeline<S, C, Q> {
        Pipeline {
            config: self.config,
            source: self.source,
            completer: self.completer,
            store: self.store,
            pacer,
            results: self.results,
            attempted: self.attempted,
            processed_any: self.processed_any,
        }
    }

    /// Start from an earlier checkpoint. Its ids are never processed again.
    pub fn resume_from(mut self, previous: ResultSet) -> Self {
        self.results = previous;
        self
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn into_results(self) -> ResultSet {
        self.results
    }

    /// Process every configured keyword in order.
    ///
    /// Only checkpoint failures abort the run; every other failure skips the candidate.
    pub async fn run(&mut self, observer: &mut impl PipelineObserver) -> Result<RunSummary> {
        let keywords = self.config.keywords.clone();
        let mut summaries = Vec::with_capacity(keywords.len());

        for keyword in &keywords {
            let span = info_span!("keyword", %keyword);
            let summary = self
                .run_keyword(keyword, &mut *observer)
                .instrument(span)
                .await?;
            observer.on_keyword_done(&summary);
            summaries.push(summary);
        }

        Ok(RunSummary {
            keywords: summaries,
            total_results: self.results.len(),
        })
    }

    pub async fn run_keyword(
        &mut self,
        keyword: &str,
        observer: &mut impl PipelineObserver,
    ) -> Result<KeywordSummary> {
        let mut excluded: HashSet<String> = self.config.excluded_ids.clone();
        excluded.extend(self.results.ids().map(String::from));
        excluded.extend(self.attempted.iter().cloned());

        let candidates = discovery::discover(&self.source, keyword, &self.config, &excluded).await;
        observer.on_discovered(keyword, candidates.len());

        let mut summary = KeywordSummary::new(keyword, candidates.len(), self.config.target);
        if summary.reached_target() {
            return Ok(summary);
        }

        for candidate in candidates {
            let outcome = if !self.attempted.insert(candidate.id.clone())
                || self.results.contains_id(&candidate.id)
            {
                CandidateOutcome::SkippedDuplicate
            } else {
                if self.processed_any {
                    self.pacer.pause().await;
                }
                self.processed_any = true;
                observer.on_candidate(&candidate);
                self.process(keyword, &candidate).await?
            };

            let accepted = outcome.is_accepted().then(|| self.results.last()).flatten();
            observer.on_outcome(&candidate, &outcome, accepted);

            if outcome.is_accepted() {
                summary.accepted += 1;
            }
            summary.reports.push(CandidateReport {
                video_id: candidate.id,
                title: candidate.title,
                outcome,
            });

            if summary.reached_target() {
                info!(accepted = summary.accepted, "target reached");
                return Ok(summary);
            }
        }

        warn!(
            accepted = summary.accepted,
            target = summary.target,
            "candidates exhausted before target"
        );
        Ok(summary)
    }

    async fn process(&mut self, keyword: &str, video: &CandidateVideo) -> Result<CandidateOutcome> {
        let transcript =
            match transcript::extract(&self.source, &video.id, &video.url, &self.config).await {
                Ok(t) => t,
                Err(reason) => {
                    warn!(
                        video_id = %video.id,
                        title = %video.title,
                        %reason,
                        "skipping: no transcript"
                    );
                    return Ok(CandidateOutcome::SkippedNoTranscript(reason));
                }
            };

        let enriched =
            analyzer::enrich(&self.completer, keyword, video, &transcript, &self.config).await;
        let result = match enriched {
            Ok(result) => result,
            Err(reason) => {
                if let AnalysisError::MalformedResponse { raw, .. } = &reason {
                    warn!(video_id = %video.id, %raw, "raw analysis response");
                }
                warn!(
                    video_id = %video.id,
                    title = %video.title,
                    %reason,
                    "skipping: analysis rejected"
                );
                return Ok(CandidateOutcome::SkippedInvalidAnalysis(reason));
            }
        };

        self.results.push(result);
        self.store.persist(&self.results).await?;
        info!(
            video_id = %video.id,
            title = %video.title,
            total = self.results.len(),
            "accepted and checkpointed"
        );

        Ok(CandidateOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_stays_in_bounds() {
        let delay = RandomDelay::new(Duration::from_millis(100), Duration::from_millis(150));
        for _ in 0..200 {
            let d = delay.pick();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(150));
        }
    }

    #[test]
    fn inverted_bounds_use_minimum() {
        let delay = RandomDelay::new(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(delay.pick(), Duration::from_secs(3));
    }

    #[test]
    fn shortfall_saturates() {
        let mut summary = KeywordSummary::new("Petra", 3, 5);
        assert_eq!(summary.shortfall(), 5);
        summary.accepted = 7;
        assert_eq!(summary.shortfall(), 0);
        assert!(summary.reached_target());
    }
}
