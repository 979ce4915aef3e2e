//! Caller-facing scoring API: strategy dispatch, cancellation and batches.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::matching::error::{MatchError, TransportFailure};
use crate::matching::models::{JobPosting, ResumeProfile};
use crate::matching::report::MatchAnalysis;
use crate::matching::scorer::{KeywordMatchScorer, MatchScorer, Strategy};
use crate::matching::suggestions::{ImprovementAdvisor, ImprovementSuggestions};
use crate::matching::taxonomy::Taxonomy;

// ────────────────────────────────────────────────────────────────────────────
// Cancellation
// ────────────────────────────────────────────────────────────────────────────

/// Caller side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by in-flight scoring; resolves once the paired handle cancels.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx })
    }

    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self::new().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits for cancellation. Pends forever once the handle is dropped uncancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Batch policy
// ────────────────────────────────────────────────────────────────────────────

/// Throttling for batches sent to the external collaborator: at most
/// `batch_size` calls in flight, with `batch_delay` between groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay: Duration::from_millis(1000),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Routes scoring requests to the scorer for the requested `Strategy`.
///
/// Inputs are validated here, before either scorer runs. Fallback between
/// strategies is left to the caller.
#[derive(Clone)]
pub struct MatchEngine {
    deterministic: Arc<dyn MatchScorer>,
    external: Option<Arc<dyn MatchScorer>>,
    advisor: Option<Arc<ImprovementAdvisor>>,
}

impl MatchEngine {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            deterministic: Arc::new(KeywordMatchScorer::new(taxonomy)),
            external: None,
            advisor: None,
        }
    }

    pub fn with_external(mut self, scorer: Arc<dyn MatchScorer>) -> Self {
        self.external = Some(scorer);
        self
    }

    pub fn with_advisor(mut self, advisor: Arc<ImprovementAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    fn scorer(&self, strategy: Strategy) -> Result<&Arc<dyn MatchScorer>, MatchError> {
        match strategy {
            Strategy::Deterministic => Ok(&self.deterministic),
            Strategy::External => self.external.as_ref().ok_or_else(|| {
                MatchError::Configuration(
                    "LLM_API_KEY is not set; the external strategy is unavailable".to_string(),
                )
            }),
        }
    }

    pub async fn score(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        strategy: Strategy,
    ) -> Result<MatchAnalysis, MatchError> {
        let scorer = self.scorer(strategy)?;
        resume.validate()?;
        scorer.score(resume, job).await
    }

    /// Resume changes that would improve `analysis`, from the external collaborator.
    pub async fn suggest_improvements(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        analysis: &MatchAnalysis,
    ) -> Result<ImprovementSuggestions, MatchError> {
        let advisor = self.advisor.as_ref().ok_or_else(|| {
            MatchError::Configuration(
                "LLM_API_KEY is not set; improvement suggestions are unavailable".to_string(),
            )
        })?;
        resume.validate()?;
        advisor.suggest_improvements(resume, job, analysis).await
    }

    /// Like `score`, but returns `Transport(Cancelled)` as soon as `cancel` fires.
    pub async fn score_with_cancel(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        strategy: Strategy,
        cancel: &CancelToken,
    ) -> Result<MatchAnalysis, MatchError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportFailure::Cancelled.into()),
            result = self.score(resume, job, strategy) => result,
        }
    }

    /// Scores one candidate against many jobs. Output order matches `jobs`.
    pub async fn score_batch(
        &self,
        resume: &ResumeProfile,
        jobs: &[JobPosting],
        strategy: Strategy,
        policy: &BatchPolicy,
        cancel: &CancelToken,
    ) -> Vec<Result<MatchAnalysis, MatchError>> {
        let pairs: Vec<_> = jobs.iter().map(|job| (resume, job)).collect();
        self.score_pairs(&pairs, strategy, policy, cancel).await
    }

    /// Scores many candidates against one job. Output order matches `resumes`.
    pub async fn score_candidates(
        &self,
        resumes: &[ResumeProfile],
        job: &JobPosting,
        strategy: Strategy,
        policy: &BatchPolicy,
        cancel: &CancelToken,
    ) -> Vec<Result<MatchAnalysis, MatchError>> {
        let pairs: Vec<_> = resumes.iter().map(|resume| (resume, job)).collect();
        self.score_pairs(&pairs, strategy, policy, cancel).await
    }

    /// Deterministic pairs are scored in one pass; external pairs are grouped
    /// and throttled per `policy`.
    async fn score_pairs(
        &self,
        pairs: &[(&ResumeProfile, &JobPosting)],
        strategy: Strategy,
        policy: &BatchPolicy,
        cancel: &CancelToken,
    ) -> Vec<Result<MatchAnalysis, MatchError>> {
        let (group_size, delay) = match strategy {
            Strategy::Deterministic => (pairs.len().max(1), Duration::ZERO),
            Strategy::External => (policy.batch_size.max(1), policy.batch_delay),
        };

        let group_count = pairs.len().div_ceil(group_size);
        if strategy == Strategy::External {
            info!(
                pairs = pairs.len(),
                groups = group_count,
                "starting external batch"
            );
        }

        let mut results = Vec::with_capacity(pairs.len());
        for (index, group) in pairs.chunks(group_size).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(delay) => {}
                }
            }

            let outcomes = join_all(
                group
                    .iter()
                    .map(|(resume, job)| self.score_with_cancel(resume, job, strategy, cancel)),
            )
            .await;

            debug!(group = index + 1, of = group_count, "batch group scored");
            results.extend(outcomes);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::models::SkillSet;
    use crate::matching::report::{MatchReport, SkillBreakdown};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// External stand-in that records concurrency and call start times.
    #[derive(Default)]
    struct RecordingScorer {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        starts: Mutex<Vec<Instant>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl MatchScorer for RecordingScorer {
        async fn score(
            &self,
            _resume: &ResumeProfile,
            job: &JobPosting,
        ) -> Result<MatchAnalysis, MatchError> {
            self.starts.lock().unwrap().push(Instant::now());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(job.title.as_str()) {
                return Err(MatchError::malformed("oops", "bad payload"));
            }
            let score: u8 = job.title.parse().unwrap_or(0);
            Ok(MatchReport::new(score, SkillBreakdown::default(), 50).into())
        }

        fn strategy(&self) -> Strategy {
            Strategy::External
        }
    }

    fn titled_jobs(count: usize) -> Vec<JobPosting> {
        (0..count)
            .map(|i| JobPosting {
                title: (40 + i).to_string(),
                ..JobPosting::default()
            })
            .collect()
    }

    fn engine_with(scorer: Arc<RecordingScorer>) -> MatchEngine {
        MatchEngine::new(Arc::new(Taxonomy::default())).with_external(scorer)
    }

    #[tokio::test]
    async fn test_external_without_credentials_is_configuration_error() {
        let engine = MatchEngine::new(Arc::new(Taxonomy::default()));
        let err = engine
            .score(&ResumeProfile::default(), &JobPosting::default(), Strategy::External)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_invalid_resume_fails_fast_for_any_strategy() {
        let mut resume = ResumeProfile::default();
        resume.skills.technical = SkillSet::new(["English"]);
        resume.skills.languages = SkillSet::new(["english"]);

        let scorer = Arc::new(RecordingScorer::default());
        let engine = engine_with(Arc::clone(&scorer));
        for strategy in [Strategy::Deterministic, Strategy::External] {
            let err = engine
                .score(&resume, &JobPosting::default(), strategy)
                .await
                .unwrap_err();
            assert!(matches!(err, MatchError::InvalidInput(_)));
        }
        assert!(scorer.starts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deterministic_batch_preserves_order() {
        let engine = MatchEngine::new(Arc::new(Taxonomy::default()));
        let resume = ResumeProfile {
            skills: crate::matching::models::ResumeSkills {
                technical: SkillSet::new(["Rust"]),
                ..Default::default()
            },
            ..ResumeProfile::default()
        };
        let jobs = vec![
            JobPosting {
                required_skills: SkillSet::new(["Rust"]),
                ..JobPosting::default()
            },
            JobPosting {
                required_skills: SkillSet::new(["Go"]),
                ..JobPosting::default()
            },
            JobPosting::default(),
        ];

        let results = engine
            .score_batch(
                &resume,
                &jobs,
                Strategy::Deterministic,
                &BatchPolicy::default(),
                &CancelToken::never(),
            )
            .await;

        let required: Vec<u8> = results
            .iter()
            .map(|r| r.as_ref().unwrap().report.required_skills_match_percentage())
            .collect();
        assert_eq!(required, vec![100, 0, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_batch_respects_group_size_and_delay() {
        let scorer = Arc::new(RecordingScorer::default());
        let engine = engine_with(Arc::clone(&scorer));
        let policy = BatchPolicy {
            batch_size: 2,
            batch_delay: Duration::from_millis(500),
        };
        let started = Instant::now();

        let results = engine
            .score_batch(
                &ResumeProfile::default(),
                &titled_jobs(5),
                Strategy::External,
                &policy,
                &CancelToken::never(),
            )
            .await;

        let scores: Vec<u8> = results
            .iter()
            .map(|r| r.as_ref().unwrap().report.match_percentage())
            .collect();
        assert_eq!(scores, vec![40, 41, 42, 43, 44]);
        assert_eq!(scorer.peak.load(Ordering::SeqCst), 2);

        let offsets: Vec<u128> = scorer
            .starts
            .lock()
            .unwrap()
            .iter()
            .map(|t| (*t - started).as_millis())
            .collect();
        // groups start at 0, 100 + 500, 2 * (100 + 500)
        assert_eq!(offsets, vec![0, 0, 600, 600, 1200]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_batch_keeps_per_item_errors() {
        let scorer = Arc::new(RecordingScorer {
            fail_on: Some("41".to_string()),
            ..RecordingScorer::default()
        });
        let engine = engine_with(scorer);
        let results = engine
            .score_batch(
                &ResumeProfile::default(),
                &titled_jobs(3),
                Strategy::External,
                &BatchPolicy::default(),
                &CancelToken::never(),
            )
            .await;

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(MatchError::MalformedResponse { .. })));
        assert!(results[2].is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_remaining_groups() {
        let scorer = Arc::new(RecordingScorer::default());
        let engine = engine_with(Arc::clone(&scorer));
        let (handle, token) = CancelToken::new();
        let policy = BatchPolicy {
            batch_size: 1,
            batch_delay: Duration::from_secs(10),
        };

        let resumes = vec![ResumeProfile::default(); 3];
        let job = JobPosting {
            title: "70".to_string(),
            ..JobPosting::default()
        };
        let batch = engine.score_candidates(&resumes, &job, Strategy::External, &policy, &token);
        let cancel_later = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            handle.cancel();
        };
        let (results, ()) = tokio::join!(batch, cancel_later);

        assert!(results[0].is_ok());
        for result in &results[1..] {
            assert_eq!(
                result.as_ref().unwrap_err(),
                &MatchError::Transport(TransportFailure::Cancelled)
            );
        }
        assert_eq!(scorer.starts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits_single_score() {
        let engine = MatchEngine::new(Arc::new(Taxonomy::default()));
        let (handle, token) = CancelToken::new();
        handle.cancel();
        assert!(token.is_cancelled());

        let err = engine
            .score_with_cancel(
                &ResumeProfile::default(),
                &JobPosting::default(),
                Strategy::Deterministic,
                &token,
            )
            .await
            .unwrap_err();
        assert_eq!(err, MatchError::Transport(TransportFailure::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty() {
        let engine = MatchEngine::new(Arc::new(Taxonomy::default()));
        let results = engine
            .score_batch(
                &ResumeProfile::default(),
                &[],
                Strategy::Deterministic,
                &BatchPolicy::default(),
                &CancelToken::never(),
            )
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_without_advisor_is_configuration_error() {
        let engine = MatchEngine::new(Arc::new(Taxonomy::default()));
        let analysis = MatchAnalysis::from(MatchReport::new(40, SkillBreakdown::default(), 50));
        let err = engine
            .suggest_improvements(&ResumeProfile::default(), &JobPosting::default(), &analysis)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_suggestions_use_advisor() {
        use crate::llm_client::{CompletionClient, LlmError};

        struct Canned;

        #[async_trait]
        impl CompletionClient for Canned {
            async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
                Ok(r#"{"summaryOfGaps": "Needs Kafka", "keywordSuggestions": ["kafka"]}"#.to_string())
            }
        }

        let advisor = ImprovementAdvisor::new(Arc::new(Canned), Duration::from_secs(5));
        let engine = MatchEngine::new(Arc::new(Taxonomy::default())).with_advisor(Arc::new(advisor));
        let analysis = MatchAnalysis::from(MatchReport::new(40, SkillBreakdown::default(), 50));
        let suggestions = engine
            .suggest_improvements(&ResumeProfile::default(), &JobPosting::default(), &analysis)
            .await
            .unwrap();
        assert_eq!(suggestions.summary_of_gaps, "Needs Kafka");
        assert_eq!(suggestions.keyword_suggestions, vec!["kafka"]);
    }
}
