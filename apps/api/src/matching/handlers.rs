//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::CancelToken;
use crate::matching::jitter::apply_jitter;
use crate::matching::models::{JobPosting, ResumeProfile};
use crate::matching::report::MatchAnalysis;
use crate::matching::scorer::Strategy;
use crate::matching::suggestions::ImprovementSuggestions;
use crate::matching::summary::{
    compare_candidates, summarize_job, CandidateAnalysis, CandidateComparison, JobMatchSummary,
};
use crate::matching::MatchError;
use crate::models::{JobRow, ResumeRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub resume: ResumeRow,
    pub job: JobRow,
    #[serde(default)]
    pub strategy: Strategy,
    /// Deterministic strategy only.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub analysis: MatchAnalysis,
    pub strategy: Strategy,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub resume: ResumeRow,
    pub jobs: Vec<JobRow>,
    #[serde(default)]
    pub strategy: Strategy,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// One element of a batch response: `{"ok": ...}` or `{"error": {...}}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOutcome {
    Ok(MatchAnalysis),
    Error(ErrorBody),
}

impl From<Result<MatchAnalysis, MatchError>> for ItemOutcome {
    fn from(result: Result<MatchAnalysis, MatchError>) -> Self {
        match result {
            Ok(analysis) => ItemOutcome::Ok(analysis),
            Err(err) => {
                let (_, code, message) = AppError::from(err).parts();
                ItemOutcome::Error(ErrorBody { code, message })
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<ItemOutcome>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInput {
    pub candidate_id: Uuid,
    pub resume: ResumeRow,
}

#[derive(Debug, Deserialize)]
pub struct CandidatesRequest {
    pub job: JobRow,
    pub candidates: Vec<CandidateInput>,
    #[serde(default)]
    pub strategy: Strategy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub candidate_id: Uuid,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub results: Vec<CandidateResult>,
    /// Over successfully scored candidates only.
    pub summary: JobMatchSummary,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    pub resume: ResumeRow,
    pub job: JobRow,
    /// Scored with `strategy` when absent.
    #[serde(default)]
    pub analysis: Option<MatchAnalysis>,
    #[serde(default)]
    pub strategy: Strategy,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub first: CandidateAnalysis,
    pub second: CandidateAnalysis,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches/score
///
/// Scores one resume against one job with the requested strategy.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    if request.jitter_seed.is_some() && request.strategy != Strategy::Deterministic {
        return Err(AppError::Validation(
            "jitterSeed is only supported with the deterministic strategy".to_string(),
        ));
    }

    let resume = ResumeProfile::try_from(request.resume)?;
    let job = JobPosting::try_from(request.job)?;

    let mut analysis = state.engine.score(&resume, &job, request.strategy).await?;
    if let Some(seed) = request.jitter_seed {
        analysis.report = apply_jitter(&analysis.report, seed);
    }

    Ok(Json(ScoreResponse {
        analysis,
        strategy: request.strategy,
    }))
}

/// POST /api/v1/matches/batch
///
/// One resume against many jobs. Results are in request order; a failed item
/// does not fail the request.
pub async fn handle_score_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let resume = ResumeProfile::try_from(request.resume)?;
    let jobs = request
        .jobs
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            JobPosting::try_from(row).map_err(|e| AppError::Validation(format!("jobs[{i}]: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(jobs = jobs.len(), strategy = ?request.strategy, "Scoring batch");

    let results = state
        .engine
        .score_batch(
            &resume,
            &jobs,
            request.strategy,
            &state.batch_policy,
            &CancelToken::never(),
        )
        .await;

    Ok(Json(BatchResponse {
        results: results.into_iter().map(ItemOutcome::from).collect(),
    }))
}

/// POST /api/v1/jobs/candidates
///
/// Many candidates against one job, plus a summary of the scored pool.
pub async fn handle_score_candidates(
    State(state): State<AppState>,
    Json(request): Json<CandidatesRequest>,
) -> Result<Json<CandidatesResponse>, AppError> {
    let job = JobPosting::try_from(request.job)?;

    let mut ids = Vec::with_capacity(request.candidates.len());
    let mut resumes = Vec::with_capacity(request.candidates.len());
    for input in request.candidates {
        let resume = ResumeProfile::try_from(input.resume).map_err(|e| {
            AppError::Validation(format!("candidate {}: {e}", input.candidate_id))
        })?;
        ids.push(input.candidate_id);
        resumes.push(resume);
    }

    info!(candidates = resumes.len(), strategy = ?request.strategy, "Scoring candidates");

    let outcomes = state
        .engine
        .score_candidates(
            &resumes,
            &job,
            request.strategy,
            &state.batch_policy,
            &CancelToken::never(),
        )
        .await;

    let scored: Vec<CandidateAnalysis> = ids
        .iter()
        .zip(&outcomes)
        .filter_map(|(id, outcome)| {
            outcome.as_ref().ok().map(|analysis| CandidateAnalysis {
                candidate_id: *id,
                analysis: analysis.clone(),
            })
        })
        .collect();
    let summary = summarize_job(&scored);

    let results = ids
        .into_iter()
        .zip(outcomes)
        .map(|(candidate_id, outcome)| CandidateResult {
            candidate_id,
            outcome: outcome.into(),
        })
        .collect();

    Ok(Json(CandidatesResponse { results, summary }))
}

/// POST /api/v1/matches/suggestions
///
/// Resume changes that would improve the candidate's match for the job.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(request): Json<SuggestionsRequest>,
) -> Result<Json<ImprovementSuggestions>, AppError> {
    let resume = ResumeProfile::try_from(request.resume)?;
    let job = JobPosting::try_from(request.job)?;

    let analysis = match request.analysis {
        Some(analysis) => analysis,
        None => state.engine.score(&resume, &job, request.strategy).await?,
    };

    let suggestions = state
        .engine
        .suggest_improvements(&resume, &job, &analysis)
        .await?;
    info!(
        score = analysis.report.match_percentage(),
        priorities = suggestions.improvement_priorities.len(),
        "Suggestions generated"
    );
    Ok(Json(suggestions))
}

/// POST /api/v1/matches/compare
///
/// Compares two previously scored candidates dimension by dimension.
pub async fn handle_compare(
    Json(request): Json<CompareRequest>,
) -> Result<Json<CandidateComparison>, AppError> {
    if request.first.candidate_id == request.second.candidate_id {
        return Err(AppError::Validation(
            "first and second must be different candidates".to_string(),
        ));
    }
    Ok(Json(compare_candidates(&request.first, &request.second)))
}
