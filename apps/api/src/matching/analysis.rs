//! External analysis adapter: delegates scoring to the language-model collaborator.
//!
//! The collaborator receives the resume and job as JSON and must answer with
//! the `MatchReport` fields plus narrative arrays. Anything that does not fit
//! that schema is a `MalformedResponse` carrying the raw text; the adapter
//! never substitutes a deterministic score on its own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{embedded_json_object, strip_json_fences, CompletionClient};
use crate::matching::error::{MatchError, TransportFailure};
use crate::matching::models::{JobPosting, ResumeProfile};
use crate::matching::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::matching::report::{MatchAnalysis, MatchReport, SkillBreakdown};
use crate::matching::scorer::{MatchScorer, Strategy};

/// Scorer backed by the external collaborator, bounded by an overall deadline.
pub struct LlmMatchScorer {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl LlmMatchScorer {
    /// `timeout` covers the whole call, retries included.
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn analyze(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
    ) -> Result<MatchAnalysis, MatchError> {
        let prompt = build_analysis_prompt(resume, job)?;
        let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");

        let raw = complete_within(self.client.as_ref(), self.timeout, &system, &prompt).await?;

        debug!(bytes = raw.len(), "match analysis received");
        parse_analysis(&raw)
    }
}

/// One collaborator call bounded by `timeout`, retries included.
pub(crate) async fn complete_within(
    client: &dyn CompletionClient,
    timeout: Duration,
    system: &str,
    prompt: &str,
) -> Result<String, MatchError> {
    let raw = tokio::time::timeout(timeout, client.complete(system, prompt))
        .await
        .map_err(|_| {
            warn!("collaborator call timed out after {}ms", timeout.as_millis());
            TransportFailure::Timeout(timeout)
        })??;
    Ok(raw)
}

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
    ) -> Result<MatchAnalysis, MatchError> {
        self.analyze(resume, job).await
    }

    fn strategy(&self) -> Strategy {
        Strategy::External
    }
}

/// Serializes both inputs into the analysis prompt.
pub fn build_analysis_prompt(resume: &ResumeProfile, job: &JobPosting) -> Result<String, MatchError> {
    let resume_json = serde_json::to_string_pretty(resume)
        .map_err(|e| MatchError::invalid(format!("resume could not be serialized: {e}")))?;
    let job_json = serde_json::to_string_pretty(job)
        .map_err(|e| MatchError::invalid(format!("job could not be serialized: {e}")))?;

    Ok(fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("resume_json", &resume_json),
            ("job_json", &job_json),
        ],
    ))
}

/// Decodes a collaborator reply into `T`. Code fences are stripped first; if
/// that still fails, the first `{` .. last `}` span is tried before the reply
/// is declared malformed.
pub(crate) fn decode_reply<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, MatchError> {
    let body = strip_json_fences(raw);
    serde_json::from_str(body)
        .or_else(|first| match embedded_json_object(body) {
            Some(inner) if inner != body => serde_json::from_str(inner).map_err(|_| first),
            _ => Err(first),
        })
        .map_err(|e| {
            warn!("{what} is not valid JSON: {e}");
            MatchError::malformed(raw, format!("not a valid {what} object: {e}"))
        })
}

/// What the collaborator is asked to return. Percentages are read as floats so
/// that `87.0` or `87.4` are accepted and rounded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    match_percentage: Option<f64>,
    #[serde(alias = "requiredSkillsMatchPercentage")]
    required_skills_match: Option<f64>,
    #[serde(alias = "preferredSkillsMatchPercentage")]
    preferred_skills_match: Option<f64>,
    #[serde(alias = "experienceRelevancePercentage")]
    experience_relevance: Option<f64>,
    #[serde(default)]
    matching_skills: Vec<String>,
    #[serde(default)]
    missing_required_skills: Vec<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    experience_analysis: Option<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    suggested_interview_questions: Vec<String>,
}

/// Validates a collaborator reply into a complete `MatchAnalysis`.
pub fn parse_analysis(raw: &str) -> Result<MatchAnalysis, MatchError> {
    let payload: AnalysisPayload = decode_reply(raw, "analysis")?;

    let percentage = |name: &str, value: Option<f64>| -> Result<u8, MatchError> {
        match value {
            None => Err(MatchError::malformed(raw, format!("missing field `{name}`"))),
            Some(v) if !v.is_finite() || !(0.0..=100.0).contains(&v) => Err(
                MatchError::malformed(raw, format!("`{name}` must be within 0-100, got {v}")),
            ),
            Some(v) => Ok(v.round() as u8),
        }
    };

    let match_percentage = percentage("matchPercentage", payload.match_percentage)?;
    let skills = SkillBreakdown {
        required_skills_match_percentage: percentage(
            "requiredSkillsMatch",
            payload.required_skills_match,
        )?,
        preferred_skills_match_percentage: percentage(
            "preferredSkillsMatch",
            payload.preferred_skills_match,
        )?,
        matching_skills: clean_list(payload.matching_skills),
        missing_required_skills: clean_list(payload.missing_required_skills),
    };
    let experience = percentage("experienceRelevance", payload.experience_relevance)?;

    Ok(MatchAnalysis {
        report: MatchReport::new(match_percentage, skills, experience),
        summary: payload.summary.unwrap_or_default().trim().to_string(),
        experience_analysis: payload.experience_analysis.unwrap_or_default().trim().to_string(),
        strengths: clean_list(payload.strengths),
        weaknesses: clean_list(payload.weaknesses),
        suggested_interview_questions: clean_list(payload.suggested_interview_questions),
    })
}

/// Trims entries and drops blanks.
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
