//! Resume improvement suggestions from the external collaborator.
//!
//! Takes a resume, a job and the match analysis already computed for the pair,
//! and asks the collaborator what the candidate could change. Deadline and
//! `MalformedResponse` rules are the same as for match analysis.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::CompletionClient;
use crate::matching::analysis::{clean_list, complete_within, decode_reply};
use crate::matching::error::MatchError;
use crate::matching::models::{JobPosting, ResumeProfile};
use crate::matching::prompts::{SUGGESTIONS_PROMPT_TEMPLATE, SUGGESTIONS_SYSTEM};
use crate::matching::report::MatchAnalysis;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementSuggestions {
    pub summary_of_gaps: String,
    pub skill_suggestions: Vec<String>,
    pub experience_suggestions: Vec<String>,
    pub resume_formatting_suggestions: Vec<String>,
    pub keyword_suggestions: Vec<String>,
    /// Most important first.
    pub improvement_priorities: Vec<String>,
}

/// Asks the collaborator for resume changes, bounded by an overall deadline.
pub struct ImprovementAdvisor {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl ImprovementAdvisor {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn suggest_improvements(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
        analysis: &MatchAnalysis,
    ) -> Result<ImprovementSuggestions, MatchError> {
        let prompt = build_suggestions_prompt(resume, job, analysis)?;
        let system = format!("{SUGGESTIONS_SYSTEM} {JSON_ONLY_SYSTEM}");

        let raw = complete_within(self.client.as_ref(), self.timeout, &system, &prompt).await?;

        debug!(bytes = raw.len(), "improvement suggestions received");
        parse_suggestions(&raw)
    }
}

pub fn build_suggestions_prompt(
    resume: &ResumeProfile,
    job: &JobPosting,
    analysis: &MatchAnalysis,
) -> Result<String, MatchError> {
    let to_json = |what: &str, value: Result<String, serde_json::Error>| {
        value.map_err(|e| MatchError::invalid(format!("{what} could not be serialized: {e}")))
    };
    let resume_json = to_json("resume", serde_json::to_string_pretty(resume))?;
    let job_json = to_json("job", serde_json::to_string_pretty(job))?;
    let analysis_json = to_json("analysis", serde_json::to_string_pretty(analysis))?;

    Ok(fill_template(
        SUGGESTIONS_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("resume_json", &resume_json),
            ("job_json", &job_json),
            ("analysis_json", &analysis_json),
        ],
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionsPayload {
    summary_of_gaps: Option<String>,
    #[serde(default)]
    skill_suggestions: Vec<String>,
    #[serde(default)]
    experience_suggestions: Vec<String>,
    #[serde(default)]
    resume_formatting_suggestions: Vec<String>,
    #[serde(default)]
    keyword_suggestions: Vec<String>,
    #[serde(default)]
    improvement_priorities: Vec<String>,
}

/// Validates a collaborator reply. `summaryOfGaps` is required; the lists
/// may be absent or empty.
pub fn parse_suggestions(raw: &str) -> Result<ImprovementSuggestions, MatchError> {
    let payload: SuggestionsPayload = decode_reply(raw, "suggestions")?;

    let summary_of_gaps = payload
        .summary_of_gaps
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MatchError::malformed(raw, "missing field `summaryOfGaps`"))?;

    Ok(ImprovementSuggestions {
        summary_of_gaps,
        skill_suggestions: clean_list(payload.skill_suggestions),
        experience_suggestions: clean_list(payload.experience_suggestions),
        resume_formatting_suggestions: clean_list(payload.resume_formatting_suggestions),
        keyword_suggestions: clean_list(payload.keyword_suggestions),
        improvement_priorities: clean_list(payload.improvement_priorities),
    })
}
