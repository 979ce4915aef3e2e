//! Match scoring: pluggable, trait-based scorers that measure a resume against a job.
//!
//! Default: `KeywordMatchScorer` (pure, deterministic, no network).
//! Alternative: `LlmMatchScorer` in `matching::analysis` (external collaborator).
//!
//! `MatchEngine` holds one `Arc<dyn MatchScorer>` per `Strategy`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::error::MatchError;
use crate::matching::models::{ExperienceBand, JobPosting, ResumeProfile, SkillSet};
use crate::matching::report::{MatchAnalysis, MatchBand, MatchReport, SkillBreakdown};
use crate::matching::taxonomy::{Corpus, Taxonomy};

/// The deterministic scorer never reports below this.
pub const SCORE_FLOOR: u32 = 30;
/// The deterministic scorer never reports above this.
pub const SCORE_CEILING: u32 = 98;
/// Base score when the job text mentions no taxonomy keyword.
pub const NEUTRAL_BASE_SCORE: u32 = 50;
/// Experience relevance when either side's band is unknown.
pub const NEUTRAL_EXPERIENCE_RELEVANCE: u8 = 50;
/// Relevance lost per band of distance between candidate and requirement.
pub const EXPERIENCE_PENALTY_PER_BAND: u8 = 20;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Which scorer a caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Deterministic,
    External,
}

/// Implement this to add a scoring backend without touching callers.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
    ) -> Result<MatchAnalysis, MatchError>;

    fn strategy(&self) -> Strategy;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchScorer
// ────────────────────────────────────────────────────────────────────────────

/// Keyword-overlap scorer. Identical inputs always give identical reports.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatchScorer {
    taxonomy: Arc<Taxonomy>,
}

impl KeywordMatchScorer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }
}

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(
        &self,
        resume: &ResumeProfile,
        job: &JobPosting,
    ) -> Result<MatchAnalysis, MatchError> {
        Ok(describe_match(compute_match(resume, job, &self.taxonomy)))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Deterministic
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword algorithm
// ────────────────────────────────────────────────────────────────────────────

/// How many taxonomy keywords the job mentions, and how many of those the resume shares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordOverlap {
    pub relevant: usize,
    pub matched: usize,
}

/// Scores `resume` against `job`. Pure and total: never fails, never panics.
pub fn compute_match(resume: &ResumeProfile, job: &JobPosting, taxonomy: &Taxonomy) -> MatchReport {
    let job_corpus = job_corpus(job);
    let resume_corpus = resume_corpus(resume);

    let overlap = keyword_overlap(taxonomy, &job_corpus, &resume_corpus);
    let base = base_score(overlap);
    let bonus = milestone_bonus(taxonomy, &job_corpus, &resume_corpus);
    let match_percentage = (base + bonus).clamp(SCORE_FLOOR, SCORE_CEILING) as u8;

    debug!(
        relevant = overlap.relevant,
        matched = overlap.matched,
        base,
        bonus,
        match_percentage,
        "keyword match computed"
    );

    let technical = &resume.skills.technical;
    let skills = SkillBreakdown {
        required_skills_match_percentage: skill_coverage(technical, &job.required_skills),
        preferred_skills_match_percentage: skill_coverage(technical, &job.preferred_skills),
        matching_skills: matching_skills(technical, job),
        missing_required_skills: job.required_skills.missing_from(technical),
    };

    MatchReport::new(
        match_percentage,
        skills,
        experience_relevance(resume.years_of_experience_band, job.required_experience_band),
    )
}

/// `description + " " + requirements`, normalized.
pub fn job_corpus(job: &JobPosting) -> Corpus {
    Corpus::new(&format!("{} {}", job.description_text, job.requirements_text))
}

/// Skills, experience descriptions and education, normalized.
pub fn resume_corpus(resume: &ResumeProfile) -> Corpus {
    let skills = resume.skills.iter().collect::<Vec<_>>().join(" ");
    let experience = resume.experience_descriptions.join(" ");
    let education = resume
        .education_entries
        .iter()
        .map(|e| format!("{} {}", e.degree, e.field))
        .collect::<Vec<_>>()
        .join(" ");
    Corpus::new(&format!("{skills} {experience} {education}"))
}

pub fn keyword_overlap(taxonomy: &Taxonomy, job: &Corpus, resume: &Corpus) -> KeywordOverlap {
    taxonomy
        .keywords()
        .iter()
        .filter(|keyword| job.contains(keyword))
        .fold(KeywordOverlap::default(), |mut acc, keyword| {
            acc.relevant += 1;
            if resume.contains(keyword) {
                acc.matched += 1;
            }
            acc
        })
}

/// Rounded match ratio as a percentage; neutral when the job names no keyword.
pub fn base_score(overlap: KeywordOverlap) -> u32 {
    if overlap.relevant == 0 {
        return NEUTRAL_BASE_SCORE;
    }
    ((overlap.matched as f64 / overlap.relevant as f64) * 100.0).round() as u32
}

/// Sum of every milestone term present in both corpora.
pub fn milestone_bonus(taxonomy: &Taxonomy, job: &Corpus, resume: &Corpus) -> u32 {
    taxonomy
        .bonuses()
        .iter()
        .filter(|b| job.contains(&b.term) && resume.contains(&b.term))
        .map(|b| b.points)
        .sum()
}

/// Share of `wanted` present in `have`, rounded. An empty `wanted` is fully covered.
pub fn skill_coverage(have: &SkillSet, wanted: &SkillSet) -> u8 {
    if wanted.is_empty() {
        return 100;
    }
    ((have.overlap(wanted) as f64 / wanted.len() as f64) * 100.0).round() as u8
}

/// 100 for equal bands, minus 20 per band of distance (floored at 0), 50 if either is unknown.
pub fn experience_relevance(
    candidate: Option<ExperienceBand>,
    required: Option<ExperienceBand>,
) -> u8 {
    match (candidate, required) {
        (Some(candidate), Some(required)) => {
            let distance = candidate.ordinal().abs_diff(required.ordinal());
            100u8.saturating_sub(distance.saturating_mul(EXPERIENCE_PENALTY_PER_BAND))
        }
        _ => NEUTRAL_EXPERIENCE_RELEVANCE,
    }
}

/// Technical skills found in the job's required or preferred set, in the job's
/// spelling, required ones first.
fn matching_skills(technical: &SkillSet, job: &JobPosting) -> Vec<String> {
    let mut matched = job.required_skills.shared_with(technical);
    for skill in job.preferred_skills.shared_with(technical) {
        if !job.required_skills.contains(&skill) {
            matched.push(skill);
        }
    }
    matched
}

// ────────────────────────────────────────────────────────────────────────────
// Narrative
// ────────────────────────────────────────────────────────────────────────────

/// Wraps a deterministic report with a short summary and one weakness per
/// missing required skill.
pub fn describe_match(report: MatchReport) -> MatchAnalysis {
    let summary = build_recommendation(&report);
    let weaknesses = report
        .missing_required_skills()
        .iter()
        .map(|skill| format!("Missing required skill: {skill}"))
        .collect();
    let strengths = report
        .matching_skills()
        .iter()
        .map(|skill| format!("Has {skill}"))
        .collect();
    let experience_analysis = format!(
        "Experience relevance {}/100 based on years of experience.",
        report.experience_relevance_percentage()
    );

    MatchAnalysis {
        summary,
        experience_analysis,
        strengths,
        weaknesses,
        ..MatchAnalysis::from(report)
    }
}

/// Builds a human-readable recommendation from the band and top missing skills.
fn build_recommendation(report: &MatchReport) -> String {
    let score = report.match_percentage();
    let top_gaps: Vec<&str> = report
        .missing_required_skills()
        .iter()
        .take(3)
        .map(String::as_str)
        .collect();

    match (report.band(), top_gaps.is_empty()) {
        (MatchBand::High, _) => {
            format!("Strong match ({score}/100). The profile covers the key requirements.")
        }
        (MatchBand::Medium, true) => format!("Moderate match ({score}/100)."),
        (MatchBand::Medium, false) => format!(
            "Moderate match ({score}/100). Missing required skills: {}.",
            top_gaps.join(", ")
        ),
        (MatchBand::Low, true) => format!("Low match ({score}/100)."),
        (MatchBand::Low, false) => format!(
            "Low match ({score}/100). Significant gaps: {}.",
            top_gaps.join(", ")
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
