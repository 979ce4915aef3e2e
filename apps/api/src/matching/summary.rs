//! Aggregates over already-scored candidates: per-job summary and head-to-head comparison.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::report::{MatchAnalysis, MatchBand};

const TOP_CANDIDATES: usize = 5;
const COMMON_ITEMS: usize = 5;

/// A scored candidate, keyed by the caller's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAnalysis {
    pub candidate_id: Uuid,
    pub analysis: MatchAnalysis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCandidate {
    pub candidate_id: Uuid,
    pub match_percentage: u8,
    pub band: MatchBand,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchSummary {
    pub analyzed_count: usize,
    pub average_match_percentage: u8,
    pub score_distribution: ScoreDistribution,
    pub top_candidates: Vec<TopCandidate>,
    pub common_strengths: Vec<String>,
    pub common_weaknesses: Vec<String>,
}

/// Summarises every analysed candidate for one job.
///
/// Common strengths and weaknesses are drawn from the top candidates only.
pub fn summarize_job(candidates: &[CandidateAnalysis]) -> JobMatchSummary {
    if candidates.is_empty() {
        return JobMatchSummary::default();
    }

    let mut distribution = ScoreDistribution::default();
    let mut total: usize = 0;
    for candidate in candidates {
        let report = &candidate.analysis.report;
        total += usize::from(report.match_percentage());
        match report.band() {
            MatchBand::High => distribution.high += 1,
            MatchBand::Medium => distribution.medium += 1,
            MatchBand::Low => distribution.low += 1,
        }
    }
    let count = candidates.len();
    // round half up
    let average = (2 * total + count) / (2 * count);

    let mut ranked: Vec<&CandidateAnalysis> = candidates.iter().collect();
    // stable: ties keep input order
    ranked.sort_by(|a, b| {
        b.analysis
            .report
            .match_percentage()
            .cmp(&a.analysis.report.match_percentage())
    });
    ranked.truncate(TOP_CANDIDATES);

    let common_strengths = most_frequent(ranked.iter().map(|c| c.analysis.strengths.as_slice()));
    let common_weaknesses =
        most_frequent(ranked.iter().map(|c| c.analysis.weaknesses.as_slice()));

    JobMatchSummary {
        analyzed_count: count,
        average_match_percentage: u8::try_from(average).unwrap_or(u8::MAX),
        score_distribution: distribution,
        top_candidates: ranked
            .into_iter()
            .map(|c| TopCandidate {
                candidate_id: c.candidate_id,
                match_percentage: c.analysis.report.match_percentage(),
                band: c.analysis.report.band(),
            })
            .collect(),
        common_strengths,
        common_weaknesses,
    }
}

/// Most frequent entries first; the earliest occurrence wins a tie.
fn most_frequent<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for item in lists.flatten() {
        let next = counts.len();
        counts.entry(item.as_str()).or_insert((0, next)).0 += 1;
    }

    let mut entries: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(item, (count, first_seen))| (item, count, first_seen))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries
        .into_iter()
        .take(COMMON_ITEMS)
        .map(|(item, _, _)| item.to_string())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Comparison
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leader {
    First,
    Second,
}

impl Leader {
    /// `First` only when it is strictly ahead.
    fn of(first: u8, second: u8) -> Self {
        if first > second {
            Leader::First
        } else {
            Leader::Second
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionComparison {
    pub difference: u8,
    pub leader: Leader,
}

impl DimensionComparison {
    fn between(first: u8, second: u8) -> Self {
        Self {
            difference: first.abs_diff(second),
            leader: Leader::of(first, second),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateComparison {
    pub first_candidate_id: Uuid,
    pub second_candidate_id: Uuid,
    pub overall: DimensionComparison,
    pub required_skills: DimensionComparison,
    pub preferred_skills: DimensionComparison,
    pub experience: DimensionComparison,
    pub unique_strengths_first: Vec<String>,
    pub unique_strengths_second: Vec<String>,
    pub shared_strengths: Vec<String>,
}

pub fn compare_candidates(first: &CandidateAnalysis, second: &CandidateAnalysis) -> CandidateComparison {
    let a = &first.analysis;
    let b = &second.analysis;

    let only_in = |left: &[String], right: &[String]| -> Vec<String> {
        left.iter().filter(|s| !right.contains(s)).cloned().collect()
    };

    CandidateComparison {
        first_candidate_id: first.candidate_id,
        second_candidate_id: second.candidate_id,
        overall: DimensionComparison::between(
            a.report.match_percentage(),
            b.report.match_percentage(),
        ),
        required_skills: DimensionComparison::between(
            a.report.required_skills_match_percentage(),
            b.report.required_skills_match_percentage(),
        ),
        preferred_skills: DimensionComparison::between(
            a.report.preferred_skills_match_percentage(),
            b.report.preferred_skills_match_percentage(),
        ),
        experience: DimensionComparison::between(
            a.report.experience_relevance_percentage(),
            b.report.experience_relevance_percentage(),
        ),
        unique_strengths_first: only_in(&a.strengths, &b.strengths),
        unique_strengths_second: only_in(&b.strengths, &a.strengths),
        shared_strengths: a
            .strengths
            .iter()
            .filter(|s| b.strengths.contains(s))
            .cloned()
            .collect(),
    }
}
