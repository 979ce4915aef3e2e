//! Scoring output: the immutable `MatchReport`, its band, and the narrative wrapper.

use serde::{Deserialize, Serialize};

/// Lowest score counted as a high match.
pub const HIGH_BAND_THRESHOLD: u8 = 80;
/// Lowest score counted as a medium match.
pub const MEDIUM_BAND_THRESHOLD: u8 = 60;

/// Coarse classification of a match percentage. The same thresholds back
/// display, filtering and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBand {
    High,
    Medium,
    Low,
}

impl MatchBand {
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_BAND_THRESHOLD {
            MatchBand::High
        } else if score >= MEDIUM_BAND_THRESHOLD {
            MatchBand::Medium
        } else {
            MatchBand::Low
        }
    }
}

/// Required/preferred skill coverage for one (resume, job) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillBreakdown {
    pub required_skills_match_percentage: u8,
    pub preferred_skills_match_percentage: u8,
    pub matching_skills: Vec<String>,
    pub missing_required_skills: Vec<String>,
}

/// Result of scoring one (resume, job) pair.
///
/// Fields are read-only; recomputing means producing a new report. `band` is
/// always derived from `match_percentage` and every percentage is within 0–100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ReportFields")]
pub struct MatchReport {
    match_percentage: u8,
    required_skills_match_percentage: u8,
    preferred_skills_match_percentage: u8,
    matching_skills: Vec<String>,
    missing_required_skills: Vec<String>,
    experience_relevance_percentage: u8,
    band: MatchBand,
}

impl MatchReport {
    /// Percentages above 100 are capped.
    pub fn new(
        match_percentage: u8,
        skills: SkillBreakdown,
        experience_relevance_percentage: u8,
    ) -> Self {
        let match_percentage = match_percentage.min(100);
        Self {
            match_percentage,
            required_skills_match_percentage: skills.required_skills_match_percentage.min(100),
            preferred_skills_match_percentage: skills.preferred_skills_match_percentage.min(100),
            matching_skills: skills.matching_skills,
            missing_required_skills: skills.missing_required_skills,
            experience_relevance_percentage: experience_relevance_percentage.min(100),
            band: MatchBand::from_score(match_percentage),
        }
    }

    /// A copy with a different overall score and a re-derived band.
    pub fn with_match_percentage(&self, match_percentage: u8) -> Self {
        let match_percentage = match_percentage.min(100);
        Self {
            match_percentage,
            band: MatchBand::from_score(match_percentage),
            ..self.clone()
        }
    }

    pub fn match_percentage(&self) -> u8 {
        self.match_percentage
    }

    pub fn required_skills_match_percentage(&self) -> u8 {
        self.required_skills_match_percentage
    }

    pub fn preferred_skills_match_percentage(&self) -> u8 {
        self.preferred_skills_match_percentage
    }

    pub fn matching_skills(&self) -> &[String] {
        &self.matching_skills
    }

    pub fn missing_required_skills(&self) -> &[String] {
        &self.missing_required_skills
    }

    pub fn experience_relevance_percentage(&self) -> u8 {
        self.experience_relevance_percentage
    }

    pub fn band(&self) -> MatchBand {
        self.band
    }
}

/// Wire shape used when reading a report back (e.g. from a stored record).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportFields {
    match_percentage: u8,
    required_skills_match_percentage: u8,
    preferred_skills_match_percentage: u8,
    #[serde(default)]
    matching_skills: Vec<String>,
    #[serde(default)]
    missing_required_skills: Vec<String>,
    experience_relevance_percentage: u8,
    #[serde(default)]
    band: Option<MatchBand>,
}

impl TryFrom<ReportFields> for MatchReport {
    type Error = String;

    fn try_from(fields: ReportFields) -> Result<Self, Self::Error> {
        let percentages = [
            ("matchPercentage", fields.match_percentage),
            ("requiredSkillsMatchPercentage", fields.required_skills_match_percentage),
            ("preferredSkillsMatchPercentage", fields.preferred_skills_match_percentage),
            ("experienceRelevancePercentage", fields.experience_relevance_percentage),
        ];
        if let Some((name, value)) = percentages.iter().find(|(_, v)| *v > 100) {
            return Err(format!("{name} must be within 0-100, got {value}"));
        }

        let report = MatchReport::new(
            fields.match_percentage,
            SkillBreakdown {
                required_skills_match_percentage: fields.required_skills_match_percentage,
                preferred_skills_match_percentage: fields.preferred_skills_match_percentage,
                matching_skills: fields.matching_skills,
                missing_required_skills: fields.missing_required_skills,
            },
            fields.experience_relevance_percentage,
        );

        match fields.band {
            Some(band) if band != report.band => Err(format!(
                "band {band:?} is inconsistent with matchPercentage {}",
                report.match_percentage
            )),
            _ => Ok(report),
        }
    }
}

/// A `MatchReport` plus the narrative fields both strategies fill in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    #[serde(flatten)]
    pub report: MatchReport,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience_analysis: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggested_interview_questions: Vec<String>,
}

impl From<MatchReport> for MatchAnalysis {
    fn from(report: MatchReport) -> Self {
        Self {
            report,
            summary: String::new(),
            experience_analysis: String::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            suggested_interview_questions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(score: u8) -> MatchReport {
        MatchReport::new(score, SkillBreakdown::default(), 50)
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(MatchBand::from_score(100), MatchBand::High);
        assert_eq!(MatchBand::from_score(80), MatchBand::High);
        assert_eq!(MatchBand::from_score(79), MatchBand::Medium);
        assert_eq!(MatchBand::from_score(60), MatchBand::Medium);
        assert_eq!(MatchBand::from_score(59), MatchBand::Low);
        assert_eq!(MatchBand::from_score(0), MatchBand::Low);
    }

    #[test]
    fn test_band_consistent_for_every_score() {
        for score in 0..=100u8 {
            let band = report(score).band();
            assert_eq!(band == MatchBand::High, score >= 80);
            assert_eq!(band == MatchBand::Medium, (60..80).contains(&score));
            assert_eq!(band == MatchBand::Low, score < 60);
        }
    }

    #[test]
    fn test_new_caps_percentages() {
        let r = MatchReport::new(
            150,
            SkillBreakdown {
                required_skills_match_percentage: 101,
                ..SkillBreakdown::default()
            },
            200,
        );
        assert_eq!(r.match_percentage(), 100);
        assert_eq!(r.required_skills_match_percentage(), 100);
        assert_eq!(r.experience_relevance_percentage(), 100);
    }

    #[test]
    fn test_with_match_percentage_rederives_band() {
        let low = report(55);
        let high = low.with_match_percentage(85);
        assert_eq!(low.band(), MatchBand::Low);
        assert_eq!(high.band(), MatchBand::High);
        assert_eq!(high.experience_relevance_percentage(), 50);
    }

    #[test]
    fn test_serializes_camel_case_with_band() {
        let json = serde_json::to_value(report(72)).unwrap();
        assert_eq!(json["matchPercentage"], 72);
        assert_eq!(json["band"], "medium");
        assert!(json.get("experienceRelevancePercentage").is_some());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let json = r#"{"matchPercentage": 120, "requiredSkillsMatchPercentage": 0,
            "preferredSkillsMatchPercentage": 0, "experienceRelevancePercentage": 0}"#;
        assert!(serde_json::from_str::<MatchReport>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_band() {
        let json = r#"{"matchPercentage": 90, "requiredSkillsMatchPercentage": 0,
            "preferredSkillsMatchPercentage": 0, "experienceRelevancePercentage": 0,
            "band": "low"}"#;
        assert!(serde_json::from_str::<MatchReport>(json).is_err());
    }

    #[test]
    fn test_analysis_flattens_report_fields() {
        let analysis = MatchAnalysis {
            summary: "Solid".to_string(),
            ..MatchAnalysis::from(report(81))
        };
        let json = serde_json::to_string(&analysis).unwrap();
        let back: MatchAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analysis);
        assert_eq!(back.report.band(), MatchBand::High);
    }
}
