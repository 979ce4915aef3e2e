//! Matchable inputs: the candidate profile and the job posting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matching::error::MatchError;
use crate::matching::taxonomy::normalize;

// ────────────────────────────────────────────────────────────────────────────
// Skill sets
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive, deduplicated set of skill names.
///
/// Entries are keyed by their normalized form; the first spelling seen is the
/// one reported back. Blank entries are dropped on insert, so the set only
/// ever holds non-empty trimmed strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillSet {
    entries: BTreeMap<String, String>,
}

impl SkillSet {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for skill in skills {
            set.insert(skill.as_ref());
        }
        set
    }

    /// Returns false when the skill was blank or already present.
    pub fn insert(&mut self, skill: &str) -> bool {
        let display = skill.trim();
        let key = normalize(display);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, display.to_string());
        true
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.entries.contains_key(&normalize(skill))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display spellings in normalized-key order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Number of skills in `self` that also appear in `other`.
    pub fn overlap(&self, other: &SkillSet) -> usize {
        self.entries
            .keys()
            .filter(|key| other.entries.contains_key(*key))
            .count()
    }

    /// Skills of `self` (in `self`'s spelling) that `other` lacks.
    pub fn missing_from(&self, other: &SkillSet) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(key, _)| !other.entries.contains_key(*key))
            .map(|(_, display)| display.clone())
            .collect()
    }

    /// Skills of `self` (in `self`'s spelling) that `other` also has.
    pub fn shared_with(&self, other: &SkillSet) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(key, _)| other.entries.contains_key(*key))
            .map(|(_, display)| display.clone())
            .collect()
    }

    fn first_shared_key<'a>(&'a self, other: &SkillSet) -> Option<&'a str> {
        self.entries
            .keys()
            .find(|key| other.entries.contains_key(*key))
            .map(String::as_str)
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(skills: Vec<String>) -> Self {
        Self::new(skills)
    }
}

impl From<SkillSet> for Vec<String> {
    fn from(set: SkillSet) -> Self {
        set.entries.into_values().collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ordinal attributes
// ────────────────────────────────────────────────────────────────────────────

/// Years-of-experience bucket on a fixed five-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExperienceBand {
    #[serde(rename = "0-1")]
    ZeroToOne,
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "10+")]
    TenPlus,
}

impl ExperienceBand {
    pub const ALL: [ExperienceBand; 5] = [
        ExperienceBand::ZeroToOne,
        ExperienceBand::OneToThree,
        ExperienceBand::ThreeToFive,
        ExperienceBand::FiveToTen,
        ExperienceBand::TenPlus,
    ];

    /// Position on the scale, 0 through 4.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceBand::ZeroToOne => "0-1",
            ExperienceBand::OneToThree => "1-3",
            ExperienceBand::ThreeToFive => "3-5",
            ExperienceBand::FiveToTen => "5-10",
            ExperienceBand::TenPlus => "10+",
        }
    }

    /// Lower-inclusive buckets: [0,1), [1,3), [3,5), [5,10), [10,∞).
    pub fn from_years(years: f64) -> Result<Self, MatchError> {
        if !years.is_finite() || years < 0.0 {
            return Err(MatchError::invalid(format!(
                "years of experience must be a non-negative number, got {years}"
            )));
        }
        Ok(match years {
            y if y < 1.0 => ExperienceBand::ZeroToOne,
            y if y < 3.0 => ExperienceBand::OneToThree,
            y if y < 5.0 => ExperienceBand::ThreeToFive,
            y if y < 10.0 => ExperienceBand::FiveToTen,
            _ => ExperienceBand::TenPlus,
        })
    }

    /// Accepts a band label ("3-5", "10+") or a year count ("4", "4 years", "4.5 yrs").
    /// Blank input means unknown.
    pub fn parse(text: &str) -> Result<Option<Self>, MatchError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Some(band) = Self::ALL.iter().find(|b| b.as_str() == trimmed) {
            return Ok(Some(*band));
        }

        let numeric = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches('+');
        let years: f64 = numeric.parse().map_err(|_| {
            MatchError::invalid(format!("unrecognized experience band '{trimmed}'"))
        })?;
        Self::from_years(years).map(Some)
    }
}

impl fmt::Display for ExperienceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum education a posting asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Phd,
    Certification,
}

impl EducationLevel {
    /// Blank input means no requirement.
    pub fn parse(text: &str) -> Result<Option<Self>, MatchError> {
        let key = normalize(text).replace([' ', '-'], "_");
        let level = match key.as_str() {
            "" => return Ok(None),
            "high_school" => EducationLevel::HighSchool,
            "associate" => EducationLevel::Associate,
            "bachelor" => EducationLevel::Bachelor,
            "master" => EducationLevel::Master,
            "phd" => EducationLevel::Phd,
            "certification" => EducationLevel::Certification,
            _ => {
                return Err(MatchError::invalid(format!(
                    "unrecognized education level '{}'",
                    text.trim()
                )))
            }
        };
        Ok(Some(level))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume profile
// ────────────────────────────────────────────────────────────────────────────

/// The three skill categories of a resume. Missing categories are empty sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeSkills {
    pub technical: SkillSet,
    pub soft: SkillSet,
    pub languages: SkillSet,
}

impl ResumeSkills {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.technical
            .iter()
            .chain(self.soft.iter())
            .chain(self.languages.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub field: String,
}

/// A candidate's matchable attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeProfile {
    pub skills: ResumeSkills,
    pub experience_descriptions: Vec<String>,
    pub education_entries: Vec<EducationEntry>,
    pub years_of_experience_band: Option<ExperienceBand>,
}

impl ResumeProfile {
    /// Skill categories must be disjoint.
    pub fn validate(&self) -> Result<(), MatchError> {
        let categories = [
            ("technical", &self.skills.technical),
            ("soft", &self.skills.soft),
            ("languages", &self.skills.languages),
        ];
        for (i, (name, set)) in categories.iter().enumerate() {
            for (other_name, other) in &categories[i + 1..] {
                if let Some(skill) = set.first_shared_key(other) {
                    return Err(MatchError::invalid(format!(
                        "skill '{skill}' is listed under both {name} and {other_name}"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job posting
// ────────────────────────────────────────────────────────────────────────────

/// A job's matchable requirement set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobPosting {
    /// Carried to the external collaborator only; not part of the keyword corpus.
    pub title: String,
    pub required_skills: SkillSet,
    pub preferred_skills: SkillSet,
    pub description_text: String,
    pub requirements_text: String,
    pub required_experience_band: Option<ExperienceBand>,
    pub education_level: Option<EducationLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_set_is_case_insensitive_and_keeps_first_spelling() {
        let set = SkillSet::new(["JavaScript", "javascript", " React ", "", "   "]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("JAVASCRIPT"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["JavaScript", "React"]);
    }

    #[test]
    fn test_skill_set_collapses_inner_whitespace_in_key() {
        let set = SkillSet::new(["Machine  Learning"]);
        assert!(set.contains("machine learning"));
    }

    #[test]
    fn test_skill_set_overlap_and_missing() {
        let required = SkillSet::new(["JavaScript", "React", "SQL"]);
        let have = SkillSet::new(["react", "Python"]);
        assert_eq!(required.overlap(&have), 1);
        assert_eq!(required.missing_from(&have), vec!["JavaScript", "SQL"]);
        assert_eq!(required.shared_with(&have), vec!["React"]);
    }

    #[test]
    fn test_skill_set_serde_as_plain_array() {
        let set: SkillSet = serde_json::from_str(r#"["Rust", "rust", "Go"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Go","Rust"]"#);
    }

    #[test]
    fn test_experience_band_parse_labels() {
        assert_eq!(ExperienceBand::parse("3-5").unwrap(), Some(ExperienceBand::ThreeToFive));
        assert_eq!(ExperienceBand::parse(" 10+ ").unwrap(), Some(ExperienceBand::TenPlus));
        assert_eq!(ExperienceBand::parse("").unwrap(), None);
    }

    #[test]
    fn test_experience_band_parse_year_counts() {
        assert_eq!(ExperienceBand::parse("4").unwrap(), Some(ExperienceBand::ThreeToFive));
        assert_eq!(ExperienceBand::parse("4 years").unwrap(), Some(ExperienceBand::ThreeToFive));
        assert_eq!(ExperienceBand::parse("12+ years").unwrap(), Some(ExperienceBand::TenPlus));
        assert_eq!(ExperienceBand::parse("0.5").unwrap(), Some(ExperienceBand::ZeroToOne));
    }

    #[test]
    fn test_experience_band_boundaries_are_lower_inclusive() {
        assert_eq!(ExperienceBand::from_years(1.0).unwrap(), ExperienceBand::OneToThree);
        assert_eq!(ExperienceBand::from_years(3.0).unwrap(), ExperienceBand::ThreeToFive);
        assert_eq!(ExperienceBand::from_years(5.0).unwrap(), ExperienceBand::FiveToTen);
        assert_eq!(ExperienceBand::from_years(10.0).unwrap(), ExperienceBand::TenPlus);
    }

    #[test]
    fn test_experience_band_rejects_negative_and_garbage() {
        assert!(matches!(
            ExperienceBand::parse("-2"),
            Err(MatchError::InvalidInput(_))
        ));
        assert!(matches!(
            ExperienceBand::parse("lots"),
            Err(MatchError::InvalidInput(_))
        ));
        assert!(ExperienceBand::from_years(f64::NAN).is_err());
    }

    #[test]
    fn test_experience_band_serde_labels() {
        let band: ExperienceBand = serde_json::from_str(r#""5-10""#).unwrap();
        assert_eq!(band, ExperienceBand::FiveToTen);
        assert!(serde_json::from_str::<ExperienceBand>(r#""20-30""#).is_err());
    }

    #[test]
    fn test_ordinals_follow_scale() {
        let ordinals: Vec<u8> = ExperienceBand::ALL.iter().map(|b| b.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_education_level_parse() {
        assert_eq!(EducationLevel::parse("PhD").unwrap(), Some(EducationLevel::Phd));
        assert_eq!(
            EducationLevel::parse("High School").unwrap(),
            Some(EducationLevel::HighSchool)
        );
        assert_eq!(EducationLevel::parse("").unwrap(), None);
        assert!(EducationLevel::parse("wizard").is_err());
    }

    #[test]
    fn test_resume_validate_rejects_overlapping_categories() {
        let mut resume = ResumeProfile::default();
        resume.skills.technical = SkillSet::new(["SQL", "Communication"]);
        resume.skills.soft = SkillSet::new(["communication"]);
        let err = resume.validate().unwrap_err();
        assert!(err.to_string().contains("communication"));
    }

    #[test]
    fn test_resume_missing_categories_deserialize_as_empty() {
        let resume: ResumeProfile =
            serde_json::from_str(r#"{"skills": {"technical": ["Rust"]}}"#).unwrap();
        assert!(resume.skills.soft.is_empty());
        assert!(resume.skills.languages.is_empty());
        assert!(resume.years_of_experience_band.is_none());
        assert!(resume.validate().is_ok());
    }
}
