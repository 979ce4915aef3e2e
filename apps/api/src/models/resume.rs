use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::decode_json_column;
use crate::matching::models::{EducationEntry, ExperienceBand, ResumeProfile, ResumeSkills};
use crate::matching::MatchError;

/// A stored resume. `skills`, `experience` and `education` are JSON text columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub skills: Option<Value>,
    #[serde(default)]
    pub experience: Option<Value>,
    #[serde(default)]
    pub education: Option<Value>,
    /// A band label, a year count as text, or a number.
    #[serde(default, alias = "years_of_experience")]
    pub years_of_experience: Option<Value>,
}

/// One entry of the `experience` column. Other keys (company, dates) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExperienceEntryRow {
    position: String,
    description: String,
}

/// The `skills` column is either the categorised object or a bare list of technical skills.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillsColumn {
    Categorised(ResumeSkills),
    Flat(Vec<String>),
}

impl Default for SkillsColumn {
    fn default() -> Self {
        SkillsColumn::Categorised(ResumeSkills::default())
    }
}

impl From<SkillsColumn> for ResumeSkills {
    fn from(column: SkillsColumn) -> Self {
        match column {
            SkillsColumn::Categorised(skills) => skills,
            SkillsColumn::Flat(list) => ResumeSkills {
                technical: list.into(),
                ..ResumeSkills::default()
            },
        }
    }
}

impl TryFrom<ResumeRow> for ResumeProfile {
    type Error = MatchError;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        let skills: SkillsColumn = decode_json_column("skills", row.skills)?;
        let experience: Vec<ExperienceEntryRow> = decode_json_column("experience", row.experience)?;
        let education_entries: Vec<EducationEntry> =
            decode_json_column("education", row.education)?;

        let profile = ResumeProfile {
            skills: skills.into(),
            experience_descriptions: experience
                .into_iter()
                .filter_map(|entry| {
                    let text = format!("{} {}", entry.position.trim(), entry.description.trim());
                    let text = text.trim();
                    (!text.is_empty()).then(|| text.to_string())
                })
                .collect(),
            education_entries,
            years_of_experience_band: parse_years(row.years_of_experience)?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

fn parse_years(value: Option<Value>) -> Result<Option<ExperienceBand>, MatchError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => ExperienceBand::parse(&text),
        Some(Value::Number(n)) => {
            let years = n
                .as_f64()
                .ok_or_else(|| MatchError::invalid(format!("years of experience {n} is out of range")))?;
            ExperienceBand::from_years(years).map(Some)
        }
        Some(other) => Err(MatchError::invalid(format!(
            "years of experience must be text or a number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ResumeRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decodes_json_text_columns() {
        let resume = row(json!({
            "skills": "{\"technical\": [\"Rust\", \"PostgreSQL\"], \"soft\": [\"Mentoring\"]}",
            "experience": "[{\"company\": \"Acme\", \"position\": \"Backend Engineer\", \"description\": \"Built APIs\", \"current\": true}]",
            "education": "[{\"institution\": \"MIT\", \"degree\": \"Bachelor\", \"field\": \"Computer Science\"}]",
            "yearsOfExperience": "4"
        }));
        let profile = ResumeProfile::try_from(resume).unwrap();

        assert!(profile.skills.technical.contains("rust"));
        assert!(profile.skills.soft.contains("Mentoring"));
        assert!(profile.skills.languages.is_empty());
        assert_eq!(profile.experience_descriptions, vec!["Backend Engineer Built APIs"]);
        assert_eq!(profile.education_entries[0].field, "Computer Science");
        assert_eq!(profile.years_of_experience_band, Some(ExperienceBand::ThreeToFive));
    }

    #[test]
    fn test_accepts_decoded_columns_and_flat_skill_list() {
        let resume = row(json!({
            "skills": ["Go", "Kubernetes"],
            "years_of_experience": 12
        }));
        let profile = ResumeProfile::try_from(resume).unwrap();
        assert_eq!(profile.skills.technical.len(), 2);
        assert_eq!(profile.years_of_experience_band, Some(ExperienceBand::TenPlus));
    }

    #[test]
    fn test_years_accepts_band_labels_and_blank() {
        let labelled = row(json!({ "yearsOfExperience": "5-10" }));
        assert_eq!(
            ResumeProfile::try_from(labelled).unwrap().years_of_experience_band,
            Some(ExperienceBand::FiveToTen)
        );
        let blank = row(json!({ "yearsOfExperience": "" }));
        assert_eq!(ResumeProfile::try_from(blank).unwrap().years_of_experience_band, None);
    }

    #[test]
    fn test_negative_years_is_invalid() {
        let resume = row(json!({ "yearsOfExperience": -2 }));
        assert!(matches!(
            ResumeProfile::try_from(resume),
            Err(MatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overlapping_skill_categories_are_invalid() {
        let resume = row(json!({
            "skills": { "technical": ["English"], "languages": ["english"] }
        }));
        assert!(matches!(
            ResumeProfile::try_from(resume),
            Err(MatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_experience_entries_are_dropped() {
        let resume = row(json!({
            "experience": [{ "company": "Acme" }, { "position": "SRE" }]
        }));
        let profile = ResumeProfile::try_from(resume).unwrap();
        assert_eq!(profile.experience_descriptions, vec!["SRE"]);
    }
}
