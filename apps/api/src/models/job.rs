use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::decode_json_column;
use crate::matching::models::{EducationLevel, ExperienceBand, JobPosting, SkillSet};
use crate::matching::MatchError;

/// A stored job posting. Skill lists are JSON text columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRow {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub required_skills: Option<Value>,
    pub preferred_skills: Option<Value>,
    /// One of "0-1", "1-3", "3-5", "5-10", "10+".
    pub required_experience: Option<String>,
    pub education_level: Option<String>,
}

impl TryFrom<JobRow> for JobPosting {
    type Error = MatchError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let required: Vec<String> = decode_json_column("required_skills", row.required_skills)?;
        let preferred: Vec<String> = decode_json_column("preferred_skills", row.preferred_skills)?;

        Ok(JobPosting {
            title: row.title.trim().to_string(),
            required_skills: SkillSet::new(required),
            preferred_skills: SkillSet::new(preferred),
            description_text: row.description.unwrap_or_default(),
            requirements_text: row.requirements.unwrap_or_default(),
            required_experience_band: match row.required_experience.as_deref() {
                Some(label) => ExperienceBand::parse(label)?,
                None => None,
            },
            education_level: match row.education_level.as_deref() {
                Some(level) => EducationLevel::parse(level)?,
                None => None,
            },
        })
    }
}
