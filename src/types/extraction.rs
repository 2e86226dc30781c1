// src/types/extraction.rs
//! Shapes returned by the AI extraction endpoints

use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::profile::{Achievement, Availability};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Number or numeric string depending on the model's mood
    #[serde(default)]
    pub years_of_experience: serde_json::Value,
    #[serde(default)]
    pub current_role: Option<String>,
}

impl BasicInfo {
    /// Numeric years of experience; anything unparsable counts as 0
    pub fn years_of_experience(&self) -> f64 {
        let years = match &self.years_of_experience {
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
            serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            serde_json::Value::Bool(true) => 1.0,
            _ => 0.0,
        };
        if years.is_finite() {
            years
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<ExtractedRole>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_areas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notable_companies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technical_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRole {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<ExtractedLanguage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedLanguage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso639_1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementsAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Achievement>,
}

pub type AvailabilityAnalysis = Availability;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_of_experience_coercion() {
        let from = |value: serde_json::Value| BasicInfo {
            years_of_experience: value,
            ..BasicInfo::default()
        };

        assert_eq!(from(serde_json::json!(7)).years_of_experience(), 7.0);
        assert_eq!(from(serde_json::json!("12")).years_of_experience(), 12.0);
        assert_eq!(from(serde_json::json!("ten")).years_of_experience(), 0.0);
        assert_eq!(from(serde_json::Value::Null).years_of_experience(), 0.0);
    }

    #[test]
    fn test_skills_analysis_defaults() {
        let skills: SkillsAnalysis = serde_json::from_str(
            r#"{"languages":[{"language":"English","iso639_1":"en","proficiency":"Native"}]}"#,
        )
        .unwrap();
        assert_eq!(skills.languages.len(), 1);
        assert_eq!(skills.languages[0].iso639_1, "en");
        assert!(skills.technical.is_empty());
    }

    #[test]
    fn test_null_lists_and_strings_read_as_empty() {
        let experience: ExperienceAnalysis = serde_json::from_str(
            r#"{
                "roles": [{"title": "Agent", "company": null, "startDate": null, "endDate": "present", "responsibilities": null}],
                "keyAreas": null,
                "softSkills": null
            }"#,
        )
        .unwrap();
        assert!(experience.key_areas.is_empty());
        assert!(experience.soft_skills.is_empty());
        assert_eq!(experience.roles[0].company, "");
        assert_eq!(experience.roles[0].start_date, "");
        assert!(experience.roles[0].responsibilities.is_empty());

        let skills: SkillsAnalysis = serde_json::from_str(
            r#"{"languages":[{"language":"French","iso639_1":null,"proficiency":null}],"technical":null}"#,
        )
        .unwrap();
        assert_eq!(skills.languages[0].iso639_1, "");
        assert!(skills.technical.is_empty());

        let achievements: AchievementsAnalysis = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(achievements.items.is_empty());
    }
}
