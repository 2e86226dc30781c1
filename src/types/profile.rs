// src/types/profile.rs
//! Profile record as stored by the backend

use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::reference::{Country, Language};

// ===== Profile =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional_summary: ProfessionalSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Skills,
    #[serde(default, deserialize_with = "null_as_default")]
    pub availability: Availability,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<Achievement>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_basic_profile_completed: bool,
}

impl Profile {
    pub fn has_name(&self) -> bool {
        !self.personal_info.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: CountryRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<ProfileLanguage>,
}

/// Country as either a bare code/name or a full record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountryRef {
    Record(Country),
    Text(String),
}

impl Default for CountryRef {
    fn default() -> Self {
        CountryRef::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLanguage {
    pub language: LanguageRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proficiency: String,
}

/// Populated language record, or just its id when the backend does not expand it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LanguageRef {
    Record(Language),
    Id(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub years_of_experience: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industries: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_expertise: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notable_companies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, deserialize_with = "null_as_default")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule: Vec<serde_json::Value>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flexibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    /// `None` when the CV gave no parsable start date
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: EndDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EndDate {
    Present,
    Date(chrono::NaiveDate),
}

impl Serialize for EndDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EndDate::Present => serializer.serialize_str("present"),
            EndDate::Date(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for EndDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EndDate::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid end date: {}", raw)))
    }
}

impl EndDate {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("present") {
            return Some(EndDate::Present);
        }
        parse_cv_date(raw).map(EndDate::Date)
    }
}

/// Stored start dates come back as timestamps; anything unparsable is `None`
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<chrono::NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_cv_date(&s),
        _ => None,
    })
}

/// Accepts the date shapes CV extraction produces: full dates, RFC 3339
/// timestamps, year-month and bare years.
pub fn parse_cv_date(raw: &str) -> Option<chrono::NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    if raw.len() == 4 {
        if let Ok(year) = raw.parse::<i32>() {
            return chrono::NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Result of a successful import, handed from the import flow to the editor
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedProfile {
    pub profile: Profile,
    pub generated_summary: String,
}
