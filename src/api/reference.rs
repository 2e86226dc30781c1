// src/api/reference.rs
//! Languages, skills, industries and activities

use tracing::{info, warn};

use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::types::reference::{DataEnvelope, Language, ReferenceItem};

const LANGUAGES_ENDPOINT: &str = "/languages";
const SKILLS_ENDPOINT: &str = "/skills";
const INDUSTRIES_ENDPOINT: &str = "/industries";
const ACTIVITIES_ENDPOINT: &str = "/activities";

impl ServiceClient {
    pub async fn get_all_languages(&self) -> Result<Vec<Language>, ApiError> {
        let envelope: DataEnvelope<Vec<Language>> = self.get(LANGUAGES_ENDPOINT).await?;
        info!("Loaded {} languages", envelope.data.len());
        Ok(envelope.data)
    }

    /// Look up a language by its ISO 639-1 code. A 404 means "unknown code".
    pub async fn get_language_by_code(&self, code: &str) -> Result<Option<Language>, ApiError> {
        let endpoint = format!("{}/{}", LANGUAGES_ENDPOINT, code);
        match self.get::<Option<DataEnvelope<Option<Language>>>>(&endpoint).await {
            Ok(envelope) => Ok(envelope.and_then(|e| e.data)),
            Err(ApiError::Status { status: 404, .. }) => {
                warn!("Language code not found: {}", code);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_skills(&self, category: &str) -> Result<Vec<ReferenceItem>, ApiError> {
        let envelope: DataEnvelope<Vec<ReferenceItem>> = self
            .get(&format!("{}/{}", SKILLS_ENDPOINT, category))
            .await?;
        Ok(envelope.data)
    }

    pub async fn get_industries(&self) -> Result<Vec<ReferenceItem>, ApiError> {
        let envelope: DataEnvelope<Vec<ReferenceItem>> = self.get(INDUSTRIES_ENDPOINT).await?;
        Ok(envelope.data)
    }

    pub async fn get_activities(&self) -> Result<Vec<ReferenceItem>, ApiError> {
        let envelope: DataEnvelope<Vec<ReferenceItem>> = self.get(ACTIVITIES_ENDPOINT).await?;
        Ok(envelope.data)
    }
}

/// Case-insensitive match on name, code or native name; a blank term keeps everything
pub fn search_languages<'a>(languages: &'a [Language], term: &str) -> Vec<&'a Language> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return languages.iter().collect();
    }

    languages
        .iter()
        .filter(|lang| {
            lang.name.to_lowercase().contains(&term)
                || lang.code.to_lowercase().contains(&term)
                || lang.native_name.to_lowercase().contains(&term)
        })
        .collect()
}
