// src/api/profiles.rs
//! Remote profile resource

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::types::profile::{Experience, PersonalInfo, Profile, Skills};
use crate::types::reference::{Country, DataEnvelope};

const PROFILES_ENDPOINT: &str = "/profiles";
const TIMEZONES_ENDPOINT: &str = "/timezones";

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    #[serde(default)]
    exists: bool,
}

fn profile_endpoint(user_id: Option<&str>) -> String {
    match user_id {
        Some(id) => format!("{}/{}", PROFILES_ENDPOINT, id),
        None => PROFILES_ENDPOINT.to_string(),
    }
}

impl ServiceClient {
    /// Fetch a specific user's profile, or the caller's own when no id is given.
    /// `None` when the backend answers with an empty body.
    pub async fn get_profile(&self, user_id: Option<&str>) -> Result<Option<Profile>, ApiError> {
        let endpoint = profile_endpoint(user_id);
        info!("Making API request to: {}", endpoint);

        self.get::<Option<Profile>>(&endpoint).await.map_err(|e| {
            error!("Error fetching profile {}: {}", endpoint, e);
            e
        })
    }

    pub async fn create_profile(&self, profile: &Profile) -> Result<Profile, ApiError> {
        self.post_json(PROFILES_ENDPOINT, profile).await
    }

    pub async fn update_basic_info(
        &self,
        id: &str,
        basic_info: &PersonalInfo,
    ) -> Result<Profile, ApiError> {
        self.put_json(&format!("{}/{}/basic-info", PROFILES_ENDPOINT, id), basic_info)
            .await
    }

    pub async fn update_experience(
        &self,
        id: &str,
        experience: &[Experience],
    ) -> Result<Profile, ApiError> {
        self.put_json(
            &format!("{}/{}/experience", PROFILES_ENDPOINT, id),
            &json!({ "experience": experience }),
        )
        .await
    }

    pub async fn update_skills(&self, id: &str, skills: &Skills) -> Result<Profile, ApiError> {
        self.put_json(
            &format!("{}/{}/skills", PROFILES_ENDPOINT, id),
            &json!({ "skills": skills }),
        )
        .await
    }

    pub async fn update_language_assessment(
        &self,
        id: &str,
        language: &str,
        proficiency: &str,
        results: &serde_json::Value,
    ) -> Result<Profile, ApiError> {
        self.post_json(
            &format!("{}/{}/language-assessment", PROFILES_ENDPOINT, id),
            &json!({
                "language": language,
                "proficiency": proficiency,
                "results": results,
            }),
        )
        .await
    }

    pub async fn add_assessment(
        &self,
        id: &str,
        assessment: &serde_json::Value,
    ) -> Result<Profile, ApiError> {
        self.post_json(&format!("{}/{}/assessment", PROFILES_ENDPOINT, id), assessment)
            .await
    }

    /// Deletes the caller's profile
    pub async fn delete_profile(&self) -> Result<serde_json::Value, ApiError> {
        self.delete(PROFILES_ENDPOINT).await
    }

    pub async fn update_profile(&self, id: &str, profile: &Profile) -> Result<Profile, ApiError> {
        self.put_json(&format!("{}/{}", PROFILES_ENDPOINT, id), profile)
            .await
    }

    pub async fn add_contact_center_assessment(
        &self,
        id: &str,
        assessment: &serde_json::Value,
    ) -> Result<Profile, ApiError> {
        self.post_json(
            &format!("{}/{}/contact-center-assessment", PROFILES_ENDPOINT, id),
            &json!({ "assessment": assessment }),
        )
        .await
    }

    /// Any failure is reported as "does not exist"
    pub async fn check_profile_exists(&self, user_id: Option<&str>) -> bool {
        let endpoint = format!("{}/exists", profile_endpoint(user_id));
        info!("Checking if profile exists: {}", endpoint);

        match self.get::<ExistsResponse>(&endpoint).await {
            Ok(response) => response.exists,
            Err(e) => {
                error!("Error checking profile existence: {}", e);
                false
            }
        }
    }

    pub async fn get_timezones(&self) -> Result<Vec<Country>, ApiError> {
        info!("Fetching timezones from API");
        let envelope: DataEnvelope<Vec<Country>> = self.get(TIMEZONES_ENDPOINT).await?;
        Ok(envelope.data)
    }
}
