// src/services/profile_service.rs
//! Profile access with a per-session cached copy

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::types::profile::{Experience, PersonalInfo, Profile, Skills};

#[derive(Default)]
struct CachedProfile {
    profile: Option<Profile>,
    fetched_user_id: Option<String>,
}

pub struct ProfileService {
    client: Arc<ServiceClient>,
    cache: RwLock<CachedProfile>,
}

impl ProfileService {
    pub fn new(client: Arc<ServiceClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(CachedProfile::default()),
        }
    }

    pub fn client(&self) -> &Arc<ServiceClient> {
        &self.client
    }

    /// Last profile seen by this service
    pub async fn profile(&self) -> Option<Profile> {
        self.cache.read().await.profile.clone()
    }

    /// Fetch a profile, defaulting to the user id cookie.
    ///
    /// Errors are logged and reported as `None`; a repeated call for the
    /// same user id is served from the cache.
    pub async fn get_profile(&self, user_id: Option<&str>) -> Option<Profile> {
        let session = self.client.session();

        let user_id = match user_id {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => session.user_id().await.unwrap_or_else(|e| {
                error!("Could not read user id cookie: {}", e);
                None
            }),
        };
        let has_token = matches!(session.token().await, Ok(Some(_)));

        let user_id = match user_id {
            Some(id) if has_token => id,
            Some(_) => {
                error!("Cannot fetch profile: No authentication token available");
                return None;
            }
            None => {
                error!("Cannot fetch profile: No user ID provided");
                return None;
            }
        };

        {
            let cache = self.cache.read().await;
            if cache.fetched_user_id.as_deref() == Some(user_id.as_str()) {
                if let Some(profile) = &cache.profile {
                    info!("Using cached profile for user {}", user_id);
                    return Some(profile.clone());
                }
            }
        }

        info!("Fetching profile for user {}", user_id);
        match self.client.get_profile(Some(&user_id)).await {
            Ok(Some(profile)) => {
                info!(
                    "Profile data successfully fetched: {}",
                    profile.id.as_deref().unwrap_or("<no id>")
                );
                let mut cache = self.cache.write().await;
                cache.profile = Some(profile.clone());
                cache.fetched_user_id = Some(user_id);
                Some(profile)
            }
            Ok(None) => {
                info!("No profile data returned from API");
                None
            }
            Err(e) => {
                error!("Error fetching profile: {}", e);
                None
            }
        }
    }

    async fn remember(&self, profile: Profile) -> Profile {
        self.cache.write().await.profile = Some(profile.clone());
        profile
    }

    pub async fn create_profile(&self, profile: &Profile) -> Result<Profile, ApiError> {
        let created = self.client.create_profile(profile).await?;
        Ok(self.remember(created).await)
    }

    pub async fn update_basic_info(
        &self,
        id: &str,
        basic_info: &PersonalInfo,
    ) -> Result<Profile, ApiError> {
        let updated = self.client.update_basic_info(id, basic_info).await?;
        Ok(self.remember(updated).await)
    }

    pub async fn update_profile(&self, id: &str, profile: &Profile) -> Result<Profile, ApiError> {
        info!("Sending profile update for {}", id);
        let updated = self.client.update_profile(id, profile).await.map_err(|e| {
            error!("Profile update error: {}", e);
            e
        })?;
        Ok(self.remember(updated).await)
    }

    pub async fn update_experience(
        &self,
        id: &str,
        experience: &[Experience],
    ) -> Result<Profile, ApiError> {
        let updated = self.client.update_experience(id, experience).await?;
        Ok(self.remember(updated).await)
    }

    pub async fn update_skills(&self, id: &str, skills: &Skills) -> Result<Profile, ApiError> {
        let updated = self.client.update_skills(id, skills).await?;
        Ok(self.remember(updated).await)
    }

    pub async fn update_language_assessment(
        &self,
        id: &str,
        language: &str,
        proficiency: &str,
        results: &serde_json::Value,
    ) -> Result<Profile, ApiError> {
        let updated = self
            .client
            .update_language_assessment(id, language, proficiency, results)
            .await?;
        Ok(self.remember(updated).await)
    }

    pub async fn add_assessment(
        &self,
        id: &str,
        assessment: &serde_json::Value,
    ) -> Result<Profile, ApiError> {
        let updated = self.client.add_assessment(id, assessment).await?;
        Ok(self.remember(updated).await)
    }

    pub async fn add_contact_center_assessment(
        &self,
        id: &str,
        assessment: &serde_json::Value,
    ) -> Result<Profile, ApiError> {
        let updated = self.client.add_contact_center_assessment(id, assessment).await?;
        Ok(self.remember(updated).await)
    }

    pub async fn delete_profile(&self) -> Result<(), ApiError> {
        self.client.delete_profile().await?;
        *self.cache.write().await = CachedProfile::default();
        Ok(())
    }
}
