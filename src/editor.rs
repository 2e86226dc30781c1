// src/editor.rs
//! Review and finish an imported profile

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::services::ProfileService;
use crate::types::profile::{ImportedProfile, Profile};

pub struct ProfileEditor {
    profiles: Arc<ProfileService>,
    profile: Profile,
    generated_summary: String,
}

impl ProfileEditor {
    pub fn new(profiles: Arc<ProfileService>, profile: Profile, generated_summary: String) -> Self {
        Self {
            profiles,
            profile,
            generated_summary,
        }
    }

    pub fn from_imported(profiles: Arc<ProfileService>, imported: ImportedProfile) -> Self {
        Self::new(profiles, imported.profile, imported.generated_summary)
    }

    /// Resume editing a stored profile; its description stands in for the generated summary
    pub fn from_profile(profiles: Arc<ProfileService>, profile: Profile) -> Self {
        let summary = profile
            .professional_summary
            .profile_description
            .clone()
            .unwrap_or_default();
        Self::new(profiles, profile, summary)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn summary(&self) -> &str {
        &self.generated_summary
    }

    pub fn set_summary(&mut self, summary: &str) {
        let summary = summary.trim().to_string();
        self.profile.professional_summary.profile_description = Some(summary.clone());
        self.generated_summary = summary;
    }

    pub async fn regenerate_summary(&mut self) -> Result<&str> {
        let summary = self
            .profiles
            .client()
            .generate_summary(&self.profile)
            .await?
            .context("Failed to generate summary")?;
        info!("Regenerated summary ({} chars)", summary.len());
        self.set_summary(&summary);
        Ok(&self.generated_summary)
    }

    pub async fn save(&mut self) -> Result<&Profile> {
        let id = self
            .profile
            .id
            .clone()
            .context("Profile has not been created yet")?;

        self.profile = self.profiles.update_profile(&id, &self.profile).await?;
        info!("Saved profile {}", id);
        Ok(&self.profile)
    }

    /// Mark the basic profile as done and persist it
    pub async fn complete(&mut self) -> Result<&Profile> {
        self.profile.is_basic_profile_completed = true;
        self.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ServiceClient, SessionStore};
    use crate::session::{RecordingNavigator, Session};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn editor(profile: Profile) -> (TempDir, ProfileEditor) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(&dir.path().join("session.db")).await.unwrap();
        let session = Session::open(
            store,
            Arc::new(RecordingNavigator::new()),
            "http://localhost/app1".to_string(),
            "localhost".to_string(),
            false,
        )
        .await
        .unwrap();
        let client = ServiceClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
            Duration::from_millis(500),
            Arc::new(session),
        )
        .unwrap();
        let profiles = Arc::new(ProfileService::new(Arc::new(client)));
        (dir, ProfileEditor::from_profile(profiles, profile))
    }

    #[tokio::test]
    async fn test_set_summary_updates_description() {
        let mut profile = Profile::default();
        profile.professional_summary.profile_description = Some("old".to_string());

        let (_dir, mut editor) = editor(profile).await;
        assert_eq!(editor.summary(), "old");

        editor.set_summary("  Seasoned support agent.  ");
        assert_eq!(editor.summary(), "Seasoned support agent.");
        assert_eq!(
            editor.profile().professional_summary.profile_description.as_deref(),
            Some("Seasoned support agent.")
        );
    }

    #[tokio::test]
    async fn test_save_requires_created_profile() {
        let (_dir, mut editor) = editor(Profile::default()).await;
        let err = editor.save().await.unwrap_err();
        assert!(err.to_string().contains("not been created"));
    }
}
