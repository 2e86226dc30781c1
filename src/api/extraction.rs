// src/api/extraction.rs
//! AI extraction endpoints: each one receives the raw CV text

use serde::Serialize;
use tracing::info;

use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::types::extraction::{
    AchievementsAnalysis, AvailabilityAnalysis, BasicInfo, ExperienceAnalysis, SkillsAnalysis,
    SummaryResponse,
};
use crate::types::profile::Profile;

const EXTRACT_BASIC_INFO_ENDPOINT: &str = "/cv/extract-basic-info";
const ANALYZE_EXPERIENCE_ENDPOINT: &str = "/cv/analyze-experience";
const ANALYZE_SKILLS_ENDPOINT: &str = "/cv/analyze-skills";
const ANALYZE_ACHIEVEMENTS_ENDPOINT: &str = "/cv/analyze-achievements";
const ANALYZE_AVAILABILITY_ENDPOINT: &str = "/cv/analyze-availability";
const GENERATE_SUMMARY_ENDPOINT: &str = "/cv/generate-summary";

#[derive(Serialize)]
struct ContentRequest<'a> {
    content: &'a str,
}

impl ServiceClient {
    async fn analyze<R>(&self, endpoint: &str, content: &str) -> Result<R, ApiError>
    where
        R: serde::de::DeserializeOwned,
    {
        info!("Calling extraction service: {} ({} chars)", endpoint, content.len());
        self.post_json(endpoint, &ContentRequest { content }).await
    }

    pub async fn extract_basic_info(&self, content: &str) -> Result<BasicInfo, ApiError> {
        self.analyze(EXTRACT_BASIC_INFO_ENDPOINT, content).await
    }

    pub async fn analyze_experience(&self, content: &str) -> Result<ExperienceAnalysis, ApiError> {
        self.analyze(ANALYZE_EXPERIENCE_ENDPOINT, content).await
    }

    pub async fn analyze_skills(&self, content: &str) -> Result<SkillsAnalysis, ApiError> {
        self.analyze(ANALYZE_SKILLS_ENDPOINT, content).await
    }

    pub async fn analyze_achievements(
        &self,
        content: &str,
    ) -> Result<AchievementsAnalysis, ApiError> {
        self.analyze(ANALYZE_ACHIEVEMENTS_ENDPOINT, content).await
    }

    pub async fn analyze_availability(
        &self,
        content: &str,
    ) -> Result<Option<AvailabilityAnalysis>, ApiError> {
        self.analyze(ANALYZE_AVAILABILITY_ENDPOINT, content).await
    }

    /// `None` when the service produced no usable summary
    pub async fn generate_summary(&self, profile: &Profile) -> Result<Option<String>, ApiError> {
        info!("Calling extraction service: {}", GENERATE_SUMMARY_ENDPOINT);
        let response: Option<SummaryResponse> =
            self.post_json(GENERATE_SUMMARY_ENDPOINT, profile).await?;

        Ok(response
            .and_then(|r| r.summary)
            .map(|summary| summary.trim().to_string())
            .filter(|summary| !summary.is_empty()))
    }
}
