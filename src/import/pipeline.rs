// src/import/pipeline.rs
//! CV import: file selection, text extraction, AI analysis and profile creation

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::extractor::{BuiltinExtractor, TextExtractor, SUPPORTED_EXTENSIONS};
use super::progress::{progress_label, AnalysisLog, AnalysisStep};
use crate::core::retry::{retry_operation, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use crate::core::{FsOps, ServiceClient};
use crate::environment::{WizardConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::ImportError;
use crate::services::ProfileService;
use crate::types::extraction::{
    AchievementsAnalysis, BasicInfo, ExperienceAnalysis, ExtractedLanguage, SkillsAnalysis,
};
use crate::types::profile::{
    parse_cv_date, Availability, CountryRef, EndDate, Experience, ImportedProfile, LanguageRef,
    PersonalInfo, ProfessionalSummary, Profile, ProfileLanguage, Skills,
};
use crate::utils::{
    get_file_extension, normalize_language_code, scan_basic_info, validate_file_extension,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    BasicInfo,
    Experience,
    Skills,
    Achievements,
    Availability,
    SummaryGeneration,
}

impl AnalysisPhase {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisPhase::BasicInfo => "basic-info",
            AnalysisPhase::Experience => "experience",
            AnalysisPhase::Skills => "skills/languages",
            AnalysisPhase::Achievements => "achievements",
            AnalysisPhase::Availability => "availability",
            AnalysisPhase::SummaryGeneration => "summary-generation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    FileSelected,
    TextExtracted,
    Analyzing(AnalysisPhase),
    ProfileCreated,
    Closed,
    Failed,
}

pub struct CvImport {
    profiles: Arc<ProfileService>,
    extractor: Arc<dyn TextExtractor>,
    max_upload_bytes: u64,
    max_retries: u32,
    base_delay: Duration,

    state: ImportState,
    text: String,
    step: u8,
    progress: u8,
    error: Option<String>,
    log: AnalysisLog,
    show_guidance: bool,
    upload_success: bool,
}

impl CvImport {
    pub fn new(profiles: Arc<ProfileService>) -> Self {
        Self {
            profiles,
            extractor: Arc::new(BuiltinExtractor),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            state: ImportState::Idle,
            text: String::new(),
            step: 1,
            progress: 0,
            error: None,
            log: AnalysisLog::default(),
            show_guidance: true,
            upload_success: false,
        }
    }

    pub fn from_config(profiles: Arc<ProfileService>, config: &WizardConfig) -> Self {
        Self::new(profiles).with_max_upload_bytes(config.max_upload_bytes)
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn with_retry(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn progress_label(&self) -> &'static str {
        progress_label(self.progress)
    }

    /// User-facing message of the last failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn steps(&self) -> &[AnalysisStep] {
        self.log.steps()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the CV text, e.g. after the user reviewed or pasted it
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if !self.text.trim().is_empty() {
            self.state = ImportState::TextExtracted;
        }
    }

    pub fn show_guidance(&self) -> bool {
        self.show_guidance
    }

    pub fn upload_success(&self) -> bool {
        self.upload_success
    }

    pub fn is_open(&self) -> bool {
        self.state != ImportState::Closed
    }

    pub fn close(&mut self) {
        info!("Closing CV import");
        self.state = ImportState::Closed;
    }

    /// Load a CV file and extract its text
    pub async fn select_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let result = self.load_file(path).await;
        self.progress = 0;

        if let Err(e) = &result {
            error!("File upload error: {}", e);
            self.error = Some(e.to_string());
            self.state = ImportState::Failed;
        }
        result
    }

    async fn load_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let size = FsOps::file_size(path)
            .await
            .map_err(|e| ImportError::FileRead(format!("{:#}", e)))?;
        if size > self.max_upload_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }

        let filename = path.to_string_lossy();
        let extension = get_file_extension(&filename).unwrap_or_default();
        if let Err(e) = validate_file_extension(&filename, &SUPPORTED_EXTENSIONS) {
            debug!("{}", e);
            return Err(ImportError::UnsupportedFormat(extension));
        }

        self.progress = 25;
        self.show_guidance = false;
        self.state = ImportState::FileSelected;
        info!("Reading {} ({} bytes)", path.display(), size);

        if !self.extractor.supports(&extension) {
            return Err(ImportError::FileRead(format!(
                "no text extractor available for .{} files",
                extension
            )));
        }

        let text = self
            .extractor
            .extract(path)
            .await
            .map_err(|e| ImportError::FileRead(format!("{:#}", e)))?;

        if text.trim().is_empty() {
            return Err(ImportError::ExtractionEmpty);
        }

        debug!("Local scan of the CV: {:?}", scan_basic_info(&text));

        self.text = text;
        self.error = None;
        self.progress = 100;
        self.upload_success = true;
        self.step = 2;
        self.state = ImportState::TextExtracted;
        Ok(())
    }

    /// Run the analysis over the current text and create the profile.
    ///
    /// On failure the import stays open so the user can retry.
    pub async fn parse_profile(&mut self) -> Result<ImportedProfile, ImportError> {
        self.error = None;
        self.progress = 0;
        self.step = 3;
        self.log.clear();

        let attempt = Uuid::new_v4();
        let span = info_span!("cv_import", attempt = %attempt);
        let content = self.text.clone();

        match self.analyze(&content).instrument(span).await {
            Ok(imported) => {
                self.close();
                Ok(imported)
            }
            Err(e) => {
                let message = e.to_string();
                error!("Profile parsing error: {}", message);
                self.log.push_error(&message);
                self.error = Some(message);
                self.state = ImportState::Failed;
                Err(e)
            }
        }
    }

    fn enter(&mut self, phase: AnalysisPhase) {
        debug!("Analysis phase: {}", phase.label());
        self.state = ImportState::Analyzing(phase);
    }

    fn advance(&mut self, message: &str, progress: u8) {
        info!("{}", message);
        self.log.push(message);
        self.progress = progress;
    }

    async fn analyze(&mut self, content: &str) -> Result<ImportedProfile, ImportError> {
        if content.trim().is_empty() {
            return Err(ImportError::EmptyContent);
        }

        let client = self.profiles.client().clone();
        self.log.push("Starting CV analysis...");

        self.enter(AnalysisPhase::BasicInfo);
        let basic_info = client.extract_basic_info(content).await?;
        self.advance("Basic information extracted", 20);

        self.enter(AnalysisPhase::Experience);
        let experience = client.analyze_experience(content).await?;
        self.advance("Work experience analyzed", 40);

        self.enter(AnalysisPhase::Skills);
        let skills = client.analyze_skills(content).await?;
        info!("Languages extracted: {}", skills.languages.len());
        if skills.languages.is_empty() {
            return Err(ImportError::MissingLanguages);
        }

        self.log.push("Matching languages with database...");
        let languages = match_languages(&client, &skills.languages).await?;
        if languages.is_empty() {
            return Err(ImportError::NoLanguagesMatched);
        }
        self.advance("Skills categorized and languages matched", 60);

        self.enter(AnalysisPhase::Achievements);
        let achievements = client.analyze_achievements(content).await?;
        self.advance("Achievements extracted", 80);

        self.enter(AnalysisPhase::Availability);
        let availability = client.analyze_availability(content).await?;
        self.advance("Availability preferences analyzed", 85);

        let mut profile = combine_profile(
            &basic_info,
            &experience,
            &skills,
            languages,
            achievements,
            availability,
        )?;

        self.enter(AnalysisPhase::SummaryGeneration);
        self.advance("Generating professional summary", 90);
        let summary = self.generate_summary(&client, &profile).await?;
        info!("Generated summary ({} chars)", summary.len());
        profile.professional_summary.profile_description = Some(summary.clone());

        self.advance("Analysis complete!", 100);

        let created = self.profiles.create_profile(&profile).await?;
        info!(
            "Created profile {}",
            created.id.as_deref().unwrap_or("<no id>")
        );
        self.state = ImportState::ProfileCreated;

        Ok(ImportedProfile {
            profile: created,
            generated_summary: summary,
        })
    }

    /// Retries empty or failed summaries; an authentication failure ends the loop at once
    async fn generate_summary(
        &self,
        client: &ServiceClient,
        profile: &Profile,
    ) -> Result<String, ImportError> {
        let outcome = retry_operation(
            move || async move {
                match client.generate_summary(profile).await {
                    Ok(summary) => Ok(summary.map(Ok)),
                    Err(e) if e.is_unauthorized() => Ok(Some(Err(e))),
                    Err(e) => Err(e),
                }
            },
            self.max_retries,
            self.base_delay,
        )
        .await;

        match outcome {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(e)) => Err(e.into()),
            Err(e) => {
                warn!("{}", e);
                Err(ImportError::SummaryFailed)
            }
        }
    }
}

/// Resolve extracted languages against the backend's language list.
/// Unknown or malformed codes are skipped.
async fn match_languages(
    client: &ServiceClient,
    extracted: &[ExtractedLanguage],
) -> Result<Vec<ProfileLanguage>, ImportError> {
    let mut matched = Vec::new();

    for language in extracted {
        let Some(code) = normalize_language_code(&language.iso639_1) else {
            warn!(
                "Skipping language {} with invalid code {:?}",
                language.language, language.iso639_1
            );
            continue;
        };

        match client.get_language_by_code(&code).await {
            Ok(Some(record)) => {
                info!(
                    "Matched language: {} ({}) -> {}",
                    language.language, code, record.name
                );
                matched.push(ProfileLanguage {
                    language: LanguageRef::Record(record),
                    proficiency: language.proficiency.clone(),
                });
            }
            Ok(None) => warn!("Could not match language code {} for {}", code, language.language),
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => warn!(
                "Could not match language code {} for {}: {}",
                code, language.language, e
            ),
        }
    }

    Ok(matched)
}

/// Prefer the experience analysis' skill lists, falling back to the skills analysis
fn pick(primary: &[String], fallback: &[String]) -> Vec<String> {
    if primary.is_empty() {
        fallback.to_vec()
    } else {
        primary.to_vec()
    }
}

/// Merge the individual analyses into the profile that gets created
pub fn combine_profile(
    basic_info: &BasicInfo,
    experience: &ExperienceAnalysis,
    skills: &SkillsAnalysis,
    languages: Vec<ProfileLanguage>,
    achievements: AchievementsAnalysis,
    availability: Option<Availability>,
) -> Result<Profile, ImportError> {
    let roles = experience
        .roles
        .iter()
        .map(|role| {
            let end_date = EndDate::parse(&role.end_date)
                .ok_or_else(|| ImportError::InvalidEndDate(role.end_date.clone()))?;
            let start_date = parse_cv_date(&role.start_date);
            if start_date.is_none() {
                debug!("Unparsable start date {:?} for {}", role.start_date, role.title);
            }

            Ok(Experience {
                title: role.title.clone(),
                company: role.company.clone(),
                start_date,
                end_date,
                responsibilities: role.responsibilities.clone(),
                achievements: role.achievements.clone(),
            })
        })
        .collect::<Result<Vec<_>, ImportError>>()?;

    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    Ok(Profile {
        personal_info: PersonalInfo {
            name: text(&basic_info.name),
            country: CountryRef::Text(text(&basic_info.country)),
            email: text(&basic_info.email),
            phone: text(&basic_info.phone),
            languages,
        },
        professional_summary: ProfessionalSummary {
            years_of_experience: basic_info.years_of_experience(),
            current_role: text(&basic_info.current_role),
            industries: Vec::new(),
            activities: Vec::new(),
            key_expertise: experience.key_areas.clone(),
            notable_companies: experience.notable_companies.clone(),
            profile_description: None,
        },
        skills: Skills {
            technical: pick(&experience.technical_skills, &skills.technical),
            professional: pick(&experience.professional_skills, &skills.professional),
            soft: pick(&experience.soft_skills, &skills.soft),
        },
        availability: availability.unwrap_or_default(),
        experience: roles,
        achievements: achievements.items,
        ..Profile::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::extraction::ExtractedRole;
    use crate::types::reference::Language;

    fn role(start: &str, end: &str) -> ExtractedRole {
        ExtractedRole {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            ..ExtractedRole::default()
        }
    }

    fn french() -> Vec<ProfileLanguage> {
        vec![ProfileLanguage {
            language: LanguageRef::Record(Language {
                id: "l1".to_string(),
                name: "French".to_string(),
                code: "fr".to_string(),
                native_name: "Français".to_string(),
            }),
            proficiency: "C1".to_string(),
        }]
    }

    #[test]
    fn test_combine_profile_maps_every_analysis() {
        let basic = BasicInfo {
            name: Some("Jane Doe".to_string()),
            country: Some("MA".to_string()),
            years_of_experience: serde_json::json!("8"),
            ..BasicInfo::default()
        };
        let experience = ExperienceAnalysis {
            roles: vec![role("2019-03", "present"), role("soon", "2018-12-31")],
            key_areas: vec!["Payments".to_string()],
            technical_skills: vec!["Rust".to_string()],
            ..ExperienceAnalysis::default()
        };
        let skills = SkillsAnalysis {
            soft: vec!["Empathy".to_string()],
            ..SkillsAnalysis::default()
        };

        let profile = combine_profile(
            &basic,
            &experience,
            &skills,
            french(),
            AchievementsAnalysis::default(),
            None,
        )
        .unwrap();

        assert_eq!(profile.personal_info.name, "Jane Doe");
        assert_eq!(profile.personal_info.country, CountryRef::Text("MA".to_string()));
        assert_eq!(profile.personal_info.languages.len(), 1);
        assert_eq!(profile.professional_summary.years_of_experience, 8.0);
        assert_eq!(profile.professional_summary.key_expertise, vec!["Payments"]);
        assert_eq!(profile.skills.technical, vec!["Rust"]);
        assert_eq!(profile.skills.soft, vec!["Empathy"]);
        assert_eq!(profile.availability, Availability::default());
        assert_eq!(profile.experience[0].end_date, EndDate::Present);
        assert!(profile.experience[0].start_date.is_some());
        assert!(profile.experience[1].start_date.is_none());
        assert!(!profile.is_basic_profile_completed);
    }

    #[test]
    fn test_combine_profile_rejects_invalid_end_date() {
        let experience = ExperienceAnalysis {
            roles: vec![role("2020-01", "whenever")],
            ..ExperienceAnalysis::default()
        };

        let err = combine_profile(
            &BasicInfo::default(),
            &experience,
            &SkillsAnalysis::default(),
            french(),
            AchievementsAnalysis::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid end date: whenever");
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(AnalysisPhase::Skills.label(), "skills/languages");
        assert_eq!(AnalysisPhase::SummaryGeneration.label(), "summary-generation");
    }
}
