// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 500;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const HOST_APP_PATH: &str = "/app1";
pub const IN_APP_BASE_PATH: &str = "/repcreationprofile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    Standalone,
    #[default]
    InApp,
}

impl RunMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "standalone" => RunMode::Standalone,
            _ => RunMode::InApp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Base URL of the profile backend, e.g. `http://localhost:5000/api`
    pub api_url: String,
    /// Origin the wizard is served from; the host application lives under it
    pub origin: String,
    #[serde(default)]
    pub run_mode: RunMode,
    #[serde(default)]
    pub standalone_user_id: Option<String>,
    #[serde(default)]
    pub orchestrator_url: String,
    #[serde(default)]
    pub orchestrator_url_standalone: String,
    #[serde(default)]
    pub host_app_url: Option<String>,
    pub session_db: PathBuf,
    pub log_file: PathBuf,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_dedup_window")]
    pub dedup_window_ms: u64,
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_dedup_window() -> u64 {
    DEFAULT_DEDUP_WINDOW_MS
}

fn default_max_upload() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: WizardConfig,
    production: WizardConfig,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            origin: "http://localhost:5174".to_string(),
            run_mode: RunMode::InApp,
            standalone_user_id: None,
            orchestrator_url: String::new(),
            orchestrator_url_standalone: String::new(),
            host_app_url: None,
            session_db: PathBuf::from(".profile-wizard/session.db"),
            log_file: PathBuf::from("/tmp/profile-wizard.log"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl WizardConfig {
    /// Load configuration: optional wizard.yaml, then environment overrides
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = PathBuf::from("wizard.yaml");
        let base = if config_path.exists() {
            Self::load_from_file(&config_path, &environment)?
        } else {
            Self::default()
        };

        let mut config = base.with_env_overrides();
        config.session_db = Self::resolve_path(&config.session_db)?;
        config.log_file = Self::resolve_path(&config.log_file)?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("WIZARD_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content, environment)
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse wizard.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WIZARD_API_URL") {
            self.api_url = url;
        }
        if let Some(origin) = lookup("WIZARD_ORIGIN") {
            self.origin = origin;
        }
        if let Some(mode) = lookup("WIZARD_RUN_MODE") {
            self.run_mode = RunMode::parse(&mode);
        }
        if let Some(user_id) = lookup("WIZARD_STANDALONE_USER_ID") {
            self.standalone_user_id = Some(user_id);
        }
        if let Some(url) = lookup("WIZARD_ORCHESTRATOR_URL") {
            self.orchestrator_url = url;
        }
        if let Some(url) = lookup("WIZARD_ORCHESTRATOR_URL_STANDALONE") {
            self.orchestrator_url_standalone = url;
        }
        if let Some(url) = lookup("WIZARD_HOST_APP_URL") {
            self.host_app_url = Some(url);
        }
        if let Some(path) = lookup("WIZARD_SESSION_DB") {
            self.session_db = PathBuf::from(path);
        }
        if let Some(path) = lookup("WIZARD_LOG_FILE") {
            self.log_file = PathBuf::from(path);
        }
        if let Some(secs) = lookup("WIZARD_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(ms) = lookup("WIZARD_DEDUP_WINDOW_MS").and_then(|v| v.parse().ok()) {
            self.dedup_window_ms = ms;
        }
        self
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// URL of the host application that logout returns to
    pub fn host_app_url(&self) -> String {
        self.host_app_url
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.origin.trim_end_matches('/'), HOST_APP_PATH))
    }

    /// Dashboard the user is handed off to once the basic profile is complete
    pub fn dashboard_url(&self) -> &str {
        match self.run_mode {
            RunMode::Standalone => &self.orchestrator_url_standalone,
            RunMode::InApp => &self.orchestrator_url,
        }
    }

    pub fn base_path(&self) -> &'static str {
        match self.run_mode {
            RunMode::Standalone => "/",
            RunMode::InApp => IN_APP_BASE_PATH,
        }
    }

    pub fn hostname(&self) -> String {
        let without_scheme = self
            .origin
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.origin);
        let host = without_scheme.split('/').next().unwrap_or_default();
        host.split(':').next().unwrap_or_default().to_string()
    }

    pub fn is_secure(&self) -> bool {
        self.origin.starts_with("https:")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }
}
