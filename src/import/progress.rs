// src/import/progress.rs
//! Progress reporting for a CV import

use chrono::{DateTime, Utc};
use serde::Serialize;

pub struct GuidanceStep {
    pub title: &'static str,
    pub description: &'static str,
}

/// Shown before the user picks a file
pub const GUIDANCE_STEPS: [GuidanceStep; 3] = [
    GuidanceStep {
        title: "Choose Your CV Format",
        description: "We support PDF, DOC, DOCX, and TXT files. Make sure your CV is up-to-date and includes your key achievements.",
    },
    GuidanceStep {
        title: "Review Content",
        description: "We'll extract the important information from your CV. You can review and edit before proceeding.",
    },
    GuidanceStep {
        title: "AI Enhancement",
        description: "Our AI will analyze your CV to create a compelling professional summary and highlight your key skills.",
    },
];

pub fn progress_label(progress: u8) -> &'static str {
    match progress {
        0..=24 => "Preparing...",
        25..=49 => "Analyzing CV...",
        50..=74 => "Extracting information...",
        _ => "Generating summary...",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisStep {
    pub text: String,
    pub error: bool,
    pub timestamp: DateTime<Utc>,
}

/// Ordered record of what the analysis did, shown to the user as it runs
#[derive(Debug, Clone, Default)]
pub struct AnalysisLog {
    steps: Vec<AnalysisStep>,
}

impl AnalysisLog {
    pub fn push(&mut self, text: impl Into<String>) {
        self.record(text.into(), false);
    }

    pub fn push_error(&mut self, message: &str) {
        self.record(format!("Error: {}", message), true);
    }

    fn record(&mut self, text: String, error: bool) {
        self.steps.push(AnalysisStep {
            text,
            error,
            timestamp: Utc::now(),
        });
    }

    pub fn steps(&self) -> &[AnalysisStep] {
        &self.steps
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}
