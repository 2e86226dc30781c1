// src/error.rs
//! Error kinds surfaced by the wizard library

use thiserror::Error;

/// Failure of a single backend call.
///
/// Cloneable so that a de-duplicated GET can hand the same outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Authentication error. Token may be invalid.")]
    Unauthorized,

    #[error("HTTP {status} error: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse JSON response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while importing a CV. The display strings are shown to the user.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File size must be less than 5MB")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unsupported file format: {0}. Use PDF, DOC, DOCX or TXT")]
    UnsupportedFormat(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Failed to read file: no text could be extracted")]
    ExtractionEmpty,

    #[error("Please provide some content to process")]
    EmptyContent,

    #[error("Languages section is required to generate your profile. Please ensure your CV includes the languages you speak.")]
    MissingLanguages,

    #[error("No languages could be matched with our database. Please ensure your CV includes common languages.")]
    NoLanguagesMatched,

    #[error("Invalid end date: {0}")]
    InvalidEndDate(String),

    #[error("Failed to generate summary")]
    SummaryFailed,

    #[error(transparent)]
    Api(#[from] ApiError),
}
