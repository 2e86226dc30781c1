// src/import/extractor.rs
//! Turning an uploaded CV file into plain text

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::core::FsOps;
use crate::utils::get_file_extension;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor can read files with the given lower-case extension
    fn supports(&self, extension: &str) -> bool;

    async fn extract(&self, path: &Path) -> Result<String>;
}

/// Reads `.txt` as UTF-8 and pulls the text layer out of `.pdf`.
/// Word documents need an external extractor.
pub struct BuiltinExtractor;

#[async_trait]
impl TextExtractor for BuiltinExtractor {
    fn supports(&self, extension: &str) -> bool {
        matches!(extension, "txt" | "pdf")
    }

    async fn extract(&self, path: &Path) -> Result<String> {
        let extension = get_file_extension(&path.to_string_lossy()).unwrap_or_default();

        match extension.as_str() {
            "txt" => FsOps::read_file_safe(path).await,
            "pdf" => {
                let bytes = FsOps::read_bytes(path).await?;
                debug!("Extracting text from {} byte PDF", bytes.len());
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .context("PDF extraction task failed")?
                    .map_err(|e| anyhow::anyhow!("PDF extraction error: {}", e))
            }
            other => anyhow::bail!("No built-in text extractor for .{} files", other),
        }
    }
}
