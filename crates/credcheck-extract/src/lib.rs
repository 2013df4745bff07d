//! Document-to-text extraction seam.
//!
//! The decision engine consumes an [`Extraction`]: structured fields,
//! forgery indicators, and a file identity hash. This crate produces one
//! from raw text locally, or from a remote document-to-text service for
//! formats that need OCR (feature `http`).

use std::path::Path;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use credcheck_core::ExtractedFields;

pub mod fields;
pub mod forgery;

#[cfg(feature = "http")]
mod remote;
#[cfg(feature = "http")]
pub use remote::RemoteExtractor;

pub use fields::parse_fields;
pub use forgery::forgery_indicators;

/// Everything the extractor hands to the verification pipeline for one
/// document.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// SHA-256 hex digest of the raw file bytes.
    pub file_hash: String,
    pub raw_text: String,
    pub fields: ExtractedFields,
    /// Symbolic forgery indicators from raw-text heuristics.
    pub forgery_flags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is not valid UTF-8 text")]
    NotText,

    #[cfg(feature = "http")]
    #[error("extraction service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "http")]
    #[error("extraction service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[cfg(feature = "http")]
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Converts a raw document into an [`Extraction`].
///
/// Implementations own their timeout policy; the pipeline awaits them
/// before any matching begins.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError>;
}

/// SHA-256 hex digest used as the file identity in verification logs.
pub fn file_sha256(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Extractor for documents that are already plain text.
///
/// PDFs and images need the remote service; this one only accepts `.txt`
/// (or extensionless) files and runs the same field patterns and forgery
/// heuristics over their contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Build an [`Extraction`] directly from text already in memory.
    pub fn extract_text(&self, raw: &str) -> Extraction {
        let fields = parse_fields(raw);
        let forgery_flags = forgery_indicators(raw);
        info!(
            fields_present = !fields.is_empty(),
            forgery_flags = forgery_flags.len(),
            "extracted structured data from text"
        );
        Extraction {
            file_hash: file_sha256(raw.as_bytes()),
            raw_text: raw.to_string(),
            fields,
            forgery_flags,
        }
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            None | Some("txt") | Some("text") => {}
            Some(other) => return Err(ExtractError::UnsupportedType(other.to_string())),
        }

        let bytes = std::fs::read(path)?;
        let raw = String::from_utf8(bytes).map_err(|_| ExtractError::NotText)?;
        Ok(self.extract_text(&raw))
    }
}
