//! HTTP client for a remote document-to-text extraction service.
//!
//! The service owns OCR, PDF parsing, and its own timeout policy; this
//! client just ships bytes and maps the response onto [`Extraction`].

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use credcheck_core::ExtractedFields;

use crate::{ExtractError, Extraction, Extractor};

/// Client for the extraction service's `/api/extract` endpoint.
pub struct RemoteExtractor {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    error: Option<String>,
    file_hash: Option<String>,
    raw_text: Option<String>,
    extracted_data: Option<ExtractedFields>,
    forgery_flags: Option<Vec<String>>,
}

impl RemoteExtractor {
    /// Create a client for the given service base URL.
    ///
    /// `base_url` should be like `http://localhost:8600` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Extractor for RemoteExtractor {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;

        let url = format!("{}/api/extract?filename={}", self.base_url, filename);
        info!(url = %url, bytes = bytes.len(), "sending document to extraction service");
        let resp = self.client.post(&url).body(bytes).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExtractError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ExtractResponse = resp.json().await?;
        if let Some(error) = parsed.error {
            return Err(ExtractError::Failed(error));
        }

        let fields = parsed.extracted_data.unwrap_or_default();
        let forgery_flags = parsed.forgery_flags.unwrap_or_default();
        info!(
            fields_present = !fields.is_empty(),
            forgery_flags = forgery_flags.len(),
            "extraction service response parsed"
        );
        Ok(Extraction {
            file_hash: parsed.file_hash.unwrap_or_default(),
            raw_text: parsed.raw_text.unwrap_or_default(),
            fields,
            forgery_flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = RemoteExtractor::new("http://localhost:8600/".into());
        assert_eq!(client.base_url, "http://localhost:8600");
    }

    #[test]
    fn response_with_error_field_parses() {
        let json = r#"{"error": "Unsupported file type: docx"}"#;
        let parsed: ExtractResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("Unsupported file type: docx"));
        assert!(parsed.extracted_data.is_none());
    }

    #[test]
    fn full_response_parses() {
        let json = r#"{
            "error": null,
            "file_hash": "abc123",
            "raw_text": "Certificate No: RU/2023/BSC/001234",
            "extracted_data": {
                "certificate_number": "RU/2023/BSC/001234",
                "student_name": null,
                "roll_number": null,
                "course": null,
                "year": "2023",
                "grade": null,
                "percentage": null
            },
            "forgery_flags": ["SPELLING_ERRORS"]
        }"#;
        let parsed: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.error.is_none());
        let fields = parsed.extracted_data.unwrap();
        assert_eq!(fields.year.as_deref(), Some("2023"));
        assert_eq!(parsed.forgery_flags.unwrap(), ["SPELLING_ERRORS"]);
    }
}
