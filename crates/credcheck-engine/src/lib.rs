//! Verification pipeline: extraction outcome to persisted verdict.
//!
//! The [`Verifier`] wires the pure decision stages together and owns every
//! failure path: an extraction error, or any store failure mid-pipeline,
//! degrades to an `ERROR` verdict with a best-effort audit row instead of
//! surfacing as an `Err`. Each attempt is isolated; nothing here shares
//! mutable state across requests beyond the store itself.

use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::{info, warn};

use credcheck_core::{
    Decision, ExtractedFields, FlagSet, MatchedSummary, SearchConfig, Verdict, decide, detect,
    find_candidates,
};
use credcheck_extract::{ExtractError, Extraction, Extractor};
use credcheck_store::{
    ClientMeta, NewSuspiciousActivity, NewVerificationRecord, Severity, Store, StoreError,
};

pub mod report;
pub use report::VerificationReport;

#[derive(Debug, Error)]
enum PipelineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Orchestrates candidate search, anomaly detection, the verdict policy,
/// and atomic persistence of the outcome.
pub struct Verifier {
    store: Arc<dyn Store>,
    config: SearchConfig,
}

impl Verifier {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_config(store, SearchConfig::default())
    }

    pub fn with_config(store: Arc<dyn Store>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    /// Extract a document through the given extractor, then verify it.
    pub async fn verify_file(
        &self,
        extractor: &dyn Extractor,
        path: &Path,
        client: &ClientMeta,
    ) -> VerificationReport {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let extraction = extractor.extract(path).await;
        self.verify(&filename, extraction, client)
    }

    /// Run the pipeline for an extraction outcome.
    ///
    /// Always returns a report. An extraction `Err` skips matching and
    /// anomaly detection entirely; any later failure is caught here and
    /// reported as an `ERROR` verdict.
    pub fn verify(
        &self,
        filename: &str,
        extraction: Result<Extraction, ExtractError>,
        client: &ClientMeta,
    ) -> VerificationReport {
        match extraction {
            Err(err) => {
                warn!(filename, error = %err, "document extraction failed");
                self.record_failure(filename, "Failed to process document", &err.to_string(), client)
            }
            Ok(extraction) => match self.evaluate(filename, &extraction, client) {
                Ok(report) => report,
                Err(err) => {
                    warn!(filename, error = %err, "verification pipeline failed");
                    self.record_failure(
                        filename,
                        "Unexpected error during verification",
                        &err.to_string(),
                        client,
                    )
                }
            },
        }
    }

    fn evaluate(
        &self,
        filename: &str,
        extraction: &Extraction,
        client: &ClientMeta,
    ) -> Result<VerificationReport, PipelineError> {
        let registry = self.store.registry_snapshot()?;
        let candidates = find_candidates(&extraction.fields, &registry, &self.config);

        let best = candidates.first();
        let anomalies = detect(&extraction.fields, best, Utc::now().year());
        let flags = FlagSet::combine(&anomalies, &extraction.forgery_flags);

        let Decision {
            verdict,
            confidence,
        } = decide(&candidates, &flags);
        info!(
            filename,
            verdict = verdict.as_str(),
            confidence,
            candidates = candidates.len(),
            flags = flags.len(),
            "verification decided"
        );

        let matched = best.map(MatchedSummary::from);
        let record = NewVerificationRecord {
            uploaded_filename: filename.to_string(),
            file_hash: Some(extraction.file_hash.clone()),
            extracted: serde_json::to_value(&extraction.fields)?,
            verdict,
            confidence,
            matched_certificate_id: matched.as_ref().map(|m| m.record_id),
            flags: flags.iter().map(str::to_string).collect(),
            client: client.clone(),
        };
        let activities = activities_for(verdict, &flags);
        let log_id = self.store.record_verification(record, &activities)?;

        Ok(VerificationReport {
            verdict,
            confidence,
            extracted: extraction.fields.clone(),
            flags,
            matched,
            log_id: Some(log_id),
            message: None,
            error: None,
        })
    }

    /// Persist an error-verdict row best-effort and build the report.
    ///
    /// A failure to write the error row itself is not retried; it is
    /// logged and appended to the report's error string.
    fn record_failure(
        &self,
        filename: &str,
        message: &str,
        error: &str,
        client: &ClientMeta,
    ) -> VerificationReport {
        let record = NewVerificationRecord {
            uploaded_filename: filename.to_string(),
            file_hash: None,
            extracted: serde_json::json!({ "error": error }),
            verdict: Verdict::Error,
            confidence: 0,
            matched_certificate_id: None,
            flags: Vec::new(),
            client: client.clone(),
        };
        let (log_id, error) = match self.store.record_verification(record, &[]) {
            Ok(id) => (Some(id), error.to_string()),
            Err(store_err) => {
                warn!(filename, error = %store_err, "failed to persist error log");
                (None, format!("{error} (error log not persisted: {store_err})"))
            }
        };
        VerificationReport {
            verdict: Verdict::Error,
            confidence: 0,
            extracted: ExtractedFields::default(),
            flags: FlagSet::new(),
            matched: None,
            log_id,
            message: Some(message.to_string()),
            error: Some(error),
        }
    }
}

/// One suspicious-activity row per flag instance, but only for verdicts
/// that warrant investigation.
fn activities_for(verdict: Verdict, flags: &FlagSet) -> Vec<NewSuspiciousActivity> {
    let severity = match verdict {
        Verdict::Invalid => Severity::High,
        Verdict::Suspicious => Severity::Medium,
        Verdict::Valid | Verdict::Error => return Vec::new(),
    };
    flags
        .iter()
        .map(|flag| NewSuspiciousActivity {
            activity_type: flag.to_string(),
            description: format!("Detected {flag} in certificate verification"),
            severity,
        })
        .collect()
}
