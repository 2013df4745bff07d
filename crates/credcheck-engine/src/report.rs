//! Caller-facing result of one verification attempt.

use serde::Serialize;

use credcheck_core::{ExtractedFields, FlagSet, MatchedSummary, Verdict};

/// Outcome returned to callers.
///
/// A verdict and confidence are always present, even when the attempt
/// failed; `message` and `error` carry the human-readable explanation and
/// the underlying error string for [`Verdict::Error`] outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub verdict: Verdict,
    pub confidence: u8,
    pub extracted: ExtractedFields,
    pub flags: FlagSet,
    pub matched: Option<MatchedSummary>,
    /// Id of the persisted verification record, when the write succeeded.
    pub log_id: Option<i64>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl VerificationReport {
    /// True when the attempt completed and the document checked out.
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }
}
