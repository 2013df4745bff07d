//! Persisted row types for the verification audit trail.
//!
//! Timestamps are ISO 8601 strings, written by the store at insert time.

use serde::{Deserialize, Serialize};

use credcheck_core::Verdict;

/// Request metadata captured alongside each verification attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Input for a new institution row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInstitution {
    pub name: String,
    pub code: String,
    /// University, College, Institute, Polytechnic.
    pub kind: String,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub established_year: Option<i32>,
}

/// A stored institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub kind: String,
    pub established_year: Option<i32>,
    pub active: bool,
    /// ISO 8601 timestamp string.
    pub created_at: String,
}

/// Input for a new issued-certificate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCertificate {
    pub certificate_number: String,
    pub student_name: String,
    pub roll_number: Option<String>,
    pub course_name: String,
    pub degree_type: String,
    pub passing_year: i32,
    pub grade: Option<String>,
    pub percentage: Option<f64>,
    /// ISO 8601 date string, when the paper certificate carries one.
    pub issue_date: Option<String>,
    pub institution_id: i64,
}

/// A stored certificate joined with its institution name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRow {
    pub id: i64,
    pub certificate_number: String,
    pub student_name: String,
    pub course_name: String,
    pub degree_type: String,
    pub passing_year: i32,
    pub institution_name: String,
}

/// Input for a new verification log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVerificationRecord {
    pub uploaded_filename: String,
    /// SHA-256 hex digest; absent when extraction itself failed.
    pub file_hash: Option<String>,
    /// Extracted-fields snapshot, or `{"error": ...}` for failed attempts.
    pub extracted: serde_json::Value,
    pub verdict: Verdict,
    pub confidence: u8,
    pub matched_certificate_id: Option<i64>,
    pub flags: Vec<String>,
    pub client: ClientMeta,
}

/// A stored verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRow {
    pub id: i64,
    pub uploaded_filename: String,
    pub file_hash: Option<String>,
    pub extracted: serde_json::Value,
    pub verdict: Verdict,
    pub confidence: u8,
    pub matched_certificate_id: Option<i64>,
    pub flags: Vec<String>,
    pub client: ClientMeta,
    /// ISO 8601 timestamp string.
    pub created_at: String,
}

/// How serious one flagged activity is, set from the verdict it rode in on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Input for a new suspicious-activity row; one per flag instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSuspiciousActivity {
    pub activity_type: String,
    pub description: String,
    pub severity: Severity,
}

/// A stored suspicious activity awaiting investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousActivityRow {
    pub id: i64,
    pub verification_log_id: i64,
    pub activity_type: String,
    pub description: String,
    pub severity: Severity,
    /// PENDING, INVESTIGATING, RESOLVED, FALSE_POSITIVE.
    pub status: String,
    /// ISO 8601 timestamp string.
    pub created_at: String,
}

/// Dashboard numbers over the whole audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub total_verifications: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub suspicious_count: usize,
    pub error_count: usize,
    pub total_institutions: usize,
    pub active_institutions: usize,
}
