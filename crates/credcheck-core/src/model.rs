//! Shared data types for certificate verification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anomaly::AnomalyFlag;

/// Structured fields pulled out of an uploaded document by the extractor.
///
/// Values are unvalidated raw strings; `None` means the extractor found no
/// matching pattern in the source text. Produced once per verification
/// attempt and consumed by the search and anomaly stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub certificate_number: Option<String>,
    pub student_name: Option<String>,
    pub roll_number: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub grade: Option<String>,
    pub percentage: Option<String>,
}

impl ExtractedFields {
    /// True when no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.certificate_number.is_none()
            && self.student_name.is_none()
            && self.roll_number.is_none()
            && self.course.is_none()
            && self.year.is_none()
            && self.grade.is_none()
            && self.percentage.is_none()
    }
}

/// Issuing institution as embedded in a registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRef {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

/// One known-issued certificate from the registry.
///
/// Owned by the external store; the decision engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub id: i64,
    pub certificate_number: String,
    pub student_name: String,
    pub roll_number: Option<String>,
    pub course_name: String,
    pub degree_type: String,
    pub passing_year: i32,
    pub grade: Option<String>,
    pub percentage: Option<f64>,
    pub institution: InstitutionRef,
}

/// How a single field contributed to a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldMatch {
    /// Case-insensitive equality.
    Exact,
    /// Similarity fallback above the rule's threshold.
    Partial,
    /// Year within the allowed tolerance.
    Close,
    /// Fuzzy similarity score that cleared the rule's threshold.
    Score(u32),
}

/// Per-field record of how a candidate earned its points, keyed by field name.
pub type MatchDetails = BTreeMap<String, FieldMatch>;

/// A registry record paired with its score against one extraction.
///
/// Transient: created during candidate search, discarded once the verdict
/// is computed. Only its summary is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub record: RegistryRecord,
    /// Additive field score, capped at 100.
    pub score: u32,
    pub details: MatchDetails,
}

/// Caller-facing summary of the best-matching registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSummary {
    pub record_id: i64,
    pub certificate_number: String,
    pub student_name: String,
    pub course_name: String,
    pub institution_name: String,
    pub passing_year: i32,
    pub match_score: u32,
    pub match_details: MatchDetails,
}

impl From<&MatchCandidate> for MatchedSummary {
    fn from(candidate: &MatchCandidate) -> Self {
        Self {
            record_id: candidate.record.id,
            certificate_number: candidate.record.certificate_number.clone(),
            student_name: candidate.record.student_name.clone(),
            course_name: candidate.record.course_name.clone(),
            institution_name: candidate.record.institution.name.clone(),
            passing_year: candidate.record.passing_year,
            match_score: candidate.score,
            match_details: candidate.details.clone(),
        }
    }
}

/// Ordered, duplicate-preserving collection of anomaly and forgery flags.
///
/// Each flag instance later becomes one suspicious-activity row, so
/// duplicates across sources are kept rather than collapsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagSet(Vec<String>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the combined set: anomaly flags first, then the forgery flags
    /// reported by the extractor, in their original order.
    pub fn combine(anomalies: &[AnomalyFlag], forgery: &[String]) -> Self {
        let mut flags: Vec<String> = anomalies.iter().map(|f| f.as_str().to_string()).collect();
        flags.extend(forgery.iter().cloned());
        Self(flags)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for FlagSet {
    fn from(flags: Vec<String>) -> Self {
        Self(flags)
    }
}
