//! In-memory backend for tests and ephemeral runs.
//!
//! One mutex guards all tables, so `record_verification` is trivially
//! atomic: the record and its activities land under the same lock.

use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};

use credcheck_core::{InstitutionRef, RegistryRecord, Verdict};

use crate::records::{
    CertificateRow, InstitutionRow, NewCertificate, NewInstitution, NewSuspiciousActivity,
    NewVerificationRecord, SuspiciousActivityRow, VerificationRow, VerificationStats,
};
use crate::{Store, StoreError};

struct StoredCertificate {
    id: i64,
    cert: NewCertificate,
}

#[derive(Default)]
struct Inner {
    institutions: Vec<InstitutionRow>,
    certificates: Vec<StoredCertificate>,
    logs: Vec<VerificationRow>,
    activities: Vec<SuspiciousActivityRow>,
}

/// Vec-backed [`Store`] with no persistence across process restarts.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Store for MemoryStore {
    fn registry_snapshot(&self) -> Result<Vec<RegistryRecord>, StoreError> {
        let inner = self.lock()?;
        let mut snapshot = Vec::with_capacity(inner.certificates.len());
        for stored in &inner.certificates {
            let institution = inner
                .institutions
                .iter()
                .find(|i| i.id == stored.cert.institution_id)
                .ok_or(StoreError::UnknownInstitution(stored.cert.institution_id))?;
            snapshot.push(RegistryRecord {
                id: stored.id,
                certificate_number: stored.cert.certificate_number.clone(),
                student_name: stored.cert.student_name.clone(),
                roll_number: stored.cert.roll_number.clone(),
                course_name: stored.cert.course_name.clone(),
                degree_type: stored.cert.degree_type.clone(),
                passing_year: stored.cert.passing_year,
                grade: stored.cert.grade.clone(),
                percentage: stored.cert.percentage,
                institution: InstitutionRef {
                    id: institution.id,
                    name: institution.name.clone(),
                    active: institution.active,
                },
            });
        }
        // Certificates are appended with ascending ids; keep that order.
        Ok(snapshot)
    }

    fn add_institution(&self, institution: NewInstitution) -> Result<i64, StoreError> {
        let mut inner = self.lock()?;
        let id = inner.institutions.len() as i64 + 1;
        inner.institutions.push(InstitutionRow {
            id,
            name: institution.name,
            code: institution.code,
            kind: institution.kind,
            established_year: institution.established_year,
            active: true,
            created_at: now(),
        });
        Ok(id)
    }

    fn set_institution_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let institution = inner
            .institutions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::UnknownInstitution(id))?;
        institution.active = active;
        Ok(())
    }

    fn add_certificate(&self, certificate: NewCertificate) -> Result<i64, StoreError> {
        let mut inner = self.lock()?;
        if !inner
            .institutions
            .iter()
            .any(|i| i.id == certificate.institution_id)
        {
            return Err(StoreError::UnknownInstitution(certificate.institution_id));
        }
        let id = inner.certificates.len() as i64 + 1;
        inner.certificates.push(StoredCertificate {
            id,
            cert: certificate,
        });
        Ok(id)
    }

    fn institutions(&self) -> Result<Vec<InstitutionRow>, StoreError> {
        Ok(self.lock()?.institutions.clone())
    }

    fn certificates(&self) -> Result<Vec<CertificateRow>, StoreError> {
        let inner = self.lock()?;
        let mut rows = Vec::with_capacity(inner.certificates.len());
        for stored in &inner.certificates {
            let institution_name = inner
                .institutions
                .iter()
                .find(|i| i.id == stored.cert.institution_id)
                .map(|i| i.name.clone())
                .unwrap_or_default();
            rows.push(CertificateRow {
                id: stored.id,
                certificate_number: stored.cert.certificate_number.clone(),
                student_name: stored.cert.student_name.clone(),
                course_name: stored.cert.course_name.clone(),
                degree_type: stored.cert.degree_type.clone(),
                passing_year: stored.cert.passing_year,
                institution_name,
            });
        }
        Ok(rows)
    }

    fn record_verification(
        &self,
        record: NewVerificationRecord,
        activities: &[NewSuspiciousActivity],
    ) -> Result<i64, StoreError> {
        let mut inner = self.lock()?;
        let log_id = inner.logs.len() as i64 + 1;
        let created_at = now();
        inner.logs.push(VerificationRow {
            id: log_id,
            uploaded_filename: record.uploaded_filename,
            file_hash: record.file_hash,
            extracted: record.extracted,
            verdict: record.verdict,
            confidence: record.confidence,
            matched_certificate_id: record.matched_certificate_id,
            flags: record.flags,
            client: record.client,
            created_at: created_at.clone(),
        });
        for activity in activities {
            let id = inner.activities.len() as i64 + 1;
            inner.activities.push(SuspiciousActivityRow {
                id,
                verification_log_id: log_id,
                activity_type: activity.activity_type.clone(),
                description: activity.description.clone(),
                severity: activity.severity,
                status: "PENDING".to_string(),
                created_at: created_at.clone(),
            });
        }
        Ok(log_id)
    }

    fn recent_logs(&self, limit: usize) -> Result<Vec<VerificationRow>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.logs.iter().rev().take(limit).cloned().collect())
    }

    fn log(&self, id: i64) -> Result<VerificationRow, StoreError> {
        self.lock()?
            .logs
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(StoreError::NoResults)
    }

    fn activities_for(&self, log_id: i64) -> Result<Vec<SuspiciousActivityRow>, StoreError> {
        Ok(self
            .lock()?
            .activities
            .iter()
            .filter(|a| a.verification_log_id == log_id)
            .cloned()
            .collect())
    }

    fn pending_activities(&self, limit: usize) -> Result<Vec<SuspiciousActivityRow>, StoreError> {
        Ok(self
            .lock()?
            .activities
            .iter()
            .rev()
            .filter(|a| a.status == "PENDING")
            .take(limit)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<VerificationStats, StoreError> {
        let inner = self.lock()?;
        let count = |verdict: Verdict| inner.logs.iter().filter(|l| l.verdict == verdict).count();
        Ok(VerificationStats {
            total_verifications: inner.logs.len(),
            valid_count: count(Verdict::Valid),
            invalid_count: count(Verdict::Invalid),
            suspicious_count: count(Verdict::Suspicious),
            error_count: count(Verdict::Error),
            total_institutions: inner.institutions.len(),
            active_institutions: inner.institutions.iter().filter(|i| i.active).count(),
        })
    }
}
