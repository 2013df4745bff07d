//! DuckDB backend for the registry and the verification audit trail.
//!
//! Schema mirrors the four-table layout the service has always used:
//! institutions, certificates, verification_logs, suspicious_activities.
//! JSON payloads (extracted fields, flags) are stored as VARCHAR columns;
//! timestamps are ISO 8601 strings written at insert time.
//!
//! Supports both in-memory (ephemeral) and persistent (file-backed) modes.
//! Use [`open`](DuckStore::open) for in-memory and
//! [`open_persistent`](DuckStore::open_persistent) for storage that
//! survives across process restarts.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use duckdb::{Connection, params};
use tracing::info;

use credcheck_core::{InstitutionRef, RegistryRecord, Verdict};

use crate::records::{
    CertificateRow, ClientMeta, InstitutionRow, NewCertificate, NewInstitution,
    NewSuspiciousActivity, NewVerificationRecord, Severity, SuspiciousActivityRow,
    VerificationRow, VerificationStats,
};
use crate::{Store, StoreError};

const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS institutions_id_seq;
CREATE TABLE IF NOT EXISTS institutions (
    id BIGINT PRIMARY KEY DEFAULT nextval('institutions_id_seq'),
    name VARCHAR NOT NULL UNIQUE,
    code VARCHAR NOT NULL UNIQUE,
    kind VARCHAR NOT NULL,
    address VARCHAR,
    contact_email VARCHAR,
    phone VARCHAR,
    established_year INTEGER,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at VARCHAR NOT NULL
);
CREATE SEQUENCE IF NOT EXISTS certificates_id_seq;
CREATE TABLE IF NOT EXISTS certificates (
    id BIGINT PRIMARY KEY DEFAULT nextval('certificates_id_seq'),
    certificate_number VARCHAR NOT NULL,
    student_name VARCHAR NOT NULL,
    roll_number VARCHAR,
    course_name VARCHAR NOT NULL,
    degree_type VARCHAR NOT NULL,
    passing_year INTEGER NOT NULL,
    grade VARCHAR,
    percentage DOUBLE,
    issue_date VARCHAR,
    institution_id BIGINT NOT NULL,
    created_at VARCHAR NOT NULL,
    UNIQUE (certificate_number, institution_id)
);
CREATE SEQUENCE IF NOT EXISTS verification_logs_id_seq;
CREATE TABLE IF NOT EXISTS verification_logs (
    id BIGINT PRIMARY KEY DEFAULT nextval('verification_logs_id_seq'),
    uploaded_filename VARCHAR NOT NULL,
    file_hash VARCHAR,
    extracted_data VARCHAR NOT NULL,
    verification_status VARCHAR NOT NULL,
    confidence_score INTEGER NOT NULL,
    matched_certificate_id BIGINT,
    flags VARCHAR NOT NULL,
    ip_address VARCHAR,
    user_agent VARCHAR,
    created_at VARCHAR NOT NULL
);
CREATE SEQUENCE IF NOT EXISTS suspicious_activities_id_seq;
CREATE TABLE IF NOT EXISTS suspicious_activities (
    id BIGINT PRIMARY KEY DEFAULT nextval('suspicious_activities_id_seq'),
    verification_log_id BIGINT NOT NULL,
    activity_type VARCHAR NOT NULL,
    description VARCHAR,
    severity VARCHAR NOT NULL,
    status VARCHAR NOT NULL DEFAULT 'PENDING',
    created_at VARCHAR NOT NULL
);
";

/// DuckDB-backed [`Store`].
///
/// The connection sits behind a mutex: DuckDB connections are not Sync,
/// and `record_verification` needs exclusive access for its transaction.
pub struct DuckStore {
    conn: Mutex<Connection>,
}

impl DuckStore {
    /// Open an in-memory database and create the schema.
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open or create a persistent database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_verdict(s: &str) -> Result<Verdict, StoreError> {
    Verdict::parse(s).ok_or_else(|| StoreError::Other(format!("unknown verdict: {s}")))
}

fn parse_severity(s: &str) -> Result<Severity, StoreError> {
    Severity::parse(s).ok_or_else(|| StoreError::Other(format!("unknown severity: {s}")))
}

fn row_to_log(
    id: i64,
    uploaded_filename: String,
    file_hash: Option<String>,
    extracted: String,
    status: String,
    confidence: i64,
    matched_certificate_id: Option<i64>,
    flags: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: String,
) -> Result<VerificationRow, StoreError> {
    Ok(VerificationRow {
        id,
        uploaded_filename,
        file_hash,
        extracted: serde_json::from_str(&extracted)?,
        verdict: parse_verdict(&status)?,
        confidence: confidence as u8,
        matched_certificate_id,
        flags: serde_json::from_str(&flags)?,
        client: ClientMeta {
            ip_address,
            user_agent,
        },
        created_at,
    })
}

impl Store for DuckStore {
    fn registry_snapshot(&self) -> Result<Vec<RegistryRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.certificate_number, c.student_name, c.roll_number,
                    c.course_name, c.degree_type, c.passing_year, c.grade, c.percentage,
                    i.id, i.name, i.active
             FROM certificates c
             JOIN institutions i ON i.id = c.institution_id
             ORDER BY c.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RegistryRecord {
                id: row.get(0)?,
                certificate_number: row.get(1)?,
                student_name: row.get(2)?,
                roll_number: row.get(3)?,
                course_name: row.get(4)?,
                degree_type: row.get(5)?,
                passing_year: row.get(6)?,
                grade: row.get(7)?,
                percentage: row.get(8)?,
                institution: InstitutionRef {
                    id: row.get(9)?,
                    name: row.get(10)?,
                    active: row.get(11)?,
                },
            })
        })?;
        let snapshot: Result<Vec<_>, _> = rows.collect();
        Ok(snapshot?)
    }

    fn add_institution(&self, institution: NewInstitution) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let id = conn.query_row(
            "INSERT INTO institutions
                 (name, code, kind, address, contact_email, phone, established_year, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                institution.name,
                institution.code,
                institution.kind,
                institution.address,
                institution.contact_email,
                institution.phone,
                institution.established_year,
                now(),
            ],
            |row| row.get(0),
        )?;
        info!(id, "institution registered");
        Ok(id)
    }

    fn set_institution_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE institutions SET active = ? WHERE id = ?",
            params![active, id],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownInstitution(id));
        }
        Ok(())
    }

    fn add_certificate(&self, certificate: NewCertificate) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let known: i64 = conn.query_row(
            "SELECT count(*) FROM institutions WHERE id = ?",
            params![certificate.institution_id],
            |row| row.get(0),
        )?;
        if known == 0 {
            return Err(StoreError::UnknownInstitution(certificate.institution_id));
        }
        let id = conn.query_row(
            "INSERT INTO certificates
                 (certificate_number, student_name, roll_number, course_name, degree_type,
                  passing_year, grade, percentage, issue_date, institution_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                certificate.certificate_number,
                certificate.student_name,
                certificate.roll_number,
                certificate.course_name,
                certificate.degree_type,
                certificate.passing_year,
                certificate.grade,
                certificate.percentage,
                certificate.issue_date,
                certificate.institution_id,
                now(),
            ],
            |row| row.get(0),
        )?;
        info!(id, "certificate registered");
        Ok(id)
    }

    fn institutions(&self) -> Result<Vec<InstitutionRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, code, kind, established_year, active, created_at
             FROM institutions ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(InstitutionRow {
                id: row.get(0)?,
                name: row.get(1)?,
                code: row.get(2)?,
                kind: row.get(3)?,
                established_year: row.get(4)?,
                active: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        let institutions: Result<Vec<_>, _> = rows.collect();
        Ok(institutions?)
    }

    fn certificates(&self) -> Result<Vec<CertificateRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.certificate_number, c.student_name, c.course_name,
                    c.degree_type, c.passing_year, i.name
             FROM certificates c
             JOIN institutions i ON i.id = c.institution_id
             ORDER BY c.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CertificateRow {
                id: row.get(0)?,
                certificate_number: row.get(1)?,
                student_name: row.get(2)?,
                course_name: row.get(3)?,
                degree_type: row.get(4)?,
                passing_year: row.get(5)?,
                institution_name: row.get(6)?,
            })
        })?;
        let certificates: Result<Vec<_>, _> = rows.collect();
        Ok(certificates?)
    }

    fn record_verification(
        &self,
        record: NewVerificationRecord,
        activities: &[NewSuspiciousActivity],
    ) -> Result<i64, StoreError> {
        let extracted = serde_json::to_string(&record.extracted)?;
        let flags = serde_json::to_string(&record.flags)?;
        let created_at = now();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let log_id: i64 = tx.query_row(
            "INSERT INTO verification_logs
                 (uploaded_filename, file_hash, extracted_data, verification_status,
                  confidence_score, matched_certificate_id, flags, ip_address, user_agent,
                  created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                record.uploaded_filename,
                record.file_hash,
                extracted,
                record.verdict.as_str(),
                record.confidence as i64,
                record.matched_certificate_id,
                flags,
                record.client.ip_address,
                record.client.user_agent,
                created_at,
            ],
            |row| row.get(0),
        )?;
        for activity in activities {
            tx.execute(
                "INSERT INTO suspicious_activities
                     (verification_log_id, activity_type, description, severity, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    log_id,
                    activity.activity_type,
                    activity.description,
                    activity.severity.as_str(),
                    created_at,
                ],
            )?;
        }
        tx.commit()?;
        info!(
            log_id,
            verdict = record.verdict.as_str(),
            activities = activities.len(),
            "verification recorded"
        );
        Ok(log_id)
    }

    fn recent_logs(&self, limit: usize) -> Result<Vec<VerificationRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, uploaded_filename, file_hash, extracted_data, verification_status,
                    confidence_score, matched_certificate_id, flags, ip_address, user_agent,
                    created_at
             FROM verification_logs ORDER BY id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, Option<i64>>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, Option<String>>(9)?,
                row.get::<_, String>(10)?,
            ))
        })?;
        let mut logs = Vec::new();
        for row in rows {
            let (id, name, hash, extracted, status, confidence, matched, flags, ip, ua, created) =
                row?;
            logs.push(row_to_log(
                id, name, hash, extracted, status, confidence, matched, flags, ip, ua, created,
            )?);
        }
        Ok(logs)
    }

    fn log(&self, id: i64) -> Result<VerificationRow, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, uploaded_filename, file_hash, extracted_data, verification_status,
                        confidence_score, matched_certificate_id, flags, ip_address, user_agent,
                        created_at
                 FROM verification_logs WHERE id = ?",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, Option<i64>>(6)?,
                        row.get::<_, String>(7)?,
                        row.get::<_, Option<String>>(8)?,
                        row.get::<_, Option<String>>(9)?,
                        row.get::<_, String>(10)?,
                    ))
                },
            )
            .map_err(|err| match err {
                duckdb::Error::QueryReturnedNoRows => StoreError::NoResults,
                other => StoreError::DuckDb(other),
            })?;
        let (id, name, hash, extracted, status, confidence, matched, flags, ip, ua, created) = row;
        row_to_log(
            id, name, hash, extracted, status, confidence, matched, flags, ip, ua, created,
        )
    }

    fn activities_for(&self, log_id: i64) -> Result<Vec<SuspiciousActivityRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, verification_log_id, activity_type, description, severity, status,
                    created_at
             FROM suspicious_activities WHERE verification_log_id = ? ORDER BY id",
        )?;
        collect_activities(stmt.query_map(params![log_id], activity_tuple)?)
    }

    fn pending_activities(&self, limit: usize) -> Result<Vec<SuspiciousActivityRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, verification_log_id, activity_type, description, severity, status,
                    created_at
             FROM suspicious_activities WHERE status = 'PENDING'
             ORDER BY id DESC LIMIT ?",
        )?;
        collect_activities(stmt.query_map(params![limit as i64], activity_tuple)?)
    }

    fn stats(&self) -> Result<VerificationStats, StoreError> {
        let conn = self.lock()?;
        let count_status = |status: &str| -> Result<usize, StoreError> {
            let n: i64 = conn.query_row(
                "SELECT count(*) FROM verification_logs WHERE verification_status = ?",
                params![status],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };
        let total: i64 =
            conn.query_row("SELECT count(*) FROM verification_logs", [], |row| row.get(0))?;
        let institutions: i64 =
            conn.query_row("SELECT count(*) FROM institutions", [], |row| row.get(0))?;
        let active: i64 = conn.query_row(
            "SELECT count(*) FROM institutions WHERE active",
            [],
            |row| row.get(0),
        )?;
        Ok(VerificationStats {
            total_verifications: total as usize,
            valid_count: count_status("VALID")?,
            invalid_count: count_status("INVALID")?,
            suspicious_count: count_status("SUSPICIOUS")?,
            error_count: count_status("ERROR")?,
            total_institutions: institutions as usize,
            active_institutions: active as usize,
        })
    }
}

type ActivityTuple = (i64, i64, String, Option<String>, String, String, String);

fn activity_tuple(row: &duckdb::Row<'_>) -> Result<ActivityTuple, duckdb::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn collect_activities(
    rows: impl Iterator<Item = Result<ActivityTuple, duckdb::Error>>,
) -> Result<Vec<SuspiciousActivityRow>, StoreError> {
    let mut activities = Vec::new();
    for row in rows {
        let (id, log_id, activity_type, description, severity, status, created_at) = row?;
        activities.push(SuspiciousActivityRow {
            id,
            verification_log_id: log_id,
            activity_type,
            description: description.unwrap_or_default(),
            severity: parse_severity(&severity)?,
            status,
            created_at,
        });
    }
    Ok(activities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn institution(name: &str, code: &str) -> NewInstitution {
        NewInstitution {
            name: name.into(),
            code: code.into(),
            kind: "University".into(),
            address: Some("Ranchi, Jharkhand".into()),
            contact_email: None,
            phone: None,
            established_year: Some(1960),
        }
    }

    fn certificate(number: &str, institution_id: i64) -> NewCertificate {
        NewCertificate {
            certificate_number: number.into(),
            student_name: "Rahul Kumar Singh".into(),
            roll_number: Some("RU23BSC001234".into()),
            course_name: "Bachelor of Science in Computer Science".into(),
            degree_type: "Bachelor".into(),
            passing_year: 2023,
            grade: Some("A".into()),
            percentage: Some(85.5),
            issue_date: Some("2023-06-15".into()),
            institution_id,
        }
    }

    fn verification(verdict: Verdict, flags: Vec<String>) -> NewVerificationRecord {
        NewVerificationRecord {
            uploaded_filename: "degree.txt".into(),
            file_hash: Some("ab".repeat(32)),
            extracted: serde_json::json!({"certificate_number": "RU/2023/BSC/001234"}),
            verdict,
            confidence: 85,
            matched_certificate_id: Some(1),
            flags,
            client: ClientMeta {
                ip_address: Some("10.0.0.1".into()),
                user_agent: Some("credcheck-cli".into()),
            },
        }
    }

    #[test]
    fn snapshot_joins_and_orders() {
        let store = DuckStore::open().unwrap();
        let ru = store.add_institution(institution("Ranchi University", "RU001")).unwrap();
        store.add_certificate(certificate("RU/2023/BSC/001234", ru)).unwrap();
        store.add_certificate(certificate("RU/2022/BA/005678", ru)).unwrap();

        let snapshot = store.registry_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].id < snapshot[1].id);
        assert_eq!(snapshot[0].institution.name, "Ranchi University");
        assert!(snapshot[0].institution.active);
        assert_eq!(snapshot[0].percentage, Some(85.5));
    }

    #[test]
    fn unknown_institution_rejected() {
        let store = DuckStore::open().unwrap();
        let result = store.add_certificate(certificate("X/1", 42));
        assert!(matches!(result, Err(StoreError::UnknownInstitution(42))));
    }

    #[test]
    fn deactivation_round_trips() {
        let store = DuckStore::open().unwrap();
        let id = store.add_institution(institution("Closed College", "CC001")).unwrap();
        store.add_certificate(certificate("CC/1", id)).unwrap();
        store.set_institution_active(id, false).unwrap();
        assert!(!store.registry_snapshot().unwrap()[0].institution.active);

        let missing = store.set_institution_active(99, false);
        assert!(matches!(missing, Err(StoreError::UnknownInstitution(99))));
    }

    #[test]
    fn verification_log_round_trips() {
        let store = DuckStore::open().unwrap();
        let flags = vec!["INVALID_DATE".to_string(), "SPELLING_ERRORS".to_string()];
        let activities: Vec<NewSuspiciousActivity> = flags
            .iter()
            .map(|flag| NewSuspiciousActivity {
                activity_type: flag.clone(),
                description: format!("Detected {flag} in certificate verification"),
                severity: Severity::Medium,
            })
            .collect();
        let log_id = store
            .record_verification(verification(Verdict::Suspicious, flags.clone()), &activities)
            .unwrap();

        let log = store.log(log_id).unwrap();
        assert_eq!(log.verdict, Verdict::Suspicious);
        assert_eq!(log.confidence, 85);
        assert_eq!(log.flags, flags);
        assert_eq!(log.client.ip_address.as_deref(), Some("10.0.0.1"));

        let stored = store.activities_for(log_id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].activity_type, "INVALID_DATE");
        assert_eq!(stored[0].severity, Severity::Medium);
        assert_eq!(stored[0].status, "PENDING");

        let pending = store.pending_activities(10).unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn missing_log_is_no_results() {
        let store = DuckStore::open().unwrap();
        assert!(matches!(store.log(7), Err(StoreError::NoResults)));
    }

    #[test]
    fn stats_aggregate_by_status() {
        let store = DuckStore::open().unwrap();
        store.add_institution(institution("Ranchi University", "RU001")).unwrap();
        store
            .record_verification(verification(Verdict::Valid, vec![]), &[])
            .unwrap();
        store
            .record_verification(verification(Verdict::Invalid, vec![]), &[])
            .unwrap();
        store
            .record_verification(verification(Verdict::Invalid, vec![]), &[])
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_verifications, 3);
        assert_eq!(stats.valid_count, 1);
        assert_eq!(stats.invalid_count, 2);
        assert_eq!(stats.total_institutions, 1);
        assert_eq!(stats.active_institutions, 1);
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("credcheck.duckdb");

        let store = DuckStore::open_persistent(&db_path).unwrap();
        let id = store.add_institution(institution("Ranchi University", "RU001")).unwrap();
        store.add_certificate(certificate("RU/2023/BSC/001234", id)).unwrap();
        drop(store);

        let store = DuckStore::open_persistent(&db_path).unwrap();
        let snapshot = store.registry_snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].certificate_number, "RU/2023/BSC/001234");
    }
}
