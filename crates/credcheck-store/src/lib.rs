//! Storage layer: registry snapshots plus atomic verification logging.
//!
//! The decision engine reads a point-in-time registry snapshot and writes
//! one verification record per attempt, together with its
//! suspicious-activity children, as a single transaction. Backends:
//! [`MemoryStore`] (always available) and `DuckStore` (feature `duckdb`).

mod error;
pub use error::StoreError;

mod records;
pub use records::{
    CertificateRow, ClientMeta, InstitutionRow, NewCertificate, NewInstitution,
    NewSuspiciousActivity, NewVerificationRecord, Severity, SuspiciousActivityRow,
    VerificationRow, VerificationStats,
};

mod memory;
pub use memory::MemoryStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

use credcheck_core::RegistryRecord;

/// Storage contract shared by all backends.
///
/// Snapshots are ordered by record id so candidate ranking has a
/// deterministic tie-break. `record_verification` persists the record and
/// its activities all-or-nothing.
pub trait Store: Send + Sync {
    /// Point-in-time view of all issued certificates, ordered by record id.
    fn registry_snapshot(&self) -> Result<Vec<RegistryRecord>, StoreError>;

    fn add_institution(&self, institution: NewInstitution) -> Result<i64, StoreError>;

    fn set_institution_active(&self, id: i64, active: bool) -> Result<(), StoreError>;

    fn add_certificate(&self, certificate: NewCertificate) -> Result<i64, StoreError>;

    fn institutions(&self) -> Result<Vec<InstitutionRow>, StoreError>;

    fn certificates(&self) -> Result<Vec<CertificateRow>, StoreError>;

    /// Persist one verification attempt and its suspicious-activity
    /// children atomically. Returns the new log id.
    fn record_verification(
        &self,
        record: NewVerificationRecord,
        activities: &[NewSuspiciousActivity],
    ) -> Result<i64, StoreError>;

    /// Most recent verification logs, newest first.
    fn recent_logs(&self, limit: usize) -> Result<Vec<VerificationRow>, StoreError>;

    fn log(&self, id: i64) -> Result<VerificationRow, StoreError>;

    fn activities_for(&self, log_id: i64) -> Result<Vec<SuspiciousActivityRow>, StoreError>;

    /// Suspicious activities still awaiting investigation, newest first.
    fn pending_activities(&self, limit: usize) -> Result<Vec<SuspiciousActivityRow>, StoreError>;

    fn stats(&self) -> Result<VerificationStats, StoreError>;
}
