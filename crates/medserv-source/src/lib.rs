//! Fetch layer for the field-service API
//!
//! Everything the dashboard renders comes through [`DataSource`]. The real
//! deployment reads snapshots exported from the API ([`JsonSnapshotSource`]);
//! tests use [`MemorySource`].

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

pub mod decode;
pub mod error;
pub mod snapshot;
pub mod types;

pub use error::{SourceError, SourceResult};
pub use snapshot::JsonSnapshotSource;

// Re-export commonly used types
pub use types::{
    EntityId, MedicalDevice, TypeOfWork, ReportDeviceItem, Report, HealthFacility, Employee,
    ErrorCodeRecord, RawErrorCodeEntry, ErrorCodeQuery,
};

// ==================== Source Trait ====================

/// Data source reference type
pub type SourceRef = Arc<dyn DataSource>;

/// Read-only access to the field-service API
#[async_trait]
pub trait DataSource: Send + Sync {
    /// All reports, with their device-item associations
    async fn fetch_reports(&self) -> SourceResult<Vec<Report>>;

    /// A single report
    async fn fetch_report(&self, id: EntityId) -> SourceResult<Report>;

    async fn fetch_medical_devices(&self) -> SourceResult<Vec<MedicalDevice>>;

    async fn fetch_types_of_work(&self) -> SourceResult<Vec<TypeOfWork>>;

    /// Raw error-code log entries matching `query`
    async fn fetch_error_codes(&self, query: ErrorCodeQuery) -> SourceResult<Vec<RawErrorCodeEntry>>;

    /// Permission names granted to the dashboard user
    async fn fetch_permissions(&self) -> SourceResult<Vec<String>>;
}

// ==================== In-memory Source ====================

/// Collection names accepted by [`MemorySource::unavailable`]
pub const COLLECTIONS: [&str; 5] = ["reports", "medical_devices", "types_of_work", "error_codes", "permissions"];

/// Source serving fixed collections, used in tests and demos
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub reports: Vec<Report>,
    pub devices: Vec<MedicalDevice>,
    pub work_types: Vec<TypeOfWork>,
    pub error_codes: Vec<RawErrorCodeEntry>,
    pub permissions: Vec<String>,
    /// Collections that fail with an IO error, to simulate an unreachable API
    pub unavailable: HashSet<&'static str>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make fetches of `collection` fail
    pub fn with_unavailable(mut self, collection: &'static str) -> Self {
        self.unavailable.insert(collection);
        self
    }

    fn check(&self, collection: &'static str) -> SourceResult<()> {
        if self.unavailable.contains(collection) {
            return Err(SourceError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("{} unavailable", collection),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch_reports(&self) -> SourceResult<Vec<Report>> {
        self.check("reports")?;
        Ok(self.reports.clone())
    }

    async fn fetch_report(&self, id: EntityId) -> SourceResult<Report> {
        self.check("reports")?;
        self.reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| SourceError::not_found("report", id))
    }

    async fn fetch_medical_devices(&self) -> SourceResult<Vec<MedicalDevice>> {
        self.check("medical_devices")?;
        Ok(self.devices.clone())
    }

    async fn fetch_types_of_work(&self) -> SourceResult<Vec<TypeOfWork>> {
        self.check("types_of_work")?;
        Ok(self.work_types.clone())
    }

    async fn fetch_error_codes(&self, query: ErrorCodeQuery) -> SourceResult<Vec<RawErrorCodeEntry>> {
        self.check("error_codes")?;
        Ok(self.error_codes.iter().filter(|e| query.matches(e)).cloned().collect())
    }

    async fn fetch_permissions(&self) -> SourceResult<Vec<String>> {
        self.check("permissions")?;
        Ok(self.permissions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_serves_collections() {
        let source = MemorySource {
            work_types: vec![TypeOfWork { id: 10, name: "Cleaning".to_string() }],
            ..MemorySource::default()
        };
        assert_eq!(source.fetch_types_of_work().await.unwrap().len(), 1);
        assert!(source.fetch_report(1).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_source_unavailable_collection() {
        let source = MemorySource::new().with_unavailable("medical_devices");
        assert!(matches!(source.fetch_medical_devices().await, Err(SourceError::IoError(_))));
        assert!(source.fetch_types_of_work().await.is_ok());
    }
}
