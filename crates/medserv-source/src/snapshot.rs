//! Data source backed by a directory of API-shaped JSON files
//!
//! Layout:
//!
//! ```text
//! data/
//!   reports/*.json          one report per file (or reports.json with an array)
//!   medical_devices.json
//!   types_of_work.json
//!   error_codes.json
//!   permissions.json        optional, array of permission strings
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::decode::{decode_collection, decode_entries, decode_entity};
use crate::error::{SourceError, SourceResult};
use crate::types::{EntityId, ErrorCodeQuery, MedicalDevice, RawErrorCodeEntry, Report, TypeOfWork};
use crate::DataSource;

const REPORTS_DIR: &str = "reports";
const REPORTS_FILE: &str = "reports.json";
const DEVICES_FILE: &str = "medical_devices.json";
const WORK_TYPES_FILE: &str = "types_of_work.json";
const ERROR_CODES_FILE: &str = "error_codes.json";
const PERMISSIONS_FILE: &str = "permissions.json";

/// Reads snapshots exported from the field-service API
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    root: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json(&self, path: &Path) -> SourceResult<Value> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::not_found("snapshot file", path.display()),
            _ => SourceError::IoError(e),
        })?;

        serde_json::from_str(&content).map_err(|source| SourceError::Decode {
            location: path.display().to_string(),
            source,
        })
    }

    async fn read_collection<T: serde::de::DeserializeOwned>(&self, file: &str) -> SourceResult<Vec<T>> {
        let path = self.root.join(file);
        let value = self.read_json(&path).await?;
        decode_collection(value, &path.display().to_string())
    }

    async fn load_reports(&self) -> SourceResult<Vec<Report>> {
        let dir = self.root.join(REPORTS_DIR);
        if !dir.is_dir() {
            return self.read_collection(REPORTS_FILE).await;
        }

        let pattern = dir.join("*.json");
        let pattern_str = pattern.to_string_lossy();
        let mut paths: Vec<PathBuf> = glob::glob(&pattern_str)
            .map_err(|e| SourceError::InvalidFormat {
                location: pattern_str.to_string(),
                message: e.to_string(),
            })?
            .flatten()
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            let value = self.read_json(&path).await?;
            reports.push(decode_entity(value, &path.display().to_string())?);
        }
        log::debug!("Loaded {} reports from {}", reports.len(), dir.display());
        Ok(reports)
    }
}

#[async_trait]
impl DataSource for JsonSnapshotSource {
    async fn fetch_reports(&self) -> SourceResult<Vec<Report>> {
        self.load_reports().await
    }

    async fn fetch_report(&self, id: EntityId) -> SourceResult<Report> {
        self.load_reports()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| SourceError::not_found("report", id))
    }

    async fn fetch_medical_devices(&self) -> SourceResult<Vec<MedicalDevice>> {
        self.read_collection(DEVICES_FILE).await
    }

    async fn fetch_types_of_work(&self) -> SourceResult<Vec<TypeOfWork>> {
        self.read_collection(WORK_TYPES_FILE).await
    }

    async fn fetch_error_codes(&self, query: ErrorCodeQuery) -> SourceResult<Vec<RawErrorCodeEntry>> {
        let path = self.root.join(ERROR_CODES_FILE);
        let value = self.read_json(&path).await?;
        let entries: Vec<RawErrorCodeEntry> = decode_entries(value, &path.display().to_string())?;
        Ok(entries.into_iter().filter(|e| query.matches(e)).collect())
    }

    async fn fetch_permissions(&self) -> SourceResult<Vec<String>> {
        let path = self.root.join(PERMISSIONS_FILE);
        if !path.exists() {
            log::warn!("{} not found, granting every dashboard permission", path.display());
            return Ok(vec!["*".to_string()]);
        }
        self.read_collection(PERMISSIONS_FILE).await
    }
}
