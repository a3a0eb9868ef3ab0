//! Entities as delivered by the field-service API

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::decode::{de_code, de_id, de_opt_code, de_opt_id, parse_day};

/// Primary key of every API entity
pub type EntityId = i64;

/// A maintained medical device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalDevice {
    #[serde(deserialize_with = "de_id")]
    pub id: EntityId,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    /// Facility the device is installed at
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub health_facility_id: Option<EntityId>,
}

impl MedicalDevice {
    /// "Brand Model" label used in lists and cards
    pub fn display_name(&self) -> String {
        let brand = self.brand.trim();
        let model = self.model.trim();
        match (brand.is_empty(), model.is_empty()) {
            (false, false) => format!("{} {}", brand, model),
            (false, true) => brand.to_string(),
            (true, false) => model.to_string(),
            (true, true) => format!("Device #{}", self.id),
        }
    }
}

/// A named category of maintenance action (e.g. "Calibration")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOfWork {
    #[serde(deserialize_with = "de_id")]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

/// One (device, work-type) association of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDeviceItem {
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(deserialize_with = "de_id")]
    pub medical_device_id: EntityId,
    #[serde(deserialize_with = "de_id")]
    pub type_of_work_id: EntityId,
}

impl ReportDeviceItem {
    pub fn new(medical_device_id: EntityId, type_of_work_id: EntityId) -> Self {
        Self {
            id: None,
            medical_device_id,
            type_of_work_id,
        }
    }
}

/// Health facility summary embedded in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthFacility {
    #[serde(deserialize_with = "de_id")]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

/// Employee (technician) summary embedded in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(deserialize_with = "de_id")]
    pub id: EntityId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Field-service report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(deserialize_with = "de_id")]
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_facility: Option<HealthFacility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<Employee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub report_device_item: Vec<ReportDeviceItem>,
}

impl Report {
    /// Raw date the service took place, falling back to the creation timestamp
    pub fn raw_service_date(&self) -> Option<&str> {
        self.service_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.created_at.as_deref().filter(|d| !d.trim().is_empty()))
    }
}

/// Error-code log entry object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorCodeRecord {
    #[serde(default, deserialize_with = "de_opt_code", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub medical_device_id: Option<EntityId>,
}

/// Raw error-code log entry: either a bare code or a full record
///
/// Codes may arrive as strings or numbers and are kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawErrorCodeEntry {
    Code(#[serde(deserialize_with = "de_code")] String),
    Record(ErrorCodeRecord),
}

impl RawErrorCodeEntry {
    pub fn code(&self) -> Option<&str> {
        match self {
            RawErrorCodeEntry::Code(code) => Some(code),
            RawErrorCodeEntry::Record(record) => record.error_code.as_deref(),
        }
    }

    /// `date`, falling back to `created_at` only when `date` is absent or
    /// blank; bare codes carry no date
    pub fn raw_date(&self) -> Option<&str> {
        match self {
            RawErrorCodeEntry::Code(_) => None,
            RawErrorCodeEntry::Record(record) => record
                .date
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .or_else(|| record.created_at.as_deref().filter(|d| !d.trim().is_empty())),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            RawErrorCodeEntry::Code(_) => None,
            RawErrorCodeEntry::Record(record) => record.description.as_deref(),
        }
    }

    pub fn medical_device_id(&self) -> Option<EntityId> {
        match self {
            RawErrorCodeEntry::Code(_) => None,
            RawErrorCodeEntry::Record(record) => record.medical_device_id,
        }
    }
}

/// Error-code lookup filter; the API applies it server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeQuery {
    pub medical_device_id: Option<EntityId>,
    pub year: i32,
    /// 1-12; `None` selects the whole year
    pub month: Option<u32>,
}

impl ErrorCodeQuery {
    pub fn new(year: i32, month: Option<u32>) -> Self {
        Self {
            medical_device_id: None,
            year,
            month,
        }
    }

    pub fn for_device(mut self, medical_device_id: EntityId) -> Self {
        self.medical_device_id = Some(medical_device_id);
        self
    }

    /// Whether the API would return `entry` for this query
    ///
    /// Entries without a resolvable date or device id are passed through;
    /// deciding what to do with them is left to the consumer.
    pub fn matches(&self, entry: &RawErrorCodeEntry) -> bool {
        if let (Some(wanted), Some(actual)) = (self.medical_device_id, entry.medical_device_id()) {
            if wanted != actual {
                return false;
            }
        }

        match entry.raw_date().and_then(parse_day) {
            Some(day) => day.year() == self.year && self.month.map_or(true, |m| day.month() == m),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_accepts_string_ids() {
        let device: MedicalDevice = serde_json::from_str(
            r#"{"id": "7", "brand": "Philips", "model": "IntelliVue", "health_facility_id": 3}"#,
        )
        .unwrap();
        assert_eq!(device.id, 7);
        assert_eq!(device.health_facility_id, Some(3));
        assert_eq!(device.serial_number, None);
        assert_eq!(device.display_name(), "Philips IntelliVue");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut device = MedicalDevice {
            id: 4,
            brand: String::new(),
            model: String::new(),
            serial_number: None,
            software_version: None,
            health_facility_id: None,
        };
        assert_eq!(device.display_name(), "Device #4");
        device.model = "V60".to_string();
        assert_eq!(device.display_name(), "V60");
    }

    #[test]
    fn test_report_with_nested_items() {
        let report: Report = serde_json::from_str(
            r#"{
                "id": 12,
                "report_number": "R-0012",
                "service_date": "2024-05-01",
                "employee": {"id": 1, "first_name": "Ana", "last_name": "Perez"},
                "report_device_item": [
                    {"id": 1, "medical_device_id": 1, "type_of_work_id": 10},
                    {"id": 2, "medical_device_id": "2", "type_of_work_id": "10"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(report.report_device_item.len(), 2);
        assert_eq!(report.report_device_item[1].medical_device_id, 2);
        assert_eq!(report.employee.unwrap().full_name(), "Ana Perez");
    }

    #[test]
    fn test_report_service_date_fallback() {
        let report: Report = serde_json::from_str(
            r#"{"id": 1, "service_date": "", "created_at": "2024-03-02T08:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(report.raw_service_date(), Some("2024-03-02T08:00:00Z"));
        assert!(report.report_device_item.is_empty());
    }

    #[test]
    fn test_error_code_query_matches() {
        let entries: Vec<RawErrorCodeEntry> = serde_json::from_str(
            r#"[
                {"error_code": "E01", "date": "2024-05-01", "medical_device_id": 1},
                {"error_code": "E02", "date": "2024-06-01", "medical_device_id": 1},
                {"error_code": "E03", "date": "2024-05-03", "medical_device_id": 2},
                {"error_code": "E04", "medical_device_id": 1},
                "E05"
            ]"#,
        )
        .unwrap();

        let query = ErrorCodeQuery::new(2024, Some(5)).for_device(1);
        let codes: Vec<_> = entries.iter().filter(|e| query.matches(e)).filter_map(|e| e.code()).collect();
        assert_eq!(codes, vec!["E01", "E04", "E05"]);

        let whole_year = ErrorCodeQuery::new(2024, None);
        assert_eq!(entries.iter().filter(|e| whole_year.matches(e)).count(), 5);
        assert_eq!(entries.iter().filter(|e| ErrorCodeQuery::new(2023, None).matches(e)).count(), 2);
    }

    #[test]
    fn test_raw_error_code_entry_shapes() {
        let entries: Vec<RawErrorCodeEntry> = serde_json::from_str(
            r#"["E05", {"error_code": "E01", "created_at": "2024-05-01T10:00:00Z", "description": "Low battery"}]"#,
        )
        .unwrap();

        assert_eq!(entries[0], RawErrorCodeEntry::Code("E05".to_string()));
        assert_eq!(entries[0].raw_date(), None);
        assert_eq!(entries[1].code(), Some("E01"));
        assert_eq!(entries[1].raw_date(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(entries[1].description(), Some("Low battery"));
    }

    #[test]
    fn test_unparseable_date_does_not_fall_back() {
        let entry: RawErrorCodeEntry = serde_json::from_str(
            r#"{"error_code": "E09", "date": "not a date", "created_at": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(entry.raw_date(), Some("not a date"));
        assert_eq!(entry.raw_date().and_then(parse_day), None);
        assert!(ErrorCodeQuery::new(2023, None).matches(&entry));
    }

    #[test]
    fn test_numeric_error_codes() {
        let entries: Vec<RawErrorCodeEntry> =
            serde_json::from_str(r#"[{"error_code": 101, "date": "2024-05-01"}, 7]"#).unwrap();
        assert_eq!(entries[0].code(), Some("101"));
        assert_eq!(entries[1], RawErrorCodeEntry::Code("7".to_string()));
    }
}
