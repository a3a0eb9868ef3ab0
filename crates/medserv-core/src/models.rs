//! Derived data models rendered by the dashboard

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use medserv_source::{EntityId, MedicalDevice, TypeOfWork};

use super::types::AlertStatus;

/// A device serviced in a report, with the work performed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicedDeviceGroup {
    pub device: MedicalDevice,
    /// Work types in the order the associations were recorded, duplicates kept
    pub work_types: Vec<TypeOfWork>,
}

impl ServicedDeviceGroup {
    pub fn new(device: MedicalDevice) -> Self {
        Self {
            device,
            work_types: Vec::new(),
        }
    }

    pub fn device_id(&self) -> EntityId {
        self.device.id
    }

    pub fn work_type_names(&self) -> Vec<&str> {
        self.work_types.iter().map(|w| w.name.as_str()).collect()
    }

    /// Work-type labels joined with `separator`
    pub fn work_type_label(&self, separator: &str) -> String {
        self.work_type_names().join(separator)
    }
}

/// One error code observed on a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCodeOccurrence {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Error codes logged on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCodeDaySummary {
    /// Day key, `YYYY-MM-DD`
    pub date: NaiveDate,
    pub count: usize,
    /// In the order they were logged
    pub codes: Vec<ErrorCodeOccurrence>,
}

impl ErrorCodeDaySummary {
    pub fn code_names(&self) -> Vec<&str> {
        self.codes.iter().map(|c| c.code.as_str()).collect()
    }
}

/// Overdue or upcoming service for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAlert {
    pub device: MedicalDevice,
    pub status: AlertStatus,
    pub last_service: NaiveDate,
    pub due_date: NaiveDate,
    /// Positive when overdue, negative while still ahead
    pub days_overdue: i64,
    /// Report that recorded the last service
    pub report_id: EntityId,
}

/// Report row in the report list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: EntityId,
    pub report_number: String,
    pub service_date: Option<NaiveDate>,
    pub health_facility: String,
    pub technician: String,
    pub device_count: usize,
    pub work_item_count: usize,
}
