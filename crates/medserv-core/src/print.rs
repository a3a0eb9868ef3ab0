//! Printable service report layout

use chrono::NaiveDate;
use medserv_config::PrintConfig;
use medserv_source::{EntityId, Report};
use medserv_utils::or_placeholder;
use serde::{Deserialize, Serialize};

use crate::grouping::work_item_count;
use crate::models::ServicedDeviceGroup;
use crate::time::day_key;

/// One row of the serviced-devices table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintableDeviceRow {
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub software_version: String,
    pub work_performed: String,
}

/// Everything the print view needs, with optional fields already resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintableReport {
    pub organization: String,
    pub report_id: EntityId,
    pub report_number: String,
    pub service_date: String,
    pub health_facility: String,
    pub technician: String,
    pub description: String,
    pub rows: Vec<PrintableDeviceRow>,
    pub device_count: usize,
    pub work_item_count: usize,
    pub footer: String,
}

impl PrintableReport {
    pub fn build(report: &Report, groups: &[ServicedDeviceGroup], settings: &PrintConfig) -> Self {
        let rows = groups
            .iter()
            .map(|group| PrintableDeviceRow {
                brand: or_placeholder(Some(group.device.brand.as_str())),
                model: or_placeholder(Some(group.device.model.as_str())),
                serial_number: or_placeholder(group.device.serial_number.as_deref()),
                software_version: or_placeholder(group.device.software_version.as_deref()),
                work_performed: or_placeholder(Some(group.work_type_label(", ").as_str())),
            })
            .collect();

        Self {
            organization: settings.organization.clone(),
            report_id: report.id,
            report_number: report_number(report),
            service_date: format_service_date(report),
            health_facility: or_placeholder(report.health_facility.as_ref().map(|f| f.name.as_str())),
            technician: or_placeholder(report.employee.as_ref().map(|e| e.full_name()).as_deref()),
            description: or_placeholder(report.description.as_deref()),
            rows,
            device_count: groups.len(),
            work_item_count: work_item_count(groups),
            footer: settings.footer.clone(),
        }
    }
}

/// Report number, or `#<id>` when the API did not assign one
pub fn report_number(report: &Report) -> String {
    match report.report_number.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() => number.to_string(),
        _ => format!("#{}", report.id),
    }
}

fn format_service_date(report: &Report) -> String {
    report
        .raw_service_date()
        .and_then(day_key)
        .map(|d: NaiveDate| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| or_placeholder(None))
}
