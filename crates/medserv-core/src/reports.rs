//! Response structures for the dashboard views

use serde::{Deserialize, Serialize};

use medserv_source::{EntityId, Report};

use super::error_codes::CodeFrequency;
use super::models::{ErrorCodeDaySummary, ReportSummary, ServicedDeviceGroup};
use super::time::MonthFilter;

/// Report detail view: the report plus its serviced devices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDetail {
    pub report: Report,
    pub devices: Vec<ServicedDeviceGroup>,
    pub work_item_count: usize,
}

/// One page of the report list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsPage {
    pub reports: Vec<ReportSummary>,
    pub total_count: usize,
    pub page: usize,
    pub per_page: usize,
}

impl ReportsPage {
    pub fn total_pages(&self) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        (self.total_count + self.per_page - 1) / self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Error-code view for one device and period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCodeReport {
    pub medical_device_id: EntityId,
    pub period: MonthFilter,
    pub days: Vec<ErrorCodeDaySummary>,
    pub total_entries: usize,
    pub top_codes: Vec<CodeFrequency>,
}

/// Landing page numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_reports: usize,
    pub total_devices: usize,
    pub total_work_types: usize,
    pub overdue_devices: usize,
    pub due_soon_devices: usize,
    pub reports_per_month: ChartData,
    pub recent_reports: Vec<ReportSummary>,
}

/// Chart data for visualization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub chart_type: String,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// Chart dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
}

impl ChartData {
    /// Largest value across all datasets, used to scale inline bar charts
    pub fn max_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0, f64::max)
    }
}
