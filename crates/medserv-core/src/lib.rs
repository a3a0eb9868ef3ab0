//! Core report aggregation and dashboard logic

pub mod alerts;
pub mod error;
pub mod error_codes;
pub mod grouping;
pub mod models;
pub mod permissions;
pub mod print;
pub mod reports;
pub mod time;
pub mod types;

use chrono::{Datelike, NaiveDate};
use medserv_config::Config;
use medserv_source::{
    EntityId, ErrorCodeQuery, MedicalDevice, Report, SourceRef, TypeOfWork,
};

pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use error_codes::{aggregate_error_codes, CodeFrequency};
pub use grouping::{group_serviced_devices, group_serviced_devices_json};
pub use models::{ErrorCodeDaySummary, ErrorCodeOccurrence, ReportSummary, ServiceAlert, ServicedDeviceGroup};
pub use permissions::PermissionSet;
pub use print::PrintableReport;
pub use reports::{ChartData, ChartDataset, DashboardOverview, ErrorCodeReport, ReportDetail, ReportsPage};
pub use time::MonthFilter;
pub use types::{AlertStatus, Permission};

/// Number of reports listed on the overview page
const RECENT_REPORTS: usize = 5;

// ==================== Dashboard ====================

/// Entry point for every dashboard view
///
/// Each call fetches what it needs from the source and derives the view from
/// that snapshot; nothing is cached between calls. When a view needs several
/// collections they are fetched concurrently, and derivation only starts
/// once all of them arrived.
pub struct Dashboard {
    config: Config,
    source: SourceRef,
}

impl Dashboard {
    pub fn new(config: Config, source: SourceRef) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Reports ====================

    /// Report detail with its devices grouped
    pub async fn report_detail(&self, id: EntityId) -> CoreResult<ReportDetail> {
        let (report, devices, work_types) = tokio::try_join!(
            self.source.fetch_report(id),
            self.source.fetch_medical_devices(),
            self.source.fetch_types_of_work(),
        )?;

        let groups = group_serviced_devices(&report.report_device_item, &devices, &work_types);
        log::debug!(
            "Report {}: {} associations grouped into {} devices",
            id,
            report.report_device_item.len(),
            groups.len()
        );

        Ok(ReportDetail {
            work_item_count: grouping::work_item_count(&groups),
            devices: groups,
            report,
        })
    }

    /// Devices serviced in a report
    pub async fn serviced_devices(&self, id: EntityId) -> CoreResult<Vec<ServicedDeviceGroup>> {
        Ok(self.report_detail(id).await?.devices)
    }

    /// Print layout of a report
    pub async fn printable_report(&self, id: EntityId) -> CoreResult<PrintableReport> {
        let detail = self.report_detail(id).await?;
        Ok(PrintableReport::build(&detail.report, &detail.devices, &self.config.print))
    }

    /// One page of the report list, newest first (pages start at 1)
    pub async fn reports_page(&self, page: usize) -> CoreResult<ReportsPage> {
        if page == 0 {
            return Err(CoreError::InvalidQuery {
                message: "page numbers start at 1".to_string(),
            });
        }
        let per_page = self.config.pagination.records_per_page;
        let skip = (page - 1).checked_mul(per_page).ok_or_else(|| CoreError::InvalidQuery {
            message: format!("page {} is out of range", page),
        })?;

        let (reports, devices, work_types) = tokio::try_join!(
            self.source.fetch_reports(),
            self.source.fetch_medical_devices(),
            self.source.fetch_types_of_work(),
        )?;

        let summaries = summarize_reports(&reports, &devices, &work_types);
        let total_count = summaries.len();
        let reports = summaries
            .into_iter()
            .skip(skip)
            .take(per_page)
            .collect();

        Ok(ReportsPage {
            reports,
            total_count,
            page,
            per_page,
        })
    }

    // ==================== Devices & Error Codes ====================

    pub async fn devices(&self) -> CoreResult<Vec<MedicalDevice>> {
        Ok(self.source.fetch_medical_devices().await?)
    }

    /// Error codes of one device for a year or month
    pub async fn error_code_report(&self, device_id: EntityId, period: MonthFilter) -> CoreResult<ErrorCodeReport> {
        let query = ErrorCodeQuery::new(period.year, period.month).for_device(device_id);
        let (devices, entries) = tokio::try_join!(
            self.source.fetch_medical_devices(),
            self.source.fetch_error_codes(query),
        )?;

        if !devices.iter().any(|d| d.id == device_id) {
            return Err(CoreError::DeviceNotFound { id: device_id.to_string() });
        }

        let days = aggregate_error_codes(&entries);
        Ok(ErrorCodeReport {
            medical_device_id: device_id,
            period,
            total_entries: days.iter().map(|d| d.count).sum(),
            top_codes: error_codes::code_frequency(&days, self.config.charts.top_codes),
            days,
        })
    }

    pub async fn error_code_chart(&self, device_id: EntityId, period: MonthFilter) -> CoreResult<ChartData> {
        let report = self.error_code_report(device_id, period).await?;
        Ok(error_codes::error_code_chart(&report.days))
    }

    // ==================== Notifications ====================

    /// Alerts for the notification bell as of `today`
    pub async fn service_alerts(&self, today: NaiveDate) -> CoreResult<Vec<ServiceAlert>> {
        let (reports, devices, work_types) = tokio::try_join!(
            self.source.fetch_reports(),
            self.source.fetch_medical_devices(),
            self.source.fetch_types_of_work(),
        )?;

        Ok(alerts::service_alerts(&reports, &devices, &work_types, today, &self.config.notifications))
    }

    // ==================== Overview & Permissions ====================

    pub async fn overview(&self, today: NaiveDate) -> CoreResult<DashboardOverview> {
        let (reports, devices, work_types) = tokio::try_join!(
            self.source.fetch_reports(),
            self.source.fetch_medical_devices(),
            self.source.fetch_types_of_work(),
        )?;

        let alerts = alerts::service_alerts(&reports, &devices, &work_types, today, &self.config.notifications);
        let overdue_devices = alerts::overdue_count(&alerts);
        let mut recent_reports = summarize_reports(&reports, &devices, &work_types);
        recent_reports.truncate(RECENT_REPORTS);

        Ok(DashboardOverview {
            total_reports: reports.len(),
            total_devices: devices.len(),
            total_work_types: work_types.len(),
            overdue_devices,
            due_soon_devices: alerts.len() - overdue_devices,
            reports_per_month: reports_per_month(&reports, today.year()),
            recent_reports,
        })
    }

    /// What the current user may see; an unreachable permission endpoint
    /// hides everything rather than failing the page
    pub async fn permissions(&self) -> PermissionSet {
        match self.source.fetch_permissions().await {
            Ok(names) => PermissionSet::from_names(&names),
            Err(e) => {
                log::warn!("Failed to fetch permissions: {}", e);
                PermissionSet::default()
            }
        }
    }
}

// ==================== Derivation Helpers ====================

/// Report list rows, newest service date first, undated reports last
pub fn summarize_reports(
    reports: &[Report],
    devices: &[MedicalDevice],
    work_types: &[TypeOfWork],
) -> Vec<ReportSummary> {
    let mut summaries: Vec<ReportSummary> = reports
        .iter()
        .map(|report| {
            let groups = group_serviced_devices(&report.report_device_item, devices, work_types);
            ReportSummary {
                id: report.id,
                report_number: print::report_number(report),
                service_date: report.raw_service_date().and_then(time::day_key),
                health_facility: medserv_utils::or_placeholder(
                    report.health_facility.as_ref().map(|f| f.name.as_str()),
                ),
                technician: medserv_utils::or_placeholder(
                    report.employee.as_ref().map(|e| e.full_name()).as_deref(),
                ),
                device_count: groups.len(),
                work_item_count: grouping::work_item_count(&groups),
            }
        })
        .collect();

    summaries.sort_by(|a, b| match (a.service_date, b.service_date) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    });
    summaries
}

/// Bar chart of reports per month of `year`
pub fn reports_per_month(reports: &[Report], year: i32) -> ChartData {
    let mut counts = [0usize; 12];
    for date in reports.iter().filter_map(|r| r.raw_service_date().and_then(time::day_key)) {
        if date.year() == year {
            counts[date.month0() as usize] += 1;
        }
    }

    ChartData {
        chart_type: "bar".to_string(),
        title: format!("Reports in {}", year),
        labels: time::MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        datasets: vec![ChartDataset {
            label: "Reports".to_string(),
            data: counts.iter().map(|c| *c as f64).collect(),
            background_color: Some("#818cf8".to_string()),
            border_color: Some("#4f46e5".to_string()),
        }],
    }
}

// ==================== Tests ====================
