//! Overdue-service alerts for the notification bell

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use medserv_config::NotificationsConfig;
use medserv_source::{EntityId, MedicalDevice, Report, TypeOfWork};

use crate::grouping::group_serviced_devices;
use crate::models::ServiceAlert;
use crate::time::day_key;
use crate::types::AlertStatus;

/// Devices whose next service is overdue or due within the warning window
///
/// A device's last service is the latest dated report in which it appears
/// in the grouped device view. Reports without a usable date and devices
/// never serviced produce no alert. Most overdue first.
pub fn service_alerts(
    reports: &[Report],
    devices: &[MedicalDevice],
    work_types: &[TypeOfWork],
    today: NaiveDate,
    settings: &NotificationsConfig,
) -> Vec<ServiceAlert> {
    let mut last_service: HashMap<EntityId, (NaiveDate, EntityId)> = HashMap::new();

    for report in reports {
        let Some(date) = report.raw_service_date().and_then(day_key) else {
            log::debug!("Report {} has no service date, ignored for alerts", report.id);
            continue;
        };
        for group in group_serviced_devices(&report.report_device_item, devices, work_types) {
            let latest = last_service.entry(group.device_id()).or_insert((date, report.id));
            if date > latest.0 {
                *latest = (date, report.id);
            }
        }
    }

    let interval = Duration::days(i64::from(settings.service_interval_days));
    let warning_limit = today
        .checked_add_signed(Duration::days(i64::from(settings.warning_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut alerts: Vec<ServiceAlert> = last_service
        .into_iter()
        .filter_map(|(device_id, (last, report_id))| {
            let Some(due_date) = last.checked_add_signed(interval) else {
                log::debug!("Device {} due date is past the calendar range, no alert", device_id);
                return None;
            };
            let status = if due_date < today {
                AlertStatus::Overdue
            } else if due_date <= warning_limit {
                AlertStatus::DueSoon
            } else {
                return None;
            };
            let device = devices.iter().find(|d| d.id == device_id)?.clone();
            Some(ServiceAlert {
                device,
                status,
                last_service: last,
                due_date,
                days_overdue: (today - due_date).num_days(),
                report_id,
            })
        })
        .collect();

    alerts.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.device.id.cmp(&b.device.id)));
    alerts.truncate(settings.max_alerts);
    alerts
}

/// Number of overdue alerts, shown on the bell badge
pub fn overdue_count(alerts: &[ServiceAlert]) -> usize {
    alerts.iter().filter(|a| a.status == AlertStatus::Overdue).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medserv_source::ReportDeviceItem;

    fn device(id: EntityId) -> MedicalDevice {
        MedicalDevice {
            id,
            brand: "Brand".to_string(),
            model: format!("M{}", id),
            serial_number: None,
            software_version: None,
            health_facility_id: None,
        }
    }

    fn report(id: EntityId, date: Option<&str>, device_ids: &[EntityId]) -> Report {
        Report {
            id,
            report_number: None,
            service_date: date.map(str::to_string),
            created_at: None,
            health_facility: None,
            employee: None,
            description: None,
            report_device_item: device_ids.iter().map(|d| ReportDeviceItem::new(*d, 10)).collect(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings() -> NotificationsConfig {
        NotificationsConfig {
            service_interval_days: 100,
            warning_days: 10,
            max_alerts: 20,
        }
    }

    fn work_types() -> Vec<TypeOfWork> {
        vec![TypeOfWork { id: 10, name: "Preventive maintenance".to_string() }]
    }

    #[test]
    fn test_overdue_and_due_soon() {
        let devices = vec![device(1), device(2), device(3)];
        let reports = vec![
            report(1, Some("2024-01-01"), &[1]),  // due 2024-04-10
            report(2, Some("2024-01-25"), &[2]),  // due 2024-05-04
            report(3, Some("2024-03-01"), &[3]),  // due 2024-06-09
        ];
        let today = date(2024, 4, 30);

        let alerts = service_alerts(&reports, &devices, &work_types(), today, &settings());

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].device.id, 1);
        assert_eq!(alerts[0].status, AlertStatus::Overdue);
        assert_eq!(alerts[0].due_date, date(2024, 4, 10));
        assert_eq!(alerts[0].days_overdue, 20);
        assert_eq!(alerts[1].device.id, 2);
        assert_eq!(alerts[1].status, AlertStatus::DueSoon);
        assert_eq!(alerts[1].days_overdue, -4);
        assert_eq!(overdue_count(&alerts), 1);
    }

    #[test]
    fn test_latest_report_counts() {
        let devices = vec![device(1)];
        let reports = vec![
            report(1, Some("2024-01-01"), &[1]),
            report(2, Some("2024-04-01"), &[1]),
        ];

        let alerts = service_alerts(&reports, &devices, &work_types(), date(2024, 4, 30), &settings());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_due_today_is_due_soon() {
        let devices = vec![device(1)];
        let reports = vec![report(7, Some("2024-01-01"), &[1])];

        let alerts = service_alerts(&reports, &devices, &work_types(), date(2024, 4, 10), &settings());
        assert_eq!(alerts[0].status, AlertStatus::DueSoon);
        assert_eq!(alerts[0].report_id, 7);
    }

    #[test]
    fn test_undated_reports_and_unknown_devices_ignored() {
        let devices = vec![device(1)];
        let reports = vec![
            report(1, None, &[1]),
            report(2, Some("2020-01-01"), &[42]),
        ];

        let alerts = service_alerts(&reports, &devices, &work_types(), date(2024, 4, 30), &settings());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_max_alerts() {
        let devices: Vec<_> = (1..=5).map(device).collect();
        let reports = vec![report(1, Some("2020-01-01"), &[1, 2, 3, 4, 5])];
        let limited = NotificationsConfig { max_alerts: 3, ..settings() };

        let alerts = service_alerts(&reports, &devices, &work_types(), date(2024, 4, 30), &limited);
        assert_eq!(alerts.iter().map(|a| a.device.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_intervals_beyond_calendar_range() {
        let devices = vec![device(1)];
        let reports = vec![report(1, Some("2024-01-01"), &[1])];
        let today = date(2024, 4, 30);

        let never_due = NotificationsConfig { service_interval_days: u32::MAX, ..settings() };
        assert!(service_alerts(&reports, &devices, &work_types(), today, &never_due).is_empty());

        let wide_window = NotificationsConfig { warning_days: u32::MAX, service_interval_days: 200, ..settings() };
        let alerts = service_alerts(&reports, &devices, &work_types(), today, &wide_window);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status, AlertStatus::DueSoon);
    }
}
