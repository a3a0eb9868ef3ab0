//! Basic enumerations for the dashboard

use serde::{Deserialize, Serialize};

/// Service status of a device in the notification bell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Due date already passed
    Overdue,
    /// Due within the warning window
    DueSoon,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Overdue => write!(f, "overdue"),
            AlertStatus::DueSoon => write!(f, "due_soon"),
        }
    }
}

/// Dashboard permissions, as named by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "report.view")]
    ReportView,
    #[serde(rename = "report.print")]
    ReportPrint,
    #[serde(rename = "device.view")]
    DeviceView,
    #[serde(rename = "error_code.view")]
    ErrorCodeView,
    #[serde(rename = "notification.view")]
    NotificationView,
    #[serde(rename = "settings.view")]
    SettingsView,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::ReportView,
        Permission::ReportPrint,
        Permission::DeviceView,
        Permission::ErrorCodeView,
        Permission::NotificationView,
        Permission::SettingsView,
    ];
}

impl std::str::FromStr for Permission {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "report.view" => Ok(Permission::ReportView),
            "report.print" => Ok(Permission::ReportPrint),
            "device.view" => Ok(Permission::DeviceView),
            "error_code.view" => Ok(Permission::ErrorCodeView),
            "notification.view" => Ok(Permission::NotificationView),
            "settings.view" => Ok(Permission::SettingsView),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::ReportView => write!(f, "report.view"),
            Permission::ReportPrint => write!(f, "report.print"),
            Permission::DeviceView => write!(f, "device.view"),
            Permission::ErrorCodeView => write!(f, "error_code.view"),
            Permission::NotificationView => write!(f, "notification.view"),
            Permission::SettingsView => write!(f, "settings.view"),
        }
    }
}
