//! Permission-based visibility
//!
//! The API enforces access; the dashboard only uses the permission list to
//! decide which links and buttons to render.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::Permission;

/// Wildcard granting every permission
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PermissionSet {
    granted: HashSet<Permission>,
}

impl PermissionSet {
    /// Build from API permission names; unknown names are ignored
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut granted = HashSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name == WILDCARD {
                return Self::all();
            }
            match name.parse::<Permission>() {
                Ok(permission) => {
                    granted.insert(permission);
                }
                Err(_) => log::debug!("Ignoring permission without a dashboard element: {}", name),
            }
        }
        Self { granted }
    }

    pub fn all() -> Self {
        Self {
            granted: Permission::ALL.into_iter().collect(),
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}
