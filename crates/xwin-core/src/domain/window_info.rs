use serde::{Deserialize, Serialize};

use super::Platform;

/// Canonical description of one desktop window and its owning process.
///
/// Every field is always populated. Facts the platform could not provide carry the
/// default for their type (empty string, zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub os: String,
    pub info: ProcessInfo,
    pub position: WindowPosition,
    pub process_id: u32,
    pub title: String,
    pub usage: UsageInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub exec_name: String,
    pub name: String,
    pub path: String,
    pub process_id: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Resident memory of the owning process, in bytes.
    pub memory: u64,
}

/// The subset of a [`WindowInfo`] that decides whether the focused window changed.
///
/// Memory usage is left out: it moves between polls while the same window stays focused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeKey {
    pub process_id: u32,
    pub title: String,
    pub position: WindowPosition,
}

impl WindowInfo {
    /// A record with every fact defaulted, stamped with the given platform.
    pub fn empty(platform: Platform) -> Self {
        Self {
            os: platform.identifier().to_string(),
            info: ProcessInfo::default(),
            position: WindowPosition::default(),
            process_id: 0,
            title: String::new(),
            usage: UsageInfo::default(),
        }
    }

    pub fn change_key(&self) -> ChangeKey {
        ChangeKey {
            process_id: self.process_id,
            title: self.title.clone(),
            position: self.position,
        }
    }

    pub fn is_same_window(&self, other: &WindowInfo) -> bool {
        self.change_key() == other.change_key()
    }
}

impl WindowPosition {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
