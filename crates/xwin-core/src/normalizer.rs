//! Mapping from raw adapter facts to the canonical [`WindowInfo`].

use std::path::Path;

use crate::domain::{Platform, ProcessInfo, UsageInfo, WindowInfo, WindowPosition};
use crate::ports::RawWindowFacts;

/// Builds a complete [`WindowInfo`] out of whatever the adapter supplied.
///
/// Never fails: unknown facts take their defaults. The `os` field always comes from
/// `platform`, not from the adapter.
pub fn normalize(raw: RawWindowFacts, platform: Platform) -> WindowInfo {
    let process_id = raw.process_id.unwrap_or(0);

    let path = raw.path.unwrap_or_default();
    let exec_name = raw
        .exec_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| executable_name_from_path(&path));

    let position = raw
        .bounds
        .map(|bounds| {
            WindowPosition::new(bounds.x, bounds.y, bounds.width.max(0), bounds.height.max(0))
        })
        .unwrap_or_default();

    WindowInfo {
        os: platform.identifier().to_string(),
        info: ProcessInfo {
            exec_name,
            name: raw.class_name.unwrap_or_default(),
            path,
            process_id,
        },
        position,
        process_id,
        title: raw.title.unwrap_or_default(),
        usage: UsageInfo {
            memory: raw.memory_bytes.unwrap_or(0),
        },
    }
}

fn executable_name_from_path(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
