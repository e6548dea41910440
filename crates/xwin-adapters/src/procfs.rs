use std::fs;

use tracing::trace;

/// Facts about a process read from `/proc`. Any of them may be missing when the
/// process exits mid-read or belongs to another user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFacts {
    pub path: Option<String>,
    pub exec_name: Option<String>,
    pub memory_bytes: Option<u64>,
}

pub fn read_process_facts(pid: u32) -> ProcessFacts {
    let executable = fs::read_link(format!("/proc/{}/exe", pid))
        .map_err(|error| trace!(pid, %error, "executable path unavailable"))
        .ok();

    let path = executable
        .as_ref()
        .map(|executable| executable.display().to_string());
    let exec_name = executable
        .as_ref()
        .and_then(|executable| executable.file_name())
        .map(|name| name.to_string_lossy().into_owned());

    let memory_bytes = fs::read_to_string(format!("/proc/{}/statm", pid))
        .ok()
        .and_then(|statm| parse_resident_pages(&statm))
        .map(|pages| pages.saturating_mul(page_size()));

    ProcessFacts {
        path,
        exec_name,
        memory_bytes,
    }
}

/// Resident set size, in pages: the second column of `/proc/<pid>/statm`.
fn parse_resident_pages(statm: &str) -> Option<u64> {
    statm.split_whitespace().nth(1)?.parse().ok()
}

fn page_size() -> u64 {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}
