//! Peak memory sampling via procfs
//!
//! Reads `VmHWM` (the high-water mark of the resident set) from
//! `/proc/<pid>/status` while a supervised process runs. The kernel keeps the
//! high-water mark monotonic for the lifetime of the process, so the last
//! successful sample is the peak.

use std::path::PathBuf;

/// Samples the peak resident set size of one process
#[derive(Debug)]
pub struct MemoryProbe {
    status_path: PathBuf,
}

impl MemoryProbe {
    /// Create a probe for the given pid
    pub fn new(pid: u32) -> Self {
        Self {
            status_path: PathBuf::from(format!("/proc/{pid}/status")),
        }
    }

    /// Read the current high-water mark in kilobytes
    ///
    /// Returns `None` once the process has exited (the procfs entry is gone)
    /// or when the field is not reported.
    pub async fn peak_rss_kb(&self) -> Option<u64> {
        let status = tokio::fs::read_to_string(&self.status_path).await.ok()?;
        parse_vm_hwm(&status)
    }
}

/// Extract the `VmHWM` value in kilobytes from `/proc/<pid>/status` content
pub(crate) fn parse_vm_hwm(status: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmHWM:")?;
        rest.trim().trim_end_matches("kB").trim().parse().ok()
    })
}
