//! Run outcome classification
//!
//! Turns a raw execution outcome into what it means for the test: time
//! limit, memory limit, runtime error, or a clean completion whose output
//! still has to be compared.

use crate::exec::signal_name;
use crate::types::{ExecutionOutcome, ProcessStatus};

/// Cap on the stderr tail carried into a runtime error detail
const RUNTIME_DETAIL_MAX_BYTES: usize = 4096;

/// How a single test run ended, before output comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunClassification {
    /// Exited cleanly; the output still needs comparing
    Completed,
    TimeLimitExceeded,
    /// Peak resident memory in kilobytes that broke the limit
    MemoryLimitExceeded(u64),
    /// Carries the submitter-visible detail line
    RuntimeError(String),
}

/// Classify a finished run against the job's memory limit
///
/// The deadline verdict wins over everything else, then the measured
/// memory peak. A crash only counts as a runtime error when neither
/// limit was broken.
pub fn classify_run(outcome: &ExecutionOutcome, memory_limit_kb: u64) -> RunClassification {
    if outcome.status == ProcessStatus::DeadlineExceeded {
        return RunClassification::TimeLimitExceeded;
    }

    if let Some(peak) = outcome.peak_memory_kb
        && peak >= memory_limit_kb
    {
        return RunClassification::MemoryLimitExceeded(peak);
    }

    match outcome.status {
        ProcessStatus::Signaled(signal) => {
            RunClassification::RuntimeError(format!("terminated by {}", signal_name(signal)))
        }
        ProcessStatus::Exited(code) if code != 0 => {
            RunClassification::RuntimeError(runtime_error_detail(outcome, code))
        }
        _ => RunClassification::Completed,
    }
}

fn runtime_error_detail(outcome: &ExecutionOutcome, code: i32) -> String {
    let stderr = outcome.stderr.trim();
    if stderr.is_empty() {
        format!("exited with code {code}")
    } else {
        tail(stderr, RUNTIME_DETAIL_MAX_BYTES).to_string()
    }
}

/// Last `max` bytes of `s`, starting on a char boundary
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Compare program output against the expected output
///
/// Trailing whitespace on either side is ignored; everything else is an
/// exact match.
pub fn compare_outputs(actual: &str, expected: &str) -> bool {
    actual.trim_end() == expected.trim_end()
}
