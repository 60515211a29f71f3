//! Process supervision
//!
//! Low-level execution of untrusted commands: spawning in a dedicated
//! process group, wall-clock deadlines, peak-memory sampling and capped
//! output capture. The judging layer decides what an outcome means; this
//! module only reports what happened.

pub use crate::exec::probe::MemoryProbe;
pub use crate::exec::process::{ExecLimits, run};

mod probe;
mod process;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from supervised execution
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to open stdin file {path}: {source}")]
    StdinOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("output capture task failed: {0}")]
    Capture(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Human-readable name for a termination signal
pub fn signal_name(signal: i32) -> String {
    match signal {
        libc::SIGSEGV => "SIGSEGV".to_string(),
        libc::SIGABRT => "SIGABRT".to_string(),
        libc::SIGFPE => "SIGFPE".to_string(),
        libc::SIGKILL => "SIGKILL".to_string(),
        libc::SIGBUS => "SIGBUS".to_string(),
        libc::SIGILL => "SIGILL".to_string(),
        libc::SIGXCPU => "SIGXCPU".to_string(),
        libc::SIGXFSZ => "SIGXFSZ".to_string(),
        libc::SIGPIPE => "SIGPIPE".to_string(),
        libc::SIGTERM => "SIGTERM".to_string(),
        other => format!("signal {other}"),
    }
}
