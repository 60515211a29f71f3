//! A library for judging code submissions against test cases.
//!
//! Gavel provides an async Rust API for compiling a submission once, running
//! it against each test case under wall-clock and memory limits, and folding
//! the outcomes into a single verdict. Languages are configured as TOML argv
//! templates, so adding one never requires a code change.
//!
//! # Features
//!
//! - **Verdict pipeline**: Compile-once, run-each-test judging with severity-ordered verdicts.
//! - **Multi-language**: Supports both compiled and interpreted languages.
//! - **TOML configuration**: Flexible per-language compiler/runtime settings.
//! - **Resource limits**: Wall-clock deadlines, measured peak-memory limits, and output caps.
//! - **Job isolation**: Each submission runs in its own throwaway workspace.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Language};
pub use exec::{ExecError, ExecLimits};
pub use judge::{CompileResult, JudgeEngine, JudgeError, JudgePool};
pub use types::{
    ExecutionOutcome, JudgeLimits, JudgeMode, JudgeResult, ProcessStatus, SubmissionJob, TestCase,
    TestVerdict, Verdict,
};
pub use workspace::{JobWorkspace, WorkspaceError};

pub mod config;
pub mod exec;
pub mod judge;
pub mod types;
pub mod workspace;
