//! Compilation step
//!
//! Runs a language's compiler inside the job workspace under the global
//! compile deadline. Compiler diagnostics are captured and cleaned of
//! workspace paths before they reach the submitter.

use std::path::Path;

use tracing::{debug, instrument};

use crate::config::{CompileConfig, Config, Language};
use crate::exec::{self, ExecError, ExecLimits, signal_name};
use crate::types::{ExecutionOutcome, ProcessStatus};
use crate::workspace::JobWorkspace;

/// Result of running the compiler
#[derive(Debug)]
pub struct CompileResult {
    /// Whether the compiler exited successfully
    pub success: bool,

    /// Raw execution outcome of the compiler process
    pub outcome: ExecutionOutcome,

    /// Combined compiler output with workspace paths stripped
    pub output: String,
}

/// Compile staged source code into the workspace build directory
///
/// The compiler runs without a memory limit but under the configured
/// compile deadline. Host-level failures (the compiler could not be
/// spawned at all) are errors; a failing compile is a normal result.
#[instrument(skip(config, compile_config, workspace, source_path))]
pub async fn compile(
    config: &Config,
    compile_config: &CompileConfig,
    workspace: &JobWorkspace,
    source_path: &Path,
) -> Result<CompileResult, ExecError> {
    let build_dir = workspace.build_dir();
    let binary = build_dir.join(&compile_config.output_name);
    let argv = Language::expand_command(
        &compile_config.command,
        &source_path.to_string_lossy(),
        &binary.to_string_lossy(),
        &build_dir.to_string_lossy(),
    );

    let limits = ExecLimits {
        wall_time_ms: config.compile_time_limit_ms,
        memory_limit_kb: None,
        output_cap_bytes: config.output_cap_bytes(),
    };

    let outcome = exec::run(&argv, workspace.path(), None, &compile_config.env, limits).await?;

    let mut output = clean_compiler_output(&combined_output(&outcome), workspace.path());
    if outcome.status == ProcessStatus::DeadlineExceeded {
        let note = format!(
            "compilation timed out after {}ms",
            config.compile_time_limit_ms
        );
        output = if output.is_empty() {
            note
        } else {
            format!("{output}\n{note}")
        };
    } else if let ProcessStatus::Signaled(signal) = outcome.status
        && output.is_empty()
    {
        output = format!("compiler terminated by {}", signal_name(signal));
    }

    let success = outcome.is_success();
    debug!(
        success,
        wall_time_ms = outcome.wall_time_ms,
        "compilation finished"
    );

    Ok(CompileResult {
        success,
        outcome,
        output,
    })
}

/// Merge compiler stdout and stderr into one diagnostic block
fn combined_output(outcome: &ExecutionOutcome) -> String {
    let stdout = outcome.stdout.trim_end();
    let stderr = outcome.stderr.trim_end();
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, true) => String::new(),
        (false, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}

/// Strip workspace paths so diagnostics read as if the source sat in cwd
fn clean_compiler_output(output: &str, workspace_root: &Path) -> String {
    let root = workspace_root.to_string_lossy();
    output
        .replace(&format!("{root}/src/"), "")
        .replace(&format!("{root}/build/"), "")
        .replace(&format!("{root}/"), "")
}
