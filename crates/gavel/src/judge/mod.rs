//! Submission judging
//!
//! Drives the compile-once, run-each-test pipeline: resolve the language,
//! create an isolated job workspace, compile when the language needs it,
//! run every test case under its limits, and fold the outcomes into one
//! result. The workspace is removed before the result is returned.

pub use crate::judge::compile::{CompileResult, compile};
pub use crate::judge::run::{RunClassification, classify_run, compare_outputs};

mod compile;
mod run;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, warn};

use crate::config::{Config, Language};
use crate::exec::{self, ExecLimits};
use crate::types::{
    ExecutionOutcome, JudgeLimits, JudgeMode, JudgeResult, SubmissionJob, TestCase, TestVerdict,
    Verdict,
};
use crate::workspace::JobWorkspace;

/// Errors that fail a judge call outright
///
/// Anything that goes wrong once a job is running is reported inside the
/// [`JudgeResult`] instead, so a result always reaches the caller.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("language '{0}' is not configured")]
    UnsupportedLanguage(String),

    #[error("judge pool is closed")]
    PoolClosed,
}

/// High-level judge for submissions
#[derive(Debug, Clone)]
pub struct JudgeEngine {
    config: Config,
}

impl JudgeEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a new engine with the default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Judge a submission against its test cases
    ///
    /// Returns `Err` only when the language is unknown; every other
    /// failure is folded into the result.
    #[instrument(skip(self, job), fields(language = %job.language, tests = job.test_cases.len()))]
    pub async fn judge(&self, job: &SubmissionJob) -> Result<JudgeResult, JudgeError> {
        let language = self
            .config
            .get_language(&job.language)
            .map_err(|_| JudgeError::UnsupportedLanguage(job.language.clone()))?;

        let mut workspace = match JobWorkspace::create(&self.config.workspace_root()).await {
            Ok(workspace) => workspace,
            Err(e) => {
                error!(error = %e, "failed to create job workspace");
                return Ok(JudgeResult::internal_error());
            }
        };

        let result = self.run_job(job, language, &workspace).await;

        if let Err(e) = workspace.cleanup().await {
            warn!(error = %e, "failed to remove job workspace");
        }

        Ok(result)
    }

    /// Run the compile-then-test pipeline inside an existing workspace
    async fn run_job(
        &self,
        job: &SubmissionJob,
        language: &Language,
        workspace: &JobWorkspace,
    ) -> JudgeResult {
        let source_path = match workspace
            .stage_source(&language.source_name(), &job.code)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "failed to stage source");
                return JudgeResult::internal_error();
            }
        };

        // Compile once; a failing compile fans out to every test
        if let Some(ref compile_config) = language.compile {
            match compile::compile(&self.config, compile_config, workspace, &source_path).await {
                Ok(result) if result.success => {
                    debug!(time_ms = result.outcome.wall_time_ms, "compilation succeeded");
                }
                Ok(result) => {
                    let verdicts = job
                        .test_cases
                        .iter()
                        .map(|case| {
                            skipped_verdict(case, job.mode, Verdict::CompilationError, None)
                        })
                        .collect();
                    return JudgeResult::compilation_failure(verdicts, result.output);
                }
                Err(e) => {
                    error!(error = %e, "compiler could not be run");
                    return JudgeResult::internal_error();
                }
            }
        }

        let run_argv = run_command(language, &source_path, &workspace.build_dir());
        let limits = ExecLimits {
            wall_time_ms: job.limits.time_limit_ms,
            memory_limit_kb: Some(job.limits.memory_limit_kb()),
            output_cap_bytes: self.config.output_cap_bytes(),
        };
        let fail_fast = job.mode == JudgeMode::Submission;

        let mut verdicts = Vec::with_capacity(job.test_cases.len());
        for (index, case) in job.test_cases.iter().enumerate() {
            let stdin_path = match workspace.stage_input(index, &case.input).await {
                Ok(path) => path,
                Err(e) => {
                    warn!(index, error = %e, "failed to stage test input");
                    verdicts.push(skipped_verdict(
                        case,
                        job.mode,
                        Verdict::InternalError,
                        Some(format!("failed to stage test input: {e}")),
                    ));
                    break;
                }
            };

            let outcome = match exec::run(
                &run_argv,
                workspace.path(),
                Some(&stdin_path),
                &language.run.env,
                limits,
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(index, error = %e, "process could not be run");
                    verdicts.push(skipped_verdict(
                        case,
                        job.mode,
                        Verdict::InternalError,
                        Some(format!("process could not be run: {e}")),
                    ));
                    break;
                }
            };

            let verdict = test_verdict(case, job.mode, &outcome, job.limits);
            let stop = fail_fast && !verdict.status.is_accepted();
            debug!(index, status = %verdict.status, time_ms = verdict.time_ms, "test finished");
            verdicts.push(verdict);
            if stop {
                debug!(index, "stopping at first failing test");
                break;
            }
        }

        JudgeResult::from_verdicts(verdicts)
    }
}

/// Build the argv used to run the submission
///
/// Compiled languages run the artifact out of the build directory;
/// interpreted languages run the staged source directly.
fn run_command(language: &Language, source_path: &Path, build_dir: &Path) -> Vec<String> {
    let binary = if let Some(ref compile_config) = language.compile {
        build_dir.join(&compile_config.output_name)
    } else {
        source_path.to_path_buf()
    };
    Language::expand_command(
        &language.run.command,
        &source_path.to_string_lossy(),
        &binary.to_string_lossy(),
        &build_dir.to_string_lossy(),
    )
}

/// Build the verdict for one completed test run
fn test_verdict(
    case: &TestCase,
    mode: JudgeMode,
    outcome: &ExecutionOutcome,
    limits: JudgeLimits,
) -> TestVerdict {
    let (status, mut details) = match classify_run(outcome, limits.memory_limit_kb()) {
        RunClassification::Completed => {
            if compare_outputs(&outcome.stdout, &case.expected_output) {
                (Verdict::Accepted, None)
            } else {
                (Verdict::WrongAnswer, None)
            }
        }
        RunClassification::TimeLimitExceeded => (
            Verdict::TimeLimitExceeded,
            Some(format!("exceeded the {}ms time limit", limits.time_limit_ms)),
        ),
        RunClassification::MemoryLimitExceeded(peak) => (
            Verdict::MemoryLimitExceeded,
            Some(format!(
                "peak memory {peak} KB exceeded the {} MB limit",
                limits.memory_limit_mb
            )),
        ),
        RunClassification::RuntimeError(detail) => (Verdict::RuntimeError, Some(detail)),
    };

    if outcome.stdout_truncated {
        details = Some(match details {
            Some(d) => format!("{d}; stdout truncated"),
            None => "stdout truncated".to_string(),
        });
    }

    let reveal = case.is_public || mode == JudgeMode::Sample;
    TestVerdict {
        label: case.label.clone(),
        status,
        input: reveal.then(|| case.input.clone()),
        expected_output: reveal.then(|| case.expected_output.clone()),
        actual_output: outcome.stdout.trim_end().to_string(),
        time_ms: outcome.wall_time_ms,
        memory_kb: outcome.peak_memory_kb,
        details,
    }
}

/// Verdict for a test that never ran
fn skipped_verdict(
    case: &TestCase,
    mode: JudgeMode,
    status: Verdict,
    details: Option<String>,
) -> TestVerdict {
    let reveal = case.is_public || mode == JudgeMode::Sample;
    TestVerdict {
        label: case.label.clone(),
        status,
        input: reveal.then(|| case.input.clone()),
        expected_output: reveal.then(|| case.expected_output.clone()),
        actual_output: String::new(),
        time_ms: 0,
        memory_kb: None,
        details,
    }
}

/// Pool that bounds how many jobs judge concurrently
///
/// Wraps a [`JudgeEngine`] behind a semaphore so a burst of submissions
/// cannot spawn an unbounded number of processes.
#[derive(Debug, Clone)]
pub struct JudgePool {
    engine: JudgeEngine,
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl JudgePool {
    /// Create a pool running at most `max_concurrent` jobs at once
    pub fn new(engine: JudgeEngine, max_concurrent: usize) -> Self {
        Self {
            engine,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            capacity: max_concurrent,
        }
    }

    /// Judge a submission, waiting for a free slot first
    #[instrument(skip(self, job), fields(language = %job.language))]
    pub async fn judge(&self, job: &SubmissionJob) -> Result<JudgeResult, JudgeError> {
        let _permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| JudgeError::PoolClosed)?;
        self.engine.judge(job).await
    }

    /// Number of jobs that could start right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Maximum number of concurrent jobs
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
