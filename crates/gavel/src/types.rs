use serde::{Deserialize, Serialize};

/// Resource limits applied to each test-case run of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeLimits {
    /// Wall-clock time limit per test case in milliseconds
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,

    /// Peak memory limit per test case in megabytes
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: u64,
}

impl JudgeLimits {
    /// Create limits with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wall-clock time limit in milliseconds
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Set the memory limit in megabytes
    pub fn with_memory_limit_mb(mut self, mb: u64) -> Self {
        self.memory_limit_mb = mb;
        self
    }

    /// Memory limit converted to kilobytes
    pub fn memory_limit_kb(&self) -> u64 {
        self.memory_limit_mb.saturating_mul(1024)
    }
}

impl Default for JudgeLimits {
    fn default() -> Self {
        Self {
            time_limit_ms: default_time_limit_ms(),
            memory_limit_mb: default_memory_limit_mb(),
        }
    }
}

fn default_time_limit_ms() -> u64 {
    2000
}

fn default_memory_limit_mb() -> u64 {
    256
}

/// How much of a submission to run and how much of each test to reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeMode {
    /// Full judging: stop at the first failing test, hide private test data
    #[default]
    Submission,

    /// Trial run: execute every test and reveal all test data
    Sample,
}

/// A single test case a submission is judged against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Data fed to the program on stdin (may be empty)
    #[serde(default)]
    pub input: String,

    /// Output the program must produce on stdout
    pub expected_output: String,

    /// Whether the test data may be shown to the submitter
    #[serde(default)]
    pub is_public: bool,

    /// Optional display name (e.g., "sample 1")
    #[serde(default)]
    pub label: Option<String>,
}

/// A submission together with everything needed to judge it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionJob {
    /// Source code of the submission
    pub code: String,

    /// Language ID, resolved against the configured language table
    pub language: String,

    /// Test cases to run against
    #[serde(default)]
    pub test_cases: Vec<TestCase>,

    /// Per-test resource limits
    #[serde(default)]
    pub limits: JudgeLimits,

    /// Judging mode
    #[serde(default)]
    pub mode: JudgeMode,
}

/// Outcome of judging one test case, or of a failure that preempted it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Output matched the expected output
    Accepted,

    /// Program completed but its output did not match
    WrongAnswer,

    /// Program crashed or exited with a non-zero code
    RuntimeError,

    /// Measured peak memory reached the declared limit
    MemoryLimitExceeded,

    /// Program did not finish within the wall-clock limit
    TimeLimitExceeded,

    /// The submission failed to compile
    CompilationError,

    /// The judge itself failed; no statement about the submission
    InternalError,
}

impl Verdict {
    /// Rank used to pick the final verdict: higher is worse
    pub fn severity(&self) -> u8 {
        match self {
            Verdict::Accepted => 0,
            Verdict::WrongAnswer => 1,
            Verdict::RuntimeError => 2,
            Verdict::MemoryLimitExceeded => 3,
            Verdict::TimeLimitExceeded => 4,
            Verdict::CompilationError => 5,
            Verdict::InternalError => 6,
        }
    }

    /// Pick the worst verdict by severity, or `None` for an empty input
    pub fn worst_of(verdicts: impl IntoIterator<Item = Verdict>) -> Option<Verdict> {
        verdicts.into_iter().max_by_key(Verdict::severity)
    }

    /// Check whether this verdict is `Accepted`
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong Answer",
            Verdict::RuntimeError => "Runtime Error",
            Verdict::MemoryLimitExceeded => "Memory Limit Exceeded",
            Verdict::TimeLimitExceeded => "Time Limit Exceeded",
            Verdict::CompilationError => "Compilation Error",
            Verdict::InternalError => "Internal Error",
        };
        write!(f, "{name}")
    }
}

/// Verdict for a single test case
///
/// `input` and `expected_output` are `None` when the test is private and the
/// job runs in submission mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVerdict {
    /// Display name carried over from the test case
    pub label: Option<String>,

    /// Verdict for this test
    pub status: Verdict,

    /// Test input, if the submitter may see it
    pub input: Option<String>,

    /// Expected output, if the submitter may see it
    pub expected_output: Option<String>,

    /// What the program actually printed (trailing whitespace stripped)
    pub actual_output: String,

    /// Wall-clock time this test took in milliseconds
    pub time_ms: u64,

    /// Measured peak memory in kilobytes, when a sample was captured
    pub memory_kb: Option<u64>,

    /// Human-readable detail (signal name, exit code, truncation note)
    pub details: Option<String>,
}

/// Result of judging a whole submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    /// Worst verdict across all tests
    pub final_verdict: Verdict,

    /// Compiler diagnostics when compilation failed
    pub compilation_error: Option<String>,

    /// Per-test verdicts in test order
    pub test_verdicts: Vec<TestVerdict>,

    /// Mean wall-clock time over accepted tests in milliseconds
    pub aggregate_time_ms: Option<f64>,

    /// Highest measured peak memory across all tests in kilobytes
    pub aggregate_memory_kb: Option<u64>,
}

impl JudgeResult {
    /// Fold per-test verdicts into a result
    ///
    /// An empty verdict list yields `Accepted`: a submission with no tests
    /// has nothing to fail.
    pub fn from_verdicts(test_verdicts: Vec<TestVerdict>) -> Self {
        let final_verdict = Verdict::worst_of(test_verdicts.iter().map(|v| v.status))
            .unwrap_or(Verdict::Accepted);
        let (aggregate_time_ms, aggregate_memory_kb) = aggregate(&test_verdicts);
        Self {
            final_verdict,
            compilation_error: None,
            test_verdicts,
            aggregate_time_ms,
            aggregate_memory_kb,
        }
    }

    /// Build the result for a submission that failed to compile
    ///
    /// The final verdict is `CompilationError` even when the job carried no
    /// test cases.
    pub fn compilation_failure(test_verdicts: Vec<TestVerdict>, message: String) -> Self {
        let (aggregate_time_ms, aggregate_memory_kb) = aggregate(&test_verdicts);
        Self {
            final_verdict: Verdict::CompilationError,
            compilation_error: Some(message),
            test_verdicts,
            aggregate_time_ms,
            aggregate_memory_kb,
        }
    }

    /// Build the result for a judge-side failure before any test could run
    ///
    /// The verdict list stays empty: the failure says nothing about the
    /// submission, and host-level detail belongs in the judge's logs, not
    /// in a result shown to submitters.
    pub fn internal_error() -> Self {
        Self {
            final_verdict: Verdict::InternalError,
            compilation_error: None,
            test_verdicts: Vec::new(),
            aggregate_time_ms: None,
            aggregate_memory_kb: None,
        }
    }

    /// Check whether the submission passed every test
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.final_verdict.is_accepted()
    }
}

/// Mean time over accepted tests and max memory over all tests
fn aggregate(verdicts: &[TestVerdict]) -> (Option<f64>, Option<u64>) {
    let accepted_times: Vec<u64> = verdicts
        .iter()
        .filter(|v| v.status.is_accepted())
        .map(|v| v.time_ms)
        .collect();
    let time = if accepted_times.is_empty() {
        None
    } else {
        Some(accepted_times.iter().sum::<u64>() as f64 / accepted_times.len() as f64)
    };
    let memory = verdicts.iter().filter_map(|v| v.memory_kb).max();
    (time, memory)
}

/// How a supervised process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Exited on its own with this code
    Exited(i32),

    /// Terminated by this signal
    Signaled(i32),

    /// Killed by the judge after the wall-clock deadline passed
    DeadlineExceeded,
}

/// Everything observed about one supervised process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// How the process ended
    pub status: ProcessStatus,

    /// Captured stdout, capped at the configured limit
    pub stdout: String,

    /// Captured stderr, capped at the configured limit
    pub stderr: String,

    /// Wall-clock duration in milliseconds
    pub wall_time_ms: u64,

    /// Peak resident set size in kilobytes, when a sample was captured
    pub peak_memory_kb: Option<u64>,

    /// Whether stdout hit the capture cap
    pub stdout_truncated: bool,

    /// Whether stderr hit the capture cap
    pub stderr_truncated: bool,
}

impl ExecutionOutcome {
    /// Exit code if the process exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ProcessStatus::Exited(code) => Some(code),
            _ => None,
        }
    }

    /// Signal number if the process was killed by a signal
    pub fn signal(&self) -> Option<i32> {
        match self.status {
            ProcessStatus::Signaled(signal) => Some(signal),
            _ => None,
        }
    }

    /// Check if the process exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ProcessStatus::Exited(0))
    }
}

impl Default for ExecutionOutcome {
    fn default() -> Self {
        Self {
            status: ProcessStatus::Exited(0),
            stdout: String::new(),
            stderr: String::new(),
            wall_time_ms: 0,
            peak_memory_kb: None,
            stdout_truncated: false,
            stderr_truncated: false,
        }
    }
}
