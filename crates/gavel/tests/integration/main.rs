//! Integration tests for gavel
//!
//! Most tests only need a POSIX shell and run anywhere. Tests that exercise
//! real language toolchains (gcc, python3, node, javac) are behind the
//! `integration-tests` feature:
//!    cargo test -p gavel --features integration-tests

use gavel::{Config, JudgeLimits, JudgeMode, SubmissionJob, TestCase};
use uuid::Uuid;

#[cfg(feature = "integration-tests")]
mod languages;
mod lifecycle;
mod verdicts;

/// Shell-only language table, judged under a throwaway workspace root
///
/// `shell` is interpreted; `shellc` stages a fake compile step (`sh -n`
/// syntax check, then copy into the build directory) so the compiled
/// pipeline is exercised without a real toolchain. `ghost` points at an
/// interpreter that does not exist.
pub(crate) fn shell_config() -> Config {
    let toml = r#"
        [languages.shell]
        name = "POSIX shell"
        extension = "sh"
        run = { command = ["sh", "{source}"] }

        [languages.shellc]
        name = "POSIX shell (checked)"
        extension = "sh"
        run = { command = ["sh", "{binary}"] }

        [languages.shellc.compile]
        command = ["sh", "-c", "sh -n {source} && cp {source} {binary}"]
        source_name = "main.sh"
        output_name = "prog"

        [languages.ghost]
        name = "Ghost"
        extension = "sh"
        run = { command = ["/nonexistent/gavel-interpreter", "{source}"] }
    "#;
    let mut config = Config::parse_toml(toml).expect("test config should parse");
    config.workspace_root = Some(std::env::temp_dir().join(format!("gavel-it-{}", Uuid::new_v4())));
    config
}

pub(crate) fn case(input: &str, expected: &str) -> TestCase {
    TestCase {
        input: input.to_string(),
        expected_output: expected.to_string(),
        is_public: false,
        label: None,
    }
}

pub(crate) fn job(code: &str, language: &str, cases: Vec<TestCase>) -> SubmissionJob {
    SubmissionJob {
        code: code.to_string(),
        language: language.to_string(),
        test_cases: cases,
        limits: JudgeLimits::default(),
        mode: JudgeMode::Submission,
    }
}
