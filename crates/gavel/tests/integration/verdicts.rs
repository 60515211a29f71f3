use gavel::{JudgeEngine, JudgeError, JudgeLimits, JudgeMode, Verdict};

use super::{case, job, shell_config};

#[tokio::test]
async fn test_accepted_submission() {
    let engine = JudgeEngine::new(shell_config());
    let code = "read a b\necho $((a + b))\n";
    let job = job(
        code,
        "shell",
        vec![case("3 4\n", "7\n"), case("10 20\n", "30\n")],
    );

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
    assert!(result.is_accepted());
    assert_eq!(result.test_verdicts.len(), 2);
    assert!(
        result
            .test_verdicts
            .iter()
            .all(|v| v.status == Verdict::Accepted)
    );
    assert!(result.aggregate_time_ms.is_some());
    assert!(result.compilation_error.is_none());
}

#[tokio::test]
async fn test_stdin_reaches_program() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("cat\n", "shell", vec![case("hello judge\n", "hello judge\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
}

#[tokio::test]
async fn test_wrong_answer_keeps_actual_output() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("echo 5\n", "shell", vec![case("", "6\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::WrongAnswer);
    assert_eq!(result.test_verdicts.len(), 1);
    assert_eq!(result.test_verdicts[0].actual_output, "5");
    assert!(result.aggregate_time_ms.is_none());
}

#[tokio::test]
async fn test_runtime_error_reports_exit_code() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("exit 7\n", "shell", vec![case("", "anything\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::RuntimeError);
    let details = result.test_verdicts[0].details.as_deref().unwrap();
    assert!(details.contains('7'), "details was: {details}");
}

#[tokio::test]
async fn test_runtime_error_names_signal() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("kill -SEGV $$\n", "shell", vec![case("", "ok\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::RuntimeError);
    let details = result.test_verdicts[0].details.as_deref().unwrap();
    assert!(details.contains("SIGSEGV"), "details was: {details}");
}

#[tokio::test]
async fn test_time_limit_exceeded() {
    let engine = JudgeEngine::new(shell_config());
    let mut job = job("while :; do :; done\n", "shell", vec![case("", "never\n")]);
    job.limits = JudgeLimits::new().with_time_limit_ms(300);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::TimeLimitExceeded);
    let verdict = &result.test_verdicts[0];
    assert!(verdict.time_ms >= 300);
    assert!(verdict.time_ms < 5000);
    assert!(verdict.details.as_deref().unwrap().contains("300ms"));
}

#[tokio::test]
async fn test_compilation_failure_fans_out() {
    let engine = JudgeEngine::new(shell_config());
    let code = "if [ 1 -eq 1 ]; then echo hi\n";
    let job = job(
        code,
        "shellc",
        vec![case("", "hi\n"), case("", "hi\n"), case("", "hi\n")],
    );

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::CompilationError);
    assert!(result.compilation_error.is_some());
    assert_eq!(result.test_verdicts.len(), 3);
    for verdict in &result.test_verdicts {
        assert_eq!(verdict.status, Verdict::CompilationError);
        assert_eq!(verdict.time_ms, 0);
        assert_eq!(verdict.actual_output, "");
    }
}

#[tokio::test]
async fn test_compiled_language_pipeline() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("echo ok\n", "shellc", vec![case("", "ok\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
    assert!(result.compilation_error.is_none());
}

#[tokio::test]
async fn test_zero_tests_accepts() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("echo hi\n", "shell", vec![]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
    assert!(result.test_verdicts.is_empty());
    assert_eq!(result.aggregate_time_ms, None);
    assert_eq!(result.aggregate_memory_kb, None);
}

#[tokio::test]
async fn test_submission_mode_stops_at_first_failure() {
    let engine = JudgeEngine::new(shell_config());
    let code = "read a b\necho $((a + b))\n";
    let job = job(
        code,
        "shell",
        vec![
            case("1 1\n", "2\n"),
            case("2 2\n", "5\n"),
            case("3 3\n", "6\n"),
        ],
    );

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::WrongAnswer);
    assert_eq!(result.test_verdicts.len(), 2);
    assert_eq!(result.test_verdicts[0].status, Verdict::Accepted);
    assert_eq!(result.test_verdicts[1].status, Verdict::WrongAnswer);
}

#[tokio::test]
async fn test_sample_mode_runs_every_test() {
    let engine = JudgeEngine::new(shell_config());
    let code = "read a b\necho $((a + b))\n";
    let mut job = job(
        code,
        "shell",
        vec![
            case("1 1\n", "2\n"),
            case("2 2\n", "5\n"),
            case("3 3\n", "6\n"),
        ],
    );
    job.mode = JudgeMode::Sample;

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::WrongAnswer);
    assert_eq!(result.test_verdicts.len(), 3);
    assert_eq!(result.test_verdicts[2].status, Verdict::Accepted);
}

#[tokio::test]
async fn test_private_test_data_redacted_in_submission_mode() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("echo 5\n", "shell", vec![case("secret in\n", "6\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    let verdict = &result.test_verdicts[0];
    assert_eq!(verdict.status, Verdict::WrongAnswer);
    assert_eq!(verdict.input, None);
    assert_eq!(verdict.expected_output, None);
    assert_eq!(verdict.actual_output, "5");
}

#[tokio::test]
async fn test_sample_mode_reveals_private_test_data() {
    let engine = JudgeEngine::new(shell_config());
    let mut job = job("echo 5\n", "shell", vec![case("secret in\n", "6\n")]);
    job.mode = JudgeMode::Sample;

    let result = engine.judge(&job).await.expect("judge call failed");

    let verdict = &result.test_verdicts[0];
    assert_eq!(verdict.input.as_deref(), Some("secret in\n"));
    assert_eq!(verdict.expected_output.as_deref(), Some("6\n"));
}

#[tokio::test]
async fn test_output_cap_truncates_and_notes() {
    let mut config = shell_config();
    config.output_cap_kb = 1;
    let engine = JudgeEngine::new(config);
    let code = "i=0; while [ $i -lt 200 ]; do echo 0123456789012345; i=$((i+1)); done\n";
    let job = job(code, "shell", vec![case("", "short\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    let verdict = &result.test_verdicts[0];
    assert_eq!(verdict.status, Verdict::WrongAnswer);
    assert!(verdict.details.as_deref().unwrap().contains("stdout truncated"));
    assert!(verdict.actual_output.len() <= 1024);
}

#[tokio::test]
async fn test_unknown_language_is_an_error() {
    let engine = JudgeEngine::new(shell_config());
    let result = engine.judge(&job("x", "cobol", vec![])).await;

    assert!(matches!(result, Err(JudgeError::UnsupportedLanguage(_))));
}

#[tokio::test]
async fn test_unrunnable_interpreter_reports_internal_error() {
    let engine = JudgeEngine::new(shell_config());
    let job = job("echo hi\n", "ghost", vec![case("", "hi\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::InternalError);
    assert_eq!(result.test_verdicts.len(), 1);
    let details = result.test_verdicts[0].details.as_deref().unwrap();
    assert!(details.contains("could not be run"), "details was: {details}");
}

#[tokio::test]
async fn test_unwritable_workspace_root_is_internal_error() {
    // /dev/null is a file, so nothing can be created beneath it
    let mut config = shell_config();
    config.workspace_root = Some(std::path::PathBuf::from("/dev/null/gavel"));
    let engine = JudgeEngine::new(config);
    let job = job("echo hi\n", "shell", vec![case("", "hi\n")]);

    let result = engine.judge(&job).await.expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::InternalError);
    assert!(result.test_verdicts.is_empty());
    assert!(result.compilation_error.is_none());
}
