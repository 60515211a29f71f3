use std::path::Path;

use gavel::{JudgeEngine, JudgePool, Verdict};

use super::{case, job, shell_config};

fn assert_no_leftover_jobs(root: &Path) {
    let entries: Vec<_> = std::fs::read_dir(root)
        .expect("workspace root should exist")
        .collect();
    assert!(entries.is_empty(), "leftover job directories: {entries:?}");
}

#[tokio::test]
async fn test_workspace_removed_after_success() {
    let config = shell_config();
    let root = config.workspace_root();
    let engine = JudgeEngine::new(config);

    let result = engine
        .judge(&job("echo hi\n", "shell", vec![case("", "hi\n")]))
        .await
        .expect("judge call failed");

    assert!(result.is_accepted());
    assert_no_leftover_jobs(&root);
}

#[tokio::test]
async fn test_workspace_removed_after_compile_failure() {
    let config = shell_config();
    let root = config.workspace_root();
    let engine = JudgeEngine::new(config);

    let result = engine
        .judge(&job("if [\n", "shellc", vec![case("", "hi\n")]))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::CompilationError);
    assert_no_leftover_jobs(&root);
}

#[tokio::test]
async fn test_workspace_removed_after_runtime_failure() {
    let config = shell_config();
    let root = config.workspace_root();
    let engine = JudgeEngine::new(config);

    let result = engine
        .judge(&job("exit 1\n", "shell", vec![case("", "hi\n")]))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::RuntimeError);
    assert_no_leftover_jobs(&root);
}

#[tokio::test]
async fn test_unknown_language_leaves_no_workspace() {
    let config = shell_config();
    let root = config.workspace_root();
    let engine = JudgeEngine::new(config);

    let result = engine.judge(&job("x", "nope", vec![])).await;

    assert!(result.is_err());
    assert!(!root.exists());
}

#[tokio::test]
async fn test_pool_judges_batch() {
    let pool = JudgePool::new(JudgeEngine::new(shell_config()), 2);

    let mut handles = Vec::new();
    for i in 0..4 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let job = job(
                &format!("echo {i}\n"),
                "shell",
                vec![case("", &format!("{i}\n"))],
            );
            pool.judge(&job).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().expect("judge call failed");
        assert_eq!(result.final_verdict, Verdict::Accepted);
    }
    assert_eq!(pool.available(), pool.capacity());
}
