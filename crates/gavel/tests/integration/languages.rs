//! Tests against real language toolchains
//!
//! Requires gcc, python3, node, and a JDK on the PATH.

use gavel::{Config, JudgeEngine, JudgeLimits, TestCase, Verdict};
use uuid::Uuid;

use super::{case, job};

fn toolchain_engine() -> JudgeEngine {
    let mut config = Config::default();
    config.workspace_root = Some(
        std::env::temp_dir().join(format!("gavel-lang-{}", Uuid::new_v4())),
    );
    JudgeEngine::new(config)
}

fn sum_cases() -> Vec<TestCase> {
    vec![case("3 4\n", "7\n"), case("100 250\n", "350\n")]
}

#[tokio::test]
async fn test_cpp_sum() {
    let code = r#"#include <iostream>
int main() {
    long a, b;
    std::cin >> a >> b;
    std::cout << a + b << "\n";
    return 0;
}
"#;
    let result = toolchain_engine()
        .judge(&job(code, "cpp", sum_cases()))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
    assert!(result.aggregate_time_ms.is_some());
}

#[tokio::test]
async fn test_python_sum() {
    let code = "a, b = map(int, input().split())\nprint(a + b)\n";
    let result = toolchain_engine()
        .judge(&job(code, "python", sum_cases()))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
}

#[tokio::test]
async fn test_javascript_sum() {
    let code = r#"const [a, b] = require("fs")
    .readFileSync(0, "utf8")
    .trim()
    .split(/\s+/)
    .map(Number);
console.log(a + b);
"#;
    let result = toolchain_engine()
        .judge(&job(code, "javascript", sum_cases()))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
}

#[tokio::test]
async fn test_java_sum() {
    let code = r#"import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner sc = new Scanner(System.in);
        long a = sc.nextLong();
        long b = sc.nextLong();
        System.out.println(a + b);
    }
}
"#;
    // The JVM maps far more address space than it uses, so give it room
    let mut job = job(code, "java", sum_cases());
    job.limits = JudgeLimits::new().with_memory_limit_mb(1024);

    let result = toolchain_engine()
        .judge(&job)
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::Accepted);
}

#[tokio::test]
async fn test_cpp_compile_error() {
    let code = "int main() { return 0\n";
    let result = toolchain_engine()
        .judge(&job(code, "cpp", sum_cases()))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::CompilationError);
    let diagnostics = result.compilation_error.as_deref().unwrap();
    assert!(diagnostics.contains("error"), "diagnostics: {diagnostics}");
}

#[tokio::test]
async fn test_python_infinite_loop_times_out() {
    let code = "while True:\n    pass\n";
    let mut job = job(code, "python", vec![case("", "never\n")]);
    job.limits = JudgeLimits::new().with_time_limit_ms(1000);

    let result = toolchain_engine()
        .judge(&job)
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::TimeLimitExceeded);
    let verdict = &result.test_verdicts[0];
    assert!(verdict.time_ms >= 1000, "wall time: {}", verdict.time_ms);
    assert!(verdict.time_ms < 5000, "wall time: {}", verdict.time_ms);
}

#[tokio::test]
async fn test_python_runtime_error() {
    let code = "print(1 / 0)\n";
    let result = toolchain_engine()
        .judge(&job(code, "python", vec![case("", "0\n")]))
        .await
        .expect("judge call failed");

    assert_eq!(result.final_verdict, Verdict::RuntimeError);
    let details = result.test_verdicts[0].details.as_deref().unwrap();
    assert!(details.contains("ZeroDivisionError"), "details: {details}");
}
