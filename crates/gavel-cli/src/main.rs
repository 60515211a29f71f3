//! Gavel CLI
//!
//! A command-line tool for judging code submissions against test cases.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gavel::{Config, EXAMPLE_CONFIG, JudgeEngine, JudgeMode, JudgeResult, SubmissionJob, TestCase};
use serde::Deserialize;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gavel")]
#[command(about = "A tool for judging code submissions against test cases")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: gavel.toml)
        #[arg(short, long, default_value = "gavel.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Judge a submission against a test suite
    Judge {
        /// Source file to judge
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language ID (e.g., cpp, python)
        #[arg(short, long)]
        language: String,

        /// TOML test suite file
        #[arg(short, long)]
        tests: Option<PathBuf>,

        /// Time limit per test in milliseconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Memory limit per test in MB
        #[arg(long)]
        memory_limit: Option<u64>,

        /// Judging mode: submission or sample
        #[arg(short, long, default_value = "submission")]
        mode: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available languages
    Languages,

    /// Show the active configuration
    ShowConfig,
}

/// Arguments for the judge subcommand
struct JudgeRequest {
    source: PathBuf,
    language: String,
    tests: Option<PathBuf>,
    time_limit: Option<u64>,
    memory_limit: Option<u64>,
    mode: String,
    json: bool,
}

/// On-disk test suite format for the judge subcommand
#[derive(Debug, Deserialize)]
struct SuiteFile {
    /// Override for the per-test time limit in milliseconds
    time_limit_ms: Option<u64>,

    /// Override for the per-test memory limit in MB
    memory_limit_mb: Option<u64>,

    #[serde(default)]
    cases: Vec<SuiteCase>,
}

#[derive(Debug, Deserialize)]
struct SuiteCase {
    #[serde(default)]
    label: Option<String>,

    #[serde(default)]
    input: String,

    expected: String,

    #[serde(default)]
    public: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Judge {
            source,
            language,
            tests,
            time_limit,
            memory_limit,
            mode,
            json,
        } => {
            let request = JudgeRequest {
                source,
                language,
                tests,
                time_limit,
                memory_limit,
                mode,
                json,
            };
            run_judge(config, request).await
        }
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_judge(config: Config, request: JudgeRequest) -> Result<()> {
    let code = tokio::fs::read_to_string(&request.source)
        .await
        .context("failed to read source file")?;

    let mode = match request.mode.as_str() {
        "submission" => JudgeMode::Submission,
        "sample" => JudgeMode::Sample,
        other => anyhow::bail!("unknown mode '{other}' (expected 'submission' or 'sample')"),
    };

    // Limits stack up: config defaults, then the suite, then CLI flags
    let mut limits = config.default_limits;
    let mut test_cases = Vec::new();
    if let Some(ref path) = request.tests {
        let suite = load_suite(path)?;
        if let Some(ms) = suite.time_limit_ms {
            limits.time_limit_ms = ms;
        }
        if let Some(mb) = suite.memory_limit_mb {
            limits.memory_limit_mb = mb;
        }
        test_cases = suite
            .cases
            .into_iter()
            .map(|case| TestCase {
                input: case.input,
                expected_output: case.expected,
                is_public: case.public,
                label: case.label,
            })
            .collect();
    }
    if let Some(ms) = request.time_limit {
        limits.time_limit_ms = ms;
    }
    if let Some(mb) = request.memory_limit {
        limits.memory_limit_mb = mb;
    }

    info!(language = %request.language, tests = test_cases.len(), "judging submission");

    let job = SubmissionJob {
        code,
        language: request.language,
        test_cases,
        limits,
        mode,
    };

    let engine = JudgeEngine::new(config);
    let result = engine.judge(&job).await.context("judging failed")?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    // Exit code reflects the verdict so the CLI scripts cleanly
    if result.is_accepted() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn load_suite(path: &Path) -> Result<SuiteFile> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .context("failed to read test suite")?
        .try_deserialize()
        .context("failed to parse test suite")
}

fn print_result(result: &JudgeResult) {
    println!("Verdict: {}", result.final_verdict);

    if let Some(ref diagnostics) = result.compilation_error {
        println!("\nCompiler output:\n{diagnostics}");
    }

    if !result.test_verdicts.is_empty() {
        println!();
        for (index, verdict) in result.test_verdicts.iter().enumerate() {
            let label = verdict
                .label
                .clone()
                .unwrap_or_else(|| format!("test {}", index + 1));
            print!(
                "  {:<12} {:<22} {:>6} ms",
                label,
                verdict.status.to_string(),
                verdict.time_ms
            );
            if let Some(kb) = verdict.memory_kb {
                print!("  {kb:>8} KB");
            }
            if let Some(ref details) = verdict.details {
                print!("  ({details})");
            }
            println!();
        }
    }

    if result.aggregate_time_ms.is_some() || result.aggregate_memory_kb.is_some() {
        println!();
        if let Some(ms) = result.aggregate_time_ms {
            println!("Mean time (accepted): {ms:.1} ms");
        }
        if let Some(kb) = result.aggregate_memory_kb {
            println!("Peak memory: {kb} KB");
        }
    }
}

fn list_languages(config: &Config) {
    println!("Available languages:\n");

    let mut languages: Vec<_> = config.languages.iter().collect();
    languages.sort_by_key(|(id, _)| *id);

    for (id, lang) in languages {
        let lang_type = if lang.is_compiled() {
            "compiled"
        } else {
            "interpreted"
        };
        println!("  {:<15} {} ({})", id, lang.name, lang_type);
    }
}

fn show_config(config: &Config) {
    println!("Default resource limits:");
    println!("  Time limit: {} ms", config.default_limits.time_limit_ms);
    println!(
        "  Memory limit: {} MB",
        config.default_limits.memory_limit_mb
    );
    println!();
    println!("Compile time limit: {} ms", config.compile_time_limit_ms);
    println!("Output cap: {} KB", config.output_cap_kb);
    println!("Workspace root: {}", config.workspace_root().display());
    println!();
    println!("Languages configured: {}", config.languages.len());
}

async fn init_config(output: &PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
