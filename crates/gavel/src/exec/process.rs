//! Supervised process execution
//!
//! Spawns a command in its own process group, enforces a wall-clock deadline,
//! samples peak memory while the process runs, and captures capped
//! stdout/stderr. On deadline the whole process group is killed so spawned
//! children cannot outlive the test.

use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, instrument, warn};

use crate::exec::ExecError;
use crate::exec::probe::MemoryProbe;
use crate::types::{ExecutionOutcome, ProcessStatus};

/// How often peak memory is sampled while the process runs
const PROBE_INTERVAL: Duration = Duration::from_millis(25);

/// Limits applied to a single supervised run
#[derive(Debug, Clone, Copy)]
pub struct ExecLimits {
    /// Wall-clock deadline in milliseconds
    pub wall_time_ms: u64,

    /// Declared memory limit in kilobytes (None leaves the address space unbounded)
    pub memory_limit_kb: Option<u64>,

    /// Per-stream cap on captured output in bytes
    pub output_cap_bytes: u64,
}

impl ExecLimits {
    /// Address space ceiling handed to setrlimit
    ///
    /// Twice the declared limit, so runtimes that reserve large virtual
    /// mappings up front still run; the verdict comes from the measured
    /// resident peak, the rlimit only stops runaway allocation.
    fn address_space_bytes(&self) -> Option<u64> {
        self.memory_limit_kb
            .map(|kb| kb.saturating_mul(1024).saturating_mul(2))
    }
}

/// Run a command to completion under the given limits
///
/// `stdin` is fed from a file when given, otherwise from `/dev/null`. The
/// returned outcome reports how the process ended; spawn failures and host
/// I/O problems are the only errors.
#[instrument(skip(argv, workdir, stdin, env))]
pub async fn run(
    argv: &[String],
    workdir: &Path,
    stdin: Option<&Path>,
    env: &HashMap<String, String>,
    limits: ExecLimits,
) -> Result<ExecutionOutcome, ExecError> {
    let (program, args) = argv.split_first().ok_or(ExecError::EmptyCommand)?;

    let stdin_io = match stdin {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|source| ExecError::StdinOpen {
                path: path.to_path_buf(),
                source,
            })?;
            Stdio::from(file)
        }
        None => Stdio::null(),
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .envs(env)
        .current_dir(workdir)
        .stdin(stdin_io)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let address_space = limits.address_space_bytes();
    // Runs in the child after fork: make the child its own process group
    // leader so the whole tree can be killed at once, cap the address space,
    // and drop core dumps.
    unsafe {
        command.pre_exec(move || {
            if libc::setpgid(0, 0) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            if let Some(bytes) = address_space {
                let limit = libc::rlimit {
                    rlim_cur: bytes as libc::rlim_t,
                    rlim_max: bytes as libc::rlim_t,
                };
                if libc::setrlimit(libc::RLIMIT_AS, &limit) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
            }
            let no_core = libc::rlimit {
                rlim_cur: 0,
                rlim_max: 0,
            };
            if libc::setrlimit(libc::RLIMIT_CORE, &no_core) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    debug!(?argv, "spawning supervised process");

    let started = Instant::now();
    let mut child = command.spawn().map_err(ExecError::Spawn)?;
    let pid = child.id();

    let stdout_task = tokio::spawn(read_capped(child.stdout.take(), limits.output_cap_bytes));
    let stderr_task = tokio::spawn(read_capped(child.stderr.take(), limits.output_cap_bytes));

    let probe = pid.map(MemoryProbe::new);
    let mut peak_memory_kb: Option<u64> = None;

    let deadline = tokio::time::sleep(Duration::from_millis(limits.wall_time_ms));
    tokio::pin!(deadline);
    let mut probe_tick = tokio::time::interval(PROBE_INTERVAL);
    probe_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let status = loop {
        tokio::select! {
            exit = child.wait() => {
                break status_of(&exit?);
            }
            _ = &mut deadline => {
                // Last sample before the tree goes away
                sample_peak(probe.as_ref(), &mut peak_memory_kb).await;
                debug!(?pid, "deadline passed, killing process group");
                kill_group(&mut child, pid).await;
                child.wait().await?;
                break ProcessStatus::DeadlineExceeded;
            }
            _ = probe_tick.tick() => {
                sample_peak(probe.as_ref(), &mut peak_memory_kb).await;
            }
        }
    };
    let wall_time_ms = started.elapsed().as_millis() as u64;

    let (stdout, stdout_truncated) = stdout_task.await??;
    let (stderr, stderr_truncated) = stderr_task.await??;

    debug!(
        ?status,
        wall_time_ms,
        peak_memory_kb = ?peak_memory_kb,
        "process complete"
    );

    Ok(ExecutionOutcome {
        status,
        stdout,
        stderr,
        wall_time_ms,
        peak_memory_kb,
        stdout_truncated,
        stderr_truncated,
    })
}

fn status_of(status: &std::process::ExitStatus) -> ProcessStatus {
    if let Some(signal) = status.signal() {
        ProcessStatus::Signaled(signal)
    } else {
        ProcessStatus::Exited(status.code().unwrap_or(-1))
    }
}

/// Fold the current high-water mark into the running peak
async fn sample_peak(probe: Option<&MemoryProbe>, peak: &mut Option<u64>) {
    if let Some(probe) = probe
        && let Some(kb) = probe.peak_rss_kb().await
    {
        *peak = Some(peak.map_or(kb, |prev| prev.max(kb)));
    }
}

/// Kill the child's whole process group, falling back to the child alone
async fn kill_group(child: &mut Child, pid: Option<u32>) {
    if let Some(pid) = pid {
        // The child was made a group leader in pre_exec, so its pid is the pgid
        if unsafe { libc::killpg(pid as i32, libc::SIGKILL) } == 0 {
            return;
        }
        warn!(pid, "killpg failed, killing child directly");
    }
    if let Err(e) = child.start_kill() {
        warn!(error = %e, "failed to kill child");
    }
}

/// Drain a stream into memory, keeping at most `cap` bytes
///
/// The remainder is read and discarded so the child never blocks on a full
/// pipe after the cap is hit.
async fn read_capped<R>(stream: Option<R>, cap: u64) -> std::io::Result<(String, bool)>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok((String::new(), false));
    };

    let mut limited = stream.take(cap + 1);
    let mut buf = Vec::new();
    limited.read_to_end(&mut buf).await?;

    let truncated = buf.len() as u64 > cap;
    if truncated {
        buf.truncate(cap as usize);
    }

    let mut rest = limited.into_inner();
    tokio::io::copy(&mut rest, &mut tokio::io::sink()).await?;

    Ok((String::from_utf8_lossy(&buf).into_owned(), truncated))
}
