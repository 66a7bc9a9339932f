//! Process driver for the program under test.
//!
//! One invocation = one process: the mode token is the sole argument, the
//! input stream goes to stdin, and stdout is captured whole. stdout and
//! stderr are redirected into anonymous temporary files so a chatty program
//! can never fill a pipe and deadlock the oracle; stdin is fed from a helper
//! thread for the same reason.
//!
//! Anything written to stderr is a contract violation and aborts the run.
//! A wall-clock timeout bounds each invocation; expiry kills the child and
//! is reported as [`RunOutcome::TimedOut`] for the caller to fail the case.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::{OracleError, Result};

/// Default wall-clock budget for one invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ── Mode ────────────────────────────────────────────────────────────────

/// Operating mode, selected by the program's single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Report the record with the highest grade/age ratio.
    Best,
    /// Print all records merge-sorted by grade.
    MergeSort,
    /// Print all records quicksorted by name.
    QuickSort,
}

impl Mode {
    pub const ALL: [Self; 3] = [Self::Best, Self::MergeSort, Self::QuickSort];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::MergeSort => "merge",
            Self::QuickSort => "quick",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Mode {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.token() == s)
            .ok_or_else(|| OracleError::Config(format!("unknown mode token '{s}'")))
    }
}

// ── Driver ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Resolved path of the program under test.
    pub executable: PathBuf,
    /// Per-invocation wall-clock budget.
    pub timeout: Duration,
}

impl DriverConfig {
    #[must_use]
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Captured result of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stdout: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Invocation),
    /// The child outlived the timeout and was killed.
    TimedOut { elapsed: Duration, partial_stdout: String },
}

/// Runs the program under test. Holds only immutable configuration, so one
/// driver serves a whole run.
#[derive(Debug, Clone)]
pub struct ProgramDriver {
    config: DriverConfig,
}

impl ProgramDriver {
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Runs the program once in `mode` with `input` on stdin.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Contract`] if the program wrote to stderr.
    /// - [`OracleError::Environment`] if the program cannot be spawned.
    /// - [`OracleError::Io`] on capture-file or stdin failures.
    pub fn run(&self, mode: Mode, input: &str) -> Result<RunOutcome> {
        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        let started = Instant::now();
        let mut child = Command::new(&self.config.executable)
            .arg(mode.token())
            .stdin(Stdio::piped())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .spawn()
            .map_err(|err| {
                OracleError::Environment(format!(
                    "failed to spawn {}: {err}",
                    self.config.executable.display()
                ))
            })?;

        let feeder = child.stdin.take().map(|mut stdin| {
            let bytes = input.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&bytes))
        });

        let waited = wait_for_child(&mut child, self.config.timeout);
        let fed = feeder.map(thread::JoinHandle::join);
        let (status, timed_out) = waited?;

        match fed {
            Some(Ok(Err(err))) if err.kind() != ErrorKind::BrokenPipe => return Err(err.into()),
            Some(Ok(Err(_))) => debug!(mode = %mode, "program closed stdin before reading all input"),
            Some(Err(_)) => {
                return Err(OracleError::Io(std::io::Error::other(
                    "stdin feeder thread panicked",
                )));
            }
            Some(Ok(Ok(()))) | None => {}
        }

        let elapsed = started.elapsed();
        let stdout = read_capture(&mut stdout_file)?;
        // Checked before the timeout: stderr output is fatal even from a hung child.
        let stderr = read_capture(&mut stderr_file)?;
        if !stderr.is_empty() {
            error!(mode = %mode, timed_out, stderr = %stderr, "program wrote to stderr");
            return Err(OracleError::Contract(format!(
                "program wrote to stderr (only stdout may be used):\n{stderr}"
            )));
        }

        if timed_out {
            warn!(
                mode = %mode,
                elapsed_ms = elapsed.as_millis(),
                "program exceeded timeout and was killed"
            );
            return Ok(RunOutcome::TimedOut {
                elapsed,
                partial_stdout: stdout,
            });
        }

        debug!(
            mode = %mode,
            exit_code = ?status.code(),
            elapsed_ms = elapsed.as_millis(),
            stdout_bytes = stdout.len(),
            "invocation complete"
        );
        Ok(RunOutcome::Completed(Invocation {
            stdout,
            exit_code: status.code(),
            elapsed,
        }))
    }
}

/// Polls `child` until it exits or `timeout` passes; a timed-out child is
/// killed and reaped. Returns the exit status and whether it timed out.
fn wait_for_child(child: &mut Child, timeout: Duration) -> Result<(ExitStatus, bool)> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let status = child.wait()?;
            return Ok((status, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_capture(file: &mut File) -> Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake_program");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[test]
    fn mode_tokens_roundtrip() {
        for mode in Mode::ALL {
            assert_eq!(mode.token().parse::<Mode>().expect("parse"), mode);
        }
        assert!("sort".parse::<Mode>().is_err());
    }

    #[test]
    fn captures_stdout_and_passes_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(dir.path(), "echo \"mode=$1\"\ncat");
        let driver = ProgramDriver::new(DriverConfig::new(exe));
        let RunOutcome::Completed(run) = driver.run(Mode::MergeSort, "a\tb\t\nq\n").expect("run")
        else {
            panic!("expected completion");
        };
        assert_eq!(run.stdout, "mode=merge\na\tb\t\nq\n");
        assert_eq!(run.exit_code, Some(0));
    }

    #[test]
    fn stderr_output_is_a_contract_violation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(dir.path(), "echo oops >&2");
        let driver = ProgramDriver::new(DriverConfig::new(exe));
        let err = driver.run(Mode::Best, "q\n").expect_err("stderr is fatal");
        assert!(err.is_fatal());
        assert!(matches!(err, OracleError::Contract(msg) if msg.contains("oops")));
    }

    #[test]
    fn hanging_program_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(dir.path(), "echo started\nexec sleep 30");
        let driver = ProgramDriver::new(DriverConfig {
            timeout: Duration::from_millis(200),
            ..DriverConfig::new(exe)
        });
        match driver.run(Mode::Best, "q\n").expect("run") {
            RunOutcome::TimedOut {
                elapsed,
                partial_stdout,
            } => {
                assert!(elapsed >= Duration::from_millis(200));
                assert_eq!(partial_stdout, "started\n");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn stderr_before_hanging_is_still_a_contract_violation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(dir.path(), "echo misuse >&2\nexec sleep 30");
        let driver = ProgramDriver::new(DriverConfig {
            timeout: Duration::from_millis(200),
            ..DriverConfig::new(exe)
        });
        let err = driver.run(Mode::Best, "q\n").expect_err("stderr is fatal");
        assert!(err.is_fatal());
        assert!(matches!(err, OracleError::Contract(msg) if msg.contains("misuse")));
    }

    #[test]
    fn early_exit_without_reading_stdin_is_tolerated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = script(dir.path(), "echo done");
        let driver = ProgramDriver::new(DriverConfig::new(exe));
        let big = "x".repeat(1 << 20);
        let RunOutcome::Completed(run) = driver.run(Mode::QuickSort, &big).expect("run") else {
            panic!("expected completion");
        };
        assert_eq!(run.stdout, "done\n");
    }

    #[test]
    fn missing_executable_fails_to_spawn() {
        let driver = ProgramDriver::new(DriverConfig::new(PathBuf::from("/nonexistent/manageStudents")));
        assert!(matches!(
            driver.run(Mode::Best, "q\n"),
            Err(OracleError::Environment(_))
        ));
    }
}
