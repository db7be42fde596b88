use std::future::Future;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::process::Command;

use super::GhError;

/// Captured result of one external command.
///
/// `stdout` is `None` whenever the command could not produce a usable
/// result (spawn failure, non-zero exit, timeout); `stderr` then carries
/// the reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: Some(stdout.into()),
            stderr: None,
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            stdout: None,
            stderr: Some(stderr.into()),
        }
    }

    /// Borrow stdout, or turn the failure into a [`GhError`].
    pub fn stdout(&self) -> Result<&str, GhError> {
        self.stdout.as_deref().ok_or_else(|| GhError::Process {
            stderr: self
                .stderr
                .as_deref()
                .map_or_else(|| "no output".to_owned(), |s| s.trim().to_owned()),
        })
    }
}

/// Executes one external command and captures its output.
///
/// Implementations must not fail: every error is reported through
/// [`ProcessOutput::failure`].
pub trait ProcessRunner: Send + Sync + 'static {
    fn invoke(
        &self,
        binary: &str,
        args: &[String],
    ) -> impl Future<Output = ProcessOutput> + Send;
}

/// Runs the real `gh` binary with a hard per-call timeout.
///
/// The timeout can be changed while the runner is shared; each call reads
/// it when it starts.
#[derive(Debug)]
pub struct CliRunner {
    timeout_ms: AtomicU64,
}

impl CliRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout_ms: AtomicU64::new(duration_ms(timeout)),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Relaxed))
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_ms.store(duration_ms(timeout), Ordering::Relaxed);
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ProcessRunner for CliRunner {
    async fn invoke(&self, binary: &str, args: &[String]) -> ProcessOutput {
        let mut command = Command::new(binary);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let timeout = self.timeout();
        // On timeout the `output()` future is dropped, which kills the child.
        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return ProcessOutput::failure(format!("failed to run {binary}: {e}"));
            }
            Err(_) => {
                return ProcessOutput::failure(format!(
                    "{binary} timed out after {}ms",
                    timeout.as_millis()
                ));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return ProcessOutput::failure(if stderr.trim().is_empty() {
                format!("{binary} exited with {}", output.status)
            } else {
                stderr
            });
        }

        ProcessOutput {
            stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            stderr: (!stderr.is_empty()).then_some(stderr),
        }
    }
}
