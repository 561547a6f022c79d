// src/exec/child.rs

//! A single supervised child process.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{LivebuildError, Result};
use crate::exec::launcher::ChildHandle;
use crate::report::Reporter;
use crate::types::ExecuteCommand;

/// Handle for a running child.
///
/// - `cancel` asks the monitor task to kill the process.
/// - `monitor` owns the `tokio::process::Child` and observes its exit.
///
/// Dropping the handle without calling [`ChildHandle::kill`] still terminates
/// the process: the monitor sees the cancel channel close and drops the child,
/// which was spawned with `kill_on_drop(true)`.
pub struct ChildProcess {
    pid: Option<u32>,
    cancel: Option<oneshot::Sender<()>>,
    monitor: JoinHandle<()>,
}

impl std::fmt::Debug for ChildProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildProcess")
            .field("pid", &self.pid)
            .field("killed", &self.killed())
            .finish()
    }
}

impl ChildProcess {
    /// Whether the monitor task has finished (process exited or was killed
    /// and all of its output was forwarded).
    pub fn is_finished(&self) -> bool {
        self.monitor.is_finished()
    }
}

impl ChildHandle for ChildProcess {
    fn kill(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if cancel.send(()).is_err() {
                debug!(pid = ?self.pid, "process already finished while killing");
            }
        }
    }

    fn killed(&self) -> bool {
        self.cancel.is_none() || self.monitor.is_finished()
    }

    fn pid(&self) -> Option<u32> {
        self.pid
    }
}

/// Spawn `command` and start forwarding its output to `reporter`.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_child(
    command: &ExecuteCommand,
    cwd: Option<&Path>,
    reporter: Arc<dyn Reporter>,
) -> Result<ChildProcess> {
    let mut cmd = Command::new(&command.command);
    cmd.args(&command.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| LivebuildError::Spawn {
        command: command.command.clone(),
        source,
    })?;

    let pid = child.id();
    info!(pid = ?pid, cmd = %command, "process started");

    let mut forwarders = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        forwarders.push(tokio::spawn(forward_stdout(stdout, Arc::clone(&reporter))));
    }
    if let Some(stderr) = child.stderr.take() {
        forwarders.push(tokio::spawn(forward_stderr(stderr, Arc::clone(&reporter))));
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let monitor = tokio::spawn(monitor_child(child, pid, cancel_rx, forwarders, reporter));

    Ok(ChildProcess {
        pid,
        cancel: Some(cancel_tx),
        monitor,
    })
}

/// Either the process exits on its own, or a kill is requested.
///
/// On a natural exit the forwarders are drained first so that the exit line
/// comes after the process's last output. A killed process reports nothing.
async fn monitor_child(
    mut child: Child,
    pid: Option<u32>,
    mut cancel_rx: oneshot::Receiver<()>,
    forwarders: Vec<JoinHandle<()>>,
    reporter: Arc<dyn Reporter>,
) {
    tokio::select! {
        status_res = child.wait() => {
            for forwarder in forwarders {
                let _ = forwarder.await;
            }

            match status_res {
                Ok(status) => {
                    info!(pid = ?pid, exit_code = ?status.code(), success = status.success(), "process exited");
                    // `None` means terminated by a signal.
                    if let Some(code) = status.code() {
                        if code != 0 {
                            reporter.error(&format!("process exited with code {code}"));
                        }
                    }
                }
                Err(e) => {
                    warn!(pid = ?pid, error = %e, "failed to wait for process");
                }
            }
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => {
                    info!(pid = ?pid, "kill requested; terminating process");
                    terminate(&mut child, pid).await;
                }
                Err(_) => {
                    debug!(pid = ?pid, "handle dropped; process is killed on drop");
                }
            }
        }
    }
}

/// How long a process gets to exit after SIGTERM before it is killed.
pub const TERM_GRACE: Duration = Duration::from_secs(5);

/// SIGTERM, then SIGKILL if the process is still running after
/// [`TERM_GRACE`]. Non-unix targets kill outright.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(raw) = pid.and_then(|p| i32::try_from(p).ok()) {
            match kill(Pid::from_raw(raw), Signal::SIGTERM) {
                Ok(()) => match tokio::time::timeout(TERM_GRACE, child.wait()).await {
                    Ok(Ok(status)) => {
                        debug!(pid = ?pid, ?status, "process exited after SIGTERM");
                        return;
                    }
                    Ok(Err(e)) => warn!(pid = ?pid, error = %e, "failed to wait for process"),
                    Err(_) => warn!(pid = ?pid, "process ignored SIGTERM; killing"),
                },
                Err(e) => debug!(pid = ?pid, error = %e, "SIGTERM failed; killing"),
            }
        }
    }

    if let Err(e) = child.kill().await {
        warn!(pid = ?pid, error = %e, "failed to kill process");
    }
}

async fn forward_stdout<R>(mut stdout: R, reporter: Arc<dyn Reporter>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => reporter.child_output(&buf[..n]),
            Err(e) => {
                debug!(error = %e, "stdout read failed");
                break;
            }
        }
    }
}

async fn forward_stderr<R>(stderr: R, reporter: Arc<dyn Reporter>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        reporter.error(&line);
    }
}
