// Conversion backend process supervision
// Owns the backend child for the lifetime of the app window

use crate::models::{BackendStatus, BackendStream, LaunchPlan};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{oneshot, watch};

#[cfg(windows)]
use super::launch::CREATE_NO_WINDOW;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Backend is already running")]
    AlreadyRunning,
    #[error("Failed to start backend `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Receives every line the backend prints
pub trait OutputSink: Send + Sync {
    fn line(&self, stream: BackendStream, line: &str);
}

/// Forwards backend output to the log facade
pub struct LogSink;

impl OutputSink for LogSink {
    fn line(&self, stream: BackendStream, line: &str) {
        match stream {
            BackendStream::Stdout => info!("[backend] {}", line),
            BackendStream::Stderr => warn!("[backend:stderr] {}", line),
        }
    }
}

pub struct BackendSupervisor {
    status: Arc<watch::Sender<BackendStatus>>,
    kill_switch: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    sink: Arc<dyn OutputSink>,
}

impl Default for BackendSupervisor {
    fn default() -> Self {
        Self::new(Arc::new(LogSink))
    }
}

impl BackendSupervisor {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        let (status, _) = watch::channel(BackendStatus::NotStarted);
        Self {
            status: Arc::new(status),
            kill_switch: Arc::new(Mutex::new(None)),
            sink,
        }
    }

    pub fn status(&self) -> BackendStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status transition
    pub fn subscribe(&self) -> watch::Receiver<BackendStatus> {
        self.status.subscribe()
    }

    /// Spawn the backend without waiting for it.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, plan: &LaunchPlan) -> Result<Option<u32>, SupervisorError> {
        let mut kill_slot = self.kill_switch.lock();
        if kill_slot.is_some() {
            return Err(SupervisorError::AlreadyRunning);
        }

        info!("Starting backend: {}", plan.describe());

        let mut cmd = Command::new(&plan.program);
        cmd.args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &plan.cwd {
            cmd.current_dir(cwd);
        }

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                error!("Failed to spawn backend {}: {}", plan.describe(), source);
                self.status.send_replace(BackendStatus::Failed {
                    reason: source.to_string(),
                });
                return Err(SupervisorError::Spawn {
                    command: plan.describe(),
                    source,
                });
            }
        };

        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, BackendStream::Stdout, self.sink.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, BackendStream::Stderr, self.sink.clone()));
        }

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        *kill_slot = Some(kill_tx);
        drop(kill_slot);

        self.status.send_replace(BackendStatus::Running { pid });

        let status = self.status.clone();
        let kill_switch = self.kill_switch.clone();

        tokio::spawn(async move {
            tokio::select! {
                exit = child.wait() => {
                    // An emptied slot means stop() raced with the exit
                    let stop_requested = kill_switch.lock().take().is_none();
                    let code = match exit {
                        Ok(exit_status) => exit_status.code(),
                        Err(e) => {
                            warn!("Failed to wait for backend: {}", e);
                            None
                        }
                    };

                    if stop_requested {
                        debug!("Backend exited during stop with code {:?}", code);
                        status.send_replace(BackendStatus::Stopped);
                    } else {
                        error!("Backend exited unexpectedly with code {:?}", code);
                        status.send_replace(BackendStatus::Exited { code });
                    }
                }
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill backend: {}", e);
                    }
                    info!("Backend stopped");
                    status.send_replace(BackendStatus::Stopped);
                }
            }
        });

        Ok(pid)
    }

    /// Terminate the backend. Returns false when there was nothing to stop.
    pub fn stop(&self) -> bool {
        match self.kill_switch.lock().take() {
            Some(kill_tx) => {
                info!("Stopping backend");
                // The monitor only drops its receiver after the child is gone
                let _ = kill_tx.send(());
                true
            }
            None => {
                debug!("Backend stop requested but nothing is running");
                false
            }
        }
    }

    /// Wait until the backend is no longer running, up to `timeout`
    pub async fn wait_until_down(&self, timeout: Duration) -> BackendStatus {
        let mut rx = self.subscribe();
        let wait = rx.wait_for(|status| !status.is_running());
        let status = match tokio::time::timeout(timeout, wait).await {
            Ok(Ok(status)) => status.clone(),
            _ => {
                warn!("Timed out waiting for backend to stop");
                self.status()
            }
        };
        status
    }
}

async fn forward_lines<R>(reader: R, stream: BackendStream, sink: Arc<dyn OutputSink>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        sink.line(stream, &line);
    }
}
