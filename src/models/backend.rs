// Backend process data models
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How to start the conversion backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub packaged: bool,
}

impl LaunchPlan {
    pub fn describe(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BackendStatus {
    NotStarted,
    Running { pid: Option<u32> },
    /// Terminated by us
    Stopped,
    /// Exited on its own
    Exited { code: Option<i32> },
    /// Could not be launched at all
    Failed { reason: String },
}

impl BackendStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, BackendStatus::Running { .. })
    }

    /// True when no conversion can succeed for the rest of the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, BackendStatus::Exited { .. } | BackendStatus::Failed { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            BackendStatus::NotStarted => "Backend not started".to_string(),
            BackendStatus::Running { pid: Some(pid) } => format!("Backend running (pid {})", pid),
            BackendStatus::Running { pid: None } => "Backend running".to_string(),
            BackendStatus::Stopped => "Backend stopped".to_string(),
            BackendStatus::Exited { code: Some(code) } => {
                format!("Backend exited unexpectedly with code {}", code)
            }
            BackendStatus::Exited { code: None } => "Backend exited unexpectedly".to_string(),
            BackendStatus::Failed { reason } => format!("Backend failed to start: {}", reason),
        }
    }
}

/// Which captured stream a backend line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStream {
    Stdout,
    Stderr,
}
