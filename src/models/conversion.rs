// Conversion job data models
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The two job types the conversion backend exposes.
/// Endpoint and artifact name are data on the mode, not separate code paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    RuleBased,
    AiAssisted,
}

impl ConversionMode {
    pub const ALL: [ConversionMode; 2] = [ConversionMode::RuleBased, ConversionMode::AiAssisted];

    pub fn endpoint(self) -> &'static str {
        match self {
            ConversionMode::RuleBased => "/convert",
            ConversionMode::AiAssisted => "/convert_ai",
        }
    }

    /// Fixed file name the backend writes into the output folder
    pub fn output_file_name(self) -> &'static str {
        match self {
            ConversionMode::RuleBased => "output_sastra.rs",
            ConversionMode::AiAssisted => "output_ai.rs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversionMode::RuleBased => "Rule-based",
            ConversionMode::AiAssisted => "AI",
        }
    }

    /// AI jobs take long enough that the UI shows a busy indicator
    pub fn shows_busy_indicator(self) -> bool {
        matches!(self, ConversionMode::AiAssisted)
    }
}

/// Body posted to the backend. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionRequest {
    #[serde(skip)]
    pub mode: ConversionMode,
    #[serde(rename = "code")]
    pub source_code: String,
    pub output_folder: PathBuf,
}

impl ConversionRequest {
    pub fn new(mode: ConversionMode, source_code: String, output_folder: PathBuf) -> Self {
        Self {
            mode,
            source_code,
            output_folder,
        }
    }

    /// Where the backend is expected to have written the artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.output_folder.join(self.mode.output_file_name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing file or folder selection
    Validation,
    /// Readiness gate still closed
    NotReady,
    /// Source file could not be read
    Io,
    /// Backend process failed to start or has exited
    BackendUnavailable,
    /// Request could not be delivered
    BackendUnreachable,
    /// Backend answered with a non-success status
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    Success { artifact_path: PathBuf },
    Failure { kind: FailureKind, message: String },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ConversionResult::Success { .. } => None,
            ConversionResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// What the `convert` command hands back to the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub request_id: String,
    pub mode: ConversionMode,
    #[serde(flatten)]
    pub result: ConversionResult,
    pub finished_at: String,
}

impl ConversionReport {
    pub fn new(request_id: String, mode: ConversionMode, result: ConversionResult) -> Self {
        Self {
            request_id,
            mode,
            result,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
