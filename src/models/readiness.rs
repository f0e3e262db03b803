// Readiness gate data models
use serde::{Deserialize, Serialize};

pub const DEFAULT_WARMUP_SECONDS: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessState {
    pub remaining_seconds: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStrategy {
    /// Fixed warm-up timer
    #[default]
    Countdown,
    /// Poll the backend's /ping endpoint
    HealthCheck,
}

/// Payload of the `readiness:update` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadinessUpdate {
    pub remaining_seconds: u32,
    pub enabled: bool,
    pub message: String,
}
