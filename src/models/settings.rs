// Settings data models
use super::readiness::{ReadinessStrategy, DEFAULT_WARMUP_SECONDS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub readiness_strategy: ReadinessStrategy,
    pub warmup_seconds: u32,
    pub request_timeout_secs: u64,
    /// Replaces the built-in launch plan when set
    pub backend_command: Option<String>,
    pub backend_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: String::from(DEFAULT_BACKEND_URL),
            readiness_strategy: ReadinessStrategy::Countdown,
            warmup_seconds: DEFAULT_WARMUP_SECONDS,
            // AI conversions load the model per request, so keep this generous
            request_timeout_secs: 600,
            backend_command: None,
            backend_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "readiness_strategy": "health_check" }"#).unwrap();

        assert_eq!(settings.readiness_strategy, ReadinessStrategy::HealthCheck);
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.warmup_seconds, 60);
        assert!(settings.backend_command.is_none());
    }
}
