// Readiness strategies
use crate::conversion::ConversionService;
use log::debug;

/// Decides, once per tick, whether the backend may take conversions
pub trait ReadinessProbe: Send + Sync {
    fn is_ready(&self, remaining_seconds: u32) -> bool;

    /// Text shown while the gate is still closed
    fn waiting_message(&self, remaining_seconds: u32) -> String {
        format!("AI Model Loading please wait: {}s", remaining_seconds)
    }
}

/// Fixed warm-up timer; never talks to the backend
pub struct CountdownProbe;

impl ReadinessProbe for CountdownProbe {
    fn is_ready(&self, remaining_seconds: u32) -> bool {
        remaining_seconds == 0
    }
}

/// Asks the backend's /ping endpoint on every tick
pub struct HealthCheckProbe<S> {
    service: S,
}

impl<S: ConversionService> HealthCheckProbe<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S: ConversionService> ReadinessProbe for HealthCheckProbe<S> {
    fn is_ready(&self, _remaining_seconds: u32) -> bool {
        match self.service.ping() {
            Ok(ready) => ready,
            Err(e) => {
                debug!("Backend ping failed: {}", e);
                false
            }
        }
    }

    fn waiting_message(&self, remaining_seconds: u32) -> String {
        if remaining_seconds > 0 {
            format!("AI Model Loading please wait: {}s", remaining_seconds)
        } else {
            "Waiting for the conversion backend...".to_string()
        }
    }
}
