// Readiness gate
// Withholds conversions until the backend has had time to load its model

use super::probe::ReadinessProbe;
use crate::models::{ReadinessState, ReadinessUpdate};
use log::info;
use parking_lot::Mutex;

pub const READY_MESSAGE: &str = "Ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still loading, with this many seconds left on the clock
    Waiting(u32),
    /// This tick opened the gate
    BecameReady,
    AlreadyReady,
}

pub struct ReadinessGate {
    state: Mutex<ReadinessState>,
}

impl ReadinessGate {
    /// A zero warm-up opens the gate immediately
    pub fn new(warmup_seconds: u32) -> Self {
        Self {
            state: Mutex::new(ReadinessState {
                remaining_seconds: warmup_seconds,
                enabled: warmup_seconds == 0,
            }),
        }
    }

    pub fn state(&self) -> ReadinessState {
        *self.state.lock()
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().enabled
    }

    /// Advance one second. The probe runs without the lock held so
    /// readers are never stalled by a slow health check.
    pub fn tick(&self, probe: &dyn ReadinessProbe) -> TickOutcome {
        let remaining = {
            let mut state = self.state.lock();
            if state.enabled {
                return TickOutcome::AlreadyReady;
            }
            state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
            state.remaining_seconds
        };

        let ready = probe.is_ready(remaining);

        let mut state = self.state.lock();
        if state.enabled {
            return TickOutcome::AlreadyReady;
        }
        if ready {
            state.enabled = true;
            info!("Conversion backend ready");
            TickOutcome::BecameReady
        } else {
            TickOutcome::Waiting(remaining)
        }
    }

    pub fn update(&self, probe: &dyn ReadinessProbe) -> ReadinessUpdate {
        let state = self.state();
        ReadinessUpdate {
            remaining_seconds: state.remaining_seconds,
            enabled: state.enabled,
            message: if state.enabled {
                READY_MESSAGE.to_string()
            } else {
                probe.waiting_message(state.remaining_seconds)
            },
        }
    }
}
