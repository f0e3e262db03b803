// Readiness timer thread
use super::gate::{ReadinessGate, TickOutcome};
use super::probe::ReadinessProbe;
use crate::models::ReadinessUpdate;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the background ticker
pub struct ReadinessDriver {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReadinessDriver {
    /// Tick `gate` every `interval` until it opens, reporting each tick.
    /// Sleeps toward absolute deadlines so a slow probe or a late wake-up
    /// does not push later ticks back.
    pub fn spawn<F>(
        gate: Arc<ReadinessGate>,
        probe: Arc<dyn ReadinessProbe>,
        interval: Duration,
        on_tick: F,
    ) -> Self
    where
        F: Fn(&ReadinessUpdate, TickOutcome) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let handle = thread::spawn(move || {
            let started = Instant::now();
            let mut ticks: u32 = 0;

            while !gate.is_ready() && !stop_flag.load(Ordering::SeqCst) {
                ticks += 1;
                let deadline = started + interval * ticks;
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                }

                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }

                let outcome = gate.tick(probe.as_ref());
                let update = gate.update(probe.as_ref());
                on_tick(&update, outcome);
            }

            debug!("Readiness driver finished after {} ticks", ticks);
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
