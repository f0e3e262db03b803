// In-progress indicator for long-running conversions
use std::sync::atomic::{AtomicUsize, Ordering};

type Listener = Box<dyn Fn(bool) + Send + Sync>;

/// Counts in-flight jobs; visible while at least one is running
pub struct BusyIndicator {
    in_flight: AtomicUsize,
    listener: Option<Listener>,
}

impl Default for BusyIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            listener: None,
        }
    }

    /// Called with `true` when the indicator appears and `false` when it clears
    pub fn with_listener<F>(listener: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self {
            in_flight: AtomicUsize::new(0),
            listener: Some(Box::new(listener)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Show the indicator until the returned guard is dropped
    pub fn raise(&self) -> BusyGuard<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.notify(true);
        }
        BusyGuard { indicator: self }
    }

    fn lower(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify(false);
        }
    }

    fn notify(&self, active: bool) {
        if let Some(listener) = &self.listener {
            listener(active);
        }
    }
}

pub struct BusyGuard<'a> {
    indicator: &'a BusyIndicator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.lower();
    }
}
