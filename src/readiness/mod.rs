// Readiness gating for conversion actions
pub mod driver;
pub mod gate;
pub mod probe;

pub use driver::{ReadinessDriver, TICK_INTERVAL};
pub use gate::{ReadinessGate, TickOutcome};
pub use probe::{CountdownProbe, HealthCheckProbe, ReadinessProbe};
