// Backend process management
pub mod launch;
pub mod supervisor;

pub use launch::resolve_launch_plan;
pub use supervisor::{BackendSupervisor, LogSink, OutputSink, SupervisorError};
