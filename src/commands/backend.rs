// Backend lifecycle and readiness queries
use crate::models::{BackendStatus, ReadinessUpdate};
use crate::process_manager::BackendSupervisor;
use crate::readiness::{ReadinessGate, ReadinessProbe};
use std::sync::Arc;
use tauri::State;

#[tauri::command]
pub fn get_backend_status(supervisor: State<'_, Arc<BackendSupervisor>>) -> BackendStatus {
    supervisor.status()
}

/// Current countdown, for pages that load after the first tick
#[tauri::command]
pub fn get_readiness(
    gate: State<'_, Arc<ReadinessGate>>,
    probe: State<'_, Arc<dyn ReadinessProbe>>,
) -> ReadinessUpdate {
    gate.update(probe.inner().as_ref())
}
