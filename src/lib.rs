mod commands;
mod conversion;
mod file_manager;
mod logging;
mod models;
mod process_manager;
mod readiness;
mod utils;

use commands::{
    backend::{get_backend_status, get_readiness},
    conversion::{convert, Dispatcher},
    session::{
        get_session, pick_output_folder, pick_source_file, set_output_folder, set_source_file,
        SessionState,
    },
    settings::{get_settings, load_settings, update_settings},
};
use conversion::{BusyIndicator, ConversionDispatcher, HttpConversionService};
use log::{error, info, warn};
use models::{ConversionSession, ReadinessStrategy, Settings, DEFAULT_BACKEND_URL};
use process_manager::{resolve_launch_plan, BackendSupervisor};
use readiness::{
    CountdownProbe, HealthCheckProbe, ReadinessDriver, ReadinessGate, ReadinessProbe, TickOutcome,
    TICK_INTERVAL,
};
use std::sync::Arc;
use std::time::Duration;
use tauri::{AppHandle, Emitter, Manager, RunEvent};
use utils::{get_settings_json_path, initialize_data_directories};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

const BACKEND_STATUS_EVENT: &str = "backend:status";
const READINESS_UPDATE_EVENT: &str = "readiness:update";
const READINESS_READY_EVENT: &str = "readiness:ready";
const AI_BUSY_EVENT: &str = "conversion:ai-busy";

fn build_service(settings: &Settings) -> Result<HttpConversionService, conversion::TransportError> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    HttpConversionService::new(&settings.backend_url, timeout).or_else(|e| {
        error!("{}; falling back to {}", e, DEFAULT_BACKEND_URL);
        HttpConversionService::new(DEFAULT_BACKEND_URL, timeout)
    })
}

fn build_probe(
    settings: &Settings,
    service: &HttpConversionService,
) -> Arc<dyn ReadinessProbe> {
    match settings.readiness_strategy {
        ReadinessStrategy::Countdown => Arc::new(CountdownProbe),
        ReadinessStrategy::HealthCheck => Arc::new(HealthCheckProbe::new(service.clone())),
    }
}

/// Launch the backend and forward every status change to the UI
fn start_backend(app: &AppHandle, settings: &Settings) -> Arc<BackendSupervisor> {
    let supervisor = Arc::new(BackendSupervisor::default());

    let packaged = !cfg!(debug_assertions);
    let resource_dir = app.path().resource_dir().ok();
    let plan = resolve_launch_plan(settings, resource_dir.as_deref(), packaged);

    let mut status_rx = supervisor.subscribe();
    let status_app = app.clone();
    tauri::async_runtime::spawn(async move {
        loop {
            let status = status_rx.borrow_and_update().clone();
            if status.is_fatal() {
                error!("{}", status.describe());
            }
            if let Err(e) = status_app.emit(BACKEND_STATUS_EVENT, &status) {
                warn!("Failed to emit backend status: {}", e);
            }
            if status_rx.changed().await.is_err() {
                break;
            }
        }
    });

    let start_supervisor = supervisor.clone();
    let started = tauri::async_runtime::block_on(async move { start_supervisor.start(&plan) });
    match started {
        Ok(pid) => info!("Backend launched (pid {:?})", pid),
        // Status is already Failed and reaches the UI as a session-wide notice
        Err(e) => error!("{}", e),
    }

    supervisor
}

fn start_readiness(
    app: &AppHandle,
    gate: Arc<ReadinessGate>,
    probe: Arc<dyn ReadinessProbe>,
) -> ReadinessDriver {
    let tick_app = app.clone();
    ReadinessDriver::spawn(gate, probe, TICK_INTERVAL, move |update, outcome| {
        let _ = tick_app.emit(READINESS_UPDATE_EVENT, update);
        if outcome == TickOutcome::BecameReady {
            let _ = tick_app.emit(READINESS_READY_EVENT, update);
        }
    })
}

/// Stop the readiness ticker and the backend. Safe to call more than once.
fn shutdown(app: &AppHandle) {
    if let Some(driver) = app.try_state::<ReadinessDriver>() {
        driver.stop();
    }

    if let Some(supervisor) = app.try_state::<Arc<BackendSupervisor>>() {
        let supervisor = supervisor.inner().clone();
        if supervisor.stop() {
            let status = tauri::async_runtime::block_on(async move {
                supervisor.wait_until_down(SHUTDOWN_TIMEOUT).await
            });
            info!("{}", status.describe());
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(logging::log_plugin())
        .plugin(tauri_plugin_dialog::init())
        .manage::<SessionState>(SessionState::new(ConversionSession::default()))
        .setup(|app| {
            logging::cleanup_old_logs();
            if let Err(e) = initialize_data_directories() {
                error!("Failed to initialize app data: {}", e);
            }

            let settings = load_settings(&get_settings_json_path());
            info!("Using backend at {}", settings.backend_url);

            let handle = app.handle().clone();
            let supervisor = start_backend(&handle, &settings);

            let service = build_service(&settings)?;
            let gate = Arc::new(ReadinessGate::new(settings.warmup_seconds));
            let probe = build_probe(&settings, &service);
            let driver = start_readiness(&handle, gate.clone(), probe.clone());

            let busy_app = handle.clone();
            let ai_busy = Arc::new(BusyIndicator::with_listener(move |active| {
                let _ = busy_app.emit(AI_BUSY_EVENT, active);
            }));

            let dispatcher: Arc<Dispatcher> = Arc::new(ConversionDispatcher::new(
                service,
                gate.clone(),
                supervisor.subscribe(),
                ai_busy,
            ));

            app.manage(supervisor);
            app.manage(gate);
            app.manage(probe);
            app.manage(driver);
            app.manage(dispatcher);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Session commands
            get_session,
            set_source_file,
            set_output_folder,
            pick_source_file,
            pick_output_folder,
            // Conversion
            convert,
            // Backend lifecycle
            get_backend_status,
            get_readiness,
            // Settings
            get_settings,
            update_settings,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| match event {
            // Fired once the last window has closed
            RunEvent::ExitRequested { .. } => shutdown(app),
            RunEvent::Exit => shutdown(app),
            _ => {}
        });
}
