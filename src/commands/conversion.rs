// Conversion command handlers
use super::session::SessionState;
use crate::conversion::{ConversionDispatcher, HttpConversionService};
use crate::models::{ConversionMode, ConversionReport};
use log::info;
use std::sync::Arc;
use tauri::State;

pub type Dispatcher = ConversionDispatcher<HttpConversionService>;

/// Convert the selected file in the given mode.
/// Validation and backend failures come back as a failure report, not an Err;
/// Err is reserved for the worker task itself dying.
#[tauri::command]
pub async fn convert(
    mode: ConversionMode,
    session: State<'_, SessionState>,
    dispatcher: State<'_, Arc<Dispatcher>>,
) -> Result<ConversionReport, String> {
    let snapshot = session.lock().clone();
    let dispatcher = dispatcher.inner().clone();
    let request_id = uuid::Uuid::new_v4().to_string();

    info!("Conversion {} requested ({})", request_id, mode.label());

    let result = tokio::task::spawn_blocking(move || dispatcher.request_conversion(mode, &snapshot))
        .await
        .map_err(|e| format!("Conversion task failed: {}", e))?;

    info!(
        "Conversion {} finished: {}",
        request_id,
        if result.is_success() { "success" } else { "failure" }
    );

    Ok(ConversionReport::new(request_id, mode, result))
}
