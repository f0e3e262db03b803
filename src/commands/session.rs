// File and folder selection commands
use crate::models::ConversionSession;
use log::debug;
use parking_lot::Mutex;
use std::path::PathBuf;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

/// The window's selections, shared by the pickers and the convert command
pub type SessionState = Mutex<ConversionSession>;

fn non_empty(path: String) -> Option<PathBuf> {
    if path.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[tauri::command]
pub fn get_session(session: State<'_, SessionState>) -> ConversionSession {
    session.lock().clone()
}

#[tauri::command]
pub fn set_source_file(path: String, session: State<'_, SessionState>) -> ConversionSession {
    let mut guard = session.lock();
    guard.source_file = non_empty(path);
    guard.clone()
}

#[tauri::command]
pub fn set_output_folder(path: String, session: State<'_, SessionState>) -> ConversionSession {
    let mut guard = session.lock();
    guard.output_folder = non_empty(path);
    guard.clone()
}

/// Open the native file picker. Cancelling keeps the previous selection.
#[tauri::command]
pub async fn pick_source_file(
    app: AppHandle,
    session: State<'_, SessionState>,
) -> Result<ConversionSession, String> {
    let picked = app
        .dialog()
        .file()
        .add_filter("C++ Files", &["cpp"])
        .blocking_pick_file();

    if let Some(file) = picked {
        let path = file.into_path().map_err(|e| e.to_string())?;
        debug!("Selected source file: {:?}", path);
        session.lock().source_file = Some(path);
    }

    Ok(session.lock().clone())
}

#[tauri::command]
pub async fn pick_output_folder(
    app: AppHandle,
    session: State<'_, SessionState>,
) -> Result<ConversionSession, String> {
    let picked = app.dialog().file().blocking_pick_folder();

    if let Some(folder) = picked {
        let path = folder.into_path().map_err(|e| e.to_string())?;
        debug!("Selected output folder: {:?}", path);
        session.lock().output_folder = Some(path);
    }

    Ok(session.lock().clone())
}
