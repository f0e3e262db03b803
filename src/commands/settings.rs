// Settings command handlers - file storage under the app data dir
use crate::file_manager::{initialize_json_file, read_json_file_or_default, write_json_file};
use crate::models::{ReadinessStrategy, Settings};
use crate::utils::get_settings_json_path;
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsParams {
    pub backend_url: Option<String>,
    pub readiness_strategy: Option<ReadinessStrategy>,
    pub warmup_seconds: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub backend_command: Option<String>,
    pub backend_args: Option<Vec<String>>,
}

/// Settings used for this launch. A missing file is created with defaults;
/// an unreadable one is logged and replaced by defaults in memory only.
pub fn load_settings(path: &Path) -> Settings {
    if let Err(e) = initialize_json_file(path, &Settings::default()) {
        warn!("Failed to initialize settings file: {}", e);
    }

    match read_json_file_or_default(path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to read settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

fn apply_update(current: &mut Settings, update: UpdateSettingsParams) {
    if let Some(backend_url) = update.backend_url {
        current.backend_url = backend_url;
    }
    if let Some(readiness_strategy) = update.readiness_strategy {
        current.readiness_strategy = readiness_strategy;
    }
    if let Some(warmup_seconds) = update.warmup_seconds {
        current.warmup_seconds = warmup_seconds;
    }
    if let Some(request_timeout_secs) = update.request_timeout_secs {
        current.request_timeout_secs = request_timeout_secs;
    }
    if let Some(backend_command) = update.backend_command {
        current.backend_command = if backend_command.is_empty() {
            None
        } else {
            Some(backend_command)
        };
    }
    if let Some(backend_args) = update.backend_args {
        current.backend_args = backend_args;
    }
}

/// Get current settings from the JSON file
#[tauri::command]
pub fn get_settings() -> Result<Settings, String> {
    read_json_file_or_default(&get_settings_json_path()).map_err(|e| e.to_string())
}

/// Update settings with partial update support. Takes effect on next launch.
#[tauri::command]
pub fn update_settings(settings: UpdateSettingsParams) -> Result<Settings, String> {
    let path = get_settings_json_path();

    let mut current_settings: Settings =
        read_json_file_or_default(&path).map_err(|e| e.to_string())?;

    apply_update(&mut current_settings, settings);

    write_json_file(&path, &current_settings).map_err(|e| e.to_string())?;

    debug!("Updated settings: {:?}", current_settings);

    Ok(current_settings)
}
