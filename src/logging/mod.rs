//! Logging setup for SASTRA
//! Installs the log plugin and handles log file cleanup for 7-day retention

use crate::utils::get_logs_dir;
use log::info;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tauri::{plugin::TauriPlugin, Runtime};
use tauri_plugin_log::{RotationStrategy, Target, TargetKind};

const LOG_RETENTION_DAYS: u64 = 7;
const LOG_FILE_NAME: &str = "sastra";
const MAX_LOG_FILE_BYTES: u128 = 5 * 1024 * 1024;

/// Stdout plus a rotating file under the app data logs dir
pub fn log_plugin<R: Runtime>() -> TauriPlugin<R> {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    tauri_plugin_log::Builder::new()
        .level(level)
        // ureq logs every connection at debug
        .level_for("ureq", log::LevelFilter::Warn)
        .targets([
            Target::new(TargetKind::Stdout),
            Target::new(TargetKind::Folder {
                path: get_logs_dir(),
                file_name: Some(LOG_FILE_NAME.to_string()),
            }),
        ])
        .max_file_size(MAX_LOG_FILE_BYTES)
        .rotation_strategy(RotationStrategy::KeepAll)
        .build()
}

pub fn cleanup_old_logs() {
    remove_logs_older_than(
        &get_logs_dir(),
        Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60),
    );
}

fn remove_logs_older_than(logs_dir: &Path, retention: Duration) -> usize {
    if !logs_dir.exists() {
        return 0;
    }

    let now = SystemTime::now();
    let mut removed = 0;

    if let Ok(entries) = fs::read_dir(logs_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "log") {
                if let Ok(meta) = fs::metadata(&path) {
                    if let Ok(modified) = meta.modified() {
                        if let Ok(age) = now.duration_since(modified) {
                            if age > retention && fs::remove_file(&path).is_ok() {
                                info!("Cleaned up old log: {:?}", path.file_name());
                                removed += 1;
                            }
                        }
                    }
                }
            }
        }
    }

    removed
}
