// Tauri command handlers - one file per domain
pub mod backend;
pub mod conversion;
pub mod session;
pub mod settings;
