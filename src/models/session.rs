// Per-window selection state
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The user's current file and folder picks. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversionSession {
    pub source_file: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
}

impl ConversionSession {
    pub fn new(source_file: Option<PathBuf>, output_folder: Option<PathBuf>) -> Self {
        Self {
            source_file,
            output_folder,
        }
    }

    /// Both selections present and non-empty
    pub fn selections(&self) -> Option<(PathBuf, PathBuf)> {
        let source = self.source_file.as_ref().filter(|p| !p.as_os_str().is_empty())?;
        let output = self.output_folder.as_ref().filter(|p| !p.as_os_str().is_empty())?;
        Some((source.clone(), output.clone()))
    }
}
