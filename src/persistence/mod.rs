//! Session log export
//!
//! The log is written as a pretty-printed JSON array of tagged, versioned
//! records (see [`crate::sim::LogEntry`]).

use std::path::Path;

use thiserror::Error;

use crate::sim::LogEntry;

/// Default export file name
pub const DATA_FILE_NAME: &str = "data.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize session log: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize the log as a pretty-printed JSON array
pub fn export_json(log: &[LogEntry]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(log)?)
}

/// Write the log to `path`, creating parent directories as needed.
/// Returns the number of bytes written.
pub fn write_export(path: &Path, log: &[LogEntry]) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = export_json(log)?;
    std::fs::write(path, &json)?;
    log::info!("Exported {} records to {}", log.len(), path.display());
    Ok(json.len())
}

/// Read a previously exported log back
pub fn read_export(path: &Path) -> Result<Vec<LogEntry>, ExportError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
