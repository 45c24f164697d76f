//! Persisted session state (written to .state.json): which workspace is
//! active.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::snapshot::atomic_write;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionState {
    /// Name of the active workspace
    #[serde(default)]
    pub active: String,
}

/// Read .state.json from the data directory
pub fn read_session(data_dir: &Path) -> Option<SessionState> {
    let path = data_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_session(data_dir: &Path, state: &SessionState) -> Result<(), std::io::Error> {
    let path = data_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&path, content.as_bytes())
}
