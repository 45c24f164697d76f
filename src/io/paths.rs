//! Data-directory discovery.

use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = "qtag";

/// Error when no data directory can be found
#[derive(Debug, thiserror::Error)]
#[error("not a qtag directory: no qtag/ data directory found (run `qt init`)")]
pub struct NotInitialized;

/// Walk up from `start` looking for a `qtag/` data directory containing a
/// registry file.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, NotInitialized> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR_NAME);
        if data_dir.is_dir() && data_dir.join("registry.toml").exists() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(NotInitialized);
        }
    }
}

/// Where the shared taxonomy copy lives inside the data directory
pub fn taxonomy_path(data_dir: &Path) -> PathBuf {
    data_dir.join("taxonomy.csv")
}
