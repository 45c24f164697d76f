//! The workspace registry: an ordered list of workspace names persisted
//! separately from any single workspace's snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot;

/// The registry file contents
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkspaceRegistry {
    #[serde(default)]
    pub workspaces: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkspaceRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.workspaces.iter().any(|w| w == name)
    }
}

pub fn registry_path(data_dir: &Path) -> PathBuf {
    data_dir.join("registry.toml")
}

/// Read the registry. A missing file yields an empty registry; a corrupted
/// file is backed up as `.bak` and replaced with an empty one.
pub fn read_registry(data_dir: &Path) -> WorkspaceRegistry {
    let path = registry_path(data_dir);
    if !path.exists() {
        return WorkspaceRegistry::default();
    }
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<WorkspaceRegistry>(&content) {
            Ok(reg) => reg,
            Err(e) => {
                let bak = path.with_extension("toml.bak");
                let _ = fs::copy(&path, &bak);
                eprintln!(
                    "warning: could not parse {} (backed up as {}): {}",
                    path.display(),
                    bak.display(),
                    e
                );
                WorkspaceRegistry::default()
            }
        },
        Err(_) => WorkspaceRegistry::default(),
    }
}

/// Write the registry, stamping `updated_at`.
pub fn write_registry(data_dir: &Path, reg: &mut WorkspaceRegistry) -> Result<(), std::io::Error> {
    reg.updated_at = Some(Utc::now());
    let content =
        toml::to_string_pretty(reg).map_err(|e| std::io::Error::other(e.to_string()))?;
    snapshot::atomic_write(&registry_path(data_dir), content.as_bytes())
}

/// Add a workspace to the registry and create its empty snapshot.
/// Returns false (and changes nothing) if the name is blank/whitespace-only
/// or already registered.
pub fn register_workspace(data_dir: &Path, name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    let mut reg = read_registry(data_dir);
    if reg.contains(name) {
        return false;
    }
    // Snapshot first: a false return must mean nothing was registered
    let empty = snapshot::Snapshot::of(&crate::model::Workspace::new(name));
    if !snapshot::save_snapshot_record(data_dir, name, &empty) {
        return false;
    }
    reg.workspaces.push(name.to_string());
    if let Err(e) = write_registry(data_dir, &mut reg) {
        eprintln!("warning: could not write workspace registry: {}", e);
        snapshot::delete_snapshot(data_dir, name);
        return false;
    }
    true
}

/// Remove a workspace from the registry and delete its snapshot.
/// Returns whether the name was registered.
pub fn remove_workspace(data_dir: &Path, name: &str) -> bool {
    let mut reg = read_registry(data_dir);
    let Some(pos) = reg.workspaces.iter().position(|w| w == name) else {
        return false;
    };
    reg.workspaces.remove(pos);
    if let Err(e) = write_registry(data_dir, &mut reg) {
        eprintln!("warning: could not write workspace registry: {}", e);
    }
    snapshot::delete_snapshot(data_dir, name);
    true
}
