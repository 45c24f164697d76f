//! Per-workspace snapshot persistence.
//!
//! Each workspace is saved as one pretty-printed JSON file under
//! `snapshots/` in the data directory, named after a sanitized form of the
//! workspace name. Saves are atomic (write to a temp file, then rename) and
//! never raise: autosave runs inside the interaction cycle, so a failed
//! write is logged to stderr and reported as `false`. A missing, unreadable,
//! or corrupt snapshot loads as `None` — corruption is "no snapshot," not a
//! fatal error.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::{Mapping, QuestionRecord, TaggingState, Workspace};

/// The on-disk form of a workspace.
///
/// Wire format note: JSON objects require string keys, so the tagging
/// state's `usize` question indices are coerced to strings here and parsed
/// back on load. Entries whose key does not parse as an index are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<Mapping>>,
    #[serde(default)]
    pub records: Vec<QuestionRecord>,
    #[serde(default)]
    pub question_col: String,
    #[serde(default)]
    pub answer_col: String,
}

impl Snapshot {
    /// Capture a workspace at the current instant
    pub fn of(ws: &Workspace) -> Snapshot {
        Snapshot {
            saved_at: Utc::now(),
            tags: ws
                .tags
                .iter()
                .map(|(idx, mappings)| (idx.to_string(), mappings.clone()))
                .collect(),
            records: ws.records.clone(),
            question_col: ws.question_col.clone(),
            answer_col: ws.answer_col.clone(),
        }
    }

    /// Rebuild a workspace from this snapshot
    pub fn into_workspace(self, name: &str) -> Workspace {
        let mut tags = TaggingState::new();
        for (key, mappings) in self.tags {
            if let Ok(idx) = key.parse::<usize>() {
                tags.insert(idx, mappings);
            }
        }
        Workspace {
            name: name.to_string(),
            records: self.records,
            tags,
            question_col: self.question_col,
            answer_col: self.answer_col,
        }
    }
}

/// Map a workspace name to a filesystem-safe stem: alphanumerics, hyphens,
/// and underscores pass through, spaces become underscores, everything else
/// is dropped.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c == ' ' {
                Some('_')
            } else {
                None
            }
        })
        .collect()
}

/// Path of a workspace's snapshot file inside the data directory
pub fn snapshot_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir
        .join("snapshots")
        .join(format!("{}.json", sanitize_name(name)))
}

/// Write a workspace snapshot. Returns whether the save succeeded; failures
/// are logged to stderr and never propagated.
pub fn save_snapshot(data_dir: &Path, ws: &Workspace) -> bool {
    let snapshot = Snapshot::of(ws);
    save_snapshot_record(data_dir, &ws.name, &snapshot)
}

/// Write an already-built snapshot record (used for empty-workspace creation)
pub fn save_snapshot_record(data_dir: &Path, name: &str, snapshot: &Snapshot) -> bool {
    let path = snapshot_path(data_dir, name);
    let content = match serde_json::to_string_pretty(snapshot) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("warning: could not serialize snapshot for '{}': {}", name, e);
            return false;
        }
    };
    if let Err(e) = atomic_write(&path, content.as_bytes()) {
        eprintln!(
            "warning: could not save snapshot {}: {}",
            path.display(),
            e
        );
        return false;
    }
    true
}

/// Read a workspace snapshot. Missing or corrupt snapshots are both `None`.
pub fn load_snapshot(data_dir: &Path, name: &str) -> Option<Snapshot> {
    let path = snapshot_path(data_dir, name);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            eprintln!(
                "warning: ignoring corrupt snapshot {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Remove a workspace's snapshot file, if present
pub fn delete_snapshot(data_dir: &Path, name: &str) {
    let _ = fs::remove_file(snapshot_path(data_dir, name));
}

/// Write a file atomically: temp file in the same directory, then rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
