//! Project catalog backing the in-level terminals.
//!
//! The catalog is external data: a JSON listing of `{name, description, url}`
//! records fetched on a background thread at startup and published over a
//! channel the main loop polls without blocking. Any failure -- missing file,
//! unreadable bytes, parse error, empty list -- substitutes one deterministic
//! fallback record, so `project_for` is total and terminals always have
//! something to show. Nothing here retries and nothing here panics.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}

pub fn fallback_record() -> ProjectRecord {
    ProjectRecord {
        name: "orb-runner".to_string(),
        description: "Interactive portfolio platformer".to_string(),
        url: "https://github.com/orb-runner/orb-runner".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCatalog {
    records: Vec<ProjectRecord>,
}

impl ProjectCatalog {
    /// Wrap a record list, substituting the fallback when it is empty so the
    /// modulo mapping below never divides by zero.
    pub fn from_records(records: Vec<ProjectRecord>) -> Self {
        if records.is_empty() {
            log::warn!("Project catalog is empty, substituting fallback entry");
            return Self::fallback();
        }
        Self { records }
    }

    pub fn fallback() -> Self {
        Self {
            records: vec![fallback_record()],
        }
    }

    /// Load the catalog, degrading to the fallback on any failure.
    pub fn load_or_fallback(path: &Path) -> Self {
        match load_records_from_path(path) {
            Ok(records) => {
                log::info!(
                    "Loaded project catalog '{}' ({} entries)",
                    path.display(),
                    records.len()
                );
                Self::from_records(records)
            }
            Err(err) => {
                log::warn!("Project catalog unavailable: {err}. Using fallback entry.");
                Self::fallback()
            }
        }
    }

    /// Terminal-to-project mapping: wraps around the catalog.
    pub fn project_for(&self, repo_index: usize) -> &ProjectRecord {
        &self.records[repo_index % self.records.len()]
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    /// Never zero: construction substitutes the fallback for empty lists.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

pub fn load_records_from_path(path: &Path) -> Result<Vec<ProjectRecord>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read project catalog {}: {e}", path.display()))?;
    let records: Vec<ProjectRecord> = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse project catalog {}: {e}", path.display()))?;
    Ok(records)
}

/// Kick off the catalog load on a background thread. The receiver yields the
/// catalog exactly once; the frame loop polls it with `try_recv` so a slow or
/// dead source never stalls a frame.
pub fn spawn_fetch(path: PathBuf) -> mpsc::Receiver<ProjectCatalog> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let catalog = ProjectCatalog::load_or_fallback(&path);
        // The receiver may already be gone on early shutdown.
        let _ = tx.send(catalog);
    });
    rx
}
