//! Content-addressed backup session with manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use resolve::error::StateError;
use uuid::Uuid;

use crate::hash::hash_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Finalized,
    RolledBack,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BackupEntry {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub pre_hash_b64: Option<String>,
    pub post_hash_b64: Option<String>,
    pub size: u64,
    pub modified_at: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct BackupManifest {
    pub session_id: String,
    pub created_at: String,
    pub root: PathBuf,
    pub entries: Vec<BackupEntry>,
    pub state: SessionState,
}

pub struct BackupSession {
    id: String,
    root: PathBuf,
    session_dir: PathBuf,
    created_at: String,
    // Guards both the backed-up-paths set and the entries vec: every first write to a
    // path must route through backup_file, and the manifest write on finalize needs a
    // consistent snapshot — one mutex covers both.
    state: Mutex<SessionInner>,
}

struct SessionInner {
    backed_up: HashMap<PathBuf, usize>,
    entries: Vec<BackupEntry>,
    session_state: SessionState,
}

impl BackupSession {
    pub fn init(root: &Path) -> std::io::Result<Self> {
        let now = chrono::Utc::now();
        let id = format!("{}-{}", now.format("%Y%m%dT%H%M%SZ"), Uuid::new_v4());
        let session_dir = root.join(".sdkmigrate-backups").join(&id);
        std::fs::create_dir_all(session_dir.join("files"))?;
        Ok(Self {
            id,
            root: root.to_path_buf(),
            session_dir,
            created_at: now.to_rfc3339(),
            state: Mutex::new(SessionInner { backed_up: HashMap::new(), entries: Vec::new(), session_state: SessionState::Active }),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Idempotent per original path: the first call copies the original to
    /// `<session>/files/<relative-path>` and records its pre-hash; later calls for the
    /// same path are no-ops that return the same backup path.
    pub fn backup_file(&self, path: &Path) -> std::io::Result<PathBuf> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let backup_path = self.session_dir.join("files").join(relative);

        let mut inner = self.state.lock().expect("backup session poisoned");
        if let Some(&idx) = inner.backed_up.get(path) {
            return Ok(inner.entries[idx].backup_path.clone());
        }

        let pre_hash = hash_file(path)?;
        if path.exists() {
            if let Some(parent) = backup_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(path, &backup_path)?;
        }
        let size = path.metadata().map(|m| m.len()).unwrap_or(0);

        let entry = BackupEntry {
            original_path: path.to_path_buf(),
            backup_path: backup_path.clone(),
            pre_hash_b64: pre_hash,
            post_hash_b64: None,
            size,
            modified_at: chrono::Utc::now().to_rfc3339(),
        };
        inner.entries.push(entry);
        let idx = inner.entries.len() - 1;
        inner.backed_up.insert(path.to_path_buf(), idx);
        Ok(backup_path)
    }

    /// Called after the real write lands, so the manifest's post-hash reflects final
    /// on-disk content.
    pub fn record_post_write(&self, path: &Path) -> std::io::Result<()> {
        let post_hash = hash_file(path)?;
        let mut inner = self.state.lock().expect("backup session poisoned");
        if let Some(&idx) = inner.backed_up.get(path) {
            inner.entries[idx].post_hash_b64 = post_hash;
        }
        Ok(())
    }

    /// Writes the manifest atomically (temp + rename) and transitions to Finalized.
    /// Backup entries become visible to rollback only after this call.
    pub fn finalize(&self) -> Result<PathBuf, StateError> {
        let mut inner = self.state.lock().expect("backup session poisoned");
        let manifest = BackupManifest {
            session_id: self.id.clone(),
            created_at: self.created_at.clone(),
            root: self.root.clone(),
            entries: inner.entries.clone(),
            state: SessionState::Finalized,
        };
        let manifest_path = self.session_dir.join("manifest.json");
        let temp_path = self.session_dir.join("manifest.json.tmp");
        let serialized = serde_json::to_string_pretty(&manifest)
            .map_err(|e| StateError::BackupWriteFailed(format!("manifest serialization failed: {e}")))?;
        std::fs::write(&temp_path, serialized).map_err(|e| StateError::BackupWriteFailed(e.to_string()))?;
        std::fs::rename(&temp_path, &manifest_path).map_err(|e| StateError::BackupWriteFailed(e.to_string()))?;
        inner.session_state = SessionState::Finalized;
        Ok(manifest_path)
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().expect("backup session poisoned").session_state
    }

    /// A manifest built from the in-memory entries recorded so far, independent of
    /// whether `finalize` has run or could even succeed. Used to attempt a rollback
    /// when the finalize write itself is what failed.
    pub fn snapshot(&self) -> BackupManifest {
        let inner = self.state.lock().expect("backup session poisoned");
        BackupManifest {
            session_id: self.id.clone(),
            created_at: self.created_at.clone(),
            root: self.root.clone(),
            entries: inner.entries.clone(),
            state: inner.session_state,
        }
    }
}

/// Restores every file in `manifest` in reverse order, reporting per-file success or
/// failure. Idempotent: a file whose current hash already equals its pre-hash is
/// skipped (a second rollback is therefore a no-op).
pub fn rollback(manifest: &BackupManifest) -> Vec<(PathBuf, Result<(), StateError>)> {
    let mut results = Vec::new();
    for entry in manifest.entries.iter().rev() {
        let outcome = rollback_one(entry);
        results.push((entry.original_path.clone(), outcome));
    }
    results
}

fn rollback_one(entry: &BackupEntry) -> Result<(), StateError> {
    let current_hash = hash_file(&entry.original_path).map_err(|e| StateError::RollbackFailed(e.to_string()))?;
    if current_hash == entry.pre_hash_b64 {
        return Ok(());
    }
    match &entry.pre_hash_b64 {
        None => {
            // The file didn't exist before migration; restoring means removing it.
            if entry.original_path.exists() {
                std::fs::remove_file(&entry.original_path).map_err(|e| StateError::RollbackFailed(e.to_string()))?;
            }
        }
        Some(_) => {
            std::fs::copy(&entry.backup_path, &entry.original_path).map_err(|e| StateError::RollbackFailed(e.to_string()))?;
        }
    }
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<BackupManifest, StateError> {
    let raw = std::fs::read_to_string(path).map_err(|e| StateError::RollbackFailed(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| StateError::RollbackFailed(format!("malformed manifest: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.csproj");
        std::fs::write(&target, "original").unwrap();

        let session = BackupSession::init(dir.path()).unwrap();
        let first = session.backup_file(&target).unwrap();
        let second = session.backup_file(&target).unwrap();
        assert_eq!(first, second);

        let inner = session.state.lock().unwrap();
        assert_eq!(inner.entries.len(), 1);
    }

    #[test]
    fn snapshot_is_available_before_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.csproj");
        std::fs::write(&target, "original").unwrap();

        let session = BackupSession::init(dir.path()).unwrap();
        session.backup_file(&target).unwrap();
        std::fs::write(&target, "migrated").unwrap();
        session.record_post_write(&target).unwrap();

        // No finalize() call: snapshot must still expose the recorded entry so a
        // caller can roll back even when finalize itself is what's about to fail.
        let snapshot = session.snapshot();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.state, SessionState::Active);

        let results = rollback(&snapshot);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn rollback_restores_original_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.csproj");
        std::fs::write(&target, "original").unwrap();

        let session = BackupSession::init(dir.path()).unwrap();
        session.backup_file(&target).unwrap();
        std::fs::write(&target, "migrated").unwrap();
        session.record_post_write(&target).unwrap();
        let manifest_path = session.finalize().unwrap();

        let manifest = load_manifest(&manifest_path).unwrap();
        let results = rollback(&manifest);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");

        // second rollback is a no-op
        let results_again = rollback(&manifest);
        assert!(results_again.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
    }
}
