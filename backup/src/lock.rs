//! Whole-solution exclusive lock, backed by a lockfile holding the owner's pid and
//! timestamp. A stale (crashed) owner is detected by a process-liveness probe and the
//! lock is forcibly taken with a warning.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use resolve::error::StateError;

const LOCK_FILE_NAME: &str = ".sdkmigrate.lock";
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct LockContents {
    owner_pid: u32,
    acquired_at: String,
}

pub struct SolutionLock {
    path: PathBuf,
}

impl SolutionLock {
    /// Blocks (via polling sleep) until the lock is acquired or `ACQUIRE_TIMEOUT`
    /// elapses. A live owner fails fast without waiting out the full timeout only once
    /// we've confirmed liveness; a dead owner's lock is taken immediately.
    pub async fn acquire(root: &Path) -> Result<Self, StateError> {
        let path = root.join(LOCK_FILE_NAME);
        let deadline = tokio::time::Instant::now() + ACQUIRE_TIMEOUT;

        loop {
            match try_take(&path)? {
                TakeOutcome::Acquired => return Ok(Self { path }),
                TakeOutcome::HeldByLiveOwner(pid) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(StateError::LockHeld { owner_pid: pid });
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    pub fn release(self) {
        let _ = fs::remove_file(&self.path);
    }
}

enum TakeOutcome {
    Acquired,
    HeldByLiveOwner(u32),
}

fn try_take(path: &Path) -> Result<TakeOutcome, StateError> {
    if let Ok(existing) = fs::read_to_string(path) {
        if let Ok(contents) = serde_json::from_str::<LockContents>(&existing) {
            if process_is_alive(contents.owner_pid) {
                return Ok(TakeOutcome::HeldByLiveOwner(contents.owner_pid));
            }
            tracing::warn!(pid = contents.owner_pid, "stale solution lock from a dead process, taking it forcibly");
        }
    }

    let contents = LockContents { owner_pid: std::process::id(), acquired_at: chrono::Utc::now().to_rfc3339() };
    let serialized = serde_json::to_string(&contents).expect("lock contents always serialize");
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| StateError::BackupWriteFailed(format!("could not write lockfile: {e}")))?;
    file.write_all(serialized.as_bytes())
        .map_err(|e| StateError::BackupWriteFailed(format!("could not write lockfile: {e}")))?;
    Ok(TakeOutcome::Acquired)
}

#[cfg(unix)]
fn process_is_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(unix))]
fn process_is_alive(_pid: u32) -> bool {
    // No portable liveness probe outside /proc; treat as live so we never steal a lock
    // we can't prove is dead.
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_then_release_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let lock = SolutionLock::acquire(dir.path()).await.unwrap();
        assert!(dir.path().join(LOCK_FILE_NAME).exists());
        lock.release();
        assert!(!dir.path().join(LOCK_FILE_NAME).exists());
    }

    #[test]
    fn stale_lock_from_dead_pid_is_taken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        let contents = LockContents { owner_pid: 999_999_999, acquired_at: "stale".into() };
        std::fs::write(&path, serde_json::to_string(&contents).unwrap()).unwrap();
        let outcome = try_take(&path).unwrap();
        assert!(matches!(outcome, TakeOutcome::Acquired));
    }
}
