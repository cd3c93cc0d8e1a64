use std::path::{Path, PathBuf};

use backup::{load_manifest, rollback as rollback_manifest};

use crate::args::RollbackArgs;
use crate::error::{CliError, ExitOutcome};

const BACKUPS_DIR: &str = ".sdkmigrate-backups";

pub async fn run(args: &RollbackArgs) -> Result<ExitOutcome, CliError> {
    let session_dir = match &args.session {
        Some(id) => args.root.join(BACKUPS_DIR).join(id),
        None => most_recent_session(&args.root)
            .ok_or_else(|| CliError::InvalidArgument("no backup sessions found under this root".to_string()))?,
    };

    let manifest_path = session_dir.join("manifest.json");
    let manifest = load_manifest(&manifest_path)?;

    let results = rollback_manifest(&manifest);
    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(()) => tracing::info!(path = %path.display(), "restored"),
            Err(e) => {
                failed += 1;
                tracing::error!(path = %path.display(), error = %e, "rollback failed");
            }
        }
    }

    tracing::info!(restored = results.len() - failed, failed, "rollback finished");
    Ok(if failed > 0 { ExitOutcome::Catastrophic } else { ExitOutcome::Success })
}

fn most_recent_session(root: &Path) -> Option<PathBuf> {
    let backups_dir = root.join(BACKUPS_DIR);
    let mut sessions: Vec<PathBuf> = std::fs::read_dir(&backups_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    sessions.sort();
    sessions.pop()
}
