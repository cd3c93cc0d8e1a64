//! `clean-deps`: re-examines already-migrated SDK-style projects and drops any
//! `PackageReference` that a resolver can show is already pulled in transitively by
//! another direct package — the same minimal-direct-set logic `migrate` applies during
//! synthesis, run a second time against a resolver's live dependency data.

use std::collections::HashMap;

use backup::{AuditStream, BackupSession, SolutionLock};
use orchestrator::{discover_sdk_style, remove_package_reference_lines, scan_sdk_project};
use resolve::transitive::{mark_transitive, DependencyGraph};
use resolve::{OfflineResolver, PackageResolver};

use crate::args::CommonArgs;
use crate::error::{CliError, ExitOutcome};

pub async fn run(common: &CommonArgs) -> Result<ExitOutcome, CliError> {
    let resolver = OfflineResolver::bundled();
    let paths = discover_sdk_style(&common.root)?;

    let lock = if common.dry_run { None } else { Some(SolutionLock::acquire(&common.root).await?) };
    let backup = if common.dry_run { None } else { Some(BackupSession::init(&common.root)?) };
    let audit = if common.dry_run {
        None
    } else {
        Some(AuditStream::create(&common.root.join(".sdkmigrate-audit.jsonl"))?)
    };

    let mut changed = 0;
    for path in &paths {
        let scan = match scan_sdk_project(path) {
            Ok(scan) => scan,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not re-scan project, skipping");
                continue;
            }
        };
        let framework = scan.target_framework.as_deref().unwrap_or("net8.0");

        let graph = build_dependency_graph(&scan.packages, &resolver, framework);
        let marked = mark_transitive(&scan.packages, &graph);
        let removed: Vec<String> = marked
            .iter()
            .filter(|p| p.is_transitive)
            .map(|p| p.id.clone())
            .collect();

        if removed.is_empty() {
            continue;
        }

        tracing::info!(path = %path.display(), removed = ?removed, "dropping transitively redundant package references");
        changed += 1;

        if common.dry_run {
            continue;
        }

        let contents = std::fs::read_to_string(path)?;
        let rewritten = remove_package_reference_lines(&contents, &removed);

        if let Some(backup) = &backup {
            backup.backup_file(path)?;
        }
        std::fs::write(path, &rewritten)?;
        if let Some(backup) = &backup {
            backup.record_post_write(path)?;
        }
        if let Some(audit) = &audit {
            let post_hash = backup::hash_file(path).ok().flatten();
            audit.append(&backup::audit::file_modified_event(&path.display().to_string(), None, post_hash))?;
        }
    }

    if let Some(backup) = backup {
        backup.finalize()?;
    }
    if let Some(lock) = lock {
        lock.release();
    }

    tracing::info!(projects_scanned = paths.len(), projects_changed = changed, "clean-deps finished");
    Ok(ExitOutcome::Success)
}

fn build_dependency_graph(
    packages: &[resolve::PackageReference],
    resolver: &OfflineResolver,
    framework: &str,
) -> DependencyGraph {
    let mut graph = HashMap::new();
    for pkg in packages {
        let deps = resolver.get_dependencies(&pkg.id, &pkg.version, framework);
        let keys: std::collections::HashSet<String> =
            deps.into_iter().map(|(id, _version)| id.to_ascii_lowercase()).collect();
        graph.insert(pkg.id.to_ascii_lowercase(), keys);
    }
    graph
}
