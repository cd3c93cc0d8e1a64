//! Orchestrator: drives discovery, per-project synthesis, solution-wide reconciliation
//! and the backup/lock/audit lifecycle end to end.

pub mod config;
pub mod cpm;
pub mod discovery;
pub mod error;
pub mod handler;
pub mod legacy_xml;
pub mod pool;
pub mod sdk_scan;
pub mod shared_props;
pub mod validate;

use std::sync::Arc;
use std::time::Instant;

use resolve::transitive::DependencyGraph;
use resolve::{MigrationResult, PackageReference, PackageResolver};

use backup::{AuditStream, BackupSession, SolutionLock};
pub use config::{CpmStrategy, RunConfiguration};
pub use cpm::{CpmConflict, CpmReconciliation};
pub use discovery::{discover_sdk_style, ProjectDiscovery, RecursiveProjectDiscovery};
pub use error::MigrationError;
pub use handler::{DetectInfo, PassthroughHandler, ProjectHandler};
pub use pool::{PoolContext, ProjectOutcome};
pub use sdk_scan::{remove_package_reference_lines, scan_sdk_project, strip_package_reference_versions, SdkProjectScan};

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The full outcome of one orchestrated run.
pub struct RunSummary {
    pub results: Vec<MigrationResult>,
    pub elapsed: std::time::Duration,
}

impl RunSummary {
    pub fn migrated_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn warned_count(&self) -> usize {
        self.results.iter().filter(|r| !r.warnings.is_empty()).count()
    }
}

/// Runs the full migration pipeline over every legacy project found under
/// `config.root`. `resolver` and `handler` are injected so callers choose online vs.
/// offline mode and which handler crate (if any) is registered.
pub async fn run(
    config: RunConfiguration,
    discovery: &dyn ProjectDiscovery,
    resolver: Arc<dyn PackageResolver>,
    handler: Arc<dyn ProjectHandler>,
    cancel: tokio_util::sync::CancellationToken,
) -> Result<RunSummary, MigrationError> {
    let start = Instant::now();
    let config = Arc::new(config);

    let lock = if config.dry_run { None } else { Some(SolutionLock::acquire(&config.root).await?) };
    let backup = if config.dry_run { None } else { Some(Arc::new(BackupSession::init(&config.root)?)) };
    let audit = if config.dry_run {
        None
    } else {
        let path = config.root.join(".sdkmigrate-audit.jsonl");
        Some(Arc::new(AuditStream::create(&path)?))
    };

    if let Some(audit) = &audit {
        let parameters = format!(
            "root={}, parallelism={}, offline={}",
            config.root.display(),
            config.parallelism,
            config.offline
        );
        let _ = audit.append(&backup::audit::start_event(TOOL_VERSION, &parameters));
    }

    let paths = discovery.discover(&config.root)?;
    let mut projects = Vec::with_capacity(paths.len());
    let mut parse_failures = Vec::new();
    for path in paths {
        match legacy_xml::parse_project_file(&path) {
            Ok(project) => projects.push(project),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not parse legacy project, skipping");
                let mut result = MigrationResult::new(path.clone(), path.clone());
                result.fail(format!("could not parse project: {e}"));
                parse_failures.push(result);
            }
        }
    }

    // No online transitive graph is wired here; the dependency edges a resolver knows
    // about are discovered lazily per-package by the transitive detector at synthesis
    // time against an empty graph when offline.
    let dependency_graph: Arc<DependencyGraph> = Arc::new(DependencyGraph::new());

    let pool_ctx = Arc::new(PoolContext {
        resolver,
        dependency_graph,
        handler,
        backup: backup.clone(),
        audit: audit.clone(),
        config: Arc::clone(&config),
    });

    let outcomes = pool::migrate_projects(projects, pool_ctx, config.parallelism, cancel).await;

    let mut results: Vec<MigrationResult> = parse_failures;
    let mut all_packages: Vec<Vec<PackageReference>> = Vec::new();
    for outcome in outcomes {
        all_packages.push(outcome.packages);
        results.push(outcome.result);
    }

    if config.central_package_management && !config.dry_run {
        let reconciliation = cpm::reconcile(&all_packages, config.cpm_strategy);
        for conflict in &reconciliation.conflicts {
            tracing::warn!(id = %conflict.id, versions = ?conflict.versions, "central package management version conflict");
        }
    }

    if let Some(backup) = &backup {
        if let Err(e) = backup.finalize() {
            tracing::error!(error = %e, "backup finalize failed, attempting automatic rollback");
            let snapshot = backup.snapshot();
            let rollback_results = backup::rollback(&snapshot);
            let failed = rollback_results.iter().filter(|(_, r)| r.is_err()).count();
            if failed > 0 {
                tracing::error!(failed, "rollback after failed finalize did not fully succeed");
            } else {
                tracing::warn!(restored = rollback_results.len(), "rolled back in-flight changes after failed finalize");
            }
            if let Some(lock) = lock {
                lock.release();
            }
            return Err(e.into());
        }
    }
    if let Some(lock) = lock {
        lock.release();
    }
    if let Some(audit) = &audit {
        let migrated = results.iter().filter(|r| r.success).count();
        let failed = results.iter().filter(|r| !r.success).count();
        let warned = results.iter().filter(|r| !r.warnings.is_empty()).count();
        let _ = audit.append(&backup::audit::end_event(migrated, failed, warned));
    }

    Ok(RunSummary { results, elapsed: start.elapsed() })
}
