//! Bounded worker pool: one task per project, concurrency capped by the configured
//! parallelism, cooperative cancellation observed at every suspension point, results
//! collected back onto the orchestrator task over an mpsc channel.

use std::sync::Arc;

use resolve::{MigrationResult, PackageReference, PackageResolver, ParsedLegacyProject};
use resolve::transitive::DependencyGraph;
use synth::{synthesize, SynthesisConfig};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::config::RunConfiguration;
use crate::handler::ProjectHandler;
use backup::{BackupSession, AuditStream};

pub struct PoolContext {
    pub resolver: Arc<dyn PackageResolver>,
    pub dependency_graph: Arc<DependencyGraph>,
    pub handler: Arc<dyn ProjectHandler>,
    pub backup: Option<Arc<BackupSession>>,
    pub audit: Option<Arc<AuditStream>>,
    pub config: Arc<RunConfiguration>,
}

pub struct ProjectOutcome {
    pub result: MigrationResult,
    pub packages: Vec<PackageReference>,
}

impl ProjectOutcome {
    fn cancelled(project: &ParsedLegacyProject) -> Self {
        let mut result = MigrationResult::new(project.path.clone(), project.path.clone());
        result.fail("cancelled before completion");
        Self { result, packages: Vec::new() }
    }
}

/// Runs every project through synthesis (and, unless `dry_run`, a real write) with at
/// most `parallelism` projects in flight at once. Order of the returned outcomes is
/// unspecified.
pub async fn migrate_projects(
    projects: Vec<ParsedLegacyProject>,
    ctx: Arc<PoolContext>,
    parallelism: usize,
    cancel: CancellationToken,
) -> Vec<ProjectOutcome> {
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    let (tx, mut rx) = mpsc::channel(projects.len().max(1));

    for project in projects {
        let project = Arc::new(project);
        let semaphore = Arc::clone(&semaphore);
        let ctx = Arc::clone(&ctx);
        let cancel = cancel.clone();
        let tx = tx.clone();

        tokio::task::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => ProjectOutcome::cancelled(&project),
                permit = semaphore.acquire() => {
                    let _permit = permit.expect("semaphore is never closed while workers run");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => ProjectOutcome::cancelled(&project),
                        outcome = migrate_one(&project, &ctx) => outcome,
                    }
                }
            };
            let _ = tx.send(outcome).await;
        });
    }
    drop(tx);

    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}

async fn migrate_one(project: &ParsedLegacyProject, ctx: &PoolContext) -> ProjectOutcome {
    let config = SynthesisConfig {
        target_framework_override: ctx.config.target_framework_override.as_deref(),
        central_package_management: ctx.config.central_package_management,
    };
    let mut output = synthesize(project, &ctx.dependency_graph, ctx.resolver.as_ref(), &config);

    let detect_info = ctx.handler.detect(project);
    if detect_info.kind.is_some() {
        ctx.handler.migrate(&detect_info, &mut output.document, &output.packages, &mut output.result);
    }

    let target_path = resolve_output_path(project, ctx);
    output.result.output_path = target_path.clone();

    if ctx.config.dry_run {
        return ProjectOutcome { result: output.result, packages: output.packages };
    }

    if let Err(e) = write_and_record(&target_path, &output.document.to_xml_string(), ctx).await {
        output.result.fail(format!("failed to write migrated project: {e}"));
        return ProjectOutcome { result: output.result, packages: output.packages };
    }

    if let Err(e) = crate::validate::validate_output(&target_path) {
        output.result.warn(format!("post-migration validation failed: {e}"));
    }

    ProjectOutcome { result: output.result, packages: output.packages }
}

fn resolve_output_path(project: &ParsedLegacyProject, ctx: &PoolContext) -> std::path::PathBuf {
    match &ctx.config.output_directory {
        Some(dir) => {
            let name = project.path.file_name().unwrap_or_default();
            dir.join(name)
        }
        None => project.path.clone(),
    }
}

async fn write_and_record(path: &std::path::Path, contents: &str, ctx: &PoolContext) -> std::io::Result<()> {
    let pre_existed = path.exists();

    if let Some(backup) = &ctx.backup {
        backup.backup_file(path)?;
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;

    if let Some(backup) = &ctx.backup {
        backup.record_post_write(path)?;
    }

    if let Some(audit) = &ctx.audit {
        let path_str = path.display().to_string();
        let post_hash = backup::hash_file(path).ok().flatten();
        let event = if pre_existed {
            backup::audit::file_modified_event(&path_str, None, post_hash)
        } else {
            backup::audit::file_created_event(&path_str, post_hash)
        };
        audit.append(&event)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfiguration;
    use crate::handler::PassthroughHandler;
    use resolve::OfflineResolver;

    fn project_named(name: &str) -> ParsedLegacyProject {
        let mut project = ParsedLegacyProject::default();
        project.path = std::path::PathBuf::from(name);
        project
    }

    fn context(parallelism: usize) -> Arc<PoolContext> {
        let mut config = RunConfiguration::default();
        config.parallelism = parallelism;
        config.dry_run = true;
        Arc::new(PoolContext {
            resolver: Arc::new(OfflineResolver::bundled()),
            dependency_graph: Arc::new(DependencyGraph::new()),
            handler: Arc::new(PassthroughHandler),
            backup: None,
            audit: None,
            config: Arc::new(config),
        })
    }

    #[tokio::test]
    async fn parallelism_one_and_parallelism_eight_migrate_the_same_projects() {
        let projects: Vec<ParsedLegacyProject> =
            (0..12).map(|i| project_named(&format!("proj{i}.csproj"))).collect();

        let serial = migrate_projects(projects.clone(), context(1), 1, CancellationToken::new()).await;
        let parallel = migrate_projects(projects, context(8), 8, CancellationToken::new()).await;

        let mut serial_paths: Vec<_> = serial.iter().map(|o| o.result.input_path.clone()).collect();
        let mut parallel_paths: Vec<_> = parallel.iter().map(|o| o.result.input_path.clone()).collect();
        serial_paths.sort();
        parallel_paths.sort();

        assert_eq!(serial_paths, parallel_paths);
        assert!(serial.iter().all(|o| o.result.success));
        assert!(parallel.iter().all(|o| o.result.success));
    }

    #[tokio::test]
    async fn cancelling_before_start_marks_every_project_failed() {
        let projects: Vec<ParsedLegacyProject> = (0..5).map(|i| project_named(&format!("p{i}.csproj"))).collect();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes = migrate_projects(projects, context(4), 4, cancel).await;

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|o| !o.result.success));
    }
}
