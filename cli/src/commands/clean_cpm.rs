//! `clean-cpm`: converts an already-migrated, non-CPM tree to central package
//! management — collects every project's `PackageReference` set, reconciles version
//! conflicts, writes `Directory.Packages.props`, then strips the per-project `Version`
//! attributes since the central file now owns them.

use backup::{AuditStream, BackupSession, SolutionLock};
use orchestrator::{discover_sdk_style, scan_sdk_project, strip_package_reference_versions, CpmStrategy};
use synth::central_package_list_document;

use crate::args::CommonArgs;
use crate::error::{CliError, ExitOutcome};

const PROPS_FILE_NAME: &str = "Directory.Packages.props";

pub async fn run(common: &CommonArgs, strategy: CpmStrategy) -> Result<ExitOutcome, CliError> {
    let paths = discover_sdk_style(&common.root)?;

    let mut all_packages = Vec::new();
    let mut scanned_paths = Vec::new();
    for path in &paths {
        match scan_sdk_project(path) {
            Ok(scan) if !scan.packages.is_empty() => {
                all_packages.push(scan.packages);
                scanned_paths.push(path.clone());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not re-scan project, skipping"),
        }
    }

    let reconciliation = orchestrator::cpm::reconcile(&all_packages, strategy);
    for conflict in &reconciliation.conflicts {
        tracing::warn!(id = %conflict.id, versions = ?conflict.versions, "central package management version conflict, keeping the reconciled version");
    }

    if reconciliation.packages.is_empty() {
        tracing::info!("no package references found, nothing to centralize");
        return Ok(ExitOutcome::Success);
    }

    let props_path = common.root.join(PROPS_FILE_NAME);
    let props_document = central_package_list_document(&reconciliation.packages);
    let props_xml = props_document.to_xml_string();

    if common.dry_run {
        tracing::info!(packages = reconciliation.packages.len(), "would write {}", props_path.display());
        return Ok(ExitOutcome::Success);
    }

    let lock = SolutionLock::acquire(&common.root).await?;
    let backup = BackupSession::init(&common.root)?;
    let audit = AuditStream::create(&common.root.join(".sdkmigrate-audit.jsonl"))?;

    let props_existed = props_path.exists();
    backup.backup_file(&props_path)?;
    std::fs::write(&props_path, &props_xml)?;
    backup.record_post_write(&props_path)?;
    let props_hash = backup::hash_file(&props_path).ok().flatten();
    let props_event = if props_existed {
        backup::audit::file_modified_event(&props_path.display().to_string(), None, props_hash)
    } else {
        backup::audit::file_created_event(&props_path.display().to_string(), props_hash)
    };
    audit.append(&props_event)?;

    for path in &scanned_paths {
        let contents = std::fs::read_to_string(path)?;
        let rewritten = strip_package_reference_versions(&contents);
        backup.backup_file(path)?;
        std::fs::write(path, &rewritten)?;
        backup.record_post_write(path)?;
        let post_hash = backup::hash_file(path).ok().flatten();
        audit.append(&backup::audit::file_modified_event(&path.display().to_string(), None, post_hash))?;
    }

    backup.finalize()?;
    lock.release();

    tracing::info!(
        projects_converted = scanned_paths.len(),
        packages_centralized = reconciliation.packages.len(),
        "clean-cpm finished"
    );
    Ok(ExitOutcome::Success)
}
