use std::sync::Arc;

use orchestrator::{MigrationError, PassthroughHandler, ProjectHandler, RecursiveProjectDiscovery, RunConfiguration};
use resolve::{OfflineResolver, PackageResolver};
use tokio_util::sync::CancellationToken;

use crate::args::CommonArgs;
use crate::config;
use crate::error::{CliError, ExitOutcome};

use super::{outcome_for, report_summary};

pub async fn run(common: &CommonArgs, cancel: CancellationToken) -> Result<ExitOutcome, CliError> {
    let file_config = config::load_file_config(&common.root)?;
    let run_config = config::build_run_configuration(common, file_config.as_ref())?;
    run_with_config(run_config, cancel).await
}

pub(crate) async fn run_with_config(
    run_config: RunConfiguration,
    cancel: CancellationToken,
) -> Result<ExitOutcome, CliError> {
    if run_config.offline {
        tracing::debug!("running offline, resolving against the bundled package table only");
    }

    let discovery = RecursiveProjectDiscovery;
    let resolver: Arc<dyn PackageResolver> = Arc::new(OfflineResolver::bundled());
    let handler: Arc<dyn ProjectHandler> = Arc::new(PassthroughHandler);

    match orchestrator::run(run_config, &discovery, resolver, handler, cancel).await {
        Ok(summary) => {
            report_summary(&summary);
            Ok(outcome_for(&summary))
        }
        Err(e @ MigrationError::State(_)) => {
            tracing::error!(error = %e, "catastrophic failure: lock, backup or rollback state is unrecoverable");
            Ok(ExitOutcome::Catastrophic)
        }
        Err(e) => Err(e.into()),
    }
}
