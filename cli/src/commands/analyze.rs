use tokio_util::sync::CancellationToken;

use crate::args::CommonArgs;
use crate::config;
use crate::error::{CliError, ExitOutcome};

/// Same pipeline as `migrate`, forced to `dry_run`: no lock, no backup session, no
/// audit stream, nothing written.
pub async fn run(common: &CommonArgs, cancel: CancellationToken) -> Result<ExitOutcome, CliError> {
    let file_config = config::load_file_config(&common.root)?;
    let mut run_config = config::build_run_configuration(common, file_config.as_ref())?;
    run_config.dry_run = true;
    super::migrate::run_with_config(run_config, cancel).await
}
