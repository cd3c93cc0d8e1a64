//! Command-line surface: argument parsing, `migrate.toml` resolution, logging setup,
//! and dispatch into the orchestrator.

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

use clap::Parser;
use tokio_util::sync::CancellationToken;

pub use args::{Cli, CommonArgs, Commands, RollbackArgs};
pub use error::{CliError, ExitOutcome};

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Runs the selected subcommand to completion, installing a `Ctrl-C` handler that
    /// cancels in-flight work cooperatively rather than aborting the process.
    pub async fn handle(self) -> Result<ExitOutcome, CliError> {
        let log_level = self.log_level();
        logging::init(log_level.as_deref());

        let cancel = CancellationToken::new();
        let watcher = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("received interrupt, finishing in-flight projects and stopping");
                watcher.cancel();
            }
        });

        match self.command.unwrap_or(Commands::Migrate(self.common)) {
            Commands::Migrate(common) => commands::migrate::run(&common, cancel).await,
            Commands::Analyze(common) => commands::analyze::run(&common, cancel).await,
            Commands::Rollback(args) => commands::rollback::run(&args).await,
            Commands::CleanDeps(common) => commands::clean_deps::run(&common).await,
            Commands::CleanCpm(common) => {
                let file_config = config::load_file_config(&common.root)?;
                let strategy = file_config
                    .as_ref()
                    .and_then(|f| f.cpm_strategy.as_deref())
                    .map(config::parse_cpm_strategy)
                    .transpose()?
                    .unwrap_or_default();
                commands::clean_cpm::run(&common, strategy).await
            }
        }
    }

    fn log_level(&self) -> Option<String> {
        match &self.command {
            Some(Commands::Migrate(a) | Commands::Analyze(a) | Commands::CleanDeps(a) | Commands::CleanCpm(a)) => {
                a.log_level.clone()
            }
            Some(Commands::Rollback(a)) => a.log_level.clone(),
            None => self.common.log_level.clone(),
        }
    }
}
