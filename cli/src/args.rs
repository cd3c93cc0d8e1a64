use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sdkmigrate", version, about = "Migrates legacy MSBuild projects to SDK-style format")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full migration pipeline (the default when no subcommand is given)
    Migrate(CommonArgs),
    /// Report what would change without writing anything
    Analyze(CommonArgs),
    /// Restore files from a previously recorded backup session
    Rollback(RollbackArgs),
    /// Remove PackageReference entries already pulled in transitively
    CleanDeps(CommonArgs),
    /// Convert an already-migrated tree to central package management
    CleanCpm(CommonArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Directory to scan for legacy projects
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Number of projects migrated concurrently
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Never contact a package index; resolve against the bundled offline table only
    #[arg(long)]
    pub offline: bool,

    /// Override the detected target framework moniker for every migrated project
    #[arg(long = "target-framework")]
    pub target_framework: Option<String>,

    /// Write migrated projects into this directory tree instead of in place
    #[arg(long = "output-directory")]
    pub output_directory: Option<PathBuf>,

    /// Consolidate package versions into a central Directory.Packages.props file
    #[arg(long = "central-package-management")]
    pub central_package_management: bool,

    /// `tracing` filter directive, e.g. "info" or "sdkmigrate=debug"
    #[arg(long = "log-level")]
    pub log_level: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RollbackArgs {
    /// Directory whose backup sessions should be searched
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Session id to restore; defaults to the most recently created session
    #[arg(long)]
    pub session: Option<String>,

    #[arg(long = "log-level")]
    pub log_level: Option<String>,
}
