use std::path::PathBuf;

/// Reconciliation strategy for central package management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpmStrategy {
    #[default]
    HighestWins,
    ManifestWins,
    UserPrompt,
}

/// The resolved, immutable set of flags driving one invocation. Built once by the
/// CLI layer and passed by reference everywhere.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub root: PathBuf,
    pub dry_run: bool,
    pub parallelism: usize,
    pub offline: bool,
    pub target_framework_override: Option<String>,
    pub output_directory: Option<PathBuf>,
    pub central_package_management: bool,
    pub cpm_strategy: CpmStrategy,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dry_run: false,
            parallelism: 4,
            offline: true,
            target_framework_override: None,
            output_directory: None,
            central_package_management: false,
            cpm_strategy: CpmStrategy::default(),
        }
    }
}
