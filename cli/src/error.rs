use std::fmt;

use orchestrator::MigrationError;

/// Ambient CLI-layer failure: unparsable or semantically invalid arguments, or an
/// unreadable config file. Always maps to exit code 3 and performs no work.
#[derive(Debug)]
pub enum CliError {
    InvalidArgument(String),
    ConfigRead(std::io::Error),
    ConfigParse(String),
    Migration(MigrationError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::ConfigRead(e) => write!(f, "could not read migrate.toml: {e}"),
            Self::ConfigParse(msg) => write!(f, "malformed migrate.toml: {msg}"),
            Self::Migration(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<MigrationError> for CliError {
    fn from(e: MigrationError) -> Self {
        Self::Migration(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::ConfigRead(e)
    }
}

impl From<resolve::error::StateError> for CliError {
    fn from(e: resolve::error::StateError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

/// Exit codes: 0 success, 1 per-project failure, 2 catastrophic, 3 invalid args.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    PartialFailure,
    Catastrophic,
    InvalidArguments,
}

impl ExitOutcome {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::PartialFailure => 1,
            Self::Catastrophic => 2,
            Self::InvalidArguments => 3,
        }
    }
}
