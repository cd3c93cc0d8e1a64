use std::fmt;

use resolve::error::StateError;

/// Run-level failure: catastrophic conditions that abort the whole run, as opposed to
/// per-project failures which stay inside a `MigrationResult`.
#[derive(Debug)]
pub enum MigrationError {
    State(StateError),
    Discovery(std::io::Error),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(e) => write!(f, "{e}"),
            Self::Discovery(e) => write!(f, "project discovery failed: {e}"),
        }
    }
}

impl std::error::Error for MigrationError {}

impl From<StateError> for MigrationError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<std::io::Error> for MigrationError {
    fn from(e: std::io::Error) -> Self {
        Self::Discovery(e)
    }
}
