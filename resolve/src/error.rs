use std::fmt;

/// Per-project failure: unreadable or malformed legacy project/manifest XML.
#[derive(Debug)]
pub enum InputError {
    Io(std::io::Error),
    Xml(String),
    MissingRoot,
    MalformedIdentity(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Xml(msg) => write!(f, "malformed xml: {msg}"),
            Self::MissingRoot => write!(f, "project file has no root Project element"),
            Self::MalformedIdentity(raw) => write!(f, "malformed assembly identity: {raw}"),
        }
    }
}

impl std::error::Error for InputError {}

impl From<std::io::Error> for InputError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Transient resolution failure. Always demoted to a warning by callers; never fatal.
#[derive(Debug)]
pub enum ResolutionError {
    Network(String),
    Timeout,
    NotFound,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network failure: {msg}"),
            Self::Timeout => write!(f, "resolution timed out"),
            Self::NotFound => write!(f, "no resolution"),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Public-key-token mismatch between a probe identity and a resolved package's assembly.
#[derive(Debug)]
pub struct IntegrityError {
    pub assembly_name: String,
    pub expected_token: String,
    pub found_token: String,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "public-key-token mismatch for {}: expected {}, found {}",
            self.assembly_name, self.expected_token, self.found_token
        )
    }
}

impl std::error::Error for IntegrityError {}

/// External restore failed or timed out; caller falls back to the cached-archive path.
#[derive(Debug)]
pub enum ToolingError {
    RestoreFailed(String),
    Timeout,
    Io(std::io::Error),
}

impl fmt::Display for ToolingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestoreFailed(msg) => write!(f, "restore failed: {msg}"),
            Self::Timeout => write!(f, "restore timed out after 30s"),
            Self::Io(e) => write!(f, "io error running restore: {e}"),
        }
    }
}

impl std::error::Error for ToolingError {}

impl From<std::io::Error> for ToolingError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Catastrophic: lock lost, backup write failed, rollback failed. Aborts the run.
#[derive(Debug)]
pub enum StateError {
    LockHeld { owner_pid: u32 },
    LockTimeout,
    BackupWriteFailed(String),
    RollbackFailed(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockHeld { owner_pid } => write!(f, "solution lock held by live process {owner_pid}"),
            Self::LockTimeout => write!(f, "timed out acquiring solution lock"),
            Self::BackupWriteFailed(msg) => write!(f, "backup write failed: {msg}"),
            Self::RollbackFailed(msg) => write!(f, "rollback failed: {msg}"),
        }
    }
}

impl std::error::Error for StateError {}

/// Post-migration re-parse/validation failure. Always a warning; output is kept.
#[derive(Debug)]
pub struct ValidationError {
    pub path: std::path::PathBuf,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ValidationError {}
