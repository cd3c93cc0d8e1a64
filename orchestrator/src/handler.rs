//! The handler plug-in contract. Per-project-kind migration behavior lives outside the
//! core as variants implementing this trait; the core never hard-codes kinds and
//! routes by detected capability set. This crate ships one built-in, pass-through
//! handler so the orchestrator always has something to route through.

use resolve::{MigrationResult, PackageReference, ParsedLegacyProject};
use synth::NewProjectDocument;

#[derive(Debug, Clone, Default)]
pub struct DetectInfo {
    pub kind: Option<String>,
}

pub trait ProjectHandler: Send + Sync {
    fn detect(&self, project: &ParsedLegacyProject) -> DetectInfo;

    /// Called only when `detect` reported a kind this handler claims; gets a chance to
    /// adjust the synthesized document before it's written.
    fn migrate(
        &self,
        info: &DetectInfo,
        document: &mut NewProjectDocument,
        packages: &[PackageReference],
        result: &mut MigrationResult,
    );
}

/// Never detects a specialized kind; `migrate` is consequently never called on real
/// input. Exists so the orchestrator has a concrete handler to hold even when no
/// richer handler crate is registered.
pub struct PassthroughHandler;

impl ProjectHandler for PassthroughHandler {
    fn detect(&self, _project: &ParsedLegacyProject) -> DetectInfo {
        DetectInfo::default()
    }

    fn migrate(
        &self,
        _info: &DetectInfo,
        _document: &mut NewProjectDocument,
        _packages: &[PackageReference],
        _result: &mut MigrationResult,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_never_claims_a_kind() {
        let handler = PassthroughHandler;
        let project = ParsedLegacyProject::default();
        assert!(handler.detect(&project).kind.is_none());
    }
}
