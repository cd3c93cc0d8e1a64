use std::path::PathBuf;

use crate::package::{PackageReference, UnconvertedReference};

/// One element dropped during synthesis, recorded so nothing disappears silently.
#[derive(Debug, Clone)]
pub struct RemovedElement {
    pub kind: RemovedElementKind,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedElementKind {
    Property,
    Import,
    Target,
    Item,
}

/// Per-project outcome of one migration.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub success: bool,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub packages: Vec<PackageReference>,
    pub unconverted: Vec<UnconvertedReference>,
    pub removed_elements: Vec<RemovedElement>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl MigrationResult {
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            success: true,
            input_path,
            output_path,
            packages: Vec::new(),
            unconverted: Vec::new(),
            removed_elements: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(path = %self.input_path.display(), %message, "migration warning");
        self.warnings.push(message);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(path = %self.input_path.display(), %message, "migration error");
        self.success = false;
        self.errors.push(message);
    }

    pub fn remove(&mut self, kind: RemovedElementKind, name: impl Into<String>, reason: impl Into<String>) {
        self.removed_elements.push(RemovedElement { kind, name: name.into(), reason: reason.into() });
    }
}
