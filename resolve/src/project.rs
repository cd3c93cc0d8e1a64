//! The legacy-evaluator abstraction: the source tool delegates to a third-party
//! MSBuild evaluator that exposes items/properties by name. We stand in a read-only
//! view over the same shape so the rest of the pipeline never touches raw XML
//! directly.

use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProjectItem {
    pub kind: String,
    pub include: String,
    pub metadata: BTreeMap<String, String>,
}

impl ProjectItem {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// A parsed legacy `.csproj`-shaped project, plus its companion `packages.config` if any.
#[derive(Debug, Clone, Default)]
pub struct ParsedLegacyProject {
    pub path: PathBuf,
    pub tools_version: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub items: Vec<ProjectItem>,
    pub raw_imports: Vec<String>,
    pub raw_targets: Vec<String>,
    pub packages_config: Vec<LegacyPackageEntry>,
}

impl ParsedLegacyProject {
    pub fn items_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ProjectItem> {
        self.items.iter().filter(move |i| i.kind == kind)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// The file stem, used as the default `AssemblyName`/`RootNamespace`.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One `<package id version [targetFramework] [developmentDependency]/>` entry from
/// `packages.config`.
#[derive(Debug, Clone)]
pub struct LegacyPackageEntry {
    pub id: String,
    pub version: String,
    pub target_framework: Option<String>,
    pub development_dependency: bool,
}
