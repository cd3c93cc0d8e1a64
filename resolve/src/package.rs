use std::collections::BTreeMap;

use crate::identity::AssemblyIdentity;

/// A `<PackageReference Include="id" Version="v" />` destined for the new project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub id: String,
    pub version: String,
    pub target_framework: Option<String>,
    pub metadata: BTreeMap<String, String>,
    /// Set by the transitive detector; never set by the converter.
    pub is_transitive: bool,
}

impl PackageReference {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            target_framework: None,
            metadata: BTreeMap::new(),
            is_transitive: false,
        }
    }

    pub fn id_key(&self) -> String {
        self.id.to_ascii_lowercase()
    }
}

/// A legacy reference that could not be safely converted to a package reference.
#[derive(Debug, Clone)]
pub struct UnconvertedReference {
    pub identity: AssemblyIdentity,
    pub hint_path: Option<String>,
    pub private: bool,
    pub metadata: BTreeMap<String, String>,
    pub reason: String,
}

/// Result of resolving a package id+version against the package index: which assemblies
/// it publishes, kept so `contains_assembly` can validate a probe identity's token.
#[derive(Debug, Clone)]
pub struct PackageResolution {
    pub id: String,
    pub version: String,
    pub assemblies: Vec<AssemblyIdentity>,
}

impl PackageResolution {
    /// True only if some published assembly matches `probe`'s name case-insensitively
    /// and either its token equals the probe's or the probe has none.
    pub fn contains_assembly(&self, probe: &AssemblyIdentity) -> bool {
        self.assemblies.iter().any(|a| {
            a.name.eq_ignore_ascii_case(&probe.name)
                && match (&probe.public_key_token, &a.public_key_token) {
                    (None, _) => true,
                    (Some(p), Some(a)) => p.eq_ignore_ascii_case(a),
                    (Some(_), None) => false,
                }
        })
    }
}

/// (package-id, version) → set of (package-id, version-range), scoped to one framework.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    pub from_id: String,
    pub from_version: String,
    pub framework: String,
    pub dependencies: Vec<(String, String)>,
}

/// The converter's decision for one legacy reference: a tagged union, not parallel
/// collections.
#[derive(Debug, Clone)]
pub enum ReferenceFate {
    Package(PackageReference),
    Unconverted(UnconvertedReference),
    Drop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_assembly_accepts_absent_probe_token() {
        let resolution = PackageResolution {
            id: "Newtonsoft.Json".into(),
            version: "12.0.3".into(),
            assemblies: vec![AssemblyIdentity::parse("Newtonsoft.Json, PublicKeyToken=30ad4fe6b2a6aeed").unwrap()],
        };
        let probe = AssemblyIdentity::parse("Newtonsoft.Json").unwrap();
        assert!(resolution.contains_assembly(&probe));
    }

    #[test]
    fn contains_assembly_rejects_token_mismatch() {
        let resolution = PackageResolution {
            id: "Foo".into(),
            version: "1.0.0".into(),
            assemblies: vec![AssemblyIdentity::parse("Foo, PublicKeyToken=bbbbbbbbbbbbbbbb").unwrap()],
        };
        let probe = AssemblyIdentity::parse("Foo, PublicKeyToken=aaaaaaaaaaaaaaaa").unwrap();
        assert!(!resolution.contains_assembly(&probe));
    }
}
