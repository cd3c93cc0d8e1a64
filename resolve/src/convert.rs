//! Per-reference conversion decision.

use std::collections::BTreeMap;

use crate::classify::is_framework_intrinsic;
use crate::identity::AssemblyIdentity;
use crate::package::{PackageReference, ReferenceFate, UnconvertedReference};
use crate::resolver::PackageResolver;

/// A legacy `<Reference>` item plus the subset of metadata the converter cares about.
#[derive(Debug, Clone)]
pub struct LegacyReference {
    pub include: String,
    pub hint_path: Option<String>,
    pub private: bool,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct ConversionResult {
    pub packages: Vec<PackageReference>,
    pub unconverted: Vec<UnconvertedReference>,
    pub warnings: Vec<String>,
}

/// Offline, framework-aware mapping from a well-known assembly name to the package id
/// that supersedes it. Distinct from the general resolver: this table is consulted
/// *before* falling back to it because these mappings are exact and require no network
/// round-trip.
pub fn well_known_package_for_assembly(assembly_name: &str, framework: &str) -> Option<&'static str> {
    let _ = framework;
    match assembly_name {
        "Newtonsoft.Json" => Some("Newtonsoft.Json"),
        "EntityFramework" => Some("EntityFramework"),
        "log4net" => Some("log4net"),
        _ => None,
    }
}

pub fn convert_references(
    references: &[LegacyReference],
    framework: &str,
    resolver: &dyn PackageResolver,
) -> ConversionResult {
    let mut result = ConversionResult::default();
    let mut seen_ids = std::collections::HashSet::new();

    for reference in references {
        match convert_one(reference, framework, resolver) {
            ReferenceFate::Drop => {}
            ReferenceFate::Package(pkg) => {
                let key = pkg.id_key();
                if seen_ids.insert(key) {
                    result.packages.push(pkg);
                } else {
                    tracing::debug!(id = %pkg.id, "discarding duplicate package candidate, first-converted wins");
                }
            }
            ReferenceFate::Unconverted(u) => result.unconverted.push(u),
        }
    }

    result
}

fn convert_one(reference: &LegacyReference, framework: &str, resolver: &dyn PackageResolver) -> ReferenceFate {
    let identity = match AssemblyIdentity::parse(&reference.include) {
        Ok(id) => id,
        Err(_) => {
            return ReferenceFate::Unconverted(UnconvertedReference {
                identity: AssemblyIdentity {
                    name: reference.include.clone(),
                    version: None,
                    culture: None,
                    public_key_token: None,
                },
                hint_path: reference.hint_path.clone(),
                private: reference.private,
                metadata: reference.metadata.clone(),
                reason: "unparseable assembly identity".into(),
            });
        }
    };

    // Step 2: drop framework-intrinsic assemblies with no hint path, silently.
    if reference.hint_path.is_none() && is_framework_intrinsic(framework, &identity.name) {
        return ReferenceFate::Drop;
    }

    // Step 3: framework-aware offline table.
    if let Some(candidate_id) = well_known_package_for_assembly(&identity.name, framework) {
        if let Some(fate) = try_convert_via_id(candidate_id, &identity, resolver) {
            return fate;
        }
    }

    // Step 4: general resolver.
    if let Some(resolution) = resolver.resolve_assembly(&identity, framework) {
        if !resolution.contains_assembly(&identity) {
            return ReferenceFate::Unconverted(UnconvertedReference {
                identity,
                hint_path: reference.hint_path.clone(),
                private: reference.private,
                metadata: reference.metadata.clone(),
                reason: "public-key-token mismatch".into(),
            });
        }
        let mut pkg = PackageReference::new(resolution.id.clone(), resolution.version.clone());
        if let Some(v) = &identity.version {
            if v.to_string() != resolution.version {
                tracing::info!(assembly = %identity.name, requested = %v, resolved = %resolution.version, "package version shifted during conversion");
            }
        }
        pkg.target_framework = Some(framework.to_string());
        return ReferenceFate::Package(pkg);
    }

    // Step 5: nothing resolved.
    ReferenceFate::Unconverted(UnconvertedReference {
        identity,
        hint_path: reference.hint_path.clone(),
        private: reference.private,
        metadata: reference.metadata.clone(),
        reason: "no known package".into(),
    })
}

fn try_convert_via_id(candidate_id: &str, identity: &AssemblyIdentity, resolver: &dyn PackageResolver) -> Option<ReferenceFate> {
    let latest = resolver.resolve_latest(candidate_id, false)?;
    if !resolver.contains_assembly(candidate_id, &latest, identity) {
        return Some(ReferenceFate::Unconverted(UnconvertedReference {
            identity: identity.clone(),
            hint_path: None,
            private: false,
            metadata: BTreeMap::new(),
            reason: "public-key-token mismatch".into(),
        }));
    }
    let version = identity
        .version
        .as_ref()
        .map(|v| format!("{}.{}.{}", v.major, v.minor, v.build))
        .unwrap_or(latest);
    let mut pkg = PackageReference::new(candidate_id, version);
    pkg.metadata.clear();
    Some(ReferenceFate::Package(pkg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::OfflineResolver;

    fn reference(include: &str, hint_path: Option<&str>) -> LegacyReference {
        LegacyReference {
            include: include.to_string(),
            hint_path: hint_path.map(str::to_string),
            private: true,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn converts_newtonsoft_json() {
        let resolver = OfflineResolver::bundled();
        let refs = vec![reference(
            "Newtonsoft.Json, Version=12.0.3, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed",
            Some(r"..\packages\Newtonsoft.Json.12.0.3\lib\net45\Newtonsoft.Json.dll"),
        )];
        let result = convert_references(&refs, "net472", &resolver);
        assert_eq!(result.packages.len(), 1);
        assert_eq!(result.packages[0].id, "Newtonsoft.Json");
        assert!(result.unconverted.is_empty());
    }

    #[test]
    fn token_mismatch_is_preserved() {
        struct MismatchResolver;
        impl PackageResolver for MismatchResolver {
            fn resolve_latest(&self, _id: &str, _include_prerelease: bool) -> Option<String> {
                Some("1.0.0".into())
            }
            fn resolve_assembly(&self, identity: &AssemblyIdentity, _framework: &str) -> Option<crate::package::PackageResolution> {
                Some(crate::package::PackageResolution {
                    id: "Foo".into(),
                    version: "1.0.0".into(),
                    assemblies: vec![AssemblyIdentity::parse(&format!("{}, PublicKeyToken=bbbbbbbbbbbbbbbb", identity.name)).unwrap()],
                })
            }
            fn get_dependencies(&self, _id: &str, _version: &str, _framework: &str) -> Vec<(String, String)> {
                Vec::new()
            }
            fn contains_assembly(&self, _id: &str, _version: &str, _identity: &AssemblyIdentity) -> bool {
                false
            }
        }

        let refs = vec![reference("Foo, Version=1.0.0.0, Culture=neutral, PublicKeyToken=aaaaaaaaaaaaaaaa", None)];
        let result = convert_references(&refs, "net472", &MismatchResolver);
        assert!(result.packages.is_empty());
        assert_eq!(result.unconverted.len(), 1);
        assert_eq!(result.unconverted[0].reason, "public-key-token mismatch");
    }

    #[test]
    fn framework_intrinsic_with_no_hint_path_is_dropped() {
        let resolver = OfflineResolver::bundled();
        let refs = vec![reference("mscorlib", None)];
        let result = convert_references(&refs, "net472", &resolver);
        assert!(result.packages.is_empty());
        assert!(result.unconverted.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first_converted() {
        let resolver = OfflineResolver::bundled();
        let refs = vec![
            reference("Newtonsoft.Json, PublicKeyToken=30ad4fe6b2a6aeed", Some("a")),
            reference("Newtonsoft.Json, PublicKeyToken=30ad4fe6b2a6aeed", Some("b")),
        ];
        let result = convert_references(&refs, "net472", &resolver);
        assert_eq!(result.packages.len(), 1);
    }
}
