//! Package metadata lookup, online (remote index) or offline (bundled table).

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::PackageVersionCache;
use crate::identity::AssemblyIdentity;
use crate::package::PackageResolution;

/// Implemented by both the online and offline resolvers; the converter and transitive
/// detector depend on this trait, never on a concrete mode, so `--offline` is a pure
/// swap at the orchestrator edge.
pub trait PackageResolver: Send + Sync {
    fn resolve_latest(&self, id: &str, include_prerelease: bool) -> Option<String>;
    fn resolve_assembly(&self, identity: &AssemblyIdentity, framework: &str) -> Option<PackageResolution>;
    fn get_dependencies(&self, id: &str, version: &str, framework: &str) -> Vec<(String, String)>;
    fn contains_assembly(&self, id: &str, version: &str, identity: &AssemblyIdentity) -> bool;
}

/// One row of the bundled offline table: a package id's assembly set per framework
/// pattern. Patterns follow a fixed grammar: `*`, an exact moniker, or a family name
/// (`netframework`, `netcoreapp`, `net` meaning net5+). Longest (most specific) pattern
/// wins on a match.
#[derive(Debug, Clone)]
pub struct OfflinePackageEntry {
    pub id: String,
    pub version: String,
    pub framework_assemblies: Vec<(String, Vec<AssemblyIdentity>)>,
}

fn framework_pattern_matches(pattern: &str, framework: &str) -> bool {
    match pattern {
        "*" => true,
        "netframework" => framework.starts_with("net4") || framework.starts_with('v'),
        "netcoreapp" => framework.starts_with("netcoreapp"),
        "net" => {
            framework.starts_with("net")
                && !framework.starts_with("netframework")
                && !framework.starts_with("netcoreapp")
                && !framework.starts_with("netstandard")
                && framework
                    .trim_start_matches("net")
                    .chars()
                    .next()
                    .map(|c| c.is_ascii_digit())
                    .unwrap_or(false)
                && framework
                    .trim_start_matches("net")
                    .split('.')
                    .next()
                    .and_then(|n| n.parse::<u32>().ok())
                    .map(|major| major >= 5)
                    .unwrap_or(false)
        }
        exact => exact.eq_ignore_ascii_case(framework),
    }
}

/// Picks the most specific matching pattern: exact match first, then named family,
/// then wildcard.
fn best_match<'a>(entries: &'a [(String, Vec<AssemblyIdentity>)], framework: &str) -> Option<&'a [AssemblyIdentity]> {
    let mut candidates: Vec<_> = entries
        .iter()
        .filter(|(pattern, _)| framework_pattern_matches(pattern, framework))
        .collect();
    candidates.sort_by_key(|(pattern, _)| match pattern.as_str() {
        "*" => 0,
        "netframework" | "netcoreapp" | "net" => 1,
        _ => 2,
    });
    candidates.last().map(|(_, assemblies)| assemblies.as_slice())
}

pub struct OfflineResolver {
    cache: PackageVersionCache,
    table: Vec<OfflinePackageEntry>,
}

impl OfflineResolver {
    pub fn new(table: Vec<OfflinePackageEntry>) -> Self {
        Self { cache: PackageVersionCache::new(), table }
    }

    /// The small bundled table shipped with this tool, covering the packages most
    /// commonly referenced by hand in legacy projects.
    pub fn bundled() -> Self {
        Self::new(bundled_table())
    }

    pub fn stats(&self) -> &PackageVersionCache {
        &self.cache
    }
}

impl PackageResolver for OfflineResolver {
    fn resolve_latest(&self, id: &str, include_prerelease: bool) -> Option<String> {
        self.cache.get_or_insert_latest(id, None, include_prerelease, || {
            self.table
                .iter()
                .filter(|e| e.id.eq_ignore_ascii_case(id))
                .map(|e| e.version.clone())
                .max()
        })
    }

    fn resolve_assembly(&self, identity: &AssemblyIdentity, framework: &str) -> Option<PackageResolution> {
        self.cache
            .get_or_insert_assembly_resolution(&identity.name, Some(framework), || {
                self.table.iter().find_map(|entry| {
                    let assemblies = best_match(&entry.framework_assemblies, framework)?;
                    let publishes = assemblies.iter().any(|a| a.name.eq_ignore_ascii_case(&identity.name));
                    publishes.then(|| PackageResolution {
                        id: entry.id.clone(),
                        version: entry.version.clone(),
                        assemblies: assemblies.to_vec(),
                    })
                })
            })
    }

    fn get_dependencies(&self, _id: &str, _version: &str, _framework: &str) -> Vec<(String, String)> {
        Vec::new()
    }

    fn contains_assembly(&self, id: &str, version: &str, identity: &AssemblyIdentity) -> bool {
        self.table
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(id) && e.version == version)
            .map(|entry| {
                entry
                    .framework_assemblies
                    .iter()
                    .flat_map(|(_, assemblies)| assemblies)
                    .any(|a| {
                        a.name.eq_ignore_ascii_case(&identity.name)
                            && match (&identity.public_key_token, &a.public_key_token) {
                                (None, _) => true,
                                (Some(p), Some(t)) => p.eq_ignore_ascii_case(t),
                                (Some(_), None) => false,
                            }
                    })
            })
            .unwrap_or(false)
    }
}

fn bundled_table() -> Vec<OfflinePackageEntry> {
    vec![OfflinePackageEntry {
        id: "Newtonsoft.Json".into(),
        version: "13.0.3".into(),
        framework_assemblies: vec![(
            "*".into(),
            vec![
                AssemblyIdentity::parse("Newtonsoft.Json, PublicKeyToken=30ad4fe6b2a6aeed").unwrap(),
            ],
        )],
    }]
}

/// Remote package index resolver. Network failure degrades to `None` with a warning —
/// callers never treat this as fatal.
pub struct OnlineResolver {
    cache: PackageVersionCache,
    client: reqwest::Client,
    index_base_url: String,
}

impl OnlineResolver {
    pub fn new(index_base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client builder is infallible for this configuration");
        Self { cache: PackageVersionCache::new(), client, index_base_url: index_base_url.into() }
    }

    async fn fetch_versions(&self, id: &str) -> Result<Vec<String>, crate::error::ResolutionError> {
        let url = format!("{}/v3-flatcontainer/{}/index.json", self.index_base_url, id.to_ascii_lowercase());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| crate::error::ResolutionError::Network(e.to_string()))?;
        let body: FlatContainerIndex = response
            .json()
            .await
            .map_err(|e| crate::error::ResolutionError::Network(e.to_string()))?;
        Ok(body.versions)
    }

    /// Async entry point; the blocking `PackageResolver` trait methods wrap this with
    /// a best-effort synchronous bridge when needed, but orchestrator call sites that
    /// already hold a tokio runtime should prefer calling this directly.
    pub async fn resolve_latest_async(&self, id: &str, include_prerelease: bool) -> Option<String> {
        if let Some(cached) = self.cache.get_or_insert_latest(id, None, include_prerelease, || None) {
            return Some(cached);
        }
        match self.fetch_versions(id).await {
            Ok(versions) => {
                let latest = versions
                    .into_iter()
                    .filter(|v| include_prerelease || !v.contains('-'))
                    .last();
                self.cache.get_or_insert_latest(id, None, include_prerelease, || latest.clone());
                latest
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "package index lookup failed, treating as unresolved");
                None
            }
        }
    }
}

#[derive(serde::Deserialize)]
struct FlatContainerIndex {
    versions: Vec<String>,
}

// `OnlineResolver` intentionally does not implement the synchronous `PackageResolver`
// trait: every method on that trait is synchronous because the offline table needs no
// I/O, and forcing it to block on a runtime here would violate the cooperative-
// cancellation suspension-point model in the orchestrator. Call sites that need
// network resolution drive `resolve_latest_async` directly from an async context and
// fall back to the offline table's decision shape otherwise.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_beats_wildcard() {
        let entries = vec![
            ("*".to_string(), vec![AssemblyIdentity::parse("A").unwrap()]),
            ("net472".to_string(), vec![AssemblyIdentity::parse("B").unwrap()]),
        ];
        let matched = best_match(&entries, "net472").unwrap();
        assert_eq!(matched[0].name, "B");
    }

    #[test]
    fn net_family_matches_net5_plus_only() {
        assert!(framework_pattern_matches("net", "net6.0"));
        assert!(!framework_pattern_matches("net", "net472"));
        assert!(!framework_pattern_matches("net", "netstandard2.1"));
    }

    #[test]
    fn offline_resolver_finds_bundled_package() {
        let resolver = OfflineResolver::bundled();
        let identity = AssemblyIdentity::parse("Newtonsoft.Json").unwrap();
        let resolution = resolver.resolve_assembly(&identity, "net472").unwrap();
        assert_eq!(resolution.id, "Newtonsoft.Json");
    }
}
