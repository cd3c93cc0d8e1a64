//! The transitive assembly set provided by a direct package list under a target
//! framework. Prefers a high-fidelity external restore; falls back to the cached
//! archive + compatibility-provider path when no restore tool is available.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ToolingError;
use crate::identity::AssemblyIdentity;
use crate::package::PackageReference;

const RESTORE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ResolvedAssembly {
    pub package_id: String,
    pub identity: AssemblyIdentity,
    pub compile_time: bool,
    pub runtime: bool,
}

#[derive(Debug, Clone)]
pub struct AssetResolution {
    pub assemblies: Vec<ResolvedAssembly>,
    /// Set by the fallback path: the compatibility provider couldn't find an exact
    /// framework group for every package, so callers should surface a warning.
    pub is_partial: bool,
}

/// Abstraction over "run an external restore tool". Production code shells out to the
/// real tool; tests substitute a fixture.
pub trait ExternalRestore: Send + Sync {
    fn restore(&self, project_path: &std::path::Path) -> Result<PathBuf, ToolingError>;
}

pub struct AssetsResolver<R> {
    restore: Arc<R>,
}

impl<R: ExternalRestore + 'static> AssetsResolver<R> {
    pub fn new(restore: R) -> Self {
        Self { restore: Arc::new(restore) }
    }

    /// High-fidelity path: synthesize a minimal project declaring only `packages`,
    /// restore it in a fresh temp directory, parse the resulting lock file. The temp
    /// directory and its contents are released on every exit path via `TempDir`'s drop.
    pub async fn resolve(
        &self,
        packages: &[PackageReference],
        framework: &str,
    ) -> Result<AssetResolution, ToolingError> {
        let temp_dir = tempfile::tempdir()?;
        let project_path = temp_dir.path().join("_restore_probe.csproj");
        std::fs::write(&project_path, synthesize_probe_project(packages, framework))?;

        let restore = Arc::clone(&self.restore);
        let project_path_owned = project_path.clone();
        let lock_path = tokio::time::timeout(
            RESTORE_TIMEOUT,
            tokio::task::spawn_blocking(move || restore.restore(&project_path_owned)),
        )
        .await
        .map_err(|_| ToolingError::Timeout)?
        .map_err(|_| ToolingError::RestoreFailed("restore task panicked".into()))??;

        let assemblies = parse_lock_file(&lock_path)?;
        Ok(AssetResolution { assemblies, is_partial: false })
    }

    /// Fallback path: no restore tool available (or it failed). For each direct
    /// package, look up its cached archive and pick the best framework-specific
    /// assembly group (exact > highest-version-compatible > nothing).
    pub fn resolve_fallback(
        &self,
        packages: &[PackageReference],
        framework: &str,
        archive_lookup: impl Fn(&str, &str) -> Option<Vec<(String, Vec<AssemblyIdentity>)>>,
    ) -> AssetResolution {
        let mut assemblies = Vec::new();
        let mut any_missing = false;
        for pkg in packages {
            match archive_lookup(&pkg.id, &pkg.version) {
                Some(groups) => match best_framework_group(&groups, framework) {
                    Some(group) => {
                        for identity in group {
                            assemblies.push(ResolvedAssembly {
                                package_id: pkg.id.clone(),
                                identity: identity.clone(),
                                compile_time: true,
                                runtime: true,
                            });
                        }
                    }
                    None => any_missing = true,
                },
                None => any_missing = true,
            }
        }
        AssetResolution { assemblies, is_partial: any_missing }
    }
}

fn best_framework_group<'a>(
    groups: &'a [(String, Vec<AssemblyIdentity>)],
    framework: &str,
) -> Option<&'a [AssemblyIdentity]> {
    groups
        .iter()
        .find(|(g, _)| g.eq_ignore_ascii_case(framework))
        .or_else(|| groups.iter().max_by_key(|(g, _)| g.clone()))
        .map(|(_, assemblies)| assemblies.as_slice())
}

fn synthesize_probe_project(packages: &[PackageReference], framework: &str) -> String {
    let mut refs = String::new();
    for pkg in packages {
        refs.push_str(&format!(
            "    <PackageReference Include=\"{}\" Version=\"{}\" />\n",
            pkg.id, pkg.version
        ));
    }
    format!(
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>{framework}</TargetFramework>\n  </PropertyGroup>\n  <ItemGroup>\n{refs}  </ItemGroup>\n</Project>\n"
    )
}

/// Parses the restore tool's lock file into the flat assembly list. The lock file
/// format here is a small JSON document `{ "libraries": [{ "id", "compile": [...], "runtime": [...] }] }`
/// rather than the full upstream schema, matching what this tool's synthesized probe
/// project actually needs out of a restore.
fn parse_lock_file(path: &std::path::Path) -> Result<Vec<ResolvedAssembly>, ToolingError> {
    #[derive(serde::Deserialize)]
    struct LockFile {
        libraries: Vec<LockLibrary>,
    }
    #[derive(serde::Deserialize)]
    struct LockLibrary {
        id: String,
        compile: Vec<String>,
        runtime: Vec<String>,
    }

    let raw = std::fs::read_to_string(path)?;
    let lock: LockFile = serde_json::from_str(&raw)
        .map_err(|e| ToolingError::RestoreFailed(format!("unreadable lock file: {e}")))?;

    let mut assemblies = Vec::new();
    for lib in lock.libraries {
        for name in &lib.compile {
            if let Ok(identity) = AssemblyIdentity::parse(name) {
                assemblies.push(ResolvedAssembly {
                    package_id: lib.id.clone(),
                    identity,
                    compile_time: true,
                    runtime: false,
                });
            }
        }
        for name in &lib.runtime {
            if let Ok(identity) = AssemblyIdentity::parse(name) {
                assemblies.push(ResolvedAssembly {
                    package_id: lib.id.clone(),
                    identity,
                    compile_time: false,
                    runtime: true,
                });
            }
        }
    }
    Ok(assemblies)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureRestore {
        lock_contents: &'static str,
    }

    impl ExternalRestore for FixtureRestore {
        fn restore(&self, project_path: &std::path::Path) -> Result<PathBuf, ToolingError> {
            let lock_path = project_path.with_extension("lock.json");
            std::fs::write(&lock_path, self.lock_contents)?;
            Ok(lock_path)
        }
    }

    #[tokio::test]
    async fn high_fidelity_path_parses_lock_file() {
        let restore = FixtureRestore {
            lock_contents: r#"{"libraries":[{"id":"Newtonsoft.Json","compile":["Newtonsoft.Json"],"runtime":["Newtonsoft.Json"]}]}"#,
        };
        let resolver = AssetsResolver::new(restore);
        let packages = vec![PackageReference::new("Newtonsoft.Json", "13.0.3")];
        let resolution = resolver.resolve(&packages, "net8.0").await.unwrap();
        assert!(!resolution.is_partial);
        assert_eq!(resolution.assemblies.len(), 2);
    }

    #[test]
    fn fallback_path_sets_partial_on_missing_archive() {
        struct NoopRestore;
        impl ExternalRestore for NoopRestore {
            fn restore(&self, _project_path: &std::path::Path) -> Result<PathBuf, ToolingError> {
                Err(ToolingError::RestoreFailed("no tool installed".into()))
            }
        }
        let resolver = AssetsResolver::new(NoopRestore);
        let packages = vec![PackageReference::new("Missing.Package", "1.0.0")];
        let resolution = resolver.resolve_fallback(&packages, "net472", |_, _| None);
        assert!(resolution.is_partial);
        assert!(resolution.assemblies.is_empty());
    }
}
