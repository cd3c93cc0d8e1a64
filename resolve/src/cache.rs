//! Thread-safe memoization of the three kinds of lookups the resolver performs. No
//! condition variables — each map is a plain mutex-guarded upsert; callers may
//! double-compute on a first miss, which is accepted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::package::{DependencyEdge, PackageResolution};

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl CacheStats {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LatestKey {
    id: String,
    framework: Option<String>,
    include_prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AllVersionsKey {
    id: String,
    include_prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AssemblyKey {
    assembly_name: String,
    framework: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DependencyKey {
    id: String,
    version: String,
    framework: Option<String>,
}

/// Four independently-locked maps. Nothing is ever evicted; `clear` exists only for
/// tests that need a clean cache between cases.
#[derive(Debug, Default)]
pub struct PackageVersionCache {
    latest: Mutex<HashMap<LatestKey, Option<String>>>,
    all_versions: Mutex<HashMap<AllVersionsKey, Vec<String>>>,
    assembly_resolutions: Mutex<HashMap<AssemblyKey, Option<PackageResolution>>>,
    dependencies: Mutex<HashMap<DependencyKey, Vec<(String, String)>>>,
    pub latest_stats: CacheStats,
    pub all_versions_stats: CacheStats,
    pub assembly_stats: CacheStats,
    pub dependency_stats: CacheStats,
}

impl PackageVersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_latest(
        &self,
        id: &str,
        framework: Option<&str>,
        include_prerelease: bool,
        compute: impl FnOnce() -> Option<String>,
    ) -> Option<String> {
        let key = LatestKey {
            id: id.to_ascii_lowercase(),
            framework: framework.map(str::to_string),
            include_prerelease,
        };
        let mut map = self.latest.lock().expect("package version cache poisoned");
        if let Some(existing) = map.get(&key) {
            self.latest_stats.hit();
            return existing.clone();
        }
        self.latest_stats.miss();
        let value = compute();
        map.insert(key, value.clone());
        value
    }

    pub fn get_or_insert_all_versions(
        &self,
        id: &str,
        include_prerelease: bool,
        compute: impl FnOnce() -> Vec<String>,
    ) -> Vec<String> {
        let key = AllVersionsKey { id: id.to_ascii_lowercase(), include_prerelease };
        let mut map = self.all_versions.lock().expect("package version cache poisoned");
        if let Some(existing) = map.get(&key) {
            self.all_versions_stats.hit();
            return existing.clone();
        }
        self.all_versions_stats.miss();
        let value = compute();
        map.insert(key, value.clone());
        value
    }

    pub fn get_or_insert_assembly_resolution(
        &self,
        assembly_name: &str,
        framework: Option<&str>,
        compute: impl FnOnce() -> Option<PackageResolution>,
    ) -> Option<PackageResolution> {
        let key = AssemblyKey {
            assembly_name: assembly_name.to_ascii_lowercase(),
            framework: framework.map(str::to_string),
        };
        let mut map = self.assembly_resolutions.lock().expect("package version cache poisoned");
        if let Some(existing) = map.get(&key) {
            self.assembly_stats.hit();
            return existing.clone();
        }
        self.assembly_stats.miss();
        let value = compute();
        map.insert(key, value.clone());
        value
    }

    pub fn get_or_insert_dependencies(
        &self,
        id: &str,
        version: &str,
        framework: Option<&str>,
        compute: impl FnOnce() -> Vec<(String, String)>,
    ) -> Vec<(String, String)> {
        let key = DependencyKey {
            id: id.to_ascii_lowercase(),
            version: version.to_string(),
            framework: framework.map(str::to_string),
        };
        let mut map = self.dependencies.lock().expect("package version cache poisoned");
        if let Some(existing) = map.get(&key) {
            self.dependency_stats.hit();
            return existing.clone();
        }
        self.dependency_stats.miss();
        let value = compute();
        map.insert(key, value.clone());
        value
    }

    /// Dependency edges as typed `DependencyEdge`s, for callers that want the richer shape.
    pub fn dependency_edges(&self, id: &str, version: &str, framework: &str) -> Option<DependencyEdge> {
        let map = self.dependencies.lock().expect("package version cache poisoned");
        let key = DependencyKey {
            id: id.to_ascii_lowercase(),
            version: version.to_string(),
            framework: Some(framework.to_string()),
        };
        map.get(&key).map(|deps| DependencyEdge {
            from_id: id.to_string(),
            from_version: version.to_string(),
            framework: framework.to_string(),
            dependencies: deps.clone(),
        })
    }

    pub fn clear(&self) {
        self.latest.lock().expect("package version cache poisoned").clear();
        self.all_versions.lock().expect("package version cache poisoned").clear();
        self.assembly_resolutions.lock().expect("package version cache poisoned").clear();
        self.dependencies.lock().expect("package version cache poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn second_call_with_same_key_is_a_hit() {
        let cache = PackageVersionCache::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::Relaxed);
            Some("1.0.0".to_string())
        };
        assert_eq!(cache.get_or_insert_latest("Foo", None, false, compute), Some("1.0.0".into()));
        assert_eq!(cache.get_or_insert_latest("foo", None, false, compute), Some("1.0.0".into()));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        let (hits, misses) = cache.latest_stats.snapshot();
        assert_eq!((hits, misses), (1, 1));
    }

    #[test]
    fn clear_resets_state_but_not_counters() {
        let cache = PackageVersionCache::new();
        cache.get_or_insert_latest("Foo", None, false, || Some("1.0.0".into()));
        cache.clear();
        let mut seen_second_compute = false;
        cache.get_or_insert_latest("Foo", None, false, || {
            seen_second_compute = true;
            Some("1.0.0".into())
        });
        assert!(seen_second_compute);
    }
}
