//! Central package management reconciliation: unions the packages declared across
//! every migrated project and settles on one version per id under the configured
//! strategy.

use std::collections::BTreeMap;

use resolve::version::PackageVersion;
use resolve::PackageReference;

use crate::config::CpmStrategy;

#[derive(Debug, Clone)]
pub struct CpmConflict {
    pub id: String,
    pub versions: Vec<String>,
}

pub struct CpmReconciliation {
    pub packages: Vec<PackageReference>,
    pub conflicts: Vec<CpmConflict>,
}

/// `all_packages` is one slice per project, in discovery order; `ManifestWins` treats
/// the first occurrence across that order as authoritative.
pub fn reconcile(all_packages: &[Vec<PackageReference>], strategy: CpmStrategy) -> CpmReconciliation {
    let mut by_id: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut display_name: BTreeMap<String, String> = BTreeMap::new();

    for project_packages in all_packages {
        for pkg in project_packages {
            let key = pkg.id.to_ascii_lowercase();
            display_name.entry(key.clone()).or_insert_with(|| pkg.id.clone());
            by_id.entry(key).or_default().push(pkg.version.clone());
        }
    }

    let mut packages = Vec::new();
    let mut conflicts = Vec::new();

    for (key, versions) in by_id {
        let id = display_name.remove(&key).unwrap_or(key);
        let distinct: Vec<String> = {
            let mut v = versions.clone();
            v.sort();
            v.dedup();
            v
        };

        if distinct.len() > 1 {
            conflicts.push(CpmConflict { id: id.clone(), versions: distinct.clone() });
        }

        let chosen = match strategy {
            CpmStrategy::ManifestWins => versions.first().cloned().unwrap_or_default(),
            CpmStrategy::HighestWins | CpmStrategy::UserPrompt => highest(&distinct),
        };
        packages.push(PackageReference::new(id, chosen));
    }

    CpmReconciliation { packages, conflicts }
}

fn highest(versions: &[String]) -> String {
    versions
        .iter()
        .max_by(|a, b| match (PackageVersion::parse(a), PackageVersion::parse(b)) {
            (Ok(PackageVersion::Exact(a)), Ok(PackageVersion::Exact(b))) => a.cmp(&b),
            _ => a.cmp(b),
        })
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_wins_picks_the_greater_version() {
        let projects = vec![
            vec![PackageReference::new("Newtonsoft.Json", "9.0.1")],
            vec![PackageReference::new("newtonsoft.json", "12.0.3")],
        ];
        let result = reconcile(&projects, CpmStrategy::HighestWins);
        assert_eq!(result.packages.len(), 1);
        assert_eq!(result.packages[0].version, "12.0.3");
        assert_eq!(result.conflicts.len(), 1);
    }

    #[test]
    fn manifest_wins_keeps_first_declared_version() {
        let projects = vec![
            vec![PackageReference::new("Foo", "2.0.0")],
            vec![PackageReference::new("Foo", "1.0.0")],
        ];
        let result = reconcile(&projects, CpmStrategy::ManifestWins);
        assert_eq!(result.packages[0].version, "2.0.0");
    }

    #[test]
    fn agreeing_versions_produce_no_conflict() {
        let projects = vec![
            vec![PackageReference::new("Foo", "1.0.0")],
            vec![PackageReference::new("Foo", "1.0.0")],
        ];
        let result = reconcile(&projects, CpmStrategy::HighestWins);
        assert!(result.conflicts.is_empty());
    }
}
