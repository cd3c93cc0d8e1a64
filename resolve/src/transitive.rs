//! Reduces a flat direct package list to its minimal direct set by marking
//! transitively-reachable entries.

use std::collections::{HashMap, HashSet};

use crate::package::PackageReference;

/// One edge of the reachability graph: `from` depends on `to` (both case-folded ids).
pub type DependencyGraph = HashMap<String, HashSet<String>>;

/// When `graph` is empty (e.g. offline mode has no dependency data), every direct
/// package stays non-transitive.
pub fn mark_transitive(packages: &[PackageReference], graph: &DependencyGraph) -> Vec<PackageReference> {
    let direct_ids: HashSet<String> = packages.iter().map(PackageReference::id_key).collect();

    // A package is transitive iff it is reachable from some *other* direct package
    // without the path needing to start at itself.
    let mut reachable_from_other: HashSet<String> = HashSet::new();
    for start in &direct_ids {
        let mut visited = HashSet::new();
        let mut stack: Vec<String> = graph.get(start).into_iter().flatten().cloned().collect();
        while let Some(dep) = stack.pop() {
            if !visited.insert(dep.clone()) {
                continue;
            }
            if direct_ids.contains(&dep) && &dep != start {
                reachable_from_other.insert(dep.clone());
            }
            if let Some(next) = graph.get(&dep) {
                stack.extend(next.iter().cloned());
            }
        }
    }

    packages
        .iter()
        .cloned()
        .map(|mut pkg| {
            let key = pkg.id_key();
            // A package can never mark itself transitive, and a package that is both
            // direct and reachable-from-another stays direct per the tie-break rule.
            pkg.is_transitive = false;
            if reachable_from_other.contains(&key) {
                pkg.is_transitive = true;
            }
            pkg
        })
        .collect()
}

/// The minimal set to keep in the output: all non-transitive packages. Packages marked
/// transitive are omitted unless no other direct package provides the same id —
/// `mark_transitive` already encodes that by only flagging packages reachable *from
/// another* direct entry.
pub fn minimal_direct_set(packages: &[PackageReference]) -> Vec<PackageReference> {
    packages.iter().filter(|p| !p.is_transitive).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn b_depends_on_a_prunes_a() {
        let packages = vec![PackageReference::new("A", "1.0"), PackageReference::new("B", "1.0")];
        let mut graph = DependencyGraph::new();
        graph.insert("b".into(), ["a".into()].into_iter().collect());

        let marked = mark_transitive(&packages, &graph);
        let minimal = minimal_direct_set(&marked);

        assert_eq!(minimal.len(), 1);
        assert_eq!(minimal[0].id, "B");
    }

    #[test]
    fn offline_empty_graph_keeps_everything_direct() {
        let packages = vec![PackageReference::new("A", "1.0"), PackageReference::new("B", "1.0")];
        let graph = DependencyGraph::new();
        let marked = mark_transitive(&packages, &graph);
        assert!(marked.iter().all(|p| !p.is_transitive));
    }

    #[test]
    fn a_package_never_marks_itself_transitive() {
        let packages = vec![PackageReference::new("A", "1.0")];
        let mut graph = DependencyGraph::new();
        graph.insert("a".into(), ["a".into()].into_iter().collect());
        let marked = mark_transitive(&packages, &graph);
        assert!(!marked[0].is_transitive);
    }
}
