//! Project discovery is an external collaborator: the orchestrator depends on the
//! `ProjectDiscovery` trait, never on a concrete walker. This module ships one thin,
//! swappable default.

use std::path::{Path, PathBuf};

pub trait ProjectDiscovery: Send + Sync {
    fn discover(&self, root: &Path) -> std::io::Result<Vec<PathBuf>>;
}

/// Directories never worth descending into while looking for legacy project files.
const IGNORED_DIR_BASENAMES: &[&str] = &[
    ".git",
    "bin",
    "obj",
    "node_modules",
    "packages",
    ".vs",
    ".vscode",
    "target",
    ".sdkmigrate-backups",
];

pub struct RecursiveProjectDiscovery;

impl ProjectDiscovery for RecursiveProjectDiscovery {
    fn discover(&self, root: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        walk(root, &mut found, is_candidate_legacy_project)?;
        Ok(found)
    }
}

/// Finds already-migrated SDK-style projects, for the commands that operate on the
/// *output* of a migration (`clean-deps`, `clean-cpm`) rather than its input.
pub fn discover_sdk_style(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, &mut found, is_sdk_style_project)?;
    Ok(found)
}

fn is_sdk_style_project(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("csproj") {
        return false;
    }
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    contains_sdk_attribute(&contents)
}

fn walk(
    dir: &Path,
    found: &mut Vec<PathBuf>,
    is_candidate: fn(&Path) -> bool,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let basename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if IGNORED_DIR_BASENAMES.iter().any(|ignored| ignored.eq_ignore_ascii_case(basename)) {
                continue;
            }
            walk(&path, found, is_candidate)?;
        } else if is_candidate(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// A `*.csproj`-shaped file whose root element looks like a legacy `Project` (carries
/// `ToolsVersion`, the tell that distinguishes it from an already-SDK-style file).
fn is_candidate_legacy_project(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("csproj") {
        return false;
    }
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    contents.contains("ToolsVersion") && !contains_sdk_attribute(&contents)
}

fn contains_sdk_attribute(contents: &str) -> bool {
    contents.lines().take(5).any(|line| line.contains("<Project Sdk="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_legacy_csproj_and_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("App.csproj"),
            r#"<Project ToolsVersion="15.0"><PropertyGroup></PropertyGroup></Project>"#,
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin").join("Decoy.csproj"), "ignored").unwrap();

        let found = RecursiveProjectDiscovery.discover(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name().unwrap(), "App.csproj");
    }

    #[test]
    fn skips_already_sdk_style_projects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Modern.csproj"),
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>",
        )
        .unwrap();
        let found = RecursiveProjectDiscovery.discover(dir.path()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn discover_sdk_style_finds_only_migrated_projects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Modern.csproj"),
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Legacy.csproj"),
            r#"<Project ToolsVersion="15.0"></Project>"#,
        )
        .unwrap();

        let found = discover_sdk_style(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name().unwrap(), "Modern.csproj");
    }
}
