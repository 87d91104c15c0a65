//! Salesforce DX project discovery.
//!
//! A project is marked by `sfdx-project.json`. Its `packageDirectories`
//! name the package roots to check.

use crate::error::{CheckError, Result};
use crate::models::project::SfdxProject;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const PROJECT_FILE: &str = "sfdx-project.json";

/// Default search depth below the checked root.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Names starting with `.` are never candidates nor searched.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Look for `sfdx-project.json` in `root`, then in its non-hidden
/// subdirectories down to `max_depth` levels, in sorted listing order.
pub fn find_project_file(root: &Path, max_depth: usize) -> Result<Option<PathBuf>> {
    let mut names: Vec<String> = fs::read_dir(root)
        .map_err(|e| CheckError::io(root, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| !is_hidden(name))
        .collect();
    names.sort();

    if names.iter().any(|n| n == PROJECT_FILE) {
        return Ok(Some(root.join(PROJECT_FILE)));
    }
    if max_depth == 0 {
        return Ok(None);
    }
    for name in names {
        let candidate = root.join(&name);
        // Symlinked directories are not followed.
        let is_dir = fs::symlink_metadata(&candidate)
            .map(|m| m.file_type().is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }
        if let Some(found) = find_project_file(&candidate, max_depth - 1)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Parse a project descriptor.
pub fn load_project(descriptor: &Path) -> Result<SfdxProject> {
    let text = fs::read_to_string(descriptor).map_err(|e| CheckError::io(descriptor, e))?;
    serde_json::from_str(&text).map_err(|source| CheckError::Descriptor {
        path: descriptor.to_path_buf(),
        source,
    })
}

/// Declared package paths in declaration order, `\` normalized to `/`.
/// Entries without a `path` are dropped; duplicates are kept.
pub fn project_packages(descriptor: &Path) -> Result<Vec<String>> {
    let project = load_project(descriptor)?;
    Ok(project
        .package_directories
        .unwrap_or_default()
        .into_iter()
        .filter_map(|dir| dir.path)
        .map(|p| p.replace('\\', "/"))
        .collect())
}

/// A declared package and where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Path as declared, `/`-separated.
    pub declared: String,
    /// Declared path joined to the descriptor's directory, `.` components
    /// dropped.
    pub path: PathBuf,
}

/// Drop `.` components so joined paths compare cleanly.
pub fn clean_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Packages resolved against the descriptor's directory, in declaration
/// order.
pub fn resolve_packages(descriptor: &Path) -> Result<Vec<Package>> {
    let base = descriptor.parent().unwrap_or_else(|| Path::new("."));
    Ok(project_packages(descriptor)?
        .into_iter()
        .map(|declared| Package {
            path: clean_path(&base.join(&declared)),
            declared,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(path: &Path, body: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = fs::File::create(path).unwrap();
        writeln!(f, "{}", body).unwrap();
    }

    #[test]
    fn test_find_in_root_and_one_level_down() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        assert_eq!(find_project_file(root, 1).unwrap(), None);

        write(&root.join("b/sfdx-project.json"), "{}");
        write(&root.join("a/sfdx-project.json"), "{}");
        assert_eq!(
            find_project_file(root, 1).unwrap(),
            Some(root.join("a").join(PROJECT_FILE))
        );
        assert_eq!(find_project_file(root, 0).unwrap(), None);

        write(&root.join(PROJECT_FILE), "{}");
        assert_eq!(
            find_project_file(root, 1).unwrap(),
            Some(root.join(PROJECT_FILE))
        );
    }

    #[test]
    fn test_depth_is_bounded_and_hidden_dirs_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("x/y/sfdx-project.json"), "{}");
        write(&root.join(".hidden/sfdx-project.json"), "{}");
        assert_eq!(find_project_file(root, 1).unwrap(), None);
        assert_eq!(
            find_project_file(root, 2).unwrap(),
            Some(root.join("x/y").join(PROJECT_FILE))
        );
    }

    #[test]
    fn test_packages_are_normalized_and_filtered() {
        let dir = tempdir().unwrap();
        let descriptor = dir.path().join(PROJECT_FILE);
        write(
            &descriptor,
            r#"{
  "packageDirectories": [
    { "path": "force-app", "default": true },
    { "package": "no-path" },
    { "path": "libs\\core" },
    { "path": "force-app" }
  ],
  "sourceApiVersion": "60.0"
}"#,
        );
        assert_eq!(
            project_packages(&descriptor).unwrap(),
            vec!["force-app", "libs/core", "force-app"]
        );
        let resolved = resolve_packages(&descriptor).unwrap();
        assert_eq!(resolved[1].declared, "libs/core");
        assert_eq!(resolved[1].path, dir.path().join("libs/core"));
        assert_eq!(resolved.len(), 3);
    }

    #[test]
    fn test_missing_or_null_directories_are_empty() {
        let dir = tempdir().unwrap();
        let descriptor = dir.path().join(PROJECT_FILE);
        write(&descriptor, r#"{"name": "x"}"#);
        assert!(project_packages(&descriptor).unwrap().is_empty());
        write(&descriptor, r#"{"packageDirectories": null}"#);
        assert!(project_packages(&descriptor).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_descriptor_is_an_error() {
        let dir = tempdir().unwrap();
        let descriptor = dir.path().join(PROJECT_FILE);
        write(&descriptor, "{ not json");
        assert!(matches!(
            project_packages(&descriptor),
            Err(CheckError::Descriptor { .. })
        ));
    }

    #[test]
    fn test_resolved_paths_drop_current_dir() {
        let dir = tempdir().unwrap();
        let descriptor = dir.path().join(PROJECT_FILE);
        write(&descriptor, r#"{"packageDirectories": [{"path": "./pkg/./src"}]}"#);
        let resolved = resolve_packages(&descriptor).unwrap();
        assert_eq!(resolved[0].declared, "./pkg/./src");
        assert_eq!(resolved[0].path, dir.path().join("pkg").join("src"));
    }
}
