//! Batch syntax checking of files, directories and SFDX projects.
//!
//! `check_path` parses every matching file below one root with a
//! collect-all listener. `check_project` runs it once per package declared
//! in `sfdx-project.json`, packages in parallel, each with its own
//! diagnostics. Syntax errors never change a result's status; only
//! processing failures (status 1) and a missing root (status 2) do.

use crate::dispatch::{resolve_extensions, FileKind};
use crate::error::{CheckError, Result};
use crate::factory::create_parser;
use crate::listener::ErrorListener;
use crate::models::{worst_status, CheckResult, Diagnostic, ProjectCheckResult, Status};
use crate::project::{clean_path, find_project_file, resolve_packages, Package, DEFAULT_MAX_DEPTH};
use glob::{glob, Pattern};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Path of `path` relative to `root`, with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() {
        ".".to_string()
    } else {
        s
    }
}

/// True when `path`, or a directory between `root` and it, is a symlink.
fn through_symlink(root: &Path, path: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    let mut cur = root.to_path_buf();
    for part in rel.components() {
        cur.push(part);
        if fs::symlink_metadata(&cur)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
        {
            return true;
        }
    }
    false
}

/// Regular files below `root`, sorted.
fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        let is_file = fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_file())
            .unwrap_or(false);
        if is_file && !through_symlink(root, &path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, kind: FileKind) -> bool {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()) == kind.extension())
        .unwrap_or(false)
}

/// Parse `text` as `kind`, tagging diagnostics with `rel`. With
/// `fail_fast` the first syntax error aborts the parse as `CheckError::Parse`.
pub fn check_source(
    rel: &str,
    text: &str,
    kind: FileKind,
    fail_fast: bool,
) -> Result<Vec<Diagnostic>> {
    let aborted = |source| CheckError::Parse {
        path: rel.to_string(),
        source,
    };
    let mut parser = create_parser(text, fail_fast).map_err(aborted)?;
    parser.add_error_listener(ErrorListener::echoing(rel));
    kind.parse(&mut parser).map_err(aborted)?;
    Ok(parser
        .take_error_listeners()
        .into_iter()
        .flat_map(ErrorListener::into_diagnostics)
        .collect())
}

/// Parse one file with a fresh parser and return its diagnostics.
///
/// Bytes that are not valid UTF-8 are replaced, never rejected.
pub fn check_file(root: &Path, file: &Path, kind: FileKind) -> Result<Vec<Diagnostic>> {
    let bytes = fs::read(file).map_err(|e| CheckError::io(file, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let rel = relative_path(root, file);
    let errors = check_source(&rel, &text, kind, false)?;
    if !errors.is_empty() {
        info!("Found {} syntax errors in: {}", errors.len(), rel);
    }
    Ok(errors)
}

/// Parses `files` matching each kind, grouped by kind, appending to
/// `errors` as it goes so a failure keeps what was collected before it.
fn parse_files(
    root: &Path,
    files: &[PathBuf],
    kinds: &[FileKind],
    errors: &mut Vec<Diagnostic>,
) -> Result<()> {
    for &kind in kinds {
        let mut parsed = 0usize;
        for file in files.iter().filter(|f| has_extension(f, kind)) {
            errors.extend(check_file(root, file, kind)?);
            parsed += 1;
        }
        info!(
            "Parsed {} '{}' files in: {}",
            parsed,
            kind.extension(),
            root.display()
        );
    }
    Ok(())
}

/// Check every file below `root` whose extension is requested. An empty
/// request checks `.cls` and `.trigger` files.
pub fn check_path<S: AsRef<str>>(root: &Path, extensions: &[S]) -> CheckResult {
    let kinds = match resolve_extensions(extensions) {
        Ok(k) => k,
        Err(e) => {
            error!("{e}");
            return CheckResult {
                status: Status::Failed,
                extensions: extensions.iter().map(|e| e.as_ref().to_string()).collect(),
                errors: Vec::new(),
            };
        }
    };
    check_kinds(root, &kinds)
}

fn check_kinds(root: &Path, kinds: &[FileKind]) -> CheckResult {
    let mut result = CheckResult {
        status: Status::Clean,
        extensions: kinds.iter().map(|k| k.extension().to_string()).collect(),
        errors: Vec::new(),
    };
    if !root.exists() {
        warn!("Path does not exist, aborting: {}", root.display());
        result.status = Status::Missing;
        return result;
    }
    let outcome =
        list_files(root).and_then(|files| parse_files(root, &files, kinds, &mut result.errors));
    if let Err(e) = outcome {
        error!("Error processing: {}: {e}", root.display());
        result.status = Status::Failed;
    }
    result
}

/// Display name of a project root: its last path component.
fn project_name(root: &Path) -> String {
    let resolved = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| resolved.to_string_lossy().to_string())
}

/// Check a project root, one result per declared package.
pub fn check_project<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Vec<ProjectCheckResult> {
    check_project_with_depth(root, extensions, DEFAULT_MAX_DEPTH)
}

/// As `check_project`, searching for the descriptor down to `max_depth`.
pub fn check_project_with_depth<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    max_depth: usize,
) -> Vec<ProjectCheckResult> {
    let name = project_name(root);
    let whole = |result: CheckResult| {
        vec![ProjectCheckResult {
            name: name.clone(),
            path: ".".to_string(),
            pkg: None,
            result,
        }]
    };

    let kinds = match resolve_extensions(extensions) {
        Ok(k) => k,
        Err(_) => return whole(check_path(root, extensions)),
    };
    if !root.is_dir() {
        return whole(check_kinds(root, &kinds));
    }

    let packages = match discover(root, max_depth) {
        Ok(found) => found,
        Err(e) => {
            error!("[{name}]: Error processing: {e}");
            return whole(CheckResult {
                status: Status::Failed,
                extensions: kinds.iter().map(|k| k.extension().to_string()).collect(),
                errors: Vec::new(),
            });
        }
    };
    if packages.is_empty() {
        info!("[{name}]: No valid SFDX project, checking all files");
        return whole(check_kinds(root, &kinds));
    }

    let base = clean_path(root);
    packages
        .par_iter()
        .map(|pkg| {
            info!("[{name}]: Checking package \"{}\"", pkg.declared);
            ProjectCheckResult {
                name: name.clone(),
                path: relative_path(&base, &pkg.path),
                pkg: Some(pkg.declared.clone()),
                result: check_kinds(&pkg.path, &kinds),
            }
        })
        .collect()
}

/// Declared packages of the descriptor found below `root`; empty when
/// there is none.
fn discover(root: &Path, max_depth: usize) -> Result<Vec<Package>> {
    match find_project_file(root, max_depth)? {
        Some(descriptor) => resolve_packages(&descriptor),
        None => Ok(Vec::new()),
    }
}

/// Process exit code for a run: the worst status across results.
pub fn exit_status(results: &[ProjectCheckResult]) -> u8 {
    worst_status(results.iter().map(|r| &r.result)).code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(path: &Path, body: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = fs::File::create(path).unwrap();
        writeln!(f, "{}", body).unwrap();
    }

    const DEFAULT: [&str; 0] = [];

    #[test]
    fn test_missing_path_is_status_2() {
        let dir = tempdir().unwrap();
        let r = check_path(&dir.path().join("nope"), &DEFAULT);
        assert_eq!(r.status, Status::Missing);
        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_unknown_extension_fails_before_reading() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("A.cls"), "public class A {");
        let r = check_path(dir.path(), &["cls", "java"]);
        assert_eq!(r.status, Status::Failed);
        assert!(r.errors.is_empty());
    }

    #[test]
    fn test_collects_relative_diagnostics_in_kind_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("classes/Good.cls"), "public class Good { }");
        write(&root.join("classes/Bad.cls"), "public class Bad {");
        write(
            &root.join("triggers/T.trigger"),
            "trigger T on Account (before insert) { Integer x = ; }",
        );
        write(&root.join("notes.txt"), "public class {");

        let r = check_path(root, &DEFAULT);
        assert_eq!(r.status, Status::Clean);
        assert_eq!(r.extensions, vec![".cls", ".trigger"]);
        let paths: Vec<&str> = r.errors.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["classes/Bad.cls", "triggers/T.trigger"]);
        assert_eq!(r.errors[0].message, "missing '}' at '<EOF>'");

        let only_triggers = check_path(root, &["trigger"]);
        assert_eq!(only_triggers.errors.len(), 1);
    }

    #[test]
    fn test_status_stays_clean_with_syntax_errors_and_runs_are_identical() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("X.cls"), "class X { void m() { if (x) } }");
        let first = check_path(dir.path(), &DEFAULT);
        let second = check_path(dir.path(), &DEFAULT);
        assert_eq!(first.status, Status::Clean);
        assert!(!first.errors.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_anonymous_files_only_on_request() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("run.apex"), "Integer i = ;");
        assert!(check_path(dir.path(), &DEFAULT).errors.is_empty());
        assert_eq!(check_path(dir.path(), &[".apex"]).errors.len(), 1);
    }

    #[test]
    fn test_project_without_descriptor_checks_whole_root() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("src/A.cls"), "class A {");
        let results = check_project(dir.path(), &DEFAULT);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, ".");
        assert_eq!(results[0].pkg, None);
        assert_eq!(results[0].result.errors[0].path, "src/A.cls");
        assert_eq!(exit_status(&results), 0);
    }

    #[test]
    fn test_project_packages_with_one_missing() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("sfdx-project.json"),
            r#"{"packageDirectories": [{"path": "force-app"}, {"path": "gone"}]}"#,
        );
        write(&root.join("force-app/main/A.cls"), "public class A { }");

        let results = check_project(root, &DEFAULT);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, "force-app");
        assert_eq!(results[0].pkg.as_deref(), Some("force-app"));
        assert_eq!(results[0].result.status, Status::Clean);
        assert_eq!(results[1].path, "gone");
        assert_eq!(results[1].result.status, Status::Missing);
        assert_eq!(exit_status(&results), 2);
    }

    #[test]
    fn test_descriptor_one_level_down() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("app/sfdx-project.json"),
            r#"{"packageDirectories": [{"path": "./pkg"}]}"#,
        );
        write(&root.join("app/pkg/B.cls"), "class B { Integer x }");

        let results = check_project(root, &DEFAULT);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "app/pkg");
        assert_eq!(results[0].pkg.as_deref(), Some("./pkg"));
        assert_eq!(results[0].result.errors[0].path, "B.cls");
    }

    #[test]
    fn test_malformed_descriptor_fails_the_project() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("sfdx-project.json"), "{ nope");
        let results = check_project(dir.path(), &DEFAULT);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result.status, Status::Failed);
        assert_eq!(exit_status(&results), 1);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(Path::new("/a/b"), Path::new("/a/b/c/D.cls")), "c/D.cls");
        assert_eq!(relative_path(Path::new("/a/b"), Path::new("/a/b")), ".");
    }

    #[test]
    fn test_invalid_utf8_does_not_stop_the_package() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("A.cls"), b"public class A { String s = '\xe9'; }").unwrap();
        write(&root.join("B.cls"), "public class B {");

        let r = check_path(root, &DEFAULT);
        assert_eq!(r.status, Status::Clean);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].path, "B.cls");
    }

    #[test]
    fn test_failure_keeps_earlier_diagnostics() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("A.cls"), "public class A {");
        let files = vec![root.join("A.cls"), root.join("B.cls"), root.join("C.cls")];
        write(&root.join("C.cls"), "public class C {");

        let mut errors = Vec::new();
        let outcome = parse_files(root, &files, &[FileKind::Class], &mut errors);
        assert!(matches!(outcome, Err(CheckError::Io { .. })));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "A.cls");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_fails_with_collected_errors() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("A.cls"), "public class A {");
        write(&root.join("B.cls"), "public class B { }");
        let locked = root.join("B.cls");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Privileged users read through permissions.
            return;
        }

        let r = check_path(root, &DEFAULT);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(r.status, Status::Failed);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].path, "A.cls");
    }

    #[test]
    fn test_fail_fast_source_is_a_processing_error() {
        match check_source("A.cls", "class A {", FileKind::Class, true) {
            Err(CheckError::Parse { path, source }) => {
                assert_eq!(path, "A.cls");
                assert_eq!(source.message, "missing '}' at '<EOF>'");
            }
            other => panic!("unexpected: {other:?}"),
        }
        let errors = check_source("A.cls", "class A {", FileKind::Class, false).unwrap();
        assert_eq!(errors.len(), 1);
    }
}
