//! Configuration discovery and effective settings resolution.
//!
//! apexcheck reads `apexcheck.toml|yaml|yml` from the checked path (or its
//! closest ancestor, stopping at a `.git` directory) and merges it with CLI
//! flags to produce an `Effective` config.
//! Defaults:
//! - `extensions`: `.cls`, `.trigger`
//! - `output`: `human`
//! - `project`: true
//! - `quiet`: false
//! - `max_depth`: 1
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::dispatch::FileKind;
use crate::project::DEFAULT_MAX_DEPTH;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["apexcheck.toml", "apexcheck.yaml", "apexcheck.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `apexcheck.toml|yaml`.
pub struct ApexCheckConfig {
    pub extensions: Option<Vec<String>>,
    pub output: Option<String>,
    pub project: Option<bool>,
    pub quiet: Option<bool>,
    #[serde(alias = "maxDepth")]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    /// Path to check.
    pub path: PathBuf,
    /// Directory the config file was looked up in.
    pub config_root: PathBuf,
    pub extensions: Vec<String>,
    pub output: String,
    pub project: bool,
    pub quiet: bool,
    pub max_depth: usize,
}

/// Walk upward from `start` to find the directory holding the config.
///
/// Stops when an `apexcheck.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_config_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => cur = p,
            _ => return start.to_path_buf(),
        }
    }
}

/// Load `ApexCheckConfig` from `apexcheck.toml` or `apexcheck.yaml|yml` if
/// present. An unreadable or invalid file counts as absent.
pub fn load_config(root: &Path) -> Option<ApexCheckConfig> {
    let toml_path = root.join("apexcheck.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: ApexCheckConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["apexcheck.yaml", "apexcheck.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: ApexCheckConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_path: Option<&str>,
    cli_extensions: Option<&[String]>,
    cli_output: Option<&str>,
    cli_project: Option<bool>,
    cli_quiet: Option<bool>,
) -> Effective {
    let path = PathBuf::from(cli_path.unwrap_or("."));
    // A file path is configured by its directory.
    let start = if path.is_dir() {
        path.clone()
    } else {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };
    let config_root = detect_config_root(&start);
    let cfg = load_config(&config_root).unwrap_or_default();

    let extensions = cli_extensions
        .filter(|e| !e.is_empty())
        .map(|e| e.to_vec())
        .or(cfg.extensions)
        .unwrap_or_else(|| {
            FileKind::DEFAULT
                .iter()
                .map(|k| k.extension().to_string())
                .collect()
        });

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let project = cli_project.or(cfg.project).unwrap_or(true);
    let quiet = cli_quiet.or(cfg.quiet).unwrap_or(false);
    let max_depth = cfg.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);

    Effective {
        path,
        config_root,
        extensions,
        output,
        project,
        quiet,
        max_depth,
    }
}
