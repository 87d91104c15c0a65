//! Processing failures of the batch checker.
//!
//! Syntax errors are not failures: they are collected as `Diagnostic`s.
//! A `CheckError` means a path could not be fully processed and maps to
//! status 1.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// A requested file extension has no grammar entry point.
    #[error("unknown extension '{extension}' (known: {})", known.join(", "))]
    UnknownExtension {
        extension: String,
        known: Vec<String>,
    },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fail-fast parse stopped on the first syntax error.
    #[error("parse aborted in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: crate::listener::SyntaxError,
    },

    /// Directory enumeration failed part way.
    #[error("cannot walk directory: {0}")]
    Walk(#[from] glob::GlobError),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// `sfdx-project.json` exists but is not valid JSON for the schema.
    #[error("invalid project descriptor {}: {source}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CheckError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CheckError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CheckError::UnknownExtension {
            extension: ".java".into(),
            known: vec![".cls".into(), ".trigger".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown extension '.java' (known: .cls, .trigger)"
        );
        let err = CheckError::io(
            "force-app/A.cls",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read force-app/A.cls: denied");
    }
}
