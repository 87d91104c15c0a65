//! File extension to grammar entry point mapping.

use crate::error::{CheckError, Result};
use crate::grammar::{ParseTree, Parser};
use crate::listener::SyntaxError;

/// Kind of Apex source, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.cls`: one top-level class, interface or enum.
    Class,
    /// `.trigger`
    Trigger,
    /// `.apex`: anonymous script.
    Anonymous,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Class, FileKind::Trigger, FileKind::Anonymous];

    /// Checked when no extensions are requested.
    pub const DEFAULT: [FileKind; 2] = [FileKind::Class, FileKind::Trigger];

    /// Extension with its leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Class => ".cls",
            FileKind::Trigger => ".trigger",
            FileKind::Anonymous => ".apex",
        }
    }

    /// Accepts `cls` and `.cls` spellings, case-sensitively.
    pub fn from_extension(ext: &str) -> Option<FileKind> {
        let dotted = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        };
        FileKind::ALL.into_iter().find(|k| k.extension() == dotted)
    }

    /// Runs the entry point for this kind of file.
    pub fn parse(self, parser: &mut Parser) -> std::result::Result<ParseTree, SyntaxError> {
        match self {
            FileKind::Class => parser.compilation_unit(),
            FileKind::Trigger => parser.trigger_unit(),
            FileKind::Anonymous => parser.anonymous_unit(),
        }
    }
}

pub fn known_extensions() -> Vec<String> {
    FileKind::ALL
        .iter()
        .map(|k| k.extension().to_string())
        .collect()
}

/// Validates requested extensions, keeping their order. An empty request
/// means the default set. Fails on the first unknown one.
pub fn resolve_extensions<S: AsRef<str>>(requested: &[S]) -> Result<Vec<FileKind>> {
    if requested.is_empty() {
        return Ok(FileKind::DEFAULT.to_vec());
    }
    requested
        .iter()
        .map(|ext| {
            let ext = ext.as_ref();
            FileKind::from_extension(ext).ok_or_else(|| CheckError::UnknownExtension {
                extension: ext.to_string(),
                known: known_extensions(),
            })
        })
        .collect()
}
