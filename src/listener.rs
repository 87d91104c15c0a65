//! Syntax error reporting policies.
//!
//! Lexers and parsers report every syntax error through the listeners
//! attached to them. The policy is chosen by the caller when attaching:
//! - `Throwing` stops the parse at the first error by returning `Err`.
//! - `Collecting` records a `Diagnostic` per error and lets recovery go on.
//! - `Counting` only counts, for cheap pass/fail checks.

use crate::models::Diagnostic;
use std::io::{self, Write};
use thiserror::Error;

/// Structured syntax error raised by the fail-fast policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}:{column} {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Error listener attached to a lexer or parser.
#[derive(Debug, Clone)]
pub enum ErrorListener {
    Throwing,
    Collecting {
        path: String,
        errors: Vec<Diagnostic>,
        /// Also write each diagnostic as a JSON line to stderr.
        echo: bool,
    },
    Counting(usize),
}

impl ErrorListener {
    pub fn throwing() -> Self {
        ErrorListener::Throwing
    }

    /// Collect-all listener tagging diagnostics with `path`.
    pub fn collecting(path: impl Into<String>) -> Self {
        ErrorListener::Collecting {
            path: path.into(),
            errors: Vec::new(),
            echo: false,
        }
    }

    /// Collect-all listener that also emits the diagnostic line protocol.
    pub fn echoing(path: impl Into<String>) -> Self {
        ErrorListener::Collecting {
            path: path.into(),
            errors: Vec::new(),
            echo: true,
        }
    }

    pub fn counting() -> Self {
        ErrorListener::Counting(0)
    }

    /// Report one syntax error at a 1-based `line`/`column`.
    pub fn syntax_error(
        &mut self,
        line: usize,
        column: usize,
        message: &str,
    ) -> Result<(), SyntaxError> {
        match self {
            ErrorListener::Throwing => Err(SyntaxError {
                line,
                column,
                message: message.to_string(),
            }),
            ErrorListener::Collecting { path, errors, echo } => {
                let diag = Diagnostic {
                    column,
                    line,
                    message: message.to_string(),
                    path: path.clone(),
                };
                if *echo {
                    // to stderr for filtering if needed
                    if let Err(e) = write_diagnostic_line(&mut io::stderr().lock(), &diag) {
                        tracing::debug!("cannot echo diagnostic for {}: {e}", diag.path);
                    }
                }
                errors.push(diag);
                Ok(())
            }
            ErrorListener::Counting(n) => {
                *n += 1;
                Ok(())
            }
        }
    }

    /// Diagnostics recorded so far; empty for non-collecting policies.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ErrorListener::Collecting { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            ErrorListener::Collecting { errors, .. } => errors,
            _ => Vec::new(),
        }
    }

    /// Number of errors seen by a collecting or counting listener.
    pub fn error_count(&self) -> usize {
        match self {
            ErrorListener::Throwing => 0,
            ErrorListener::Collecting { errors, .. } => errors.len(),
            ErrorListener::Counting(n) => *n,
        }
    }
}

/// Writes `diag` as one JSON line: `{"column":..,"line":..,"message":..,"path":..}`.
pub fn write_diagnostic_line(out: &mut impl Write, diag: &Diagnostic) -> io::Result<()> {
    serde_json::to_writer(&mut *out, diag)?;
    writeln!(out)
}

/// Forward one error to each listener in attachment order.
///
/// A throwing listener stops the dispatch; listeners after it never see
/// the error.
pub(crate) fn dispatch(
    listeners: &mut [ErrorListener],
    line: usize,
    column: usize,
    message: &str,
) -> Result<(), SyntaxError> {
    for l in listeners.iter_mut() {
        l.syntax_error(line, column, message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throwing_returns_structured_error() {
        let mut l = ErrorListener::throwing();
        let err = l.syntax_error(3, 7, "missing ';' at '}'").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 7);
        assert_eq!(err.to_string(), "line 3:7 missing ';' at '}'");
    }

    #[test]
    fn test_collecting_tags_path_and_keeps_order() {
        let mut l = ErrorListener::collecting("classes/Foo.cls");
        l.syntax_error(1, 2, "first").unwrap();
        l.syntax_error(4, 1, "second").unwrap();
        let d = l.diagnostics();
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].path, "classes/Foo.cls");
        assert_eq!(d[0].message, "first");
        assert_eq!(d[1].line, 4);
        assert_eq!(l.error_count(), 2);
    }

    #[test]
    fn test_counting_only_counts() {
        let mut l = ErrorListener::counting();
        for _ in 0..3 {
            l.syntax_error(1, 1, "x").unwrap();
        }
        assert_eq!(l.error_count(), 3);
        assert!(l.diagnostics().is_empty());
    }

    #[test]
    fn test_dispatch_stops_at_throwing_listener() {
        let mut listeners = vec![
            ErrorListener::counting(),
            ErrorListener::throwing(),
            ErrorListener::counting(),
        ];
        assert!(dispatch(&mut listeners, 1, 1, "boom").is_err());
        assert_eq!(listeners[0].error_count(), 1);
        assert_eq!(listeners[2].error_count(), 0);
    }

    #[test]
    fn test_diagnostic_line_protocol() {
        let mut l = ErrorListener::echoing("triggers/T.trigger");
        l.syntax_error(2, 5, "missing ';' at '}'").unwrap();
        let mut out: Vec<u8> = Vec::new();
        write_diagnostic_line(&mut out, &l.diagnostics()[0]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"column\":5,\"line\":2,\"message\":\"missing ';' at '}'\",\"path\":\"triggers/T.trigger\"}\n"
        );
    }
}
