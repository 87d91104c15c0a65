//! Shared data models for check results and the project descriptor.

pub mod project;

use serde::{Serialize, Serializer};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// One syntax error, positioned relative to the checked root.
///
/// Field order is the order of the JSON line protocol.
pub struct Diagnostic {
    pub column: usize,
    pub line: usize,
    pub message: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Outcome code of one check; ordered so that the worst one is the max.
pub enum Status {
    #[default]
    Clean,
    /// Processing aborted before every file was attempted.
    Failed,
    /// The requested path does not exist.
    Missing,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Clean => 0,
            Status::Failed => 1,
            Status::Missing => 2,
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
/// Result of checking one filesystem path.
///
/// `status` and `errors` are independent: a clean status with errors means
/// every file was parsed and some of them have syntax errors.
pub struct CheckResult {
    pub status: Status,
    pub extensions: Vec<String>,
    pub errors: Vec<Diagnostic>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// Result of checking one project package, or the whole project root when
/// there is no package structure.
pub struct ProjectCheckResult {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg: Option<String>,
    #[serde(flatten)]
    pub result: CheckResult,
}

/// Worst status across results; `Clean` when there are none.
pub fn worst_status<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> Status {
    results
        .into_iter()
        .map(|r| r.status)
        .max()
        .unwrap_or_default()
}
