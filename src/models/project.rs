//! `sfdx-project.json` schema: only package directory paths are read.

use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
/// Project descriptor. Unknown keys are ignored.
pub struct SfdxProject {
    #[serde(default)]
    pub package_directories: Option<Vec<PackageDirectory>>,
}

#[derive(Deserialize, Debug, Default)]
/// One declared package; entries without `path` are dropped by discovery.
pub struct PackageDirectory {
    #[serde(default)]
    pub path: Option<String>,
}
