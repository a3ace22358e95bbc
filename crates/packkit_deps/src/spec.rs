//! Dependency categories, stage report models and error types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use packkit_fs::{CopyFileError, EnumCopyOutcome};
use thiserror::Error;

/// Where a linked library comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumDllCategory {
    /// Windows system library; never shipped.
    System,
    /// Library from the active MSYS2 environment; shipped next to the
    /// executable.
    Msys,
    /// Resolved somewhere neither rule recognizes.
    Unknown,
}

impl EnumDllCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Msys => "MSYS",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EnumDllCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category -> library paths, in lister output order.
pub type MapDependencies = BTreeMap<EnumDllCategory, Vec<String>>;

/// Empty mapping with every category present.
pub fn derive_empty_dependencies() -> MapDependencies {
    [
        EnumDllCategory::System,
        EnumDllCategory::Msys,
        EnumDllCategory::Unknown,
    ]
    .into_iter()
    .map(|c| (c, Vec::new()))
    .collect()
}

/// One file placed (or found up to date) in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStagedFile {
    pub path_src: PathBuf,
    pub enum_outcome: EnumCopyOutcome,
}

/// Result of staging an executable with its libraries.
#[derive(Debug, Default, Clone)]
pub struct ReportStage {
    pub l_staged: Vec<SpecStagedFile>,
    /// System libraries left out of the package.
    pub l_system_skipped: Vec<String>,
    /// Libraries that matched no category.
    pub l_unknown: Vec<String>,
    /// Per-library copy failures as `(path, message)`.
    pub errors: Vec<(PathBuf, String)>,
}

impl ReportStage {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("`{command}` failed: {message}")]
    SubprocessFailure { command: String, message: String },
    #[error("Failed to stage {}: {source}", .path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: CopyFileError,
    },
}
