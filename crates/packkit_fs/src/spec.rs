//! Copy mask models, mirror options and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Rule kind of one copy mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCopyMaskKind {
    /// Copy files whose basename matches.
    Include,
    /// Skip files whose basename matches and stop evaluating further rules.
    Exclude,
    /// Do not descend into directories whose basename matches.
    ExcludeDir,
}

impl EnumCopyMaskKind {
    /// Upper-case label used in traces and plan listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Include => "INCLUDE",
            Self::Exclude => "EXCLUDE",
            Self::ExcludeDir => "EXCLUDE_DIR",
        }
    }

    /// Whether the rule takes part in file-level evaluation.
    pub fn is_file_rule(self) -> bool {
        !matches!(self, Self::ExcludeDir)
    }
}

impl fmt::Display for EnumCopyMaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified result of one successful `copy_if_stale` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCopyOutcome {
    /// Destination did not exist and was created.
    Copy,
    /// Destination was stale and was replaced.
    Overwrite,
    /// Destination is up to date; nothing was written.
    Skip,
}

impl EnumCopyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "COPY",
            Self::Overwrite => "OVERWRITE",
            Self::Skip => "SKIP",
        }
    }

    /// Whether the destination file was written.
    pub fn is_write(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

impl fmt::Display for EnumCopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Structs

/// One `(rule kind, glob pattern)` pair. The pattern is matched against the
/// entry basename only, never against a full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecCopyMask {
    pub kind: EnumCopyMaskKind,
    pub pattern: String,
}

impl SpecCopyMask {
    pub fn new(kind: EnumCopyMaskKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }

    pub fn include(pattern: impl Into<String>) -> Self {
        Self::new(EnumCopyMaskKind::Include, pattern)
    }

    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self::new(EnumCopyMaskKind::Exclude, pattern)
    }

    pub fn exclude_dir(pattern: impl Into<String>) -> Self {
        Self::new(EnumCopyMaskKind::ExcludeDir, pattern)
    }
}

impl fmt::Display for SpecCopyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.kind, self.pattern)
    }
}

/// Mask list used when the caller gives none: include everything.
pub fn derive_default_masks() -> Vec<SpecCopyMask> {
    vec![SpecCopyMask::include("*")]
}

/// Input options for `mirror_tree`.
#[derive(Debug, Clone)]
pub struct SpecMirrorOptions {
    /// Ordered mask list; first matching file rule wins.
    pub masks: Vec<SpecCopyMask>,
    /// Create missing destination directories.
    pub if_create_dirs: bool,
    /// Descend into subdirectories.
    pub if_recurse: bool,
    /// Ask the operator once before any filesystem mutation.
    pub if_ask_confirmation: bool,
    /// Compile mask globs case-insensitively.
    pub if_case_insensitive: bool,
}

impl Default for SpecMirrorOptions {
    fn default() -> Self {
        Self {
            masks: derive_default_masks(),
            if_create_dirs: true,
            if_recurse: true,
            if_ask_confirmation: false,
            if_case_insensitive: false,
        }
    }
}

/// A proposed mirror operation, as presented for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMirrorPlan {
    pub path_dir_src: PathBuf,
    pub path_dir_dst: PathBuf,
    pub masks: Vec<SpecCopyMask>,
}

/// One mirror failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMirrorError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures of a single `copy_if_stale` call. None of these leave a partial
/// destination behind except `Io` raised after an overwrite removal.
#[derive(Debug, Error)]
pub enum CopyFileError {
    #[error("Source file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Destination must be a path relative to the destination root: {}", .0.display())]
    InvalidDestination(PathBuf),
    #[error("Destination directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("Destination is a directory, expected file: {}", .0.display())]
    DestinationIsDirectory(PathBuf),
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// "Top-level call failed" errors for `mirror_tree`. Per-entry failures are
/// collected in the report instead.
#[derive(Debug, Error)]
pub enum MirrorTreeError {
    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .path_dir_src.display(),
        .path_dir_dst.display()
    )]
    SourceDestinationOverlap {
        path_dir_src: PathBuf,
        path_dir_dst: PathBuf,
    },
    #[error("Invalid copy mask pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("Mirror aborted by operator")]
    UserAborted,
    #[error("Failed to read confirmation answer: {0}")]
    Prompt(#[source] io::Error),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
