use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;
use globset::{GlobBuilder, GlobMatcher};

use crate::spec::{CopyFileError, EnumCopyMaskKind, MirrorTreeError, SpecCopyMask};

////////////////////////////////////////////////////////////////////////////////
// #region MaskMatching

#[derive(Debug, Clone)]
struct SpecCompiledMask {
    kind: EnumCopyMaskKind,
    matcher: GlobMatcher,
}

/// Mask list compiled once per mirror call.
#[derive(Debug, Clone)]
pub(crate) struct SpecCompiledMasks {
    l_masks: Vec<SpecCompiledMask>,
    if_has_file_rules: bool,
}

impl SpecCompiledMasks {
    pub(crate) fn compile(
        masks: &[SpecCopyMask],
        if_case_insensitive: bool,
    ) -> Result<Self, MirrorTreeError> {
        let mut l_masks = Vec::with_capacity(masks.len());
        for spec_mask in masks {
            let matcher = GlobBuilder::new(&spec_mask.pattern)
                .case_insensitive(if_case_insensitive)
                .literal_separator(true)
                .build()
                .map_err(|e| MirrorTreeError::InvalidPattern {
                    pattern: spec_mask.pattern.clone(),
                    message: e.kind().to_string(),
                })?
                .compile_matcher();
            l_masks.push(SpecCompiledMask {
                kind: spec_mask.kind,
                matcher,
            });
        }
        let if_has_file_rules = l_masks.iter().any(|m| m.kind.is_file_rule());
        Ok(Self {
            l_masks,
            if_has_file_rules,
        })
    }

    /// First file-level rule matching `name_file`, in list order.
    ///
    /// A list made only of `ExcludeDir` rules constrains traversal, not files,
    /// so it behaves as if the default `INCLUDE *` were present.
    pub(crate) fn match_file(&self, name_file: &OsStr) -> Option<EnumCopyMaskKind> {
        if !self.if_has_file_rules {
            return Some(EnumCopyMaskKind::Include);
        }
        self.l_masks
            .iter()
            .filter(|m| m.kind.is_file_rule())
            .find(|m| m.matcher.is_match(name_file))
            .map(|m| m.kind)
    }

    pub(crate) fn is_dir_excluded(&self, name_dir: &OsStr) -> bool {
        self.l_masks
            .iter()
            .any(|m| m.kind == EnumCopyMaskKind::ExcludeDir && m.matcher.is_match(name_dir))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _has_windows_root_prefix(path: &Path) -> bool {
    let c_path = path.to_string_lossy();
    let raw = c_path.as_bytes();
    if raw.len() >= 2 && raw[0].is_ascii_alphabetic() && raw[1] == b':' {
        return true;
    }
    matches!(raw.first(), Some(b'/') | Some(b'\\'))
}

/// Reject destination paths that are rooted, carry a drive/UNC prefix, or
/// climb out of the destination root with `..`.
///
/// Windows-shaped prefixes are rejected on every host, since the packaged
/// layout targets Windows regardless of where the packer runs.
pub(crate) fn validate_relative_destination(path_dst_rel: &Path) -> Result<(), CopyFileError> {
    if path_dst_rel.has_root() || _has_windows_root_prefix(path_dst_rel) {
        return Err(CopyFileError::InvalidDestination(path_dst_rel.to_path_buf()));
    }
    let b_is_escaping = path_dst_rel.components().any(|c| {
        matches!(
            c,
            Component::Prefix(_) | Component::RootDir | Component::ParentDir
        )
    });
    if b_is_escaping {
        return Err(CopyFileError::InvalidDestination(path_dst_rel.to_path_buf()));
    }
    Ok(())
}

/// Resolve symlinks in the longest existing prefix of `path` and append the
/// remaining components, so not-yet-created destinations compare correctly.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    let mut path_existing = path_abs.as_path();
    let mut l_tail = Vec::new();
    loop {
        if let Ok(path_resolved) = fs::canonicalize(path_existing) {
            return l_tail
                .iter()
                .rev()
                .fold(path_resolved, |acc: PathBuf, name| acc.join(name));
        }
        match (path_existing.parent(), path_existing.file_name()) {
            (Some(parent), Some(name)) => {
                l_tail.push(name.to_os_string());
                path_existing = parent;
            }
            _ => return path_abs,
        }
    }
}

/// Whether one directory contains the other (or both are the same).
pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let path_src_resolved = _normalize_path(src);
    let path_dst_resolved = _normalize_path(dst);
    path_dst_resolved.starts_with(&path_src_resolved)
        || path_src_resolved.starts_with(&path_dst_resolved)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyPrimitives

/// Destination is stale when the source is strictly newer or sizes differ.
pub(crate) fn is_destination_stale(meta_file_src: &fs::Metadata, meta_file_dst: &fs::Metadata) -> bool {
    let file_time_src = FileTime::from_last_modification_time(meta_file_src);
    let file_time_dst = FileTime::from_last_modification_time(meta_file_dst);
    file_time_src > file_time_dst || meta_file_src.len() != meta_file_dst.len()
}

/// Copy bytes and permissions, then carry source timestamps over so the next
/// staleness check sees equal modification times.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    filetime::set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let Ok(iter_xattr_names) = xattr::list(path_file_src) else {
        return;
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                "xattr {} not carried to {} ({e})",
                name.to_string_lossy(),
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
