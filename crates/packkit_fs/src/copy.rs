//! Staleness-aware single file copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::spec::{CopyFileError, EnumCopyOutcome};
use crate::util::{copy_file_with_metadata, is_destination_stale, validate_relative_destination};

/// Copy `file_source` into `dir_destination_root / path_destination_rel`
/// unless the destination is already up to date.
///
/// - `if_create_dirs`: create missing destination directories (all levels);
///   otherwise a missing directory is [`CopyFileError::MissingDirectory`].
/// - `if_destination_is_file`: `path_destination_rel` names the destination
///   file itself instead of the directory receiving a same-named copy.
///
/// An existing destination is overwritten when the source modification time
/// is strictly newer or the byte sizes differ. The old file is removed before
/// the copy starts, so a crash in between leaves the destination absent.
///
/// Input validation happens before any mutation: a missing source or a rooted
/// destination path never touches the filesystem.
pub fn copy_if_stale<P, Q, R>(
    file_source: P,
    dir_destination_root: Q,
    path_destination_rel: R,
    if_create_dirs: bool,
    if_destination_is_file: bool,
) -> Result<EnumCopyOutcome, CopyFileError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let path_file_src = file_source.as_ref();
    let path_dir_dst_root = dir_destination_root.as_ref();
    let path_dst_rel = path_destination_rel.as_ref();

    let meta_file_src = match fs::metadata(path_file_src) {
        Ok(v) if v.is_file() => v,
        Ok(_) => return Err(CopyFileError::NotFound(path_file_src.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CopyFileError::NotFound(path_file_src.to_path_buf()));
        }
        Err(e) => {
            return Err(CopyFileError::Io {
                path: path_file_src.to_path_buf(),
                source: e,
            });
        }
    };

    validate_relative_destination(path_dst_rel)?;
    let (path_dir_dst, path_file_dst) =
        derive_destination_paths(path_file_src, path_dir_dst_root, path_dst_rel, if_destination_is_file)?;

    if !path_dir_dst.is_dir() {
        if !if_create_dirs {
            return Err(CopyFileError::MissingDirectory(path_dir_dst));
        }
        debug!("making path: {}", path_dir_dst.display());
        fs::create_dir_all(&path_dir_dst).map_err(|e| CopyFileError::Io {
            path: path_dir_dst.clone(),
            source: e,
        })?;
    }

    let enum_outcome = match fs::metadata(&path_file_dst) {
        Ok(meta_file_dst) if meta_file_dst.is_dir() => {
            return Err(CopyFileError::DestinationIsDirectory(path_file_dst));
        }
        Ok(meta_file_dst) => {
            if !is_destination_stale(&meta_file_src, &meta_file_dst) {
                info!(
                    "{} {} -> {}",
                    EnumCopyOutcome::Skip,
                    path_file_src.display(),
                    path_file_dst.display()
                );
                return Ok(EnumCopyOutcome::Skip);
            }
            fs::remove_file(&path_file_dst).map_err(|e| CopyFileError::Io {
                path: path_file_dst.clone(),
                source: e,
            })?;
            EnumCopyOutcome::Overwrite
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => EnumCopyOutcome::Copy,
        Err(e) => {
            return Err(CopyFileError::Io {
                path: path_file_dst,
                source: e,
            });
        }
    };

    copy_file_with_metadata(path_file_src, &path_file_dst).map_err(|e| CopyFileError::Io {
        path: path_file_dst.clone(),
        source: e,
    })?;
    info!(
        "{enum_outcome} {} -> {}",
        path_file_src.display(),
        path_file_dst.display()
    );
    Ok(enum_outcome)
}

/// Returns `(destination directory, destination file)`.
fn derive_destination_paths(
    path_file_src: &Path,
    path_dir_dst_root: &Path,
    path_dst_rel: &Path,
    if_destination_is_file: bool,
) -> Result<(PathBuf, PathBuf), CopyFileError> {
    if if_destination_is_file {
        if path_dst_rel.file_name().is_none() {
            return Err(CopyFileError::InvalidDestination(path_dst_rel.to_path_buf()));
        }
        let path_file_dst = path_dir_dst_root.join(path_dst_rel);
        let path_dir_dst = path_file_dst
            .parent()
            .map_or_else(|| path_dir_dst_root.to_path_buf(), Path::to_path_buf);
        return Ok((path_dir_dst, path_file_dst));
    }

    let Some(name_file) = path_file_src.file_name() else {
        return Err(CopyFileError::NotFound(path_file_src.to_path_buf()));
    };
    let path_dir_dst = path_dir_dst_root.join(path_dst_rel);
    let path_file_dst = path_dir_dst.join(name_file);
    Ok((path_dir_dst, path_file_dst))
}
