//! Masked, one-directional directory tree mirroring.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::confirm::{AlwaysConfirm, PlanConfirmer, StdioConfirmer};
use crate::copy::copy_if_stale;
use crate::report::{ReportMirror, ReportMirrorBuilder};
use crate::spec::{EnumCopyMaskKind, MirrorTreeError, SpecMirrorOptions, SpecMirrorPlan};
use crate::util::{SpecCompiledMasks, is_overlap};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: OsString,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: OsString,
}

#[derive(Debug)]
struct SpecMirrorContext<'a> {
    path_dir_dst: PathBuf,
    spec_mirror_options: &'a SpecMirrorOptions,
    spec_masks: SpecCompiledMasks,
    builder_report: ReportMirrorBuilder,
    /// Canonical paths of the directories on the current branch, root first.
    l_ancestor_dirs: Vec<PathBuf>,
}

/// Mirror `dir_source` into `dir_destination`, prompting on standard
/// input/output when [`SpecMirrorOptions::if_ask_confirmation`] is set.
///
/// See [`mirror_tree_with`] for the traversal rules.
pub fn mirror_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_mirror_options: &SpecMirrorOptions,
) -> Result<ReportMirror, MirrorTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if spec_mirror_options.if_ask_confirmation {
        let stdin = io::stdin();
        let mut confirmer = StdioConfirmer::new(stdin.lock(), io::stdout());
        return mirror_tree_with(dir_source, dir_destination, spec_mirror_options, &mut confirmer);
    }
    mirror_tree_with(
        dir_source,
        dir_destination,
        spec_mirror_options,
        &mut AlwaysConfirm,
    )
}

/// Mirror `dir_source` into `dir_destination` using an explicit confirmer.
///
/// Traversal is depth-first and pre-order: files of a directory are handled
/// before its subdirectories, each group in name order.
/// - Files: the first file-level mask matching the basename decides.
///   INCLUDE copies through [`copy_if_stale`]; EXCLUDE stops evaluation;
///   no match means the file is not copied.
/// - Directories: skipped entirely when `if_recurse` is false, pruned when an
///   EXCLUDE_DIR mask matches the basename, otherwise walked with the same
///   masks.
///
/// Destination files missing from the source are never deleted.
///
/// Returns [`MirrorTreeError`] only for a missing top-level source, a
/// destination nested in the source (or the reverse), invalid masks or a
/// refused confirmation. All of them happen before any mutation.
/// Per-entry failures are recorded in the returned [`ReportMirror`] and the
/// walk continues with siblings.
pub fn mirror_tree_with<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_mirror_options: &SpecMirrorOptions,
    confirmer: &mut dyn PlanConfirmer,
) -> Result<ReportMirror, MirrorTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    if !path_dir_src.is_dir() {
        warn!("cannot mirror, {} does not exist", path_dir_src.display());
        return Err(MirrorTreeError::SourceNotFound(path_dir_src));
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(MirrorTreeError::SourceDestinationOverlap {
            path_dir_src,
            path_dir_dst,
        });
    }
    let spec_masks = SpecCompiledMasks::compile(
        &spec_mirror_options.masks,
        spec_mirror_options.if_case_insensitive,
    )?;

    if spec_mirror_options.if_ask_confirmation {
        let spec_plan = SpecMirrorPlan {
            path_dir_src: path_dir_src.clone(),
            path_dir_dst: path_dir_dst.clone(),
            masks: spec_mirror_options.masks.clone(),
        };
        if !confirmer
            .confirm(&spec_plan)
            .map_err(MirrorTreeError::Prompt)?
        {
            info!("mirror of {} refused by operator", path_dir_src.display());
            return Err(MirrorTreeError::UserAborted);
        }
    }

    info!(
        "mirror {} -> {}",
        path_dir_src.display(),
        path_dir_dst.display()
    );
    let mut spec_mirror_ctx = SpecMirrorContext {
        path_dir_dst,
        spec_mirror_options,
        spec_masks,
        builder_report: ReportMirrorBuilder::default(),
        l_ancestor_dirs: Vec::new(),
    };
    walk_directory(&path_dir_src, Path::new(""), &mut spec_mirror_ctx);
    Ok(spec_mirror_ctx.builder_report.build())
}

fn walk_directory(path_root: &Path, path_rel: &Path, spec_mirror_ctx: &mut SpecMirrorContext<'_>) {
    debug!("entering {}", path_root.display());

    // A loop is a directory resolving to one of its own ancestors.
    let path_resolved = match fs::canonicalize(path_root) {
        Ok(v) => v,
        Err(e) => {
            warn!("cannot enter {} ({e})", path_root.display());
            spec_mirror_ctx.builder_report.add_error(
                path_root.to_path_buf(),
                format!("Source directory does not exist: {} ({e})", path_root.display()),
            );
            return;
        }
    };
    if spec_mirror_ctx.l_ancestor_dirs.contains(&path_resolved) {
        spec_mirror_ctx
            .builder_report
            .add_warning(format!("Symlink loop detected: {}", path_root.display()));
        return;
    }

    spec_mirror_ctx.l_ancestor_dirs.push(path_resolved);
    walk_entries(path_root, path_rel, spec_mirror_ctx);
    spec_mirror_ctx.l_ancestor_dirs.pop();
}

fn walk_entries(path_root: &Path, path_rel: &Path, spec_mirror_ctx: &mut SpecMirrorContext<'_>) {
    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            warn!("cannot read {} ({e})", path_root.display());
            spec_mirror_ctx.builder_report.add_error(
                path_root.to_path_buf(),
                format!("Failed to read directory {} ({e})", path_root.display()),
            );
            return;
        }
    };

    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_mirror_ctx.builder_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_root.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let name_os = entry.file_name();
        // Follows symlinks, so a link counts as whatever it resolves to.
        let meta_entry = match fs::metadata(&path_entry) {
            Ok(v) => v,
            Err(e) => {
                spec_mirror_ctx
                    .builder_report
                    .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };

        if meta_entry.is_dir() {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: name_os,
            });
        } else if meta_entry.is_file() {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: name_os,
            });
        } else {
            spec_mirror_ctx
                .builder_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
        }
    }

    l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    for _file_entry in l_files {
        handle_file_entry(_file_entry, path_rel, spec_mirror_ctx);
    }

    if !spec_mirror_ctx.spec_mirror_options.if_recurse {
        return;
    }
    for _dir_entry in l_dirs {
        if spec_mirror_ctx.spec_masks.is_dir_excluded(&_dir_entry.name_dir) {
            debug!("SKIP DIR {}", _dir_entry.path_dir_src_sub.display());
            spec_mirror_ctx.builder_report.add_pruned_dir();
            continue;
        }
        let path_rel_sub = path_rel.join(&_dir_entry.name_dir);
        walk_directory(&_dir_entry.path_dir_src_sub, &path_rel_sub, spec_mirror_ctx);
    }
}

fn handle_file_entry(
    spec_file_entry: SpecFileEntry,
    path_rel: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
) {
    spec_mirror_ctx.builder_report.add_scanned();

    match spec_mirror_ctx.spec_masks.match_file(&spec_file_entry.name_file) {
        Some(EnumCopyMaskKind::Include) => {}
        Some(EnumCopyMaskKind::Exclude) => {
            debug!("SKIP {} (excluded)", spec_file_entry.path_file_src.display());
            spec_mirror_ctx.builder_report.add_excluded();
            return;
        }
        Some(EnumCopyMaskKind::ExcludeDir) | None => {
            spec_mirror_ctx.builder_report.add_unmatched();
            return;
        }
    }
    spec_mirror_ctx.builder_report.add_matched();

    let res_copy = copy_if_stale(
        &spec_file_entry.path_file_src,
        &spec_mirror_ctx.path_dir_dst,
        path_rel,
        spec_mirror_ctx.spec_mirror_options.if_create_dirs,
        false,
    );
    match res_copy {
        Ok(enum_outcome) => spec_mirror_ctx.builder_report.add_outcome(enum_outcome),
        Err(e) => {
            warn!("{e}");
            spec_mirror_ctx
                .builder_report
                .add_error(spec_file_entry.path_file_src, e.to_string());
        }
    }
}
