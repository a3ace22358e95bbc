use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use packkit_deps::{
    DependencyLister, LddDependencyLister, SpecPackConfig, convert_msys_path_to_windows,
    stage_executable,
};
use packkit_fs::{
    EnumCopyMaskKind, MirrorTreeError, SpecCopyMask, SpecMirrorOptions, derive_default_masks,
    mirror_tree,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// packkit - stage files for a mod package
///
/// Mirrors a source directory into a destination, copying only files that
/// pass the mask list and are missing or stale at the destination.
#[derive(Debug, Parser)]
#[command(name = "packkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source directory to mirror
    #[arg(short, long, value_name = "DIR", required_unless_present_any = ["deps", "stage"])]
    src: Option<PathBuf>,

    /// Destination directory
    #[arg(short, long, value_name = "DIR", required_unless_present = "deps")]
    dst: Option<PathBuf>,

    /// Ask once for confirmation before copying anything
    #[arg(long)]
    ask: bool,

    /// Copy files whose name matches PATTERN (repeatable, order matters)
    #[arg(long, value_name = "PATTERN")]
    include: Vec<String>,

    /// Skip files whose name matches PATTERN (repeatable, order matters)
    #[arg(long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Do not descend into directories whose name matches PATTERN
    #[arg(long, value_name = "PATTERN")]
    exclude_dir: Vec<String>,

    /// Only copy files directly inside the source directory
    #[arg(long)]
    no_recurse: bool,

    /// Fail instead of creating missing destination directories
    #[arg(long)]
    no_create_dirs: bool,

    /// Match patterns case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// List the dependency categories of EXE and exit
    #[arg(long, value_name = "EXE", conflicts_with = "stage")]
    deps: Option<PathBuf>,

    /// Stage EXE and its MSYS2 libraries into the destination directory
    #[arg(long, value_name = "EXE")]
    stage: Option<PathBuf>,

    /// Native MSYS2 installation root used to resolve library paths
    #[arg(long, value_name = "DIR")]
    msys_root: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(v) => v,
        Err(e) => e.exit(),
    };
    init_tracing(cli.verbose);

    match run(&cli, &matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let c_level_default = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(c_level_default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli, matches: &ArgMatches) -> Result<bool> {
    if let Some(path_exe) = &cli.deps {
        return cmd_deps(cli, path_exe);
    }
    let path_dir_dst = cli.dst.as_deref().context("--dst is required")?;
    if let Some(path_exe) = &cli.stage {
        return cmd_stage(cli, path_exe, path_dir_dst);
    }
    let path_dir_src = cli.src.as_deref().context("--src is required")?;
    cmd_mirror(cli, matches, path_dir_src, path_dir_dst)
}

fn cmd_mirror(
    cli: &Cli,
    matches: &ArgMatches,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> Result<bool> {
    let spec_mirror_options = SpecMirrorOptions {
        masks: collect_masks(matches),
        if_create_dirs: !cli.no_create_dirs,
        if_recurse: !cli.no_recurse,
        if_ask_confirmation: cli.ask,
        if_case_insensitive: cli.ignore_case,
    };

    match mirror_tree(path_dir_src, path_dir_dst, &spec_mirror_options) {
        Ok(report) => {
            for spec_error in &report.errors {
                eprintln!("error: {}: {}", spec_error.path.display(), spec_error.exception);
            }
            println!("{report}");
            Ok(report.is_success())
        }
        Err(MirrorTreeError::UserAborted) => {
            eprintln!("aborted, nothing copied");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_deps(cli: &Cli, path_exe: &Path) -> Result<bool> {
    let spec_config = derive_config(cli, path_exe);
    let spec_lister = LddDependencyLister::from_config(&spec_config);
    let map_deps = spec_lister.list_dependencies(&spec_config.path_program())?;

    for (enum_category, l_paths) in &map_deps {
        println!("{enum_category}:");
        for path_dll in l_paths {
            match spec_config.dir_msys_root.as_deref() {
                Some(dir_msys_root) => println!(
                    "  {path_dll} ({})",
                    convert_msys_path_to_windows(path_dll, Some(dir_msys_root))
                ),
                None => println!("  {path_dll}"),
            }
        }
    }
    Ok(true)
}

fn cmd_stage(cli: &Cli, path_exe: &Path, path_dir_dst: &Path) -> Result<bool> {
    let spec_config = derive_config(cli, path_exe);
    let spec_lister = LddDependencyLister::from_config(&spec_config);
    let report_stage = stage_executable(&spec_config, &spec_lister, path_dir_dst, "")
        .with_context(|| format!("staging {}", path_exe.display()))?;

    for (path, message) in &report_stage.errors {
        eprintln!("error: {}: {message}", path.display());
    }
    println!(
        "[STAGE] staged={} system_skipped={} unknown={} errors={}",
        report_stage.l_staged.len(),
        report_stage.l_system_skipped.len(),
        report_stage.l_unknown.len(),
        report_stage.errors.len()
    );
    Ok(report_stage.is_success())
}

/// Environment snapshot with the executable location taken from `path_exe`.
fn derive_config(cli: &Cli, path_exe: &Path) -> SpecPackConfig {
    let mut spec_config = SpecPackConfig::from_env();
    if let Some(name_exe) = path_exe.file_name() {
        spec_config.program_name = name_exe.to_string_lossy().to_string();
    }
    spec_config.dir_work = match path_exe.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    spec_config.dir_msys_root.clone_from(&cli.msys_root);

    match &spec_config.msys {
        Some(spec_msys) => info!(
            "running in MSYS2 {} with prefix {}",
            spec_msys.name_system, spec_msys.path_prefix
        ),
        None => warn!("not running in MSYS2, no library will be classified as MSYS"),
    }
    spec_config
}

/// Rebuild the mask list in command-line order across the three mask flags.
fn collect_masks(matches: &ArgMatches) -> Vec<SpecCopyMask> {
    let mut l_indexed: Vec<(usize, SpecCopyMask)> = Vec::new();
    for (c_id, enum_kind) in [
        ("include", EnumCopyMaskKind::Include),
        ("exclude", EnumCopyMaskKind::Exclude),
        ("exclude_dir", EnumCopyMaskKind::ExcludeDir),
    ] {
        let (Some(iter_values), Some(iter_indices)) =
            (matches.get_many::<String>(c_id), matches.indices_of(c_id))
        else {
            continue;
        };
        for (pattern, n_idx) in iter_values.zip(iter_indices) {
            l_indexed.push((n_idx, SpecCopyMask::new(enum_kind, pattern.clone())));
        }
    }

    if l_indexed.is_empty() {
        return derive_default_masks();
    }
    l_indexed.sort_by_key(|(n_idx, _)| *n_idx);
    l_indexed.into_iter().map(|(_, spec_mask)| spec_mask).collect()
}
