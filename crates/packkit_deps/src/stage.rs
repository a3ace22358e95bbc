//! Stage an executable and its MSYS2 libraries into a package directory.

use std::path::{Path, PathBuf};

use packkit_fs::copy_if_stale;
use tracing::{info, warn};

use crate::conf::SpecPackConfig;
use crate::lister::DependencyLister;
use crate::spec::{DependencyError, EnumDllCategory, ReportStage, SpecStagedFile};
use crate::util::join_msys_path_under_root;

/// Copy the configured executable and every MSYS library it links against
/// into `dir_package_root / path_rel`, skipping up-to-date files.
///
/// System libraries are recorded and left out; unrecognized libraries are
/// recorded with a warning. Failing to list dependencies or to stage the
/// executable itself is an error; a failing library copy is recorded in the
/// report and staging continues.
pub fn stage_executable<P, R>(
    spec_config: &SpecPackConfig,
    spec_lister: &dyn DependencyLister,
    dir_package_root: P,
    path_rel: R,
) -> Result<ReportStage, DependencyError>
where
    P: AsRef<Path>,
    R: AsRef<Path>,
{
    let path_dir_pkg_root = dir_package_root.as_ref();
    let path_rel = path_rel.as_ref();
    let path_exe = spec_config.path_program();

    let map_deps = spec_lister.list_dependencies(&path_exe)?;
    let mut report_stage = ReportStage::default();

    let enum_outcome = copy_if_stale(&path_exe, path_dir_pkg_root, path_rel, true, false)
        .map_err(|e| DependencyError::Stage {
            path: path_exe.clone(),
            source: e,
        })?;
    report_stage.l_staged.push(SpecStagedFile {
        path_src: path_exe,
        enum_outcome,
    });

    for (enum_category, l_paths) in map_deps {
        match enum_category {
            EnumDllCategory::System => report_stage.l_system_skipped.extend(l_paths),
            EnumDllCategory::Unknown => {
                for path_dll in &l_paths {
                    warn!("not staging unrecognized library {path_dll}");
                }
                report_stage.l_unknown.extend(l_paths);
            }
            EnumDllCategory::Msys => {
                for path_dll in l_paths {
                    let path_dll_src = resolve_library_path(spec_config, &path_dll);
                    match copy_if_stale(&path_dll_src, path_dir_pkg_root, path_rel, true, false) {
                        Ok(enum_outcome) => report_stage.l_staged.push(SpecStagedFile {
                            path_src: path_dll_src,
                            enum_outcome,
                        }),
                        Err(e) => {
                            warn!("{e}");
                            report_stage.errors.push((path_dll_src, e.to_string()));
                        }
                    }
                }
            }
        }
    }

    info!(
        "staged {} file(s) into {}",
        report_stage.l_staged.len(),
        path_dir_pkg_root.join(path_rel).display()
    );
    Ok(report_stage)
}

fn resolve_library_path(spec_config: &SpecPackConfig, path_dll: &str) -> PathBuf {
    match spec_config.dir_msys_root.as_deref() {
        Some(dir_msys_root) => join_msys_path_under_root(path_dll, Path::new(dir_msys_root)),
        None => PathBuf::from(path_dll),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    use packkit_fs::EnumCopyOutcome;
    use tempfile::TempDir;

    use super::stage_executable;
    use crate::conf::SpecPackConfig;
    use crate::lister::DependencyLister;
    use crate::spec::{
        DependencyError, EnumDllCategory, MapDependencies, derive_empty_dependencies,
    };

    #[derive(Debug)]
    struct MockLister {
        map_deps: MapDependencies,
        l_calls: RefCell<Vec<PathBuf>>,
    }

    impl DependencyLister for MockLister {
        fn list_dependencies(&self, path_executable: &Path) -> Result<MapDependencies, DependencyError> {
            self.l_calls.borrow_mut().push(path_executable.to_path_buf());
            Ok(self.map_deps.clone())
        }
    }

    #[derive(Debug)]
    struct FailingLister;

    impl DependencyLister for FailingLister {
        fn list_dependencies(&self, _path_executable: &Path) -> Result<MapDependencies, DependencyError> {
            Err(DependencyError::SubprocessFailure {
                command: "ldd tool.exe".to_string(),
                message: "exit status: 1".to_string(),
            })
        }
    }

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, txt).expect("write text");
    }

    fn derive_fixture(tmp: &TempDir) -> (SpecPackConfig, MockLister) {
        let dir_build = tmp.path().join("build");
        let dir_msys_bin = tmp.path().join("mingw64/bin");
        write_text(&dir_build.join("tool.exe"), "MZ-tool");
        write_text(&dir_msys_bin.join("zlib1.dll"), "zlib");
        write_text(&dir_msys_bin.join("libstdc++-6.dll"), "stdc++");

        let mut map_deps = derive_empty_dependencies();
        map_deps.insert(
            EnumDllCategory::System,
            vec!["/c/WINDOWS/SYSTEM32/ntdll.dll".to_string()],
        );
        map_deps.insert(
            EnumDllCategory::Msys,
            vec![
                dir_msys_bin.join("zlib1.dll").to_string_lossy().to_string(),
                dir_msys_bin
                    .join("libstdc++-6.dll")
                    .to_string_lossy()
                    .to_string(),
            ],
        );
        map_deps.insert(
            EnumDllCategory::Unknown,
            vec!["/home/dev/custom.dll".to_string()],
        );

        let spec_config = SpecPackConfig {
            program_name: "tool.exe".to_string(),
            dir_work: dir_build,
            ..SpecPackConfig::default()
        };
        let spec_lister = MockLister {
            map_deps,
            l_calls: RefCell::new(Vec::new()),
        };
        (spec_config, spec_lister)
    }

    #[test]
    fn stage_executable_copies_exe_and_msys_libraries() {
        let tmp = TempDir::new().expect("tempdir");
        let (spec_config, spec_lister) = derive_fixture(&tmp);
        let dir_pkg = tmp.path().join("pkg");

        let report_stage =
            stage_executable(&spec_config, &spec_lister, &dir_pkg, "bin").expect("stage");

        assert!(report_stage.is_success());
        assert_eq!(report_stage.l_staged.len(), 3);
        assert!(dir_pkg.join("bin/tool.exe").exists());
        assert!(dir_pkg.join("bin/zlib1.dll").exists());
        assert!(dir_pkg.join("bin/libstdc++-6.dll").exists());
        assert!(!dir_pkg.join("bin/ntdll.dll").exists());
        assert_eq!(report_stage.l_system_skipped.len(), 1);
        assert_eq!(report_stage.l_unknown, vec!["/home/dev/custom.dll".to_string()]);
        assert_eq!(
            spec_lister.l_calls.borrow().as_slice(),
            &[spec_config.path_program()]
        );
    }

    #[test]
    fn stage_executable_rerun_is_all_skip() {
        let tmp = TempDir::new().expect("tempdir");
        let (spec_config, spec_lister) = derive_fixture(&tmp);
        let dir_pkg = tmp.path().join("pkg");

        stage_executable(&spec_config, &spec_lister, &dir_pkg, "").expect("first stage");
        let report_stage =
            stage_executable(&spec_config, &spec_lister, &dir_pkg, "").expect("second stage");

        assert!(
            report_stage
                .l_staged
                .iter()
                .all(|f| f.enum_outcome == EnumCopyOutcome::Skip)
        );
    }

    #[test]
    fn stage_executable_records_missing_library_and_continues() {
        let tmp = TempDir::new().expect("tempdir");
        let (spec_config, mut spec_lister) = derive_fixture(&tmp);
        spec_lister
            .map_deps
            .get_mut(&EnumDllCategory::Msys)
            .expect("msys entry")
            .insert(0, tmp.path().join("gone.dll").to_string_lossy().to_string());
        let dir_pkg = tmp.path().join("pkg");

        let report_stage =
            stage_executable(&spec_config, &spec_lister, &dir_pkg, "").expect("stage");

        assert_eq!(report_stage.errors.len(), 1);
        assert!(!report_stage.is_success());
        assert!(dir_pkg.join("zlib1.dll").exists());
    }

    #[test]
    fn stage_executable_missing_exe_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut spec_config, spec_lister) = derive_fixture(&tmp);
        spec_config.program_name = "absent.exe".to_string();

        let err = stage_executable(&spec_config, &spec_lister, tmp.path().join("pkg"), "")
            .expect_err("missing exe must fail");
        assert!(matches!(err, DependencyError::Stage { .. }));
    }

    #[test]
    fn stage_executable_propagates_lister_failure() {
        let tmp = TempDir::new().expect("tempdir");
        let (spec_config, _) = derive_fixture(&tmp);
        let dir_pkg = tmp.path().join("pkg");

        let err = stage_executable(&spec_config, &FailingLister, &dir_pkg, "")
            .expect_err("lister failure must propagate");

        assert!(matches!(err, DependencyError::SubprocessFailure { .. }));
        assert!(!dir_pkg.exists());
    }

    #[test]
    fn stage_executable_resolves_msys_paths_under_installation_root() {
        let tmp = TempDir::new().expect("tempdir");
        let (mut spec_config, mut spec_lister) = derive_fixture(&tmp);
        spec_config.dir_msys_root = Some(tmp.path().to_string_lossy().to_string());
        spec_lister.map_deps.insert(
            EnumDllCategory::Msys,
            vec!["/mingw64/bin/zlib1.dll".to_string()],
        );
        let dir_pkg = tmp.path().join("pkg");

        let report_stage =
            stage_executable(&spec_config, &spec_lister, &dir_pkg, "").expect("stage");

        assert!(report_stage.is_success());
        assert_eq!(
            report_stage.l_staged[1].path_src,
            tmp.path().join("mingw64").join("bin").join("zlib1.dll")
        );
        assert!(dir_pkg.join("zlib1.dll").exists());
    }
}
