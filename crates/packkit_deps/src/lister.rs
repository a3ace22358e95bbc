//! Dependency discovery through a linker-dependency lister.

use std::path::{Path, PathBuf};
use std::process::Command;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::conf::{C_LDD_PROGRAM_DEFAULT, SpecPackConfig};
use crate::spec::{DependencyError, EnumDllCategory, MapDependencies, derive_empty_dependencies};

/// Capability: executable path -> category -> library paths.
pub trait DependencyLister {
    /// # Errors
    /// Returns [`DependencyError::SubprocessFailure`] when the underlying
    /// tool cannot be run or exits non-zero.
    fn list_dependencies(&self, path_executable: &Path) -> Result<MapDependencies, DependencyError>;
}

/// `ldd`-backed lister for MSYS2 shells.
#[derive(Debug, Clone)]
pub struct LddDependencyLister {
    path_ldd: PathBuf,
    name_msys_system: Option<String>,
}

impl LddDependencyLister {
    pub fn new(path_ldd: impl Into<PathBuf>, name_msys_system: Option<String>) -> Self {
        Self {
            path_ldd: path_ldd.into(),
            name_msys_system,
        }
    }

    /// Plain `ldd` from `PATH`, classifying against the configured MSYS2
    /// environment. Outside MSYS2 nothing is classified as MSYS.
    pub fn from_config(spec_config: &SpecPackConfig) -> Self {
        Self::new(
            C_LDD_PROGRAM_DEFAULT,
            spec_config.msys.as_ref().map(|m| m.name_system.clone()),
        )
    }
}

impl DependencyLister for LddDependencyLister {
    fn list_dependencies(&self, path_executable: &Path) -> Result<MapDependencies, DependencyError> {
        let c_command = format!("{} {}", self.path_ldd.display(), path_executable.display());
        debug!("running {c_command}");

        let output = Command::new(&self.path_ldd)
            .arg(path_executable)
            .output()
            .map_err(|e| DependencyError::SubprocessFailure {
                command: c_command.clone(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(DependencyError::SubprocessFailure {
                command: c_command,
                message: format!(
                    "{} ({})",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(parse_ldd_output(
            &String::from_utf8_lossy(&output.stdout),
            self.name_msys_system.as_deref(),
        ))
    }
}

#[derive(Debug)]
struct SpecLddPatterns {
    regex_line: Regex,
    regex_system: Regex,
    regex_msys: Option<Regex>,
}

impl SpecLddPatterns {
    fn new(name_msys_system: Option<&str>) -> Self {
        // Fixed patterns; escaping the environment name keeps them valid.
        let regex_line = Regex::new(r"^\s*(\S+)\s=>\s(\S+)\s").expect("static regex");
        let regex_system = RegexBuilder::new(r"^/[a-z]/windows/system32/.+\.dll")
            .case_insensitive(true)
            .build()
            .expect("static regex");
        let regex_msys = name_msys_system.map(|name| {
            RegexBuilder::new(&format!(r"^/{}/bin/.+\.dll", regex::escape(name)))
                .case_insensitive(true)
                .build()
                .expect("escaped regex")
        });
        Self {
            regex_line,
            regex_system,
            regex_msys,
        }
    }

    fn classify(&self, path_dll: &str) -> EnumDllCategory {
        if self.regex_system.is_match(path_dll) {
            return EnumDllCategory::System;
        }
        if self.regex_msys.as_ref().is_some_and(|r| r.is_match(path_dll)) {
            return EnumDllCategory::Msys;
        }
        EnumDllCategory::Unknown
    }
}

/// Classify `ldd` output lines of the form `name => /path/name.dll (0x...)`.
///
/// Lines without a resolved path are ignored. The mapping always carries all
/// three categories.
pub fn parse_ldd_output(stdout: &str, name_msys_system: Option<&str>) -> MapDependencies {
    let spec_patterns = SpecLddPatterns::new(name_msys_system);
    let mut map_deps = derive_empty_dependencies();

    for line in stdout.lines() {
        let Some(captures) = spec_patterns.regex_line.captures(line) else {
            continue;
        };
        let path_dll = &captures[2];
        let enum_category = spec_patterns.classify(path_dll);
        if enum_category == EnumDllCategory::Unknown {
            warn!(
                "unable to match needed dll to category: {} ({path_dll})",
                &captures[1]
            );
        }
        map_deps
            .entry(enum_category)
            .or_default()
            .push(path_dll.to_string());
    }
    map_deps
}
