//! Packaging constants and the explicit packaging configuration value.

use std::path::PathBuf;

/// Compiled executable shipped in the package.
pub const C_PROGRAM_NAME_DEFAULT: &str = "NemesisUnlimitedBehaviorEngine.exe";
/// MSYS2 environment name (`MINGW64`, `UCRT64`, ...).
pub const C_ENV_MSYSTEM: &str = "MSYSTEM";
/// MSYS2 environment prefix as seen from the POSIX side (`/mingw64`, ...).
pub const C_ENV_MSYSTEM_PREFIX: &str = "MSYSTEM_PREFIX";
/// Default linker-dependency lister.
pub const C_LDD_PROGRAM_DEFAULT: &str = "ldd";

/// MSYS2 shell environment the packer runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMsysEnv {
    /// Value of `MSYSTEM`.
    pub name_system: String,
    /// Value of `MSYSTEM_PREFIX`.
    pub path_prefix: String,
}

/// Packaging configuration, built once and passed to every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPackConfig {
    /// Executable file name inside `dir_work`.
    pub program_name: String,
    /// Build directory containing the compiled executable.
    pub dir_work: PathBuf,
    /// `Some` when running inside an MSYS2 shell.
    pub msys: Option<SpecMsysEnv>,
    /// Native location of the MSYS2 installation (`C:\msys64`), used to
    /// translate lister output into paths a native process can open.
    pub dir_msys_root: Option<String>,
}

impl Default for SpecPackConfig {
    fn default() -> Self {
        Self {
            program_name: C_PROGRAM_NAME_DEFAULT.to_string(),
            dir_work: PathBuf::from("."),
            msys: None,
            dir_msys_root: None,
        }
    }
}

impl SpecPackConfig {
    /// Build from an explicit environment snapshot. MSYS mode needs both
    /// `MSYSTEM` and `MSYSTEM_PREFIX`.
    pub fn from_env_vars<I, K, V>(dir_work: PathBuf, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut name_system = None;
        let mut path_prefix = None;
        for (key, value) in vars {
            match key.as_ref() {
                C_ENV_MSYSTEM => name_system = Some(value.into()),
                C_ENV_MSYSTEM_PREFIX => path_prefix = Some(value.into()),
                _ => {}
            }
        }
        let msys = match (name_system, path_prefix) {
            (Some(name_system), Some(path_prefix)) => Some(SpecMsysEnv {
                name_system,
                path_prefix,
            }),
            _ => None,
        };
        Self {
            dir_work,
            msys,
            ..Self::default()
        }
    }

    /// Snapshot the current process environment and working directory.
    pub fn from_env() -> Self {
        let dir_work = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_env_vars(dir_work, std::env::vars())
    }

    pub fn is_running_in_msys(&self) -> bool {
        self.msys.is_some()
    }

    pub fn path_program(&self) -> PathBuf {
        self.dir_work.join(&self.program_name)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{C_PROGRAM_NAME_DEFAULT, SpecMsysEnv, SpecPackConfig};

    #[test]
    fn from_env_vars_detects_msys() {
        let spec_config = SpecPackConfig::from_env_vars(
            PathBuf::from("build"),
            [
                ("PATH", "/usr/bin"),
                ("MSYSTEM", "MINGW64"),
                ("MSYSTEM_PREFIX", "/mingw64"),
            ],
        );

        assert!(spec_config.is_running_in_msys());
        assert_eq!(
            spec_config.msys,
            Some(SpecMsysEnv {
                name_system: "MINGW64".to_string(),
                path_prefix: "/mingw64".to_string(),
            })
        );
        assert_eq!(
            spec_config.path_program(),
            PathBuf::from("build").join(C_PROGRAM_NAME_DEFAULT)
        );
    }

    #[test]
    fn from_env_vars_needs_both_msys_variables() {
        let spec_config =
            SpecPackConfig::from_env_vars(PathBuf::from("."), [("MSYSTEM", "UCRT64")]);
        assert!(!spec_config.is_running_in_msys());
    }
}
