//! `packkit_deps` v1:
//! Dependency discovery and executable staging for package builds.
//!
//! - `conf`   : constants and the packaging configuration value
//! - `spec`   : categories/reports/errors
//! - `lister` : `DependencyLister` capability and the `ldd` implementation
//! - `stage`  : copy an executable and its libraries into a package
//! - `util`   : MSYS2 -> Windows path translation

pub mod conf;
pub mod lister;
pub mod spec;
pub mod stage;
pub mod util;

pub use conf::{
    C_ENV_MSYSTEM, C_ENV_MSYSTEM_PREFIX, C_LDD_PROGRAM_DEFAULT, C_PROGRAM_NAME_DEFAULT,
    SpecMsysEnv, SpecPackConfig,
};
pub use lister::{DependencyLister, LddDependencyLister, parse_ldd_output};
pub use spec::{
    DependencyError, EnumDllCategory, MapDependencies, ReportStage, SpecStagedFile,
    derive_empty_dependencies,
};
pub use stage::stage_executable;
pub use util::{convert_msys_path_to_windows, join_msys_path_under_root};
