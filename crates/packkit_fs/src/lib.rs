//! `packkit_fs` v1:
//! Staleness-aware copy and masked tree mirroring for package staging.
//!
//! - `copy`    : single-file copy with COPY / OVERWRITE / SKIP classification
//! - `mirror`  : masked, non-deleting directory tree mirror
//! - `confirm` : operator confirmation of a planned mirror
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `util`    : shared helper functions

pub mod confirm;
pub mod copy;
pub mod mirror;
pub mod report;
pub mod spec;
mod util;

pub use confirm::{
    AlwaysConfirm, EnumConfirmAnswer, PlanConfirmer, StdioConfirmer, format_plan,
    parse_confirm_answer,
};
pub use copy::copy_if_stale;
pub use mirror::{mirror_tree, mirror_tree_with};
pub use report::{ReportMirror, ReportMirrorBuilder};
pub use spec::{
    CopyFileError, EnumCopyMaskKind, EnumCopyOutcome, MirrorTreeError, SpecCopyMask,
    SpecMirrorError, SpecMirrorOptions, SpecMirrorPlan, derive_default_masks,
};
