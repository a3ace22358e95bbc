//! Mirror report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{EnumCopyOutcome, SpecMirrorError};

/// Aggregate counters and diagnostics for one `mirror_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportMirror {
    /// Total scanned file entries.
    pub cnt_scanned: u64,
    /// Files selected by an INCLUDE rule.
    pub cnt_matched: u64,
    /// Files copied to a new destination.
    pub cnt_copied: u64,
    /// Stale destination files replaced.
    pub cnt_overwritten: u64,
    /// Up-to-date destination files left untouched.
    pub cnt_skipped: u64,
    /// Files stopped by an EXCLUDE rule.
    pub cnt_excluded: u64,
    /// Files matching no rule (implicit deny).
    pub cnt_unmatched: u64,
    /// Directories not descended into because of an EXCLUDE_DIR rule.
    pub cnt_pruned_dirs: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecMirrorError>,
}

impl ReportMirror {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Single success flag for callers that only need a boolean.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_overwritten".to_string(), self.cnt_overwritten);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_excluded".to_string(), self.cnt_excluded);
        dict_counts.insert("cnt_unmatched".to_string(), self.cnt_unmatched);
        dict_counts.insert("cnt_pruned_dirs".to_string(), self.cnt_pruned_dirs);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} matched={} copied={} overwritten={} skipped={} excluded={} unmatched={} pruned_dirs={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_matched,
            self.cnt_copied,
            self.cnt_overwritten,
            self.cnt_skipped,
            self.cnt_excluded,
            self.cnt_unmatched,
            self.cnt_pruned_dirs,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MIRROR]"))
    }
}

/// Mutable accumulator for mirror statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportMirrorBuilder {
    report: ReportMirror,
}

impl ReportMirrorBuilder {
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    pub fn add_matched(&mut self) {
        self.report.cnt_matched += 1;
    }

    pub fn add_excluded(&mut self) {
        self.report.cnt_excluded += 1;
    }

    pub fn add_unmatched(&mut self) {
        self.report.cnt_unmatched += 1;
    }

    pub fn add_pruned_dir(&mut self) {
        self.report.cnt_pruned_dirs += 1;
    }

    /// Count one copy outcome under its matching counter.
    pub fn add_outcome(&mut self, enum_outcome: EnumCopyOutcome) {
        match enum_outcome {
            EnumCopyOutcome::Copy => self.report.cnt_copied += 1,
            EnumCopyOutcome::Overwrite => self.report.cnt_overwritten += 1,
            EnumCopyOutcome::Skip => self.report.cnt_skipped += 1,
        }
    }

    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.report.errors.push(SpecMirrorError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportMirror {
        self.report
    }
}
