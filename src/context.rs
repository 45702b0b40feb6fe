//! Per-run state shared by every fragment processed in one run.
use crate::failure::FailureRecord;
use std::path::{Path, PathBuf};

/// Owns the output root and the failure list for the lifetime of a run.
///
/// Failures are append-only while fragments are processed and drained once
/// by the reporter through [`RunContext::into_failures`].
#[derive(Debug)]
pub struct RunContext {
    output_root: PathBuf,
    failures: Vec<FailureRecord>,
}

impl RunContext {
    pub fn new(output_root: PathBuf) -> Self {
        Self {
            output_root,
            failures: Vec::new(),
        }
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn record_failure(&mut self, record: FailureRecord) {
        self.failures.push(record);
    }

    /// Path relative to the output root when it lies beneath it.
    pub fn display_name(&self, path: &Path) -> String {
        match path.strip_prefix(&self.output_root) {
            Ok(relative) => relative.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }

    pub fn into_failures(self) -> Vec<FailureRecord> {
        self.failures
    }
}
