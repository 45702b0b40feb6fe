//! Process every fragment under an output root in a fixed order.
use crate::action::{apply_fragment, MergeConfig, MergeOutcome};
use crate::context::RunContext;
use crate::failure::FailureRecord;
use crate::fsutil;
use crate::hooks::Hooks;
use crate::resolve;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of one run, handed to the reporter once all fragments are done.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Targets that received a merge, relative to the output root.
    pub applied: Vec<String>,
    pub failures: Vec<FailureRecord>,
}

/// Fragments under `root`, ordered by directory and then by file name.
pub fn discover_fragments(root: &Path) -> Result<Vec<PathBuf>> {
    let mut fragments: Vec<PathBuf> = fsutil::collect_files_recursive(root)?
        .into_iter()
        .filter(|path| resolve::is_fragment(path))
        .collect();
    fragments.sort_by(|a, b| {
        a.parent()
            .cmp(&b.parent())
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(fragments)
}

/// Apply all fragments sequentially.
///
/// Under the strict policy the first failure ends the run with its error;
/// fragments after it are left on disk.
pub fn run_merges(output_root: &Path, fail_on_error: bool, hooks: &Hooks) -> Result<RunReport> {
    let mut ctx = RunContext::new(output_root.to_path_buf());
    let fragments = discover_fragments(output_root)?;
    tracing::info!(
        root = %output_root.display(),
        fragments = fragments.len(),
        fail_on_error,
        "merge run started"
    );

    let mut applied = Vec::new();
    for fragment in fragments {
        let config = MergeConfig {
            fragment_path: fragment,
            fail_on_error,
        };
        if let MergeOutcome::Applied { target, .. } = apply_fragment(&mut ctx, &config, hooks)? {
            applied.push(ctx.display_name(&target));
        }
    }

    let report = RunReport {
        applied,
        failures: ctx.into_failures(),
    };
    tracing::info!(
        applied = report.applied.len(),
        failed = report.failures.len(),
        "merge run complete"
    );
    Ok(report)
}

/// Persist the report in a stable JSON format.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(report).context("serialize merge report")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
