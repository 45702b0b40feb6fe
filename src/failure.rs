//! Quarantine of fragments that could not be merged.
use crate::context::RunContext;
use crate::hooks::UniqueNamer;
use crate::resolve::{self, FAILED_SUFFIX, SUFFIX};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeFailureKind {
    FileNotFound,
    LineNotFound,
}

/// One unresolved fragment, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub source_file_name: String,
    pub fragment_file_name: String,
    pub failed_file_name: String,
    pub description: String,
    pub intent: String,
    pub kind: MergeFailureKind,
}

/// Where a fragment is copied when it cannot be applied.
///
/// The stem's `postaction` marker becomes `failedpostaction`; the namer adds
/// a numeric suffix if that name is taken. The extension is kept.
pub fn quarantine_path(fragment: &Path, namer: &dyn UniqueNamer) -> Result<PathBuf> {
    let stem = fragment
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("fragment name is not valid UTF-8: {}", fragment.display()))?;
    let failed_stem = stem.replace(SUFFIX, FAILED_SUFFIX);
    let extension = fragment
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let folder = match fragment.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let unique = namer.unique_name(folder, &failed_stem, &extension);
    Ok(fragment.with_file_name(format!("{unique}{extension}")))
}

/// Intent text for a fragment, empty when it has no intent file.
pub fn read_intent(fragment: &Path) -> Result<String> {
    let path = resolve::intent_path(fragment);
    if !path.is_file() {
        return Ok(String::new());
    }
    fs::read_to_string(&path).with_context(|| format!("read intent {}", path.display()))
}

/// Copy a fragment aside and record why it failed.
///
/// The fragment itself is left in place; the caller removes it.
pub fn quarantine(
    ctx: &mut RunContext,
    namer: &dyn UniqueNamer,
    fragment: &Path,
    target: &Path,
    kind: MergeFailureKind,
    description: String,
) -> Result<FailureRecord> {
    let failed_path = quarantine_path(fragment, namer)?;
    fs::copy(fragment, &failed_path).with_context(|| {
        format!(
            "copy {} to {}",
            fragment.display(),
            failed_path.display()
        )
    })?;
    let record = FailureRecord {
        source_file_name: ctx.display_name(target),
        fragment_file_name: ctx.display_name(fragment),
        failed_file_name: ctx.display_name(&failed_path),
        description,
        intent: read_intent(fragment)?,
        kind,
    };
    tracing::warn!(
        kind = ?record.kind,
        fragment = %record.fragment_file_name,
        quarantined = %record.failed_file_name,
        "fragment quarantined"
    );
    ctx.record_failure(record.clone());
    Ok(record)
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
