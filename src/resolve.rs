//! Fragment naming conventions and target resolution.
//!
//! Derivation is a fixed regex transform over the fragment's file name; only
//! the global convention looks at the file system.
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub(crate) const SUFFIX: &str = "postaction";
pub(crate) const FAILED_SUFFIX: &str = "failedpostaction";

/// Scoped fragment marker: `Target_postaction.ext`.
pub const FRAGMENT_MARKER: &str = "_postaction.";
/// Project-global scoped marker: `Target$scope_gpostaction.ext`.
pub const GLOBAL_SCOPED_MARKER: &str = "_gpostaction.";
/// Directory-global fragment prefix: one fragment per extension.
pub const GLOBAL_FRAGMENT_MARKER: &str = "$*_gpostaction.";
/// Extension of the companion intent file, without the dot.
pub const INTENT_EXTENSION: &str = "md";

/// Strips either scoped marker (and an optional `$scope`) from a file name.
pub const POSTACTION_PATTERN: &str = r"(\$\S*)?(_postaction|_gpostaction)\.";
/// Matches quarantined fragment names, including the uniqueness digit.
pub const FAILED_POSTACTION_PATTERN: &str =
    r"(\$\S*)?(_failedpostaction|_gfailedpostaction)(\d)?\.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentConvention {
    /// Applies to the first sibling file sharing the fragment's extension.
    Global,
    /// Names its target explicitly.
    Scoped,
}

fn postaction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(POSTACTION_PATTERN).expect("regex for postaction marker"))
}

fn failed_postaction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(FAILED_POSTACTION_PATTERN).expect("regex for failed postaction marker")
    })
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
}

pub fn convention(fragment: &Path) -> FragmentConvention {
    if file_name(fragment).starts_with(GLOBAL_FRAGMENT_MARKER) {
        FragmentConvention::Global
    } else {
        FragmentConvention::Scoped
    }
}

/// True for files the generator left behind as merge fragments.
///
/// Intent files share the marker but carry the intent extension, and
/// quarantined fragments use a different marker; neither is a fragment.
pub fn is_fragment(path: &Path) -> bool {
    let name = file_name(path);
    if failed_postaction_regex().is_match(name) {
        return false;
    }
    if has_intent_extension(path) {
        return false;
    }
    name.contains(FRAGMENT_MARKER) || name.contains(GLOBAL_SCOPED_MARKER)
}

fn has_intent_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == INTENT_EXTENSION)
}

/// Recover a scoped fragment's target path by stripping its marker.
pub fn scoped_target(fragment: &Path) -> PathBuf {
    let name = file_name(fragment);
    let target_name = postaction_regex().replace_all(name, ".");
    fragment.with_file_name(target_name.as_ref())
}

/// Resolve the file a fragment merges into.
///
/// Returns `None` when a global fragment has no eligible sibling. A scoped
/// result is not checked for existence.
pub fn resolve_target(fragment: &Path) -> Result<Option<PathBuf>> {
    match convention(fragment) {
        FragmentConvention::Scoped => Ok(Some(scoped_target(fragment))),
        FragmentConvention::Global => global_target(fragment),
    }
}

fn global_target(fragment: &Path) -> Result<Option<PathBuf>> {
    let Some(extension) = fragment.extension() else {
        return Ok(None);
    };
    let directory = match fragment.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut siblings = Vec::new();
    for entry in
        fs::read_dir(directory).with_context(|| format!("read {}", directory.display()))?
    {
        let path = entry?.path();
        let same_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if path.is_file() && same_extension {
            siblings.push(path);
        }
    }
    siblings.sort();
    let target = siblings
        .into_iter()
        .find(|path| !file_name(path).contains(SUFFIX))
        .map(|path| fragment.with_file_name(file_name(&path)));
    Ok(target)
}

/// Companion intent file: same directory and stem, intent extension.
pub fn intent_path(fragment: &Path) -> PathBuf {
    fragment.with_extension(INTENT_EXTENSION)
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
