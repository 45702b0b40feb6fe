//! User-facing message templates for merge failures.
use std::path::Path;

pub fn merge_file_not_found(fragment: &Path) -> String {
    format!(
        "there is no merge target for file '{}'",
        fragment.display()
    )
}

pub fn merge_line_not_found(line: &str, target: &Path) -> String {
    format!(
        "line '{}' not found in file '{}'",
        line.trim(),
        target.display()
    )
}

/// Description stored with a quarantined fragment whose target is missing.
pub fn failed_merge_file_not_found(source_name: &str) -> String {
    format!("File '{source_name}' was not found, so the merge could not be applied.")
}

/// Description stored with a quarantined fragment whose anchor is missing.
pub fn failed_merge_line_not_found(line: &str, source_name: &str) -> String {
    format!(
        "Could not find the expected line '{}' in file '{source_name}'.",
        line.trim()
    )
}
