//! Fatal merge failures raised under the strict policy.
//!
//! These travel inside `anyhow::Error`; callers recover the kind with
//! [`merge_error`].
use crate::messages;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The resolved target does not exist. Carries the fragment path.
    FileNotFound { fragment: PathBuf },
    /// An anchor line is absent from the target after removals.
    LineNotFound { line: String, target: PathBuf },
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::FileNotFound { fragment } => {
                f.write_str(&messages::merge_file_not_found(fragment))
            }
            MergeError::LineNotFound { line, target } => {
                f.write_str(&messages::merge_line_not_found(line, target))
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// Find a strict-mode merge failure anywhere in an error chain.
pub fn merge_error(err: &anyhow::Error) -> Option<&MergeError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<MergeError>())
}
