//! Merge generated fragments into files the user may already have edited.
//!
//! A scaffolding run that regenerates an existing file writes a fragment next
//! to it instead of overwriting it. This crate resolves each fragment to its
//! target, applies its add/remove directives, and either commits the merged
//! file or quarantines the fragment for manual resolution.
pub mod action;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod failure;
pub mod fsutil;
pub mod hooks;
pub mod merge;
pub mod messages;
pub mod resolve;
pub mod run;

pub use action::{apply_fragment, MergeConfig, MergeOutcome};
pub use context::RunContext;
pub use error::{merge_error, MergeError};
pub use failure::{FailureRecord, MergeFailureKind};
