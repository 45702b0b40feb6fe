//! Apply one merge fragment: resolve, merge, then commit or quarantine.
//!
//! Nothing touches the target until the merge has resolved every anchor. The
//! fragment and its intent file are removed afterwards on both the applied
//! and the quarantined path; a strict failure returns before any cleanup.
use crate::context::RunContext;
use crate::error::MergeError;
use crate::failure::{self, FailureRecord, MergeFailureKind};
use crate::fsutil;
use crate::hooks::Hooks;
use crate::merge::{self, UnmatchedLine};
use crate::messages;
use crate::resolve;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Settings for a single fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    pub fragment_path: PathBuf,
    /// Strict policy: raise instead of quarantining.
    pub fail_on_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied { target: PathBuf, refreshed: bool },
    Quarantined(FailureRecord),
}

pub fn apply_fragment(
    ctx: &mut RunContext,
    config: &MergeConfig,
    hooks: &Hooks,
) -> Result<MergeOutcome> {
    let fragment = config.fragment_path.as_path();
    let _span = tracing::info_span!("fragment", path = %ctx.display_name(fragment)).entered();
    let intent = resolve::intent_path(fragment);

    let target = match resolve::resolve_target(fragment)? {
        Some(target) if target.is_file() => target,
        unresolved => {
            if config.fail_on_error {
                return Err(MergeError::FileNotFound {
                    fragment: fragment.to_path_buf(),
                }
                .into());
            }
            let target = unresolved.unwrap_or_else(|| sibling_pattern(fragment));
            let description = messages::failed_merge_file_not_found(&ctx.display_name(&target));
            let record = failure::quarantine(
                ctx,
                hooks.namer.as_ref(),
                fragment,
                &target,
                MergeFailureKind::FileNotFound,
                description,
            )?;
            cleanup(fragment, &intent)?;
            return Ok(MergeOutcome::Quarantined(record));
        }
    };
    tracing::debug!(
        convention = ?resolve::convention(fragment),
        target = %target.display(),
        "resolved merge target"
    );

    let target_file = fsutil::read_text_file(&target)?;
    let fragment_file = fsutil::read_text_file(fragment)?;
    let parsed = merge::parse_fragment(&fragment_file.lines);

    let outcome = match merge::apply(&target_file.lines, &parsed) {
        Ok(merged) => {
            fsutil::ensure_writable(&target)?;
            fsutil::replace_file(&target, target_file.render(&merged).as_bytes())
                .with_context(|| format!("commit merge into {}", target.display()))?;
            let refreshed = refresh_if_project(hooks, &target);
            tracing::info!(
                target = %ctx.display_name(&target),
                directives = parsed.iter().filter(|line| line.is_directive()).count(),
                lines = merged.len(),
                "fragment applied"
            );
            MergeOutcome::Applied { target, refreshed }
        }
        Err(UnmatchedLine(line)) => {
            if config.fail_on_error {
                return Err(MergeError::LineNotFound { line, target }.into());
            }
            let description =
                messages::failed_merge_line_not_found(&line, &ctx.display_name(&target));
            let record = failure::quarantine(
                ctx,
                hooks.namer.as_ref(),
                fragment,
                &target,
                MergeFailureKind::LineNotFound,
                description,
            )?;
            MergeOutcome::Quarantined(record)
        }
    };

    cleanup(fragment, &intent)?;
    Ok(outcome)
}

// A refresh failure does not undo the committed merge.
fn refresh_if_project(hooks: &Hooks, target: &Path) -> bool {
    if !hooks.is_project_file(target) {
        return false;
    }
    match hooks.refresher.refresh_project(target) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(project = %target.display(), error = %err, "project refresh failed");
            false
        }
    }
}

/// Stand-in target for a global fragment with no eligible sibling.
fn sibling_pattern(fragment: &Path) -> PathBuf {
    let extension = fragment
        .extension()
        .map(|ext| format!("*.{}", ext.to_string_lossy()))
        .unwrap_or_else(|| "*".to_string());
    fragment.with_file_name(extension)
}

fn cleanup(fragment: &Path, intent: &Path) -> Result<()> {
    fsutil::remove_if_exists(fragment)?;
    fsutil::remove_if_exists(intent)?;
    Ok(())
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
