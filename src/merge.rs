//! Line-level merge of a fragment into a target.
//!
//! Fragments mark directives with block markers that may sit inside the
//! target language's comment syntax (`//{[{`, `<!--{[{-->`):
//!
//! - `{[{` ... `}]}` wraps lines to add after the preceding anchor
//! - `{--{` ... `}--}` wraps lines to remove from the target
//! - a lone `^^` places the next additions before the following anchor
//! - `{**` ... `**}` wraps generator notes that never reach the target
//!
//! Every other line is an anchor that must exist in the target. Removals are
//! applied as a separate pass first so anchors cannot match lines that are
//! about to be deleted.
use std::fmt;

const ADD_START: &str = "{[{";
const ADD_END: &str = "}]}";
const REMOVE_START: &str = "{--{";
const REMOVE_END: &str = "}--}";
const DOC_START: &str = "{**";
const DOC_END: &str = "**}";
const BEFORE_ANCHOR: &str = "^^";

/// One classified fragment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentLine {
    Context(String),
    Addition(String),
    Removal(String),
    /// Additions that follow attach to the next anchor instead of the previous.
    BeforeAnchor,
}

impl FragmentLine {
    pub fn is_directive(&self) -> bool {
        !matches!(self, FragmentLine::Context(_))
    }
}

/// An anchor line that could not be located in the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedLine(pub String);

impl fmt::Display for UnmatchedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor line not found: {}", self.0)
    }
}

impl std::error::Error for UnmatchedLine {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Addition,
    Removal,
    Documentation,
}

/// Classify raw fragment lines into directives.
///
/// Marker lines are consumed. An unterminated block runs to the end of the
/// fragment.
pub fn parse_fragment<S: AsRef<str>>(lines: &[S]) -> Vec<FragmentLine> {
    let mut parsed = Vec::with_capacity(lines.len());
    let mut block = Block::None;
    for line in lines {
        let line = line.as_ref();
        let trimmed = line.trim();
        match block {
            Block::Documentation => {
                if trimmed.contains(DOC_END) {
                    block = Block::None;
                }
                continue;
            }
            Block::Addition if trimmed.contains(ADD_END) => {
                block = Block::None;
                continue;
            }
            Block::Removal if trimmed.contains(REMOVE_END) => {
                block = Block::None;
                continue;
            }
            Block::Addition => {
                parsed.push(FragmentLine::Addition(line.to_string()));
                continue;
            }
            Block::Removal => {
                parsed.push(FragmentLine::Removal(line.to_string()));
                continue;
            }
            Block::None => {}
        }

        if trimmed.contains(DOC_START) {
            if !trimmed.contains(DOC_END) {
                block = Block::Documentation;
            }
        } else if trimmed.contains(ADD_START) {
            block = Block::Addition;
        } else if trimmed.contains(REMOVE_START) {
            block = Block::Removal;
        } else if trimmed == BEFORE_ANCHOR {
            parsed.push(FragmentLine::BeforeAnchor);
        } else {
            parsed.push(FragmentLine::Context(line.to_string()));
        }
    }
    parsed
}

/// Delete one target line per removal directive, first match wins.
///
/// A removal with no matching line is skipped without error.
pub fn strip_removals(target: &[String], fragment: &[FragmentLine]) -> Vec<String> {
    let mut result = target.to_vec();
    for line in fragment {
        let FragmentLine::Removal(text) = line else {
            continue;
        };
        match result.iter().position(|candidate| candidate == text) {
            Some(index) => {
                result.remove(index);
            }
            None => {
                tracing::debug!(line = %text, "removal line not present in target");
            }
        }
    }
    result
}

/// The fragment without its removal lines.
pub fn drop_removal_markers(fragment: &[FragmentLine]) -> Vec<FragmentLine> {
    fragment
        .iter()
        .filter(|line| !matches!(line, FragmentLine::Removal(_)))
        .cloned()
        .collect()
}

/// Insert additions relative to their anchors.
///
/// Anchors are searched in order, each after the previous one. The first
/// anchor that cannot be found aborts the merge; nothing partial is returned.
pub fn merge(target: &[String], fragment: &[FragmentLine]) -> Result<Vec<String>, UnmatchedLine> {
    let mut result = target.to_vec();
    let mut pending: Vec<String> = Vec::new();
    let mut before_anchor = false;
    let mut last_anchor: Option<usize> = None;

    for line in fragment {
        match line {
            FragmentLine::Addition(text) => pending.push(text.clone()),
            FragmentLine::BeforeAnchor => {
                // Additions already buffered stay with the previous anchor.
                if let Some(previous) = last_anchor.filter(|_| !pending.is_empty()) {
                    let flushed = std::mem::take(&mut pending);
                    let count = insert_lines(&mut result, previous + 1, flushed);
                    last_anchor = Some(previous + count);
                }
                before_anchor = true;
            }
            FragmentLine::Removal(_) => {}
            FragmentLine::Context(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                let start = last_anchor.map_or(0, |index| index + 1);
                let Some(offset) = result[start..].iter().position(|line| line == text) else {
                    return Err(UnmatchedLine(text.clone()));
                };
                let mut anchor = start + offset;
                if !pending.is_empty() {
                    let at = match last_anchor {
                        Some(previous) if !before_anchor => previous + 1,
                        _ => anchor,
                    };
                    anchor += insert_lines(&mut result, at, std::mem::take(&mut pending));
                }
                before_anchor = false;
                last_anchor = Some(anchor);
            }
        }
    }

    if !pending.is_empty() {
        let at = last_anchor.map_or(result.len(), |index| index + 1);
        insert_lines(&mut result, at, pending);
    }
    Ok(result)
}

fn insert_lines(result: &mut Vec<String>, at: usize, lines: Vec<String>) -> usize {
    let count = lines.len();
    let tail = result.split_off(at);
    result.extend(lines);
    result.extend(tail);
    count
}

/// Removals first, then additions, over an already parsed fragment.
pub fn apply(
    target: &[String],
    fragment: &[FragmentLine],
) -> Result<Vec<String>, UnmatchedLine> {
    let stripped = strip_removals(target, fragment);
    merge(&stripped, &drop_removal_markers(fragment))
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
