//! File helpers for reading targets and committing merged text.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const BOM: char = '\u{feff}';

/// A text file split into lines, remembering how to write it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub lines: Vec<String>,
    pub newline: &'static str,
    pub bom: bool,
}

impl TextFile {
    pub fn parse(text: &str) -> Self {
        let (bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            lines: body.lines().map(str::to_string).collect(),
            newline,
            bom,
        }
    }

    /// Every line terminated, including the last.
    pub fn render(&self, lines: &[String]) -> String {
        let mut text = String::new();
        if self.bom {
            text.push(BOM);
        }
        for line in lines {
            text.push_str(line);
            text.push_str(self.newline);
        }
        text
    }
}

/// Read and split a text file. Bytes that are not valid UTF-8 decode to
/// U+FFFD instead of failing the read.
pub fn read_text_file(path: &Path) -> Result<TextFile> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), "file is not valid UTF-8; decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    Ok(TextFile::parse(&text))
}

/// Clear a read-only lock on `path`. Safe to call on writable files.
pub fn ensure_writable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).with_context(|| format!("inspect {}", path.display()))?;
    let mut permissions = metadata.permissions();
    if !permissions.readonly() {
        return Ok(());
    }
    make_writable(&mut permissions);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("make {} writable", path.display()))?;
    tracing::debug!(path = %path.display(), "cleared read-only flag");
    Ok(())
}

#[cfg(unix)]
fn make_writable(permissions: &mut fs::Permissions) {
    use std::os::unix::fs::PermissionsExt;
    permissions.set_mode(permissions.mode() | 0o200);
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(permissions: &mut fs::Permissions) {
    permissions.set_readonly(false);
}

/// Replace `dest` through a sibling temp file so readers never see a torn write.
///
/// The existing file's permissions carry over to the replacement. A symlinked
/// `dest` is resolved first so the link's target receives the new content.
pub fn replace_file(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dest = fs::canonicalize(dest).with_context(|| format!("resolve {}", dest.display()))?;
    let dest = dest.as_path();
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(dest)
        .with_context(|| format!("inspect {}", dest.display()))?
        .permissions();
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write {}", dest.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync {}", dest.display()))?;
    fs::set_permissions(tmp.path(), permissions)
        .with_context(|| format!("copy permissions to {}", tmp.path().display()))?;
    tmp.persist(dest)
        .map_err(|err| anyhow!("publish {}: {}", dest.display(), err.error))?;
    Ok(())
}

/// Remove a file, treating an already missing file as success.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}

/// Every regular file under `root`, directories first visited in name order.
pub fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    let mut entries = fs::read_dir(root)
        .with_context(|| format!("read {}", root.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("read {}", root.display()))?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_files_recursive(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
#[path = "fsutil_tests.rs"]
mod tests;
