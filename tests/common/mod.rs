//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Output root populated with targets and fragments for one test.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, text: &str) -> anyhow::Result<()> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text.as_bytes())?;
        Ok(())
    }

    pub fn read(&self, rel: &str) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.path(rel))?)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Run the fmerge binary with `args`, with logging kept off stdout.
    pub fn fmerge(&self, args: &[&str]) -> anyhow::Result<Output> {
        let output = Command::new(env!("CARGO_BIN_EXE_fmerge"))
            .args(args)
            .env("FMERGE_LOG", "fragment_merge=debug")
            .output()?;
        Ok(output)
    }

    /// `fmerge apply --root <root>` plus extra flags.
    pub fn apply(&self, extra: &[&str]) -> anyhow::Result<Output> {
        let root = self.root().display().to_string();
        let mut args = vec!["apply", "--root", root.as_str()];
        args.extend_from_slice(extra);
        self.fmerge(&args)
    }
}
