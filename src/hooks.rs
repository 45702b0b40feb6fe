//! Environment capabilities the merge core calls out to.
//!
//! Both are narrow traits so runs can be driven with fakes in tests.
use crate::config::MergerConfig;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Picks a file name that does not collide with anything in a directory.
pub trait UniqueNamer {
    /// Returns a stem (without extension) unique within `dir` for `extension`.
    ///
    /// `extension` includes its leading dot, or is empty.
    fn unique_name(&self, dir: &Path, stem: &str, extension: &str) -> String;
}

/// Appends `1`, `2`, ... to the stem until no file with that name exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsUniqueNamer;

impl UniqueNamer for FsUniqueNamer {
    fn unique_name(&self, dir: &Path, stem: &str, extension: &str) -> String {
        if !dir.join(format!("{stem}{extension}")).exists() {
            return stem.to_string();
        }
        let mut suffix: u32 = 1;
        loop {
            let candidate = format!("{stem}{suffix}");
            if !dir.join(format!("{candidate}{extension}")).exists() {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Tells host tooling that a structural project file changed on disk.
pub trait ProjectRefresher {
    fn refresh_project(&self, project: &Path) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresher;

impl ProjectRefresher for NoopRefresher {
    fn refresh_project(&self, project: &Path) -> Result<()> {
        tracing::debug!(project = %project.display(), "no project refresh configured");
        Ok(())
    }
}

/// Runs a configured command with the project path as its last argument.
#[derive(Debug, Clone)]
pub struct CommandRefresher {
    argv: Vec<String>,
}

impl CommandRefresher {
    pub fn new(command: &str) -> Result<Self> {
        let argv = shell_words::split(command)
            .with_context(|| format!("parse refresh command: {command}"))?;
        if argv.is_empty() {
            return Err(anyhow!("refresh command is empty"));
        }
        Ok(Self { argv })
    }
}

impl ProjectRefresher for CommandRefresher {
    fn refresh_project(&self, project: &Path) -> Result<()> {
        let start = Instant::now();
        let output = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .arg(project)
            .output()
            .with_context(|| format!("spawn refresh command: {}", self.argv[0]))?;
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            project = %project.display(),
            "project refresh complete"
        );
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "refresh command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }
        Ok(())
    }
}

/// Collaborators handed to the orchestrator for one run.
pub struct Hooks {
    pub namer: Box<dyn UniqueNamer>,
    pub refresher: Box<dyn ProjectRefresher>,
    /// Extension, without the dot, of files that trigger a project refresh.
    pub project_extension: String,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            namer: Box::new(FsUniqueNamer),
            refresher: Box::new(NoopRefresher),
            project_extension: crate::config::DEFAULT_PROJECT_EXTENSION.to_string(),
        }
    }
}

impl Hooks {
    pub fn from_config(config: &MergerConfig) -> Result<Self> {
        let refresher: Box<dyn ProjectRefresher> = match config.refresh_command.as_deref() {
            Some(command) if !command.trim().is_empty() => {
                Box::new(CommandRefresher::new(command)?)
            }
            _ => Box::new(NoopRefresher),
        };
        Ok(Self {
            namer: Box::new(FsUniqueNamer),
            refresher,
            project_extension: config.project_extension.clone(),
        })
    }

    pub fn is_project_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.project_extension))
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
