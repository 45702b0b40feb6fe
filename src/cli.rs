//! CLI argument parsing for the fragment merge workflow.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "fmerge",
    version,
    about = "Merge generated fragments into existing files",
    after_help = "Examples:\n  fmerge apply --root ./out\n  fmerge apply --root ./out --fail-on-error\n  fmerge apply --root ./out --report merge-report.json --json\n  fmerge resolve --fragment ./out/App_postaction.xaml",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Apply(ApplyArgs),
    Resolve(ResolveArgs),
}

/// Apply command inputs for one run over an output root.
#[derive(Parser, Debug)]
#[command(about = "Apply every merge fragment under an output root")]
pub struct ApplyArgs {
    /// Output root containing generated fragments and their targets
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,

    /// Merge config JSON (defaults to <root>/.fmerge.json when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop at the first failed fragment instead of quarantining it
    #[arg(long)]
    pub fail_on_error: bool,

    /// Write the run report as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Emit the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Resolve command inputs; never modifies files.
#[derive(Parser, Debug)]
#[command(about = "Show the target and intent file a fragment resolves to")]
pub struct ResolveArgs {
    /// Fragment file to resolve
    #[arg(long, value_name = "PATH")]
    pub fragment: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
