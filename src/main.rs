use anyhow::{Context, Result};
use clap::Parser;
use fragment_merge::cli::{ApplyArgs, Command, ResolveArgs, RootArgs};
use fragment_merge::hooks::Hooks;
use fragment_merge::{config, resolve, run};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();
    match args.command {
        Command::Apply(args) => cmd_apply(&args),
        Command::Resolve(args) => cmd_resolve(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FMERGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("fragment_merge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_apply(args: &ApplyArgs) -> Result<()> {
    let mut merge_config = config::resolve_config(args.config.as_deref(), &args.root)?;
    if args.fail_on_error {
        merge_config.fail_on_error = true;
    }
    let hooks = Hooks::from_config(&merge_config)?;
    let report = run::run_merges(&args.root, merge_config.fail_on_error, &hooks)
        .with_context(|| format!("merge fragments under {}", args.root.display()))?;

    if let Some(path) = args.report.as_ref() {
        run::write_report(path, &report)?;
    }
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize merge report")?;
        println!("{text}");
        return Ok(());
    }

    for target in &report.applied {
        println!("merged {target}");
    }
    for failure in &report.failures {
        println!(
            "failed {} -> {} ({:?}): {}",
            failure.fragment_file_name,
            failure.failed_file_name,
            failure.kind,
            failure.description
        );
        if !failure.intent.trim().is_empty() {
            println!("  intent: {}", failure.intent.trim());
        }
    }
    println!(
        "{} merged, {} quarantined",
        report.applied.len(),
        report.failures.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct Resolution {
    fragment: PathBuf,
    convention: resolve::FragmentConvention,
    target: Option<PathBuf>,
    target_exists: bool,
    intent: PathBuf,
    intent_exists: bool,
}

fn cmd_resolve(args: &ResolveArgs) -> Result<()> {
    let target = resolve::resolve_target(&args.fragment)?;
    let intent = resolve::intent_path(&args.fragment);
    let resolution = Resolution {
        fragment: args.fragment.clone(),
        convention: resolve::convention(&args.fragment),
        target_exists: target.as_ref().is_some_and(|path| path.is_file()),
        target,
        intent_exists: intent.is_file(),
        intent,
    };

    if args.json {
        let text = serde_json::to_string_pretty(&resolution).context("serialize resolution")?;
        println!("{text}");
        return Ok(());
    }

    println!("convention: {:?}", resolution.convention);
    match resolution.target.as_ref() {
        Some(path) if resolution.target_exists => println!("target: {}", path.display()),
        Some(path) => println!("target: {} (missing)", path.display()),
        None => println!("target: not found"),
    }
    let suffix = if resolution.intent_exists { "" } else { " (missing)" };
    println!("intent: {}{suffix}", resolution.intent.display());
    Ok(())
}
