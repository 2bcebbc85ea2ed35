//! # imprint
//!
//! Inspect memory-file imports from the command line: print import trees,
//! the merged instruction set, discovered roots, token usage, or broken
//! imports. Command output is JSON on stdout; logs go to stderr.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imprint_context::{MemoryResolver, collect_issues};
use imprint_core::Scope;
use imprint_logging::LogLevel;
use imprint_settings::ImprintSettings;
use imprint_store::{FsFileStore, MemoryLayout};
use serde_json::json;

/// Memory-file import resolver.
#[derive(Parser, Debug)]
#[command(name = "imprint", about = "Resolve and inspect memory-file imports")]
struct Cli {
    /// Project root, also the base for relative paths (overrides settings;
    /// defaults to the current directory).
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Settings file (defaults to `~/.imprint/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the import tree of a memory file.
    Tree {
        /// Root memory file.
        path: PathBuf,
        /// Scope inherited by the file's imports.
        #[arg(long, default_value = "project")]
        scope: Scope,
    },
    /// Merge every discovered memory file.
    Merge {
        /// Print the rendered text instead of JSON.
        #[arg(long)]
        text: bool,
    },
    /// List discovered root memory files in precedence order.
    Roots,
    /// Estimate token usage of the merged memory.
    Usage,
    /// Report broken imports; exits with status 1 when any are found.
    Check {
        /// Root memory file.
        path: PathBuf,
        /// Scope inherited by the file's imports.
        #[arg(long, default_value = "project")]
        scope: Scope,
    },
}

/// What a command printed and whether it should fail the process.
struct Output {
    body: String,
    failed: bool,
}

impl Output {
    fn ok(body: String) -> Self {
        Self {
            body,
            failed: false,
        }
    }
}

/// Load settings and apply command-line overrides.
fn resolve_settings(args: &Cli, cwd: &Path) -> Result<ImprintSettings> {
    let path = args
        .settings
        .clone()
        .unwrap_or_else(imprint_settings::settings_path);
    let mut settings = imprint_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(project) = &args.project {
        let project = cwd.join(project).to_string_lossy().into_owned();
        settings.paths.project_root = Some(project.clone());
        settings.paths.base_dir = Some(project);
    }
    if settings.paths.project_root.is_none() {
        settings.paths.project_root = Some(cwd.to_string_lossy().into_owned());
    }
    if settings.paths.base_dir.is_none() {
        settings.paths.base_dir = Some(cwd.to_string_lossy().into_owned());
    }
    if args.json_logs {
        settings.logging.json = true;
    }
    Ok(settings)
}

fn build_resolver(settings: &ImprintSettings) -> MemoryResolver<FsFileStore> {
    let mut layout = MemoryLayout::new(settings.paths.home_dir());
    if let Some(root) = &settings.paths.project_root {
        layout = layout.with_project_root(root);
    }
    if let Some(managed) = &settings.paths.managed_file {
        layout = layout.with_managed_file(managed);
    }
    MemoryResolver::from_settings(FsFileStore::new(layout), settings)
}

fn pretty(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn execute(
    command: &Command,
    resolver: &MemoryResolver<FsFileStore>,
    settings: &ImprintSettings,
) -> Result<Output> {
    match command {
        Command::Tree { path, scope } => {
            let tree = resolver
                .build_in_scope(*scope, path)
                .with_context(|| format!("Failed to resolve {}", path.display()))?;
            Ok(Output::ok(pretty(&tree)?))
        }
        Command::Merge { text } => {
            let set = resolver.merge_discovered().context("Failed to merge memory")?;
            if *text {
                Ok(Output::ok(set.render()))
            } else {
                Ok(Output::ok(pretty(&set)?))
            }
        }
        Command::Roots => {
            let roots = resolver
                .discover_roots()
                .context("Failed to list memory roots")?;
            let listed: Vec<_> = roots
                .iter()
                .map(|(scope, path)| json!({ "scope": scope, "path": path }))
                .collect();
            Ok(Output::ok(pretty(&listed)?))
        }
        Command::Usage => {
            let set = resolver.merge_discovered().context("Failed to merge memory")?;
            Ok(Output::ok(pretty(&set.usage(settings.merge.chars_per_token))?))
        }
        Command::Check { path, scope } => {
            let tree = resolver
                .build_in_scope(*scope, path)
                .with_context(|| format!("Failed to resolve {}", path.display()))?;
            let issues = collect_issues(&tree);
            if issues.is_empty() {
                tracing::info!(root = %tree.path.display(), nodes = tree.node_count(), "no broken imports");
            } else {
                tracing::warn!(root = %tree.path.display(), count = issues.len(), "broken imports found");
            }
            Ok(Output {
                failed: !issues.is_empty(),
                body: pretty(&issues)?,
            })
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    // Settings first: they carry the log level
    let settings = resolve_settings(&args, &cwd)?;
    let _ = imprint_logging::init_subscriber(
        LogLevel::from_str_lossy(&settings.logging.level),
        settings.logging.json,
    );
    tracing::debug!(
        project = ?settings.paths.project_root,
        max_depth = settings.resolver.max_depth,
        "settings loaded"
    );

    let resolver = build_resolver(&settings);
    let output = execute(&args.command, &resolver, &settings)?;
    println!("{}", output.body);

    Ok(if output.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
