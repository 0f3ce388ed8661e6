//! CLI entry point for gesture-binding-manager
//!
//! Provides command-line interface for listing, editing and auditing
//! gesture bindings stored in a bindings file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use gesture_binding_manager::core::{
    parser::parse_store, BindOutcome, BindableEvent, ClaimSource, ConflictDetector,
    DefaultBindingSet, Gesture, GestureRegistry,
};
use gesture_binding_manager::events::TracingPublisher;
use gesture_binding_manager::store::{BindingStore, FileStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gesture-binding-manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the bindings store file
    #[arg(short, long, global = true, default_value = "~/.config/gesture-bindings/bindings.conf")]
    store: PathBuf,

    /// Number of store backups to keep
    #[arg(long, global = true, default_value_t = 10)]
    keep_backups: usize,

    /// Work on defaults only, without reading or writing the store
    #[arg(long, global = true)]
    in_memory: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all live bindings
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the factory-default catalog
    Defaults,

    /// Show which event a gesture triggers
    Lookup { gesture: Gesture },

    /// Add a gesture to an event
    Bind { event: BindableEvent, gesture: Gesture },

    /// Remove a gesture from whichever event holds it
    Unbind { gesture: Gesture },

    /// Replace all of an event's gestures
    Set {
        event: BindableEvent,
        #[arg(required = true)]
        gestures: Vec<Gesture>,
    },

    /// Remove every removable gesture from an event
    Clear { event: BindableEvent },

    /// Replace one gesture of an event with another
    Update {
        event: BindableEvent,
        old: Gesture,
        /// New gesture; omitted means explicitly unbound
        new: Option<Gesture>,
    },

    /// Check the store file for gestures claimed by several events
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = expand_path(&cli.store)?;
    let (in_memory, keep_backups) = (cli.in_memory, cli.keep_backups);
    let open = || open_registry(&path, in_memory, keep_backups);

    let outcome = match cli.command {
        Commands::Check => return check_conflicts(&path),
        Commands::Defaults => return list_defaults(),
        Commands::List { json } => return list_bindings(&open()?, json),
        Commands::Lookup { gesture } => {
            match open()?.lookup(&gesture) {
                Some(event) => println!("{} → {}", gesture.to_string().cyan().bold(), event),
                None => println!("{} is not bound", gesture.to_string().cyan()),
            }
            return Ok(());
        }
        Commands::Bind { event, gesture } => open()?.add_binding(event, gesture),
        Commands::Unbind { gesture } => open()?.remove_binding(&gesture),
        Commands::Set { event, gestures } => open()?.set_bindings(event, gestures),
        Commands::Clear { event } => open()?.clear_bindings(event),
        Commands::Update { event, old, new } => open()?.update_binding(event, old, new)?,
    };

    report_outcome(outcome);
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand tilde in path
fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::tilde(
        path.to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?,
    );
    Ok(PathBuf::from(expanded.as_ref()))
}

fn open_registry(
    path: &Path,
    in_memory: bool,
    keep_backups: usize,
) -> anyhow::Result<GestureRegistry> {
    let store: Option<Box<dyn BindingStore>> = if in_memory {
        None
    } else {
        let store = FileStore::open(path.to_path_buf())
            .with_context(|| format!("Failed to open store {}", path.display()))?
            .with_backup_limit(keep_backups);
        Some(Box::new(store))
    };

    let registry = GestureRegistry::new();
    registry.initialize(Arc::new(TracingPublisher), store);
    Ok(registry)
}

/// Print the outcome and exit with status 1 on failure
fn report_outcome(outcome: BindOutcome) {
    match outcome {
        BindOutcome::Applied => println!("{} Done", "✓".green().bold()),
        BindOutcome::Unchanged => println!("{} Nothing to change", "✓".green()),
        failed => {
            eprintln!("{} {}", "✗".red().bold(), failed.to_string().red());
            std::process::exit(1);
        }
    }
}

fn list_bindings(registry: &GestureRegistry, json: bool) -> anyhow::Result<()> {
    let bindings = registry.bindings();

    if json {
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(());
    }

    println!("{}", "Gesture bindings\n".bold());

    for event in BindableEvent::ALL {
        let gestures = registry.get_bindings(event);
        let listed = if gestures.is_empty() {
            "(unbound)".dimmed().to_string()
        } else {
            gestures
                .iter()
                .map(|g| g.to_string().cyan().bold().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        println!("{} → {}", event.to_string().green(), listed);
    }

    println!("\n{} Total: {} bindings", "→".cyan(), bindings.len());
    Ok(())
}

fn list_defaults() -> anyhow::Result<()> {
    println!("{}", "Factory defaults\n".bold());

    for binding in DefaultBindingSet::standard().iter() {
        let lock = if binding.overridable {
            String::new()
        } else {
            " (protected)".yellow().to_string()
        };
        println!(
            "{} → {}{}",
            binding.gesture.to_string().cyan().bold(),
            binding.event.to_string().green(),
            lock
        );
    }

    Ok(())
}

/// Check the store file for conflicting claims, including against defaults
fn check_conflicts(path: &Path) -> anyhow::Result<()> {
    let content = match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(anyhow::anyhow!("Failed to read file: {}", e)),
    };

    println!("{} Checking store: {}", "→".cyan(), path.display());

    let parsed = parse_store(&content);
    println!("{} Found {} stored bindings", "✓".green(), parsed.entries.len());

    for skipped in &parsed.skipped {
        println!("  {} {}", "skipped".yellow(), skipped);
    }
    println!();

    let mut detector = ConflictDetector::new();
    detector.add_defaults(DefaultBindingSet::standard());
    for (line, event, gesture) in parsed.entries {
        detector.add_claim(event, gesture, ClaimSource::Store { line });
    }

    let conflicts = detector.find_conflicts();

    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} conflict{}:\n",
        "✗".red().bold(),
        conflicts.len(),
        if conflicts.len() == 1 { "" } else { "s" }
    );

    for (i, conflict) in conflicts.iter().enumerate() {
        println!(
            "{} {}",
            format!("Conflict {}", i + 1).yellow().bold(),
            conflict.gesture.to_string().cyan()
        );

        for (idx, claim) in conflict.claims.iter().enumerate() {
            println!(
                "  {} {} ({})",
                format!("{}.", idx + 1).dimmed(),
                claim.event.to_string().magenta(),
                claim.source
            );
        }
        println!();
    }

    println!("{}", "⚠ Only the first claim of each gesture is loaded!".yellow());
    std::process::exit(1);
}
