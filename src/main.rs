//! TTL Cache snapshot tool
//!
//! Inspects and compacts snapshot files written by `Store::save_file`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::Cache;

/// TTL Cache snapshot tool
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the live entries in a snapshot
    Inspect {
        /// Snapshot file
        path: PathBuf,
    },
    /// Rewrite a snapshot without its expired entries
    Compact {
        /// Snapshot file
        path: PathBuf,

        /// Where to write the result (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Inspect { path } => inspect(&path),
        Command::Compact { path, output } => {
            compact(&path, output.as_deref().unwrap_or(path.as_path()))
        }
    }
}

/// Loads a snapshot into a cache with no default TTL and no sweeper, so only
/// the expirations recorded in the file apply.
fn load(path: &Path) -> anyhow::Result<Cache> {
    let cache = Cache::new(Duration::ZERO, Duration::ZERO);
    let loaded = cache
        .load_file(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    info!("Loaded {} entries from {}", loaded, path.display());
    Ok(cache)
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let cache = load(path)?;

    let mut items: Vec<_> = cache.items().into_iter().collect();
    items.sort_by(|(a, _), (b, _)| a.cmp(b));

    println!("{} live entries", items.len());
    for (key, entry) in items {
        let expires = entry
            .expires_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        let remaining = entry
            .ttl_remaining()
            .map(|ttl| format!("{}s", ttl.as_secs()))
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}\t{}", key, entry.value.kind_name(), expires, remaining);
    }
    Ok(())
}

fn compact(path: &Path, output: &Path) -> anyhow::Result<()> {
    let cache = load(path)?;
    cache
        .save_file(output)
        .with_context(|| format!("Failed to write snapshot {}", output.display()))?;
    info!("Wrote {} live entries to {}", cache.items().len(), output.display());
    Ok(())
}
