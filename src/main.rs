use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tabload::{logging::init_logging, rebuild_store, store, AppConfig};
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Load a CSV source into a typed SQLite table (once)"
)]
struct Args {
    /// Delete the store first and rebuild it from the source file.
    #[arg(long)]
    fresh: bool,
    /// YAML config file (defaults to $TABLOAD_CONFIG, then built-in defaults).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Store path, overriding the config.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    init_logging("info");
    let args = Args::parse();

    // ─── 2) resolve config ───────────────────────────────────────────
    let mut cfg = AppConfig::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        cfg.store.path = db;
    }
    info!(
        store = %cfg.store.path.display(),
        table = %cfg.loader.table,
        fresh = args.fresh,
        "startup"
    );

    // ─── 3) open + load ──────────────────────────────────────────────
    let conn = if args.fresh {
        rebuild_store(&cfg.store, &cfg.loader)?
    } else {
        store::ensure_store(&cfg.store, &cfg.loader)?
    };
    drop(conn);

    println!("SQLite database initialized at {}", cfg.store.path.display());
    Ok(())
}
