// src/store/mod.rs
pub mod query;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::{LoaderConfig, StoreConfig};
use crate::load::{ensure_loaded, LoadOutcome};

pub use query::{describe_table, fetch_rows, head, QueryResult};

/// Open (or create) the SQLite store at `path`, creating parent dirs as needed.
pub fn open_store<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating store directory {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("opening store {}", path.display()))?;
    Ok(conn)
}

/// Open the store and make sure the destination table is loaded.
///
/// The returned connection is the only handle; dropping it closes the store.
pub fn ensure_store(store: &StoreConfig, loader: &LoaderConfig) -> Result<Connection> {
    let mut conn = open_store(&store.path)?;
    let outcome = ensure_loaded(&mut conn, loader).with_context(|| {
        format!(
            "loading `{}` into {}",
            loader.table,
            store.path.display()
        )
    })?;

    match outcome {
        LoadOutcome::Loaded { source, rows, .. } => info!(
            store = %store.path.display(),
            source = %source.display(),
            rows,
            "store initialised"
        ),
        LoadOutcome::AlreadyPresent { rows } => {
            info!(store = %store.path.display(), rows, "store ready")
        }
    }
    Ok(conn)
}

/// Fresh mode: delete the store (and its journal side files), then rebuild it.
pub fn rebuild_store(store: &StoreConfig, loader: &LoaderConfig) -> Result<Connection> {
    for path in store_files(&store.path) {
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("removing {}", path.display()))?;
            info!(path = %path.display(), "removed existing store file");
        }
    }
    ensure_store(store, loader)
}

fn store_files(db: &Path) -> Vec<PathBuf> {
    let mut files = vec![db.to_path_buf()];
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut name: OsString = db.as_os_str().to_owned();
        name.push(suffix);
        files.push(PathBuf::from(name));
    }
    files
}
