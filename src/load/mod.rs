// src/load/mod.rs
pub mod convert;
pub mod insert;
pub mod source;

use rusqlite::Connection;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::schema::derive_columns;

pub use convert::{coerce_cell, coerce_record, Cell, TypedRow};
pub use insert::{create_and_fill, table_state, TableState};
pub use source::{discover_source, read_source, RawRecord, RawTable};

/// Result of a successful `ensure_loaded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The table was (re)built from `source`.
    Loaded {
        source: PathBuf,
        columns: usize,
        rows: u64,
    },
    /// The table already held rows; nothing was touched.
    AlreadyPresent { rows: u64 },
}

/// Make sure `cfg.table` exists in `conn` and holds rows.
///
///  1) populated table → no-op
///  2) find the source file among the candidates
///  3) parse it fully, failing on zero data rows
///  4) derive column specs from the headers
///  5) create the table and insert every row in one transaction
///
/// Steps 2-4 run before the store is touched, so a missing or empty source
/// never leaves a table behind.
#[tracing::instrument(level = "info", skip(conn, cfg), fields(table = %cfg.table))]
pub fn ensure_loaded(conn: &mut Connection, cfg: &LoaderConfig) -> Result<LoadOutcome, LoadError> {
    let state = table_state(conn, &cfg.table)?;
    if !state.needs_load() {
        let rows = state.rows();
        info!(rows, "table already populated; skipping load");
        return Ok(LoadOutcome::AlreadyPresent { rows });
    }
    if state == TableState::Empty {
        warn!("table exists but is empty; reloading");
    }

    let path = discover_source(&cfg.candidates)?;
    let raw = read_source(&path)?;
    info!(
        path = %raw.path.display(),
        headers = raw.headers.len(),
        records = raw.records.len(),
        "parsed source"
    );

    let cols = derive_columns(&raw.headers, &cfg.types)?;
    let rows = create_and_fill(conn, &cfg.table, &cols, &raw.records)?;

    Ok(LoadOutcome::Loaded {
        source: raw.path,
        columns: cols.len(),
        rows,
    })
}
