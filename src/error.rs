use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single `ensure_loaded` call. Every variant leaves the store
/// as it was before the call.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no source file found (tried: {})", display_paths(.tried))]
    SourceNotFound { tried: Vec<PathBuf> },

    #[error("source `{}` contains no data records", .path.display())]
    EmptySource { path: PathBuf },

    #[error("could not derive a unique column name for header `{header}`")]
    SchemaCollisionUnresolved { header: String },

    #[error("bulk load into `{table}` failed: {source}")]
    LoadFailed {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing `{}`: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
