use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::schema::{sanitize_identifier, TypeTable};

pub const CONFIG_ENV: &str = "TABLOAD_CONFIG";
pub const DB_ENV: &str = "TABLOAD_DB";
pub const CSV_ENV: &str = "TABLOAD_CSV";

/// Where the persistent store lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("local.db"),
        }
    }
}

/// What to load and how to type it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Destination table name.
    pub table: String,
    /// Source files to try, first existing wins.
    pub candidates: Vec<PathBuf>,
    pub types: TypeTable,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            table: "cities".into(),
            candidates: vec![
                PathBuf::from("world-cities-geoname.csv"),
                PathBuf::from("World Cities Geoname.csv"),
            ],
            types: TypeTable::world_cities(),
        }
    }
}

impl LoaderConfig {
    /// Resolve relative candidates against `base`.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.candidates = self
            .candidates
            .into_iter()
            .map(|p| if p.is_relative() { base.join(p) } else { p })
            .collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub loader: LoaderConfig,
}

impl AppConfig {
    /// Parse a YAML document; missing keys fall back to defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: AppConfig = serde_yaml::from_str(text).context("parsing config YAML")?;
        Ok(cfg.normalized())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("loading config {}", path.display()))
    }

    /// Load from `explicit`, else `$TABLOAD_CONFIG`, else defaults; then apply
    /// `$TABLOAD_DB` and `$TABLOAD_CSV`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| env::var_os(key))
    }

    /// `load` with the environment supplied by `lookup`.
    pub fn load_with<F>(explicit: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let from_env = lookup(CONFIG_ENV).map(PathBuf::from);
        let cfg = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        Ok(cfg.apply_overrides(lookup).normalized())
    }

    /// `$TABLOAD_DB` replaces the store path; `$TABLOAD_CSV` becomes the first candidate.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(db) = lookup(DB_ENV) {
            self.store.path = PathBuf::from(db);
        }
        if let Some(csv) = lookup(CSV_ENV) {
            self.loader.candidates.insert(0, PathBuf::from(csv));
        }
        self
    }

    /// The table name must satisfy the same identifier grammar as columns.
    fn normalized(mut self) -> Self {
        let table = sanitize_identifier(&self.loader.table);
        if table != self.loader.table {
            warn!(
                "table name `{}` is not a valid identifier, using `{}`",
                self.loader.table, table
            );
            self.loader.table = table;
        }
        self
    }
}
