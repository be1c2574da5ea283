// src/load/source.rs
use csv::{ReaderBuilder, Trim};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::error::LoadError;

/// One data row, positionally aligned with `RawTable::headers`.
/// `None` means the row ended before this column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub values: Vec<Option<String>>,
}

impl RawRecord {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }
}

/// A fully parsed source file.
#[derive(Debug)]
pub struct RawTable {
    pub path: PathBuf,
    /// Headers in file order, trimmed, BOM removed.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub records: Vec<RawRecord>,
}

/// First candidate that exists on disk.
pub fn discover_source<P: AsRef<Path>>(candidates: &[P]) -> Result<PathBuf, LoadError> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate.is_file() {
            info!(path = %candidate.display(), "found source file");
            return Ok(candidate.to_path_buf());
        }
        debug!(path = %candidate.display(), "source candidate missing");
    }
    Err(LoadError::SourceNotFound {
        tried: candidates.iter().map(|c| c.as_ref().to_path_buf()).collect(),
    })
}

/// Read and parse `path`. Fails with `EmptySource` when no data rows remain.
pub fn read_source(path: &Path) -> Result<RawTable, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (headers, records) = parse_text(&text).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    if records.is_empty() {
        return Err(LoadError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        records,
    })
}

/// Split CSV text into headers and positional records.
///  - a leading UTF-8 BOM is dropped
///  - blank lines are skipped
///  - every cell is trimmed
pub fn parse_text(text: &str) -> Result<(Vec<String>, Vec<RawRecord>), csv::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut records = Vec::new();
    let mut warned_wide = false;
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // the csv reader already drops empty lines; this catches lines of bare whitespace
        if record.len() == 1 && record.get(0) == Some("") {
            continue;
        }
        if record.len() > width && !warned_wide {
            warn!(
                "parse_text: record {} has {} cells but only {} headers; extra cells ignored",
                idx,
                record.len(),
                width
            );
            warned_wide = true;
        }

        let values = (0..width)
            .map(|i| record.get(i).map(str::to_string))
            .collect();
        records.push(RawRecord { values });
    }

    Ok((headers, records))
}
