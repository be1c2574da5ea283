use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{ToSql, ToSqlOutput, Value};

use super::source::RawRecord;
use crate::schema::{ColumnSpec, StorageType};

/// A coerced cell, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Real(f64),
    Integer(i64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            Cell::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

static INTEGER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").unwrap());
static REAL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?").unwrap()
});

/// One row of cells, positionally aligned with the column specs.
pub type TypedRow = Vec<Cell>;

/// Coerce one raw cell according to `ty`.
///
/// Missing and empty cells are null. Numeric cells are read from their
/// leading numeric part; no such part, an out-of-range integer or a
/// non-finite float gives null rather than an error.
pub fn coerce_cell(raw: Option<&str>, ty: StorageType) -> Cell {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Cell::Null,
        Some(s) => s,
    };

    match ty {
        StorageType::Real => parse_real(raw).map_or(Cell::Null, Cell::Real),
        StorageType::Integer => parse_integer(raw).map_or(Cell::Null, Cell::Integer),
        StorageType::Text => Cell::Text(raw.to_string()),
    }
}

/// Longest leading float prefix (`"3.14 km"` -> 3.14); non-finite is rejected.
fn parse_real(s: &str) -> Option<f64> {
    let m = REAL_PREFIX.find(s)?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest leading base-10 integer prefix (`"12.5"` -> 12, `"1,234"` -> 1).
fn parse_integer(s: &str) -> Option<i64> {
    let m = INTEGER_PREFIX.find(s)?;
    m.as_str().parse::<i64>().ok()
}

/// Build the typed row for `record`, column by column.
pub fn coerce_record(record: &RawRecord, cols: &[ColumnSpec]) -> TypedRow {
    cols.iter()
        .enumerate()
        .map(|(idx, col)| coerce_cell(record.get(idx), col.storage_type))
        .collect()
}
