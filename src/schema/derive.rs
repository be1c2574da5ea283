use tracing::{debug, warn};

use super::sanitize::{is_valid_identifier, resolve_identifiers};
use super::{ColumnSpec, TypeTable};
use crate::error::LoadError;

/// Build one `ColumnSpec` per header, in header order.
///
///  - names come from sanitize + collision resolution over the full sequence
///  - types come from looking up each *base* name in `types`
pub fn derive_columns<S: AsRef<str>>(
    headers: &[S],
    types: &TypeTable,
) -> Result<Vec<ColumnSpec>, LoadError> {
    for name in types.overlapping() {
        warn!(
            "derive_columns: `{}` is listed as both real and integer, using real",
            name
        );
    }

    let resolved = resolve_identifiers(headers)?;
    let cols: Vec<ColumnSpec> = headers
        .iter()
        .zip(resolved)
        .map(|(header, r)| {
            debug_assert!(is_valid_identifier(&r.name));
            let storage_type = types.classify(&r.base);
            debug!(
                "derive_columns: `{}` -> {} {}",
                header.as_ref(),
                r.name,
                storage_type
            );
            ColumnSpec {
                original_header: header.as_ref().to_string(),
                sanitized_name: r.name,
                storage_type,
            }
        })
        .collect();

    Ok(cols)
}

/// Double-quote an identifier for SQLite.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE "<table>" ("a" REAL, "b" TEXT, ...)` in column order.
pub fn create_table_sql(table: &str, cols: &[ColumnSpec]) -> String {
    let defs: Vec<String> = cols
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.sanitized_name), c.storage_type))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table), defs.join(", "))
}

/// `INSERT INTO "<table>" (...) VALUES (?1, ?2, ...)` in column order.
pub fn insert_sql(table: &str, cols: &[ColumnSpec]) -> String {
    let names: Vec<String> = cols.iter().map(|c| quote_ident(&c.sanitized_name)).collect();
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders.join(", ")
    )
}
