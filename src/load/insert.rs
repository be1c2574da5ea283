use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use super::convert::coerce_record;
use super::source::RawRecord;
use crate::error::LoadError;
use crate::schema::{create_table_sql, insert_sql, quote_ident, ColumnSpec};

/// What the store currently holds under the destination name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Missing,
    Empty,
    Populated(u64),
}

impl TableState {
    pub fn needs_load(&self) -> bool {
        !matches!(self, TableState::Populated(_))
    }

    pub fn rows(&self) -> u64 {
        match self {
            TableState::Populated(n) => *n,
            TableState::Missing | TableState::Empty => 0,
        }
    }
}

/// Explicit existence + row-count check for `table`.
pub fn table_state(conn: &Connection, table: &str) -> rusqlite::Result<TableState> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(TableState::Missing);
    }

    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
        [],
        |r| r.get(0),
    )?;
    Ok(match count {
        0 => TableState::Empty,
        n => TableState::Populated(n as u64),
    })
}

/// Create `table` and insert every record, all inside one transaction.
///
/// An existing empty table of the same name is dropped first, in the same
/// transaction. On any failure the transaction rolls back and the store is
/// left exactly as it was. Returns the number of rows inserted.
pub fn create_and_fill(
    conn: &mut Connection,
    table: &str,
    cols: &[ColumnSpec],
    records: &[RawRecord],
) -> Result<u64, LoadError> {
    let failed = |source: rusqlite::Error| LoadError::LoadFailed {
        table: table.to_string(),
        source,
    };

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(failed)?;

    tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
        .map_err(failed)?;

    let create = create_table_sql(table, cols);
    debug!(sql = %create, "creating destination table");
    tx.execute_batch(&create).map_err(failed)?;

    let mut nulls = vec![0u64; cols.len()];
    let mut inserted = 0u64;
    {
        let mut stmt = tx.prepare(&insert_sql(table, cols)).map_err(failed)?;
        for record in records {
            let row = coerce_record(record, cols);
            for (count, cell) in nulls.iter_mut().zip(&row) {
                if cell.is_null() {
                    *count += 1;
                }
            }
            stmt.execute(rusqlite::params_from_iter(row.iter()))
                .map_err(failed)?;
            inserted += 1;
        }
    }

    tx.commit().map_err(failed)?;

    for (col, count) in cols.iter().zip(&nulls) {
        if *count > 0 {
            debug!(
                column = %col.sanitized_name,
                nulls = count,
                "column loaded with null cells"
            );
        }
    }
    info!(table, rows = inserted, "bulk insert committed");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{derive_columns, TypeTable};
    use anyhow::Result;

    fn record(values: &[&str]) -> RawRecord {
        RawRecord {
            values: values.iter().map(|v| Some(v.to_string())).collect(),
        }
    }

    #[test]
    fn state_tracks_missing_empty_and_populated() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        assert_eq!(table_state(&conn, "cities")?, TableState::Missing);

        conn.execute_batch("CREATE TABLE cities (name TEXT)")?;
        assert_eq!(table_state(&conn, "cities")?, TableState::Empty);

        conn.execute_batch("INSERT INTO cities VALUES ('a'), ('b')")?;
        assert_eq!(table_state(&conn, "cities")?, TableState::Populated(2));
        assert!(!TableState::Populated(2).needs_load());
        assert!(TableState::Empty.needs_load());
        assert!(TableState::Missing.needs_load());
        assert_eq!(TableState::Populated(2).rows(), 2);
        assert_eq!(TableState::Empty.rows(), 0);
        Ok(())
    }

    #[test]
    fn fills_rows_in_source_order() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        let cols = derive_columns(&["Name", "Population"], &TypeTable::world_cities())?;
        let records: Vec<RawRecord> = (0..50)
            .map(|i| record(&[format!("city{}", i).as_str(), i.to_string().as_str()]))
            .collect();

        assert_eq!(create_and_fill(&mut conn, "cities", &cols, &records)?, 50);

        let mut stmt = conn.prepare("SELECT name, population FROM cities ORDER BY rowid")?;
        let rows: Vec<(String, i64)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        for (i, (name, pop)) in rows.iter().enumerate() {
            assert_eq!(name, &format!("city{}", i));
            assert_eq!(*pop, i as i64);
        }
        Ok(())
    }

    #[test]
    fn replaces_empty_table_with_new_schema() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch("CREATE TABLE cities (legacy TEXT)")?;
        let cols = derive_columns(&["Name"], &TypeTable::default())?;

        create_and_fill(&mut conn, "cities", &cols, &[record(&["Quito"])])?;

        let name: String = conn.query_row("SELECT name FROM cities", [], |r| r.get(0))?;
        assert_eq!(name, "Quito");
        Ok(())
    }

    #[test]
    fn failure_after_drop_restores_previous_table() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch("CREATE TABLE cities (legacy TEXT)")?;

        // two columns with one name make CREATE fail after the DROP already ran
        let mut cols = derive_columns(&["Name", "Other"], &TypeTable::default())?;
        cols[1].sanitized_name = "name".into();

        let err = create_and_fill(&mut conn, "cities", &cols, &[record(&["a", "b"])]).unwrap_err();
        assert!(matches!(err, LoadError::LoadFailed { .. }));

        let legacy: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('cities') WHERE name = 'legacy'",
            [],
            |r| r.get(0),
        )?;
        assert_eq!(legacy, 1);
        assert_eq!(table_state(&conn, "cities")?, TableState::Empty);
        Ok(())
    }

    #[test]
    fn failure_leaves_no_table_behind() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        // a view under the destination name cannot be dropped as a table
        conn.execute_batch("CREATE VIEW cities AS SELECT 1 AS name")?;
        let cols = derive_columns(&["Name"], &TypeTable::default())?;

        let err = create_and_fill(&mut conn, "cities", &cols, &[record(&["x"])]).unwrap_err();
        assert!(matches!(err, LoadError::LoadFailed { .. }));

        let kind: String = conn.query_row(
            "SELECT type FROM sqlite_master WHERE name = 'cities'",
            [],
            |r| r.get(0),
        )?;
        assert_eq!(kind, "view");
        Ok(())
    }
}
