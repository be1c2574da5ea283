use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{types::ValueRef, Connection};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::schema::{quote_ident, StorageType};

static LIMIT_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\blimit\b").unwrap());

/// Rows returned by a read-only query, each an ordered column → value map.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// The statement actually executed (after any `LIMIT` was appended).
    pub query: String,
    pub rows: Vec<Map<String, JsonValue>>,
    pub row_count: usize,
}

/// Run a read-only statement and collect every row as JSON.
///
/// With `limit`, ` LIMIT n` is appended unless the text already has a `LIMIT`
/// keyword (as a whole word, so a column like `speed_limit` does not count). Statements that would write to the store are rejected.
pub fn fetch_rows(conn: &Connection, sql: &str, limit: Option<usize>) -> Result<QueryResult> {
    let mut query = sql.trim().trim_end_matches(';').trim_end().to_string();
    if let Some(n) = limit {
        if !LIMIT_CLAUSE.is_match(&query) {
            query = format!("{} LIMIT {}", query, n);
        }
    }

    let mut stmt = conn
        .prepare(&query)
        .with_context(|| format!("preparing `{}`", query))?;
    if !stmt.readonly() {
        bail!("refusing to run a statement that modifies the store: `{}`", query);
    }

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut obj = Map::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            obj.insert(name.clone(), to_json(row.get_ref(idx)?));
        }
        rows.push(obj);
    }

    Ok(QueryResult {
        query,
        row_count: rows.len(),
        rows,
    })
}

/// First `n` rows of `table` in storage order.
pub fn head(conn: &Connection, table: &str, n: usize) -> Result<QueryResult> {
    fetch_rows(conn, &format!("SELECT * FROM {}", quote_ident(table)), Some(n))
}

/// Column names and declared types of `table`, in table order.
pub fn describe_table(conn: &Connection, table: &str) -> Result<Vec<(String, Option<StorageType>)>> {
    let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
    let cols = stmt
        .query_map([table], |r| {
            let name: String = r.get(0)?;
            let ty: String = r.get(1)?;
            Ok((name, StorageType::from_sql(&ty)))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if cols.is_empty() {
        bail!("table `{}` does not exist", table);
    }
    Ok(cols)
}

fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(t) => JsonValue::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => JsonValue::String(format!("<{} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Result<Connection> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE cities (name TEXT, population INTEGER, latitude REAL);
             INSERT INTO cities VALUES ('Rome', 2318895, 41.89), ('Paris', NULL, 48.85),
                                       ('Oslo', 700000, NULL);",
        )?;
        Ok(conn)
    }

    #[test]
    fn head_returns_first_rows_in_order() -> Result<()> {
        let conn = sample()?;
        let res = head(&conn, "cities", 2)?;
        assert_eq!(res.row_count, 2);
        assert_eq!(res.query, r#"SELECT * FROM "cities" LIMIT 2"#);
        assert_eq!(
            JsonValue::Object(res.rows[0].clone()),
            json!({"name": "Rome", "population": 2318895, "latitude": 41.89})
        );
        assert_eq!(res.rows[1]["population"], JsonValue::Null);

        let keys: Vec<&String> = res.rows[0].keys().collect();
        assert_eq!(keys, vec!["name", "population", "latitude"]);
        Ok(())
    }

    #[test]
    fn existing_limit_is_left_alone() -> Result<()> {
        let conn = sample()?;
        let res = fetch_rows(&conn, "SELECT name FROM cities LIMIT 1;", Some(50))?;
        assert_eq!(res.query, "SELECT name FROM cities LIMIT 1");
        assert_eq!(res.row_count, 1);

        let all = fetch_rows(&conn, "SELECT name FROM cities", None)?;
        assert_eq!(all.row_count, 3);
        Ok(())
    }

    #[test]
    fn limit_inside_a_name_still_gets_a_limit() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE roads (name TEXT, speed_limit INTEGER);
             INSERT INTO roads VALUES ('A1', 130), ('M4', 110), ('B7', 80);",
        )?;
        let res = fetch_rows(&conn, "SELECT name, speed_limit FROM roads", Some(1))?;
        assert_eq!(res.query, "SELECT name, speed_limit FROM roads LIMIT 1");
        assert_eq!(res.row_count, 1);
        assert_eq!(res.rows[0]["speed_limit"], 130);

        let res = fetch_rows(&conn, "select name from roads limit 2", Some(1))?;
        assert_eq!(res.query, "select name from roads limit 2");
        assert_eq!(res.row_count, 2);
        Ok(())
    }

    #[test]
    fn writes_are_rejected() -> Result<()> {
        let conn = sample()?;
        assert!(fetch_rows(&conn, "DELETE FROM cities", None).is_err());
        assert!(fetch_rows(&conn, "DROP TABLE cities", None).is_err());
        assert_eq!(fetch_rows(&conn, "SELECT * FROM cities", None)?.row_count, 3);
        Ok(())
    }

    #[test]
    fn describe_lists_declared_types() -> Result<()> {
        let conn = sample()?;
        assert_eq!(
            describe_table(&conn, "cities")?,
            vec![
                ("name".to_string(), Some(StorageType::Text)),
                ("population".to_string(), Some(StorageType::Integer)),
                ("latitude".to_string(), Some(StorageType::Real)),
            ]
        );
        assert!(describe_table(&conn, "nope").is_err());
        Ok(())
    }
}
