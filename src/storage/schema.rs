//! Snapshot table schema
//!
//! One wide table per crawl mode, with explicit column typing: INTEGER for
//! ids/counts/amounts/flags, REAL for coordinates, TIMESTAMP for temporal
//! columns (bound as `DateTime<Utc>`), and TEXT for strings and the JSON
//! passthrough blobs. The column order here is the binding order of
//! [`insert_sql`] and the read order of the storage layer.

use crate::storage::traits::{PersistError, PersistResult};
use rusqlite::Connection;

/// Expected columns of a snapshot table, in binding order
pub const COLUMNS: &[(&str, &str)] = &[
    ("id", "INTEGER NOT NULL"),
    ("downloaded_at", "TIMESTAMP NOT NULL"),
    ("created_at", "TIMESTAMP"),
    ("updated_at", "TIMESTAMP"),
    ("content_updated_at", "TIMESTAMP"),
    ("activated_at", "TIMESTAMP"),
    ("completed_at", "TIMESTAMP"),
    ("closed_at", "TIMESTAMP"),
    ("donated_amount_in_cents", "INTEGER NOT NULL"),
    ("open_amount_in_cents", "INTEGER NOT NULL"),
    ("progress_percentage", "INTEGER NOT NULL"),
    ("donations_count", "INTEGER NOT NULL"),
    ("donor_count", "INTEGER NOT NULL"),
    ("positive_opinions_count", "INTEGER NOT NULL"),
    ("negative_opinions_count", "INTEGER NOT NULL"),
    ("comments_count", "INTEGER NOT NULL"),
    ("incomplete_need_count", "INTEGER NOT NULL"),
    ("completed_need_count", "INTEGER NOT NULL"),
    ("latitude", "REAL"),
    ("longitude", "REAL"),
    ("city", "TEXT"),
    ("country", "TEXT"),
    ("zip", "TEXT"),
    ("title", "TEXT"),
    ("description", "TEXT"),
    ("summary", "TEXT"),
    ("tax_deductible", "INTEGER"),
    ("donations_prohibited", "INTEGER"),
    ("carrier_id", "INTEGER"),
    ("carrier_name", "TEXT"),
    ("carrier_city", "TEXT"),
    ("contact_name", "TEXT"),
    ("carrier", "TEXT"),
    ("contact", "TEXT"),
    ("profile_picture", "TEXT"),
    ("active_matching_fund", "TEXT"),
    ("closed_notice", "TEXT"),
    ("links", "TEXT"),
    ("tags", "TEXT NOT NULL"),
];

/// Comma-separated column name list, for SELECT and INSERT statements
pub fn column_list() -> String {
    COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// CREATE TABLE statement for a snapshot table
pub fn create_table_sql(table: &str) -> String {
    let columns = COLUMNS
        .iter()
        .map(|(name, decl)| format!("    {name} {decl}"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n{columns}\n);\n\
         CREATE INDEX IF NOT EXISTS idx_{table}_id ON {table}(id);\n\
         CREATE INDEX IF NOT EXISTS idx_{table}_downloaded_at ON {table}(downloaded_at);"
    )
}

/// INSERT statement for a snapshot table, with one placeholder per column
pub fn insert_sql(table: &str) -> String {
    let placeholders = (1..=COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        column_list()
    )
}

/// Creates the snapshot table if absent, or verifies it if present
///
/// An existing table must carry every expected column with a compatible
/// declared type; anything else is a [`PersistError::SchemaMismatch`].
/// Columns beyond the expected set are tolerated.
pub fn ensure_schema(conn: &Connection, table: &str) -> PersistResult<()> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)?;

    if !exists {
        conn.execute_batch(&create_table_sql(table))?;
        return Ok(());
    }

    verify_schema(conn, table)
}

fn verify_schema(conn: &Connection, table: &str) -> PersistResult<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let existing: Vec<(String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?
        .collect::<Result<_, _>>()?;

    for (name, decl) in COLUMNS {
        let expected_type = decl.split_whitespace().next().unwrap_or("TEXT");
        let found = existing
            .iter()
            .find(|(existing_name, _)| existing_name == name);

        match found {
            None => {
                return Err(PersistError::SchemaMismatch {
                    table: table.to_string(),
                    detail: format!("column {name} is missing"),
                });
            }
            Some((_, found_type)) if !found_type.eq_ignore_ascii_case(expected_type) => {
                return Err(PersistError::SchemaMismatch {
                    table: table.to_string(),
                    detail: format!(
                        "column {name} has type {found_type}, expected {expected_type}"
                    ),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_creates_table() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn, "projects_vf").unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='projects_vf'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn, "projects_vf").unwrap();
        ensure_schema(&conn, "projects_vf").unwrap();
    }

    #[test]
    fn test_ensure_schema_rejects_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE projects_vf (id INTEGER NOT NULL)")
            .unwrap();

        let err = ensure_schema(&conn, "projects_vf").unwrap_err();
        assert!(matches!(err, PersistError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_ensure_schema_rejects_wrong_type() {
        let conn = Connection::open_in_memory().unwrap();
        // Same columns, but id declared TEXT
        let sql = create_table_sql("projects_vf").replace("id INTEGER NOT NULL", "id TEXT NOT NULL");
        conn.execute_batch(&sql).unwrap();

        let err = ensure_schema(&conn, "projects_vf").unwrap_err();
        match err {
            PersistError::SchemaMismatch { table, detail } => {
                assert_eq!(table, "projects_vf");
                assert!(detail.contains("id"));
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_sql_matches_column_count() {
        let sql = insert_sql("projects_vf");
        assert!(sql.contains(&format!("?{}", COLUMNS.len())));
        assert!(!sql.contains(&format!("?{}", COLUMNS.len() + 1)));
    }
}
