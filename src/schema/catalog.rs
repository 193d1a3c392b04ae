//! SQLite catalog extraction.
//!
//! Reads the same table/column/index/foreign-key attributes the DDL parser
//! derives from text, but directly from `sqlite_master` and the PRAGMA
//! catalog, producing an identical `Schema` shape. Tables come back in rowid
//! order, which is creation order, matching the SQL path's declaration-order
//! guarantee.

use super::{Column, ColumnId, ColumnType, ForeignKey, IndexDef, Schema, TableId, TableSchema};
use crate::report::Warning;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Extract a schema from a SQLite database file.
pub fn extract_from_sqlite(path: &Path) -> Result<(Schema, Vec<Warning>)> {
    let conn = Connection::open(path)
        .with_context(|| format!("cannot open SQLite database: {}", path.display()))?;
    extract_from_connection(&conn)
}

/// Extract a schema from an open SQLite connection.
pub fn extract_from_connection(conn: &Connection) -> Result<(Schema, Vec<Warning>)> {
    let mut schema = Schema::new();
    let warnings = Vec::new();

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")
        .context("failed to read sqlite_master")?;

    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<_, _>>()?;

    for name in names {
        if name.starts_with("sqlite_") {
            continue;
        }
        let table = read_table(conn, &name)
            .with_context(|| format!("failed to read catalog for table {}", name))?;
        schema.add_table(table);
    }

    Ok((schema, warnings))
}

fn read_table(conn: &Connection, name: &str) -> Result<TableSchema> {
    let mut table = TableSchema::new(name.to_string(), TableId(0));
    let quoted = name.replace('"', "\"\"");

    // columns: cid, name, type, notnull, dflt_value, pk (1-based PK position)
    let mut col_stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", quoted))?;
    let mut pk_positions: Vec<(i64, ColumnId)> = Vec::new();

    let cols: Vec<(String, String, bool, Option<String>, i64)> = col_stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?
        .collect::<std::result::Result<_, _>>()?;

    for (i, (col_name, type_name, not_null, default, pk_pos)) in cols.into_iter().enumerate() {
        let ordinal = ColumnId(i as u16);
        if pk_pos > 0 {
            pk_positions.push((pk_pos, ordinal));
        }
        table.columns.push(Column {
            name: col_name,
            col_type: ColumnType::from_sql_type(&type_name),
            type_name,
            ordinal,
            is_primary_key: pk_pos > 0,
            is_nullable: !not_null && pk_pos == 0,
            default,
        });
    }

    // composite PKs keep catalog-declared order
    pk_positions.sort_by_key(|(pos, _)| *pos);
    table.primary_key = pk_positions.into_iter().map(|(_, id)| id).collect();

    // foreign keys: id, seq, table, from, to, on_update, on_delete, match
    let mut fk_stmt = conn.prepare(&format!("PRAGMA foreign_key_list(\"{}\")", quoted))?;
    let fk_rows: Vec<(i64, String, String, Option<String>)> = fk_stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?
        .collect::<std::result::Result<_, _>>()?;

    // rows with the same id belong to one (possibly multi-column) constraint
    let mut fk_by_id: ahash::AHashMap<i64, usize> = ahash::AHashMap::new();
    for (id, ref_table, from_col, to_col) in fk_rows {
        match fk_by_id.get(&id) {
            Some(&idx) => {
                let fk = &mut table.foreign_keys[idx];
                fk.column_names.push(from_col);
                if let Some(to) = to_col {
                    fk.referenced_columns.push(to);
                }
            }
            None => {
                fk_by_id.insert(id, table.foreign_keys.len());
                table.foreign_keys.push(ForeignKey {
                    name: None,
                    column_names: vec![from_col],
                    referenced_table: ref_table,
                    referenced_columns: to_col.into_iter().collect(),
                });
            }
        }
    }

    // indexes: PRAGMA index_list then index_info per index
    let mut idx_stmt = conn.prepare(&format!("PRAGMA index_list(\"{}\")", quoted))?;
    let idx_rows: Vec<(String, bool)> = idx_stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, bool>(2)?))
        })?
        .collect::<std::result::Result<_, _>>()?;

    for (idx_name, is_unique) in idx_rows {
        let idx_quoted = idx_name.replace('"', "\"\"");
        // index_info rows are (seqno, cid, name); name is NULL for rowid or
        // expression members
        let mut info_stmt = conn.prepare(&format!("PRAGMA index_info(\"{}\")", idx_quoted))?;
        let columns: Vec<String> = info_stmt
            .query_map([], |row| row.get::<_, Option<String>>(2))?
            .filter_map(|r| r.transpose())
            .collect::<std::result::Result<_, _>>()?;

        table.indexes.push(IndexDef {
            name: idx_name,
            columns,
            is_unique,
        });
    }

    Ok(table)
}
