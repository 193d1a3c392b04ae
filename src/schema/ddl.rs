//! DDL parsing for schema extraction from SQL text.
//!
//! Parses CREATE TABLE, CREATE INDEX, and ALTER TABLE statements to extract:
//! - Column definitions with types, nullability, and defaults
//! - Primary key constraints (inline and table-level, composite included)
//! - Foreign key constraints (inline REFERENCES and FOREIGN KEY clauses)
//! - Index definitions

use super::{Column, ColumnId, ColumnType, ForeignKey, IndexDef, Schema, TableId, TableSchema};
use crate::parser::{Parser, StatementType, STMT_BUFFER_SIZE};
use crate::report::Warning;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;

/// Table name from CREATE TABLE.
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), unquoted, schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?"#)
        .unwrap()
});

/// Table name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)ALTER\s+TABLE\s+(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s;]+)[\]`"]?"#).unwrap()
});

/// Column definition: name then declared type
static COLUMN_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*[\[`"]?([^\[\]`"\s,]+)[\]`"]?\s+(\w+(?:\([^)]+\))?(?:\s+unsigned)?)"#).unwrap()
});

/// Table-level PRIMARY KEY constraint
static PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PRIMARY\s+KEY\s*\(([^)]+)\)").unwrap());

/// Inline PRIMARY KEY on a column line
static INLINE_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// FOREIGN KEY constraint with optional constraint name
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:CONSTRAINT\s+[\[`"]?([^\[\]`"\s]+)[\]`"]?\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Inline REFERENCES on a column line (referenced columns optional)
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bREFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(,]+)[\]`"]?\s*(?:\(([^)]+)\))?"#)
        .unwrap()
});

static NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());

/// DEFAULT expression: quoted string, call, or bare token
static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bDEFAULT\s+('(?:[^']|'')*'|\w+\s*\([^)]*\)|[^\s,]+)"#).unwrap()
});

/// Inline INDEX/KEY in a CREATE TABLE body
static INLINE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:(UNIQUE)\s+)?(?:INDEX|KEY)\s+[\[`"]?(\w+)[\]`"]?\s*\(([^)]+)\)"#).unwrap()
});

/// CREATE [UNIQUE] INDEX statement
static CREATE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)CREATE\s+(UNIQUE\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?[\[`"]?(\w+)[\]`"]?\s+ON\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?(\w+)[\]`"]?\s*\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Builder for constructing a schema from DDL statements.
/// Statements that classify as DDL but fail their grammar are recorded as
/// warnings and skipped; the rest of the input is still processed.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
    warnings: Vec<Warning>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CREATE TABLE statement and add it to the schema
    pub fn parse_create_table(&mut self, stmt: &str) -> Option<TableId> {
        let table_name = match extract_create_table_name(stmt) {
            Some(name) => name,
            None => {
                self.warn_skipped(stmt, "unextractable table name");
                return None;
            }
        };

        if self.schema.get_table_id(&table_name).is_some() {
            return self.schema.get_table_id(&table_name);
        }

        let body = match extract_table_body(stmt) {
            Some(body) => body,
            None => {
                self.warn_skipped(stmt, "missing column list");
                return None;
            }
        };

        let mut table = TableSchema::new(table_name, TableId(0));
        parse_table_body(&body, &mut table);

        if table.columns.is_empty() {
            self.warnings.push(Warning::new(
                "skipped-statement",
                format!("CREATE TABLE {}: no parseable columns", table.name),
            ));
            return None;
        }

        Some(self.schema.add_table(table))
    }

    /// Parse an ALTER TABLE statement; only ADD CONSTRAINT ... FOREIGN KEY
    /// shapes contribute anything.
    pub fn parse_alter_table(&mut self, stmt: &str) -> Option<TableId> {
        let table_name = match extract_alter_table_name(stmt) {
            Some(name) => name,
            None => {
                self.warn_skipped(stmt, "unextractable table name");
                return None;
            }
        };

        let table_id = match self.schema.get_table_id(&table_name) {
            Some(id) => id,
            None => {
                self.warnings.push(Warning::new(
                    "unknown-table",
                    format!("ALTER TABLE {}: table not declared, skipped", table_name),
                ));
                return None;
            }
        };

        if let Some(table) = self.schema.table_mut(table_id) {
            for fk in parse_foreign_keys(stmt) {
                table.foreign_keys.push(fk);
            }
        }

        Some(table_id)
    }

    /// Parse a CREATE INDEX statement and attach it to the named table
    pub fn parse_create_index(&mut self, stmt: &str) -> Option<TableId> {
        let caps = match CREATE_INDEX_RE.captures(stmt) {
            Some(caps) => caps,
            None => {
                self.warn_skipped(stmt, "unrecognized CREATE INDEX form");
                return None;
            }
        };

        let is_unique = caps.get(1).is_some();
        let index_name = caps.get(2)?.as_str().to_string();
        let table_name = caps.get(3)?.as_str().to_string();
        let columns = parse_column_list(caps.get(4)?.as_str());

        let table_id = match self.schema.get_table_id(&table_name) {
            Some(id) => id,
            None => {
                self.warnings.push(Warning::new(
                    "unknown-table",
                    format!("CREATE INDEX {}: table {} not declared, skipped", index_name, table_name),
                ));
                return None;
            }
        };

        if let Some(table) = self.schema.table_mut(table_id) {
            table.indexes.push(IndexDef {
                name: index_name,
                columns,
                is_unique,
            });
        }

        Some(table_id)
    }

    /// Finalize, yielding the schema and any recoverable issues found
    pub fn build(self) -> (Schema, Vec<Warning>) {
        (self.schema, self.warnings)
    }

    fn warn_skipped(&mut self, stmt: &str, reason: &str) {
        let head: String = stmt.trim_start().chars().take(60).collect();
        self.warnings.push(Warning::new(
            "skipped-statement",
            format!("{}: {}", reason, head),
        ));
    }
}

/// Extract a schema from a stream of SQL text.
/// Statements outside the supported DDL grammar are ignored; supported
/// statements that fail to parse surface as warnings.
pub fn extract_from_sql<R: Read>(reader: R) -> std::io::Result<(Schema, Vec<Warning>)> {
    let mut parser = Parser::new(reader, STMT_BUFFER_SIZE);
    let mut builder = SchemaBuilder::new();

    while let Some(stmt) = parser.read_statement()? {
        let (stmt_type, _) = Parser::<&[u8]>::parse_statement(&stmt);
        let stmt_str = String::from_utf8_lossy(&stmt);

        match stmt_type {
            StatementType::CreateTable => {
                builder.parse_create_table(&stmt_str);
            }
            StatementType::AlterTable => {
                builder.parse_alter_table(&stmt_str);
            }
            StatementType::CreateIndex => {
                builder.parse_create_index(&stmt_str);
            }
            StatementType::Other => {}
        }
    }

    Ok(builder.build())
}

/// Extract table name from CREATE TABLE statement
pub fn extract_create_table_name(stmt: &str) -> Option<String> {
    CREATE_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract table name from ALTER TABLE statement
pub fn extract_alter_table_name(stmt: &str) -> Option<String> {
    ALTER_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the body of a CREATE TABLE statement (between the first `(` and
/// its balanced `)`), ignoring parens inside string literals.
fn extract_table_body(stmt: &str) -> Option<String> {
    let bytes = stmt.as_bytes();
    let mut depth = 0;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if b == b'\\' && in_string {
            escape_next = true;
            continue;
        }

        if b == b'\'' {
            in_string = !in_string;
            continue;
        }

        if in_string {
            continue;
        }

        if b == b'(' {
            if depth == 0 {
                start = Some(i + 1);
            }
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(stmt[s..i].to_string());
                }
            }
        }
    }

    None
}

/// Parse the body of a CREATE TABLE into columns and constraints
fn parse_table_body(body: &str, table: &mut TableSchema) {
    let parts = split_table_body(body);

    for part in parts {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        let upper = trimmed.to_uppercase();
        if upper.starts_with("PRIMARY KEY")
            || upper.starts_with("CONSTRAINT")
            || upper.starts_with("FOREIGN KEY")
            || upper.starts_with("KEY ")
            || upper.starts_with("INDEX ")
            || upper.starts_with("UNIQUE ")
            || upper.starts_with("CHECK ")
        {
            if let Some(pk_cols) = parse_primary_key_constraint(trimmed) {
                for col_name in pk_cols {
                    if let Some(col) = table
                        .columns
                        .iter_mut()
                        .find(|c| c.name.eq_ignore_ascii_case(&col_name))
                    {
                        col.is_primary_key = true;
                        if !table.primary_key.contains(&col.ordinal) {
                            table.primary_key.push(col.ordinal);
                        }
                    }
                }
            }

            for fk in parse_foreign_keys(trimmed) {
                table.foreign_keys.push(fk);
            }

            if let Some(idx) = parse_inline_index(trimmed) {
                table.indexes.push(idx);
            }
        } else if let Some(mut col) = parse_column_def(trimmed, ColumnId(table.columns.len() as u16)) {
            if INLINE_PRIMARY_KEY_RE.is_match(trimmed) {
                col.is_primary_key = true;
                table.primary_key.push(col.ordinal);
            }

            // inline `REFERENCES t (c)` surfaces into the table's FK set;
            // with no column list, empty referenced_columns means "target PK"
            // and the resolver fills it in
            if !upper.starts_with("FOREIGN KEY") {
                if let Some(caps) = INLINE_REFERENCES_RE.captures(trimmed) {
                    let ref_table = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
                    let ref_cols = caps
                        .get(2)
                        .map(|m| parse_column_list(m.as_str()))
                        .unwrap_or_default();
                    if !ref_table.is_empty() {
                        table.foreign_keys.push(ForeignKey {
                            name: None,
                            column_names: vec![col.name.clone()],
                            referenced_table: ref_table,
                            referenced_columns: ref_cols,
                        });
                    }
                }
            }

            table.columns.push(col);
        }
    }
}

/// Split a table body on top-level commas, respecting nested parentheses so
/// inline constraints are never split apart.
pub fn split_table_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in body.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '\'' {
            in_string = !in_string;
            current.push(ch);
            continue;
        }

        if in_string {
            current.push(ch);
            continue;
        }

        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse one column definition line
fn parse_column_def(def: &str, ordinal: ColumnId) -> Option<Column> {
    let caps = COLUMN_DEF_RE.captures(def)?;
    let name = caps.get(1)?.as_str().to_string();
    let type_str = caps.get(2)?.as_str();

    let col_type = ColumnType::from_sql_type(type_str);
    let is_nullable = !NOT_NULL_RE.is_match(def);
    let default = DEFAULT_RE
        .captures(def)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Some(Column {
        name,
        col_type,
        type_name: type_str.to_string(),
        ordinal,
        is_primary_key: false,
        is_nullable,
        default,
    })
}

/// Parse PRIMARY KEY constraint, returning column names
fn parse_primary_key_constraint(constraint: &str) -> Option<Vec<String>> {
    let caps = PRIMARY_KEY_RE.captures(constraint)?;
    Some(parse_column_list(caps.get(1)?.as_str()))
}

/// Parse inline INDEX/KEY definition from a CREATE TABLE body
fn parse_inline_index(constraint: &str) -> Option<IndexDef> {
    let caps = INLINE_INDEX_RE.captures(constraint)?;

    Some(IndexDef {
        name: caps.get(2)?.as_str().to_string(),
        columns: parse_column_list(caps.get(3)?.as_str()),
        is_unique: caps.get(1).is_some(),
    })
}

/// Parse FOREIGN KEY constraints from a statement
fn parse_foreign_keys(stmt: &str) -> Vec<ForeignKey> {
    let mut fks = Vec::new();

    for caps in FOREIGN_KEY_RE.captures_iter(stmt) {
        let name = caps.get(1).map(|m| m.as_str().to_string());
        let local_cols = caps
            .get(2)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();
        let ref_table = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let ref_cols = caps
            .get(4)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();

        if !local_cols.is_empty() && !ref_table.is_empty() && !ref_cols.is_empty() {
            fks.push(ForeignKey {
                name,
                column_names: local_cols,
                referenced_table: ref_table,
                referenced_columns: ref_cols,
            });
        }
    }

    fks
}

/// Parse a comma-separated column list, stripping quote styles
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| {
            c.trim()
                .trim_matches('`')
                .trim_matches('"')
                .trim_matches('[')
                .trim_matches(']')
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_create_table() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255) NOT NULL, bio TEXT DEFAULT 'none');",
        );
        let (schema, warnings) = builder.build();

        assert!(warnings.is_empty());
        let users = schema.get_table("users").unwrap();
        assert_eq!(users.columns.len(), 3);
        assert!(users.columns[0].is_primary_key);
        assert!(!users.columns[1].is_nullable);
        assert_eq!(users.columns[2].default.as_deref(), Some("'none'"));
    }

    #[test]
    fn test_composite_primary_key_order() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table(
            "CREATE TABLE m (b INT, a INT, PRIMARY KEY (a, b));",
        );
        let (schema, _) = builder.build();
        let m = schema.get_table("m").unwrap();

        // PK tuple keeps constraint order, not column order
        let pk_names: Vec<&str> = m
            .primary_key
            .iter()
            .map(|id| m.column(*id).unwrap().name.as_str())
            .collect();
        assert_eq!(pk_names, vec!["a", "b"]);
    }

    #[test]
    fn test_no_primary_key_is_valid() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table("CREATE TABLE log_lines (msg TEXT);");
        let (schema, warnings) = builder.build();

        assert!(warnings.is_empty());
        assert!(schema.get_table("log_lines").unwrap().primary_key.is_empty());
    }

    #[test]
    fn test_inline_references() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table(
            "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users(id));",
        );
        let (schema, _) = builder.build();
        let orders = schema.get_table("orders").unwrap();

        assert_eq!(orders.foreign_keys.len(), 1);
        assert_eq!(orders.foreign_keys[0].column_names, vec!["user_id"]);
        assert_eq!(orders.foreign_keys[0].referenced_table, "users");
        assert_eq!(orders.foreign_keys[0].referenced_columns, vec!["id"]);
    }

    #[test]
    fn test_inline_references_without_columns() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table(
            "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users);",
        );
        let (schema, _) = builder.build();
        let orders = schema.get_table("orders").unwrap();

        assert_eq!(orders.foreign_keys.len(), 1);
        assert!(orders.foreign_keys[0].referenced_columns.is_empty());
    }

    #[test]
    fn test_fk_constraint_not_split_on_inner_commas() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table(
            "CREATE TABLE t (a INT, b INT, FOREIGN KEY (a, b) REFERENCES other (x, y));",
        );
        let (schema, _) = builder.build();
        let t = schema.get_table("t").unwrap();

        assert_eq!(t.columns.len(), 2);
        assert_eq!(t.foreign_keys.len(), 1);
        assert_eq!(t.foreign_keys[0].column_names, vec!["a", "b"]);
        assert_eq!(t.foreign_keys[0].referenced_columns, vec!["x", "y"]);
    }

    #[test]
    fn test_quoted_identifiers_unquoted() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table("CREATE TABLE \"order_items\" (`id` INT PRIMARY KEY, [qty] INT);");
        let (schema, _) = builder.build();

        let table = schema.get_table("order_items").unwrap();
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[1].name, "qty");
    }

    #[test]
    fn test_create_index_attaches_to_table() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table("CREATE TABLE users (id INT PRIMARY KEY, email TEXT);");
        builder.parse_create_index("CREATE UNIQUE INDEX idx_users_email ON users (email);");
        let (schema, warnings) = builder.build();

        assert!(warnings.is_empty());
        let users = schema.get_table("users").unwrap();
        assert_eq!(users.indexes.len(), 1);
        assert!(users.indexes[0].is_unique);
        assert!(users.is_indexed("email"));
    }

    #[test]
    fn test_create_index_unknown_table_warns() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_index("CREATE INDEX idx ON nope (x);");
        let (schema, warnings) = builder.build();

        assert!(schema.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "unknown-table");
    }

    #[test]
    fn test_alter_table_adds_fk() {
        let mut builder = SchemaBuilder::new();
        builder.parse_create_table("CREATE TABLE users (id INT PRIMARY KEY);");
        builder.parse_create_table("CREATE TABLE orders (id INT PRIMARY KEY, user_id INT);");
        builder.parse_alter_table(
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_users FOREIGN KEY (user_id) REFERENCES users(id);",
        );
        let (schema, _) = builder.build();

        let orders = schema.get_table("orders").unwrap();
        assert_eq!(orders.foreign_keys.len(), 1);
        assert_eq!(orders.foreign_keys[0].name.as_deref(), Some("fk_orders_users"));
    }

    #[test]
    fn test_malformed_create_table_warns_and_continues() {
        let sql = "CREATE TABLE broken;\nCREATE TABLE ok (id INT PRIMARY KEY);";
        let (schema, warnings) = extract_from_sql(sql.as_bytes()).unwrap();

        assert_eq!(schema.len(), 1);
        assert!(schema.get_table("ok").is_some());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "skipped-statement");
    }

    #[test]
    fn test_extract_preserves_declaration_order() {
        let sql = "CREATE TABLE zebra (id INT);\nCREATE TABLE apple (id INT);";
        let (schema, _) = extract_from_sql(sql.as_bytes()).unwrap();
        assert_eq!(schema.table_names(), vec!["zebra", "apple"]);
    }

    #[test]
    fn test_dml_is_ignored_silently() {
        let sql = "BEGIN;\nINSERT INTO x VALUES (1);\nCOMMIT;\nCREATE TABLE t (id INT);";
        let (schema, warnings) = extract_from_sql(sql.as_bytes()).unwrap();

        assert_eq!(schema.len(), 1);
        assert!(warnings.is_empty());
    }
}
