//! Schema extraction module.
//!
//! This module provides:
//! - Data models for table schemas, columns, indexes, and foreign keys
//! - DDL parsing for extracting schema information from SQL text
//! - SQLite catalog extraction producing the same schema shape
//!
//! A `Schema` is immutable once extraction finishes; downstream components
//! (resolver, synthesizer, assembler) only read it.

mod catalog;
mod ddl;

pub use catalog::*;
pub use ddl::*;

use crate::report::Warning;
use ahash::AHashMap;
use anyhow::Context;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Unique identifier for a table within a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

/// Unique identifier for a column within a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub u16);

/// SQL column type classification, normalized across dialects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Integer types: INT, INTEGER, TINYINT, SMALLINT, MEDIUMINT
    Int,
    /// Big integer types: BIGINT
    BigInt,
    /// Text types: CHAR, VARCHAR, TEXT, etc.
    Text,
    /// UUID types
    Uuid,
    /// Decimal/numeric types
    Decimal,
    /// Date/time types
    DateTime,
    /// Boolean type
    Bool,
    /// Any other type
    Other(String),
}

impl ColumnType {
    /// Parse a SQL type string into a ColumnType.
    /// Tolerates MySQL, PostgreSQL, and SQLite spellings.
    pub fn from_sql_type(type_str: &str) -> Self {
        let type_lower = type_str.to_lowercase();
        let base_type = type_lower.split('(').next().unwrap_or(&type_lower).trim();

        match base_type {
            "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "int4" | "int2" => {
                ColumnType::Int
            }
            "serial" | "smallserial" => ColumnType::Int,
            "bigint" | "int8" | "bigserial" => ColumnType::BigInt,
            "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "enum"
            | "set" | "character" => ColumnType::Text,
            "decimal" | "numeric" | "float" | "double" | "real" | "float4" | "float8" | "money" => {
                ColumnType::Decimal
            }
            "date" | "datetime" | "timestamp" | "time" | "year" | "timestamptz" | "timetz"
            | "interval" => ColumnType::DateTime,
            "bool" | "boolean" => ColumnType::Bool,
            "binary" | "varbinary" | "blob" | "bytea" => {
                // binary(16) is UUID by convention
                if type_lower.contains("16") {
                    ColumnType::Uuid
                } else {
                    ColumnType::Other(type_str.to_string())
                }
            }
            "uuid" => ColumnType::Uuid,
            _ => ColumnType::Other(type_str.to_string()),
        }
    }

    /// Whether two type classes are close enough for an inferred foreign key.
    /// Integer widths are interchangeable; unclassified types are permissive
    /// because vendor types would otherwise mute the heuristic entirely.
    pub fn is_compatible(&self, other: &ColumnType) -> bool {
        use ColumnType::*;
        match (self, other) {
            (Int | BigInt, Int | BigInt) => true,
            (Other(_), _) | (_, Other(_)) => true,
            (a, b) => a == b,
        }
    }

    /// Short display name for diagram labels
    pub fn display(&self) -> String {
        match self {
            ColumnType::Int => "INT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Text => "VARCHAR".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Decimal => "DECIMAL".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Bool => "BOOL".to_string(),
            ColumnType::Other(s) => s.to_uppercase(),
        }
    }
}

/// Column definition within a table. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Normalized type class
    pub col_type: ColumnType,
    /// Declared type as written in the source (for display)
    pub type_name: String,
    /// Position in table (0-indexed)
    pub ordinal: ColumnId,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Whether this column allows NULL values
    pub is_nullable: bool,
    /// Default expression, verbatim from the source
    pub default: Option<String>,
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Index name
    pub name: String,
    /// Columns covered by the index
    pub columns: Vec<String>,
    /// Whether this is a unique index
    pub is_unique: bool,
}

/// Foreign key constraint definition
#[derive(Debug, Clone)]
pub struct ForeignKey {
    /// Constraint name (optional)
    pub name: Option<String>,
    /// Column names in this table that form the FK
    pub column_names: Vec<String>,
    /// Referenced table name
    pub referenced_table: String,
    /// Referenced column names
    pub referenced_columns: Vec<String>,
}

/// Complete table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Table ID within the schema
    pub id: TableId,
    /// Column definitions in declaration order
    pub columns: Vec<Column>,
    /// Primary key column IDs (ordered for composite PKs; empty is valid)
    pub primary_key: Vec<ColumnId>,
    /// Declared foreign key constraints
    pub foreign_keys: Vec<ForeignKey>,
    /// Index definitions
    pub indexes: Vec<IndexDef>,
}

impl TableSchema {
    pub fn new(name: String, id: TableId) -> Self {
        Self {
            name,
            id,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get column ID by name
    pub fn get_column_id(&self, name: &str) -> Option<ColumnId> {
        self.get_column(name).map(|c| c.ordinal)
    }

    /// Get column by ID
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(id.0 as usize)
    }

    /// Whether a column is a primary key or covered by a declared index
    pub fn is_indexed(&self, col_name: &str) -> bool {
        if self
            .get_column(col_name)
            .map(|c| c.is_primary_key)
            .unwrap_or(false)
        {
            return true;
        }
        self.indexes
            .iter()
            .any(|idx| idx.columns.iter().any(|c| c.eq_ignore_ascii_case(col_name)))
    }

    /// All column names declared as foreign keys on this table
    pub fn fk_column_names(&self) -> Vec<&str> {
        self.foreign_keys
            .iter()
            .flat_map(|fk| fk.column_names.iter().map(|s| s.as_str()))
            .collect()
    }
}

/// Complete database schema, in source declaration order
#[derive(Debug, Default)]
pub struct Schema {
    /// Map from table name to table ID
    tables: AHashMap<String, TableId>,
    /// Table schemas indexed by TableId
    table_schemas: Vec<TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get table ID by name (exact first, then case-insensitive)
    pub fn get_table_id(&self, name: &str) -> Option<TableId> {
        if let Some(&id) = self.tables.get(name) {
            return Some(id);
        }
        let name_lower = name.to_lowercase();
        self.tables
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, &id)| id)
    }

    /// Get table schema by ID
    pub fn table(&self, id: TableId) -> Option<&TableSchema> {
        self.table_schemas.get(id.0 as usize)
    }

    /// Get mutable table schema by ID (extraction only)
    pub(crate) fn table_mut(&mut self, id: TableId) -> Option<&mut TableSchema> {
        self.table_schemas.get_mut(id.0 as usize)
    }

    /// Get table schema by name
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.get_table_id(name).and_then(|id| self.table(id))
    }

    /// Add a new table schema, returning its ID
    pub fn add_table(&mut self, mut schema: TableSchema) -> TableId {
        let id = TableId(self.table_schemas.len() as u32);
        schema.id = id;
        self.tables.insert(schema.name.clone(), id);
        self.table_schemas.push(schema);
        id
    }

    pub fn len(&self) -> usize {
        self.table_schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table_schemas.is_empty()
    }

    /// Iterate over all table schemas in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.table_schemas.iter()
    }

    /// All table names in declaration order
    pub fn table_names(&self) -> Vec<&str> {
        self.table_schemas.iter().map(|t| t.name.as_str()).collect()
    }
}

const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Whether a file is a SQLite database, by extension or magic header.
pub fn is_sqlite_file(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if matches!(ext.to_lowercase().as_str(), "db" | "sqlite" | "sqlite3") {
            return true;
        }
    }
    let mut header = [0u8; 16];
    match File::open(path) {
        Ok(mut f) => f.read_exact(&mut header).is_ok() && header == *SQLITE_MAGIC,
        Err(_) => false,
    }
}

/// Extract a schema from an input file, sniffing SQLite vs SQL text.
/// Unreadable input is fatal; malformed statements surface as warnings.
pub fn extract_from_path(path: &Path) -> anyhow::Result<(Schema, Vec<Warning>)> {
    if is_sqlite_file(path) {
        extract_from_sqlite(path)
    } else {
        let file = File::open(path)
            .with_context(|| format!("cannot read input file: {}", path.display()))?;
        extract_from_sql(file).context("failed reading SQL input")
    }
}
