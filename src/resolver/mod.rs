//! Relationship resolution.
//!
//! Two passes over an immutable schema: explicit foreign keys first, then
//! (when enabled) name-pattern inference over the columns no explicit key
//! covers. Dangling references are discarded, never errors — schemas are
//! frequently incomplete. No duplicate (source table, source column, target
//! table, target column) tuple survives across the two passes; explicit
//! always wins.

pub mod naming;

pub use naming::{fk_base_name, match_tables, NaivePluralizer, Pluralize, TableMatch};

use crate::schema::{Column, Schema, TableSchema};
use ahash::AHashSet;
use serde::Serialize;

/// How a relationship was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Declared as a FOREIGN KEY in the schema source
    Explicit,
    /// Inferred from column-naming conventions
    Assumed,
}

/// A resolved directed relationship between two tables.
/// Target table and column are guaranteed to exist in the schema the
/// relationship was resolved against, and the target column is a primary key
/// or indexed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub kind: RelationKind,
}

/// Resolve relationships with the default pluralization strategy.
pub fn resolve(schema: &Schema, assume: bool) -> Vec<Relationship> {
    resolve_with(schema, assume, &NaivePluralizer)
}

/// Resolve relationships with an injected pluralization strategy.
pub fn resolve_with<P: Pluralize>(
    schema: &Schema,
    assume: bool,
    pluralizer: &P,
) -> Vec<Relationship> {
    let mut rels = Vec::new();
    let mut seen: AHashSet<(String, String, String, String)> = AHashSet::new();
    let mut covered: AHashSet<(String, String)> = AHashSet::new();

    // explicit pass
    for table in schema.iter() {
        for fk in &table.foreign_keys {
            let target = match schema.get_table(&fk.referenced_table) {
                Some(t) => t,
                None => continue,
            };

            for (i, col_name) in fk.column_names.iter().enumerate() {
                let source_col = match table.get_column(col_name) {
                    Some(c) => c,
                    None => continue,
                };

                // elided referenced columns mean "the target's primary key"
                let target_col = match fk.referenced_columns.get(i) {
                    Some(name) => target.get_column(name),
                    None if target.primary_key.len() == 1 => {
                        target.column(target.primary_key[0])
                    }
                    None => None,
                };
                let target_col = match target_col {
                    Some(c) => c,
                    None => continue,
                };

                if !target.is_indexed(&target_col.name) {
                    continue;
                }

                covered.insert(key2(&table.name, &source_col.name));
                let key = key4(&table.name, &source_col.name, &target.name, &target_col.name);
                if seen.insert(key) {
                    rels.push(Relationship {
                        source_table: table.name.clone(),
                        source_column: source_col.name.clone(),
                        target_table: target.name.clone(),
                        target_column: target_col.name.clone(),
                        kind: RelationKind::Explicit,
                    });
                }
            }
        }
    }

    if !assume {
        return rels;
    }

    // assumed pass over columns not covered by an explicit relationship
    let table_names = schema.table_names();

    for table in schema.iter() {
        for col in &table.columns {
            // a table's own single-column primary key is never a foreign-key
            // candidate; composite-PK members (join tables) still are
            if col.is_primary_key && table.primary_key.len() == 1 {
                continue;
            }
            if covered.contains(&key2(&table.name, &col.name)) {
                continue;
            }
            let base = match fk_base_name(&col.name) {
                Some(b) => b,
                None => continue,
            };

            for m in match_tables(base, &table_names, pluralizer) {
                let target = match schema.get_table(m.table) {
                    Some(t) => t,
                    None => continue,
                };
                let target_col = match target_column(target, base) {
                    Some(c) => c,
                    None => continue,
                };
                if !col.col_type.is_compatible(&target_col.col_type) {
                    continue;
                }
                // a column must not be linked to itself
                if target.name == table.name && target_col.name.eq_ignore_ascii_case(&col.name) {
                    continue;
                }

                let key = key4(&table.name, &col.name, &target.name, &target_col.name);
                if seen.insert(key) {
                    rels.push(Relationship {
                        source_table: table.name.clone(),
                        source_column: col.name.clone(),
                        target_table: target.name.clone(),
                        target_column: target_col.name.clone(),
                        kind: RelationKind::Assumed,
                    });
                }
                break;
            }
        }
    }

    rels
}

/// The column an assumed relationship points at: the single-column primary
/// key when there is one, otherwise the best indexed column — one whose base
/// name matches the candidate, else an `id` column, else the first indexed
/// one.
fn target_column<'a>(table: &'a TableSchema, base: &str) -> Option<&'a Column> {
    if table.primary_key.len() == 1 {
        return table.column(table.primary_key[0]);
    }

    let mut id_col = None;
    let mut first_indexed = None;
    for col in &table.columns {
        if !table.is_indexed(&col.name) {
            continue;
        }
        let base_matches = col.name.eq_ignore_ascii_case(base)
            || fk_base_name(&col.name)
                .map(|b| b.eq_ignore_ascii_case(base))
                .unwrap_or(false);
        if base_matches {
            return Some(col);
        }
        if col.name.eq_ignore_ascii_case("id") && id_col.is_none() {
            id_col = Some(col);
        }
        if first_indexed.is_none() {
            first_indexed = Some(col);
        }
    }
    id_col.or(first_indexed)
}

fn key2(a: &str, b: &str) -> (String, String) {
    (a.to_lowercase(), b.to_lowercase())
}

fn key4(a: &str, b: &str, c: &str, d: &str) -> (String, String, String, String) {
    (
        a.to_lowercase(),
        b.to_lowercase(),
        c.to_lowercase(),
        d.to_lowercase(),
    )
}
