//! Constraint synthesis: renders assumed relationships back into SQL.
//!
//! Pure text generation. Two modes: a standalone ALTER TABLE script wrapped
//! in BEGIN/COMMIT, and inline FOREIGN KEY clauses formatted for pasting into
//! a CREATE TABLE body. Output is grouped by source table in schema
//! declaration order either way.

use crate::resolver::{RelationKind, Relationship};
use crate::schema::Schema;
use ahash::AHashMap;

/// Emit a transaction of `ALTER TABLE ... ADD CONSTRAINT` statements, one per
/// assumed relationship. Constraint names follow `fk_<table>_<ref_table>`; a
/// second relationship to the same referenced table gets a numeric suffix.
pub fn alter_script(schema: &Schema, relationships: &[Relationship]) -> String {
    let grouped = group_by_source(schema, relationships);
    let mut out = String::from("BEGIN;\n");

    for (_, rels) in &grouped {
        let mut name_counts: AHashMap<String, u32> = AHashMap::new();
        for rel in rels {
            let name = constraint_name(&mut name_counts, &rel.source_table, &rel.target_table);
            out.push_str(&format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({});\n",
                rel.source_table, name, rel.source_column, rel.target_table, rel.target_column
            ));
        }
    }

    out.push_str("COMMIT;\n");
    out
}

/// Emit inline `FOREIGN KEY (...) REFERENCES ...` clauses per table, in the
/// syntax expected inside a CREATE TABLE body.
pub fn inline_clauses(schema: &Schema, relationships: &[Relationship]) -> String {
    let grouped = group_by_source(schema, relationships);
    let mut out = String::new();

    for (table, rels) in &grouped {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("-- {}\n", table));
        let clauses: Vec<String> = rels
            .iter()
            .map(|rel| {
                format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    rel.source_column, rel.target_table, rel.target_column
                )
            })
            .collect();
        out.push_str(&clauses.join(",\n"));
        out.push('\n');
    }

    out
}

/// Assumed relationships grouped by source table, tables in schema
/// declaration order.
fn group_by_source<'a>(
    schema: &Schema,
    relationships: &'a [Relationship],
) -> Vec<(String, Vec<&'a Relationship>)> {
    let mut grouped = Vec::new();

    for table in schema.iter() {
        let rels: Vec<&Relationship> = relationships
            .iter()
            .filter(|r| r.kind == RelationKind::Assumed && r.source_table == table.name)
            .collect();
        if !rels.is_empty() {
            grouped.push((table.name.clone(), rels));
        }
    }

    grouped
}

fn constraint_name(counts: &mut AHashMap<String, u32>, table: &str, ref_table: &str) -> String {
    let base = format!("fk_{}_{}", table, ref_table);
    let n = counts.entry(base.clone()).or_insert(0);
    *n += 1;
    if *n == 1 {
        base
    } else {
        format!("{}_{}", base, n)
    }
}
