//! Name-pattern matching for assumed relationships.
//!
//! The matcher is a pure function from a column-name-derived candidate plus
//! the set of table names to a ranked list of matching tables. Ranks count
//! normalization steps, so "fewest steps" is a numeric comparison:
//!
//!   0 exact, 1 case-insensitive, 2 plural toggle (plain `s`),
//!   3 secondary plural toggle (`y`/`ies`, `es`),
//!   4 cluster-prefix-stripped, 5 prefix-stripped plus plural toggle
//!
//! Pluralization is injectable. The default strategy is deliberately naive
//! (suffix toggling only); irregular plurals like person/people are a known
//! limitation, not handled here.

use ahash::AHashMap;

/// Singular/plural spelling strategy.
pub trait Pluralize {
    /// Primary alternate spellings of a lowercase base word, excluding the
    /// word itself.
    fn variants(&self, base: &str) -> Vec<String>;

    /// Secondary alternate spellings, ranked after the primary ones.
    fn secondary_variants(&self, base: &str) -> Vec<String>;
}

/// Suffix-toggling pluralizer: strip/add `s` as the primary toggle, with
/// `y`/`ies` and `es` toggles as secondary candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaivePluralizer;

impl Pluralize for NaivePluralizer {
    fn variants(&self, base: &str) -> Vec<String> {
        let mut out = Vec::new();
        out.push(format!("{}s", base));
        if let Some(stem) = base.strip_suffix('s') {
            if !stem.is_empty() {
                out.push(stem.to_string());
            }
        }
        out.retain(|v| v != base);
        out.dedup();
        out
    }

    fn secondary_variants(&self, base: &str) -> Vec<String> {
        let primary = self.variants(base);
        let mut out = Vec::new();
        if let Some(stem) = base.strip_suffix('y') {
            out.push(format!("{}ies", stem));
        }
        if let Some(stem) = base.strip_suffix("ies") {
            out.push(format!("{}y", stem));
        }
        if base.ends_with("ss") {
            out.push(format!("{}es", base));
        }
        if let Some(stem) = base.strip_suffix("es") {
            if !stem.is_empty() {
                out.push(stem.to_string());
            }
        }
        out.retain(|v| v != base && !primary.contains(v));
        out.dedup();
        out
    }
}

/// A table that matched a foreign-key candidate name, with its rank
/// (number of normalization steps taken).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMatch<'a> {
    pub table: &'a str,
    pub rank: u8,
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    if s.len() > suffix.len()
        && s.is_char_boundary(s.len() - suffix.len())
        && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    {
        Some(&s[..s.len() - suffix.len()])
    } else {
        None
    }
}

/// Strip a foreign-key naming suffix (`_id`, `id`, `_key`) from a column
/// name, keeping the original casing. Returns None for column names that do
/// not follow any of the patterns (including a bare `id`).
pub fn fk_base_name(column: &str) -> Option<&str> {
    strip_suffix_ci(column, "_id")
        .or_else(|| strip_suffix_ci(column, "_key"))
        .or_else(|| strip_suffix_ci(column, "id"))
        .filter(|base| !base.ends_with('_'))
}

/// Cluster prefix of a table name: everything up to the first underscore.
pub fn cluster_prefix(table: &str) -> &str {
    table.split('_').next().unwrap_or(table)
}

/// Match a candidate base name against a set of table names.
/// Returns all matches sorted by rank, ties broken alphabetically; the first
/// element is the preferred target.
pub fn match_tables<'a, P: Pluralize>(
    candidate: &str,
    table_names: &[&'a str],
    pluralizer: &P,
) -> Vec<TableMatch<'a>> {
    let candidate_lower = candidate.to_lowercase();
    let primary = pluralizer.variants(&candidate_lower);
    let secondary = pluralizer.secondary_variants(&candidate_lower);

    // tables sharing a prefix with at least one sibling form a cluster group;
    // only those participate in prefix-stripped matching
    let mut groups: AHashMap<&str, usize> = AHashMap::new();
    for name in table_names {
        *groups.entry(cluster_prefix(name)).or_insert(0) += 1;
    }

    let mut matches = Vec::new();

    for &name in table_names {
        let name_lower = name.to_lowercase();

        let rank = if name == candidate {
            Some(0)
        } else if name_lower == candidate_lower {
            Some(1)
        } else if primary.iter().any(|v| *v == name_lower) {
            Some(2)
        } else if secondary.iter().any(|v| *v == name_lower) {
            Some(3)
        } else {
            prefix_stripped_rank(
                name,
                &name_lower,
                &candidate_lower,
                &primary,
                &secondary,
                &groups,
            )
        };

        if let Some(rank) = rank {
            matches.push(TableMatch { table: name, rank });
        }
    }

    matches.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.table.cmp(b.table)));
    matches
}

fn prefix_stripped_rank(
    name: &str,
    name_lower: &str,
    candidate_lower: &str,
    primary: &[String],
    secondary: &[String],
    groups: &AHashMap<&str, usize>,
) -> Option<u8> {
    let prefix = cluster_prefix(name);
    if groups.get(prefix).copied().unwrap_or(0) < 2 {
        return None;
    }
    let stripped = name_lower.strip_prefix(&format!("{}_", prefix.to_lowercase()))?;
    if stripped.is_empty() {
        return None;
    }
    if stripped == candidate_lower {
        Some(4)
    } else if primary.iter().any(|v| v == stripped) || secondary.iter().any(|v| v == stripped) {
        Some(5)
    } else {
        None
    }
}
