//! Identifier remapping: per-table source→destination id maps and the
//! policy that assigns destination identifiers.

use std::collections::HashMap;

/// How destination identifiers are assigned for one migration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapPolicy {
    /// Rows keep their source identifiers verbatim.
    Identity,

    /// Rows are re-keyed by a fixed per-table offset, measured from the
    /// destination's current maximum identifier when the table's pass
    /// begins. Constant for the whole pass.
    Offset(i64),
}

impl RemapPolicy {
    /// The additive offset for this policy.
    #[must_use]
    pub fn offset(&self) -> i64 {
        match self {
            RemapPolicy::Identity => 0,
            RemapPolicy::Offset(o) => *o,
        }
    }

    /// Destination identifier for a source identifier.
    #[must_use]
    pub fn apply(&self, id: i64) -> i64 {
        id + self.offset()
    }
}

/// Source→destination identifier map for one destination table.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    entries: HashMap<i64, i64>,
}

impl IdentifierMap {
    /// Record a translation.
    pub fn insert(&mut self, source: i64, dest: i64) {
        self.entries.insert(source, dest);
    }

    /// Destination identifier for a source identifier, if migrated.
    pub fn get(&self, source: i64) -> Option<i64> {
        self.entries.get(&source).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifier maps for every table migrated so far in one source pass.
///
/// Owned exclusively by the sequential migration driver; a table's map is
/// fully populated before any later-migrated table that references it is
/// processed.
#[derive(Debug, Default)]
pub struct IdMaps {
    tables: HashMap<String, IdentifierMap>,
}

impl IdMaps {
    /// The map for a table, if that table has been migrated in this pass.
    pub fn table(&self, name: &str) -> Option<&IdentifierMap> {
        self.tables.get(name)
    }

    /// The map for a table, created empty on first access.
    pub fn table_mut(&mut self, name: &str) -> &mut IdentifierMap {
        self.tables.entry(name.to_string()).or_default()
    }

    /// Record a translation for a table.
    pub fn insert(&mut self, table: &str, source: i64, dest: i64) {
        self.table_mut(table).insert(source, dest);
    }

    /// Translate an identifier through a table's map.
    pub fn lookup(&self, table: &str, source: i64) -> Option<i64> {
        self.tables.get(table).and_then(|m| m.get(source))
    }
}
