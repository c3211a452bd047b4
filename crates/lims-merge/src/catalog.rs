//! Static table catalog: which tables are copyable, their primary key,
//! the foreign keys that need rewriting, and the text columns that must
//! stay unique when two sources are merged.
//!
//! The catalog is versioned configuration, kept in lockstep with the actual
//! schema by hand; nothing here is inferred at runtime. It is constructed
//! once and passed to every component, never consulted as ambient state.

use crate::error::{MergeError, Result};

/// Spec for one copyable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name.
    pub name: &'static str,

    /// Integer primary key column.
    pub pk: &'static str,

    /// Foreign key columns as (column, referenced table).
    pub foreign_keys: &'static [(&'static str, &'static str)],

    /// Text columns carrying a uniqueness constraint that can collide
    /// when a second source is merged in.
    pub unique_text: &'static [&'static str],
}

impl TableSpec {
    /// Table referenced by a foreign key column, if the column is declared.
    pub fn referenced_table(&self, column: &str) -> Option<&'static str> {
        self.foreign_keys
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, t)| *t)
    }
}

/// All copyable tables.
const SPECS: &[TableSpec] = &[
    // Schema-wide reference tables, not scoped to any plate.
    TableSpec {
        name: "thermocycle",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    TableSpec {
        name: "cycle",
        pk: "id",
        foreign_keys: &[("thermocycleId", "thermocycle")],
        unique_text: &[],
    },
    TableSpec {
        name: "state",
        pk: "id",
        foreign_keys: &[("cycleId", "cycle")],
        unique_text: &[],
    },
    TableSpec {
        name: "pcr_thermocycle",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    TableSpec {
        name: "cyclesequencing_thermocycle",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    // Plate-scoped tables.
    TableSpec {
        name: "plate",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    TableSpec {
        name: "extraction",
        pk: "id",
        foreign_keys: &[("plate", "plate")],
        unique_text: &["extractionId"],
    },
    TableSpec {
        name: "workflow",
        pk: "id",
        foreign_keys: &[("extractionId", "extraction")],
        unique_text: &["name"],
    },
    TableSpec {
        name: "failure_reason",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    TableSpec {
        name: "assembly",
        pk: "id",
        foreign_keys: &[("workflow", "workflow"), ("failure_reason", "failure_reason")],
        unique_text: &[],
    },
    TableSpec {
        name: "pcr_cocktail",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    TableSpec {
        name: "cyclesequencing_cocktail",
        pk: "id",
        foreign_keys: &[],
        unique_text: &[],
    },
    TableSpec {
        name: "pcr",
        pk: "id",
        foreign_keys: &[
            ("plate", "plate"),
            ("workflow", "workflow"),
            ("cocktail", "pcr_cocktail"),
        ],
        unique_text: &[],
    },
    TableSpec {
        name: "cyclesequencing",
        pk: "id",
        foreign_keys: &[
            ("plate", "plate"),
            ("workflow", "workflow"),
            ("cocktail", "cyclesequencing_cocktail"),
        ],
        unique_text: &[],
    },
    TableSpec {
        name: "traces",
        pk: "id",
        foreign_keys: &[("reaction", "cyclesequencing")],
        unique_text: &[],
    },
    TableSpec {
        name: "gel_quantification",
        pk: "id",
        foreign_keys: &[("extractionId", "extraction"), ("plate", "plate")],
        unique_text: &[],
    },
    TableSpec {
        name: "gelimages",
        pk: "id",
        foreign_keys: &[("plate", "plate")],
        unique_text: &[],
    },
];

/// Reference tables copied whole from each source, before any workset is
/// computed. Order is FK-safe: cycle references thermocycle, state
/// references cycle.
const GLOBAL_TABLES: &[&str] = &[
    "thermocycle",
    "cycle",
    "state",
    "pcr_thermocycle",
    "cyclesequencing_thermocycle",
];

/// Workset-scoped tables in destination FK-safe insertion order: a table
/// appears only after every table it references.
const SCOPED_TABLES: &[&str] = &[
    "plate",
    "extraction",
    "workflow",
    "failure_reason",
    "assembly",
    "pcr_cocktail",
    "cyclesequencing_cocktail",
    "pcr",
    "cyclesequencing",
    "traces",
    "gel_quantification",
    "gelimages",
];

/// Association table copied by the composite link pass. It has no surrogate
/// key of its own; both columns are foreign keys.
pub const LINK_TABLE: &str = "sequencing_result";

/// Link column referencing a cyclesequencing reaction.
pub const LINK_REACTION_COLUMN: &str = "reaction";

/// Table the link's reaction column references.
pub const LINK_REACTION_TABLE: &str = "cyclesequencing";

/// Link column referencing an assembly.
pub const LINK_ASSEMBLY_COLUMN: &str = "assembly";

/// Table the link's assembly column references.
pub const LINK_ASSEMBLY_TABLE: &str = "assembly";

/// Read-only registry over the table specs above.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCatalog;

impl TableCatalog {
    /// The built-in catalog for the LIMS schema family.
    pub fn builtin() -> Self {
        Self
    }

    /// Look up a table spec, failing with a configuration error when the
    /// table is unknown.
    pub fn lookup(&self, table: &str) -> Result<&'static TableSpec> {
        SPECS
            .iter()
            .find(|s| s.name == table)
            .ok_or_else(|| MergeError::Config(format!("Unknown table in catalog: {}", table)))
    }

    /// Global reference tables in copy order.
    pub fn global_tables(&self) -> &'static [&'static str] {
        GLOBAL_TABLES
    }

    /// Workset-scoped tables in FK-safe insertion order.
    pub fn scoped_tables(&self) -> &'static [&'static str] {
        SCOPED_TABLES
    }
}
