//! Workset computation: the per-source set of row identifiers reachable
//! from the chosen root plates.
//!
//! The dependency graph is fixed: extraction hangs off plate, workflow off
//! extraction, assembly off workflow, and the pcr / cyclesequencing /
//! traces / gel branches hang off plate. The builder walks it forward,
//! one select per edge, and returns pure data; no connection is retained.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::error::Result;
use crate::source::SourceReader;

/// Identifiers reachable from the root plates of one source schema.
///
/// Built once per source, consumed by the subset copy for that source,
/// then discarded.
#[derive(Debug, Default)]
pub struct Workset {
    /// Source schema label.
    pub schema: String,

    /// Root plate identifiers in selection order.
    pub plates: Vec<i64>,

    /// Reachable identifiers per table.
    tables: BTreeMap<String, BTreeSet<i64>>,

    /// Cyclesequencing identifiers, retained for composite-link
    /// resolution (the link table's "reaction" side).
    pub reaction_ids: BTreeSet<i64>,

    /// Assembly identifiers, retained for composite-link resolution.
    pub assembly_ids: BTreeSet<i64>,
}

impl Workset {
    /// Reachable identifiers for a table, if any were computed.
    pub fn ids(&self, table: &str) -> Option<&BTreeSet<i64>> {
        self.tables.get(table)
    }

    fn put(&mut self, table: &str, ids: BTreeSet<i64>) {
        self.tables.insert(table.to_string(), ids);
    }

    /// Total identifiers across all tables, for progress output.
    pub fn total_ids(&self) -> usize {
        self.tables.values().map(BTreeSet::len).sum()
    }
}

/// Builds a [`Workset`] for one source schema.
pub struct WorksetBuilder {
    plate_names: Vec<String>,
    max_plates: u32,
}

impl WorksetBuilder {
    /// Create a builder. An empty `plate_names` filter selects the most
    /// recently dated plates, up to `max_plates`.
    pub fn new(plate_names: Vec<String>, max_plates: u32) -> Self {
        Self {
            plate_names,
            max_plates,
        }
    }

    /// Compute the workset for one source.
    pub async fn build(&self, src: &dyn SourceReader) -> Result<Workset> {
        info!("Building workset for {}", src.schema());

        let mut ws = Workset {
            schema: src.schema().to_string(),
            ..Workset::default()
        };

        let plates = src.root_plates(&self.plate_names, self.max_plates).await?;
        info!("{}: root plates {:?}", src.schema(), plates);
        ws.plates = plates.clone();
        ws.put("plate", plates.iter().copied().collect());

        let extractions = children(src, "extraction", "plate", &plates).await?;
        let workflows = children(src, "workflow", "extractionId", &ids(&extractions)).await?;
        let assemblies = children(src, "assembly", "workflow", &ids(&workflows)).await?;
        ws.assembly_ids = assemblies.clone();

        let failure_reasons = references(
            src,
            "assembly",
            "failure_reason",
            "workflow",
            &ids(&workflows),
        )
        .await?;

        let reactions = children(src, "cyclesequencing", "plate", &plates).await?;
        ws.reaction_ids = reactions.clone();

        let pcrs = children(src, "pcr", "plate", &plates).await?;
        let pcr_cocktails = references(src, "pcr", "cocktail", "plate", &plates).await?;
        let cs_cocktails =
            references(src, "cyclesequencing", "cocktail", "plate", &plates).await?;

        let traces = children(src, "traces", "reaction", &ids(&reactions)).await?;
        let gel_quantifications = children(src, "gel_quantification", "plate", &plates).await?;
        let gelimages = children(src, "gelimages", "plate", &plates).await?;

        ws.put("extraction", extractions);
        ws.put("workflow", workflows);
        ws.put("failure_reason", failure_reasons);
        ws.put("assembly", assemblies);
        ws.put("pcr_cocktail", pcr_cocktails);
        ws.put("cyclesequencing_cocktail", cs_cocktails);
        ws.put("pcr", pcrs);
        ws.put("cyclesequencing", reactions);
        ws.put("traces", traces);
        ws.put("gel_quantification", gel_quantifications);
        ws.put("gelimages", gelimages);

        debug!(
            "{}: workset holds {} identifiers across {} tables",
            ws.schema,
            ws.total_ids(),
            ws.tables.len()
        );

        Ok(ws)
    }
}

fn ids(set: &BTreeSet<i64>) -> Vec<i64> {
    set.iter().copied().collect()
}

/// Select child identifiers, short-circuiting on an empty parent set.
///
/// Without the guard an empty set would turn into an unconstrained query
/// and pull in unrelated rows.
async fn children(
    src: &dyn SourceReader,
    table: &str,
    fk_column: &str,
    parents: &[i64],
) -> Result<BTreeSet<i64>> {
    if parents.is_empty() {
        return Ok(BTreeSet::new());
    }
    src.child_ids(table, "id", fk_column, parents).await
}

/// Select distinct referenced identifiers, with the same empty-parent
/// guard as [`children`].
async fn references(
    src: &dyn SourceReader,
    table: &str,
    ref_column: &str,
    fk_column: &str,
    parents: &[i64],
) -> Result<BTreeSet<i64>> {
    if parents.is_empty() {
        return Ok(BTreeSet::new());
    }
    src.referenced_ids(table, ref_column, fk_column, parents).await
}
