//! Composite-link migration for the association table linking reactions
//! to assemblies.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::{
    TableCatalog, LINK_ASSEMBLY_COLUMN, LINK_ASSEMBLY_TABLE, LINK_REACTION_COLUMN,
    LINK_REACTION_TABLE, LINK_TABLE,
};
use crate::dest::DestWriter;
use crate::error::Result;
use crate::record::SqlValue;
use crate::remap::IdMaps;
use crate::source::SourceReader;

use super::resolve_reference;

/// Copy association rows whose reaction side or assembly side is in
/// scope, translating both sides independently through the identifier
/// maps built for cyclesequencing and assembly. No-op when both identifier
/// sets are empty.
///
/// The table has no key of its own; pair uniqueness is left to whatever
/// constraints the destination declares.
#[allow(clippy::too_many_arguments)]
pub async fn migrate_links(
    catalog: &TableCatalog,
    src: &dyn SourceReader,
    dest: &mut dyn DestWriter,
    reactions: &BTreeSet<i64>,
    assemblies: &BTreeSet<i64>,
    reindex: bool,
    maps: &IdMaps,
    batch_size: usize,
) -> Result<u64> {
    if reactions.is_empty() && assemblies.is_empty() {
        return Ok(0);
    }

    let reaction_list: Vec<i64> = reactions.iter().copied().collect();
    let assembly_list: Vec<i64> = assemblies.iter().copied().collect();
    let pairs = src
        .link_pairs(
            LINK_TABLE,
            LINK_REACTION_COLUMN,
            &reaction_list,
            LINK_ASSEMBLY_COLUMN,
            &assembly_list,
        )
        .await?;

    debug!(
        "{}: {} link rows in scope from {}",
        LINK_TABLE,
        pairs.len(),
        src.schema()
    );

    let columns = [
        LINK_REACTION_COLUMN.to_string(),
        LINK_ASSEMBLY_COLUMN.to_string(),
    ];
    let mut written = 0u64;
    let mut batch: Vec<Vec<SqlValue>> = Vec::new();

    for (reaction, assembly) in pairs {
        let reaction =
            resolve_reference(dest, catalog, maps, LINK_REACTION_TABLE, reaction, reindex).await?;
        let assembly =
            resolve_reference(dest, catalog, maps, LINK_ASSEMBLY_TABLE, assembly, reindex).await?;
        batch.push(vec![SqlValue::I64(reaction), SqlValue::I64(assembly)]);

        if batch.len() >= batch_size {
            written += dest
                .insert_rows(LINK_TABLE, &columns, std::mem::take(&mut batch))
                .await?;
        }
    }

    if !batch.is_empty() {
        written += dest.insert_rows(LINK_TABLE, &columns, batch).await?;
    }

    Ok(written)
}
