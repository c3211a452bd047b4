//! Whole-table replication of schema-wide reference tables.

use tracing::info;

use crate::catalog::{TableCatalog, TableSpec};
use crate::dest::DestWriter;
use crate::error::Result;
use crate::remap::IdMaps;
use crate::source::SourceReader;

use super::table::{copy_rows, pass_policy};

/// Copy every row of a global reference table from one source.
///
/// For one table this must run once per source, non-reindexed source
/// first, so the reindexed pass's offset reflects the rows the identity
/// pass already inserted. The table's identifier map in `maps` is
/// populated as a side effect, letting dependent global tables (cycle
/// referencing thermocycle, state referencing cycle) resolve through it
/// later in the same phase.
pub async fn replicate_global_table(
    catalog: &TableCatalog,
    spec: &TableSpec,
    src: &dyn SourceReader,
    dest: &mut dyn DestWriter,
    reindex: bool,
    maps: &mut IdMaps,
    batch_size: usize,
) -> Result<u64> {
    info!(
        "{}: copying whole table from {} ({})",
        spec.name,
        src.schema(),
        if reindex { "reindex ids" } else { "preserve ids" }
    );

    let policy = pass_policy(dest, spec, reindex).await?;
    let rows = src.all_rows(spec.name).await?;

    copy_rows(catalog, spec, dest, rows, policy, reindex, maps, batch_size).await
}
