//! The copy passes: whole-table global replication, workset-scoped row
//! migration, and composite-link translation.
//!
//! All passes share one rewrite pipeline per row (primary key, then
//! foreign keys, then unique text) and one reference-resolution rule.

mod global;
mod links;
mod table;

pub use global::replicate_global_table;
pub use links::migrate_links;
pub use table::migrate_table;

use tracing::warn;

use crate::catalog::TableCatalog;
use crate::dest::DestWriter;
use crate::error::Result;
use crate::remap::IdMaps;

/// Translate a foreign-key value through the referenced table's
/// identifier map.
///
/// When the referenced row was never migrated in this pass:
/// - reindexing: fall back to `value + current destination MAX(pk)` of the
///   referenced table, recomputed at this moment. The recomputed offset is
///   not guaranteed to match the offset the referenced table was actually
///   migrated with, so the resulting identifier may not correspond to any
///   migrated row. Inherited behavior, kept as-is; the warning makes runs
///   that hit it visible.
/// - not reindexing: the value is used unchanged.
pub(crate) async fn resolve_reference(
    dest: &mut dyn DestWriter,
    catalog: &TableCatalog,
    maps: &IdMaps,
    ref_table: &str,
    value: i64,
    reindex: bool,
) -> Result<i64> {
    if let Some(mapped) = maps.lookup(ref_table, value) {
        return Ok(mapped);
    }
    if reindex {
        let spec = catalog.lookup(ref_table)?;
        let offset = dest.max_id(spec.name, spec.pk).await?;
        warn!(
            "{} id {} was not migrated in this run; rewriting with recomputed offset {}",
            ref_table, value, offset
        );
        return Ok(value + offset);
    }
    Ok(value)
}
