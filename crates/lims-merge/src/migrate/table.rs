//! Workset-scoped row migration for one table.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::catalog::{TableCatalog, TableSpec};
use crate::dest::DestWriter;
use crate::error::Result;
use crate::record::{Record, SqlValue};
use crate::remap::{IdMaps, RemapPolicy};
use crate::source::SourceReader;

use super::resolve_reference;

/// Copy the rows of `spec` named by `ids` from one source into the
/// destination. No-op when `ids` is empty.
///
/// After this returns, the table's identifier map in `maps` reflects every
/// migrated row, ready for foreign-key rewriting by tables processed later
/// in the fixed dependency order.
#[allow(clippy::too_many_arguments)]
pub async fn migrate_table(
    catalog: &TableCatalog,
    spec: &TableSpec,
    src: &dyn SourceReader,
    dest: &mut dyn DestWriter,
    ids: &BTreeSet<i64>,
    reindex: bool,
    maps: &mut IdMaps,
    batch_size: usize,
) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let policy = pass_policy(dest, spec, reindex).await?;
    let id_list: Vec<i64> = ids.iter().copied().collect();
    let rows = src.rows_by_id(spec.name, spec.pk, &id_list).await?;

    copy_rows(catalog, spec, dest, rows, policy, reindex, maps, batch_size).await
}

/// Identifier policy for one table's pass. The offset is measured once,
/// before the first row of the pass is written, and stays fixed for the
/// whole pass.
pub(crate) async fn pass_policy(
    dest: &mut dyn DestWriter,
    spec: &TableSpec,
    reindex: bool,
) -> Result<RemapPolicy> {
    if reindex {
        let offset = dest.max_id(spec.name, spec.pk).await?;
        debug!("{}: reindex offset {}", spec.name, offset);
        Ok(RemapPolicy::Offset(offset))
    } else {
        Ok(RemapPolicy::Identity)
    }
}

/// Rewrite and insert a set of fetched rows. Shared by the scoped and
/// global passes.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn copy_rows(
    catalog: &TableCatalog,
    spec: &TableSpec,
    dest: &mut dyn DestWriter,
    rows: Vec<Record>,
    policy: RemapPolicy,
    reindex: bool,
    maps: &mut IdMaps,
    batch_size: usize,
) -> Result<u64> {
    let mut written = 0u64;
    let mut columns: Option<Vec<String>> = None;
    let mut batch: Vec<Vec<SqlValue>> = Vec::new();
    // Unique-text values assigned earlier in this pass. Rows still sitting
    // in an unflushed batch are invisible to the destination probe, so the
    // probe alone cannot keep the suffix progression deterministic.
    let mut assigned: HashMap<&'static str, HashSet<String>> = HashMap::new();

    for record in rows {
        let record = rewrite_primary_key(spec, record, policy, maps);
        let record = rewrite_foreign_keys(catalog, spec, dest, record, reindex, maps).await?;
        let record = if reindex {
            rewrite_unique_text(spec, dest, record, &mut assigned).await?
        } else {
            record
        };

        if columns.is_none() {
            columns = Some(record.columns().to_vec());
        }
        batch.push(record.into_values());

        if batch.len() >= batch_size {
            let cols = columns.as_ref().expect("columns captured with first row");
            written += dest
                .insert_rows(spec.name, cols, std::mem::take(&mut batch))
                .await?;
        }
    }

    if !batch.is_empty() {
        let cols = columns.as_ref().expect("columns captured with first row");
        written += dest.insert_rows(spec.name, cols, batch).await?;
    }

    Ok(written)
}

/// Assign the destination identifier and record the translation.
fn rewrite_primary_key(
    spec: &TableSpec,
    record: Record,
    policy: RemapPolicy,
    maps: &mut IdMaps,
) -> Record {
    match record.id(spec.pk) {
        Some(source_id) => {
            let dest_id = policy.apply(source_id);
            maps.insert(spec.name, source_id, dest_id);
            record.with_value(spec.pk, SqlValue::I64(dest_id))
        }
        // A NULL key passes through untouched.
        None => record,
    }
}

/// Rewrite every declared foreign key through the referenced table's map.
async fn rewrite_foreign_keys(
    catalog: &TableCatalog,
    spec: &TableSpec,
    dest: &mut dyn DestWriter,
    mut record: Record,
    reindex: bool,
    maps: &IdMaps,
) -> Result<Record> {
    for &(column, ref_table) in spec.foreign_keys {
        let Some(value) = record.id(column) else {
            // NULL foreign keys stay NULL.
            continue;
        };
        let rewritten = resolve_reference(dest, catalog, maps, ref_table, value, reindex).await?;
        record = record.with_value(column, SqlValue::I64(rewritten));
    }
    Ok(record)
}

/// De-collide declared unique text columns against the destination and
/// against values already assigned in this pass.
async fn rewrite_unique_text(
    spec: &TableSpec,
    dest: &mut dyn DestWriter,
    mut record: Record,
    assigned: &mut HashMap<&'static str, HashSet<String>>,
) -> Result<Record> {
    for &column in spec.unique_text {
        let Some(value) = record.get(column).and_then(SqlValue::as_text) else {
            continue;
        };
        let value = value.to_string();
        let taken = assigned.entry(column).or_default();
        let resolved = decollide(dest, spec.name, column, &value, taken).await?;
        if resolved != value {
            debug!(
                "{}.{}: \"{}\" collides, renamed to \"{}\"",
                spec.name, column, value, resolved
            );
            record = record.with_value(column, SqlValue::Text(resolved.clone()));
        }
        taken.insert(resolved);
    }
    Ok(record)
}

/// Deterministic suffixing: "v" collides → "v_lb", then "v_lb1", "v_lb2", …
async fn decollide(
    dest: &mut dyn DestWriter,
    table: &str,
    column: &str,
    value: &str,
    taken: &HashSet<String>,
) -> Result<String> {
    if !taken.contains(value) && !dest.text_exists(table, column, value).await? {
        return Ok(value.to_string());
    }

    let mut candidate = format!("{}_lb", value);
    let mut n = 1;
    while taken.contains(&candidate) || dest.text_exists(table, column, &candidate).await? {
        candidate = format!("{}_lb{}", value, n);
        n += 1;
    }
    Ok(candidate)
}
