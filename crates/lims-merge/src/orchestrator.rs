//! Merge orchestrator - main workflow coordinator.
//!
//! Runs the whole merge strictly sequentially: global reference tables
//! (identity source before reindexed source), workset computation for both
//! sources, the identity-preserving subset copy, the reindexed subset
//! copy, and the composite-link pass inside each subset copy. All
//! destination writes happen inside one transaction committed at the end.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{TableCatalog, LINK_TABLE};
use crate::config::Config;
use crate::dest::DestWriter;
use crate::drivers::{MysqlDestWriter, MysqlSourceReader};
use crate::error::Result;
use crate::migrate::{migrate_links, migrate_table, replicate_global_table};
use crate::remap::IdMaps;
use crate::source::SourceReader;
use crate::workset::{Workset, WorksetBuilder};

/// Merge orchestrator.
pub struct Orchestrator {
    config: Config,
    catalog: TableCatalog,
    lims: Box<dyn SourceReader>,
    labbench: Box<dyn SourceReader>,
    dest: Box<dyn DestWriter>,
}

/// Result of a merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    /// When the merge started.
    pub started_at: DateTime<Utc>,

    /// When the merge committed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Root plates selected from the identity-preserving source.
    pub lims_plates: Vec<i64>,

    /// Root plates selected from the reindexed source.
    pub labbench_plates: Vec<i64>,

    /// Rows written per destination table, both sources combined.
    pub rows_by_table: BTreeMap<String, u64>,

    /// Total rows written.
    pub rows_copied: u64,
}

impl MergeResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Orchestrator {
    /// Create an orchestrator, connecting to both sources and the
    /// destination. Fails before any connection when the configuration is
    /// invalid.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let lims = MysqlSourceReader::connect(&config.source, &config.source.lims_schema).await?;
        let labbench =
            MysqlSourceReader::connect(&config.source, &config.source.labbench_schema).await?;
        let dest = MysqlDestWriter::connect(&config.dest).await?;

        Ok(Self::with_connections(
            config,
            Box::new(lims),
            Box::new(labbench),
            Box::new(dest),
        ))
    }

    /// Create an orchestrator over already-established connections.
    pub fn with_connections(
        config: Config,
        lims: Box<dyn SourceReader>,
        labbench: Box<dyn SourceReader>,
        dest: Box<dyn DestWriter>,
    ) -> Self {
        Self {
            config,
            catalog: TableCatalog::builtin(),
            lims,
            labbench,
            dest,
        }
    }

    /// Run the merge. On success every pass has been committed; on error
    /// the destination transaction is dropped uncommitted and nothing
    /// from this run is observable.
    pub async fn run(self) -> Result<MergeResult> {
        let started_at = Utc::now();
        let Orchestrator {
            config,
            catalog,
            lims,
            labbench,
            mut dest,
        } = self;

        let batch_size = config.merge.batch_size;
        let mut rows_by_table: BTreeMap<String, u64> = BTreeMap::new();

        info!("Phase 1: copying global reference tables");
        for (src, reindex) in [(lims.as_ref(), false), (labbench.as_ref(), true)] {
            let mut maps = IdMaps::default();
            for table in catalog.global_tables() {
                let spec = catalog.lookup(table)?;
                let n = replicate_global_table(
                    &catalog,
                    spec,
                    src,
                    dest.as_mut(),
                    reindex,
                    &mut maps,
                    batch_size,
                )
                .await?;
                *rows_by_table.entry(table.to_string()).or_insert(0) += n;
            }
        }

        info!("Phase 2: computing worksets");
        let builder = WorksetBuilder::new(
            config.merge.plate_names.clone(),
            config.merge.max_plates,
        );
        let lims_set = builder.build(lims.as_ref()).await?;
        let labbench_set = builder.build(labbench.as_ref()).await?;

        info!("Phase 3: copying {} subset (preserve ids)", lims_set.schema);
        copy_subset(
            &catalog,
            lims.as_ref(),
            dest.as_mut(),
            &lims_set,
            false,
            batch_size,
            &mut rows_by_table,
        )
        .await?;

        info!(
            "Phase 4: copying {} subset (reindex ids)",
            labbench_set.schema
        );
        copy_subset(
            &catalog,
            labbench.as_ref(),
            dest.as_mut(),
            &labbench_set,
            true,
            batch_size,
            &mut rows_by_table,
        )
        .await?;

        dest.commit().await?;

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let rows_copied = rows_by_table.values().sum();

        let result = MergeResult {
            started_at,
            completed_at,
            duration_seconds,
            lims_plates: lims_set.plates,
            labbench_plates: labbench_set.plates,
            rows_by_table,
            rows_copied,
        };

        info!(
            "Merge committed: {} rows across {} tables in {:.1}s",
            result.rows_copied,
            result.rows_by_table.len(),
            result.duration_seconds
        );

        Ok(result)
    }
}

/// Copy one source's workset in FK-safe table order, then its composite
/// links. Identifier maps are scoped to this pass and discarded with it.
async fn copy_subset(
    catalog: &TableCatalog,
    src: &dyn SourceReader,
    dest: &mut dyn DestWriter,
    workset: &Workset,
    reindex: bool,
    batch_size: usize,
    rows_by_table: &mut BTreeMap<String, u64>,
) -> Result<()> {
    let mut maps = IdMaps::default();

    for table in catalog.scoped_tables() {
        let spec = catalog.lookup(table)?;
        let Some(ids) = workset.ids(table) else {
            continue;
        };
        let n = migrate_table(
            catalog,
            spec,
            src,
            dest,
            ids,
            reindex,
            &mut maps,
            batch_size,
        )
        .await?;
        if n > 0 {
            info!("{}: {} rows from {}", table, n, workset.schema);
        }
        *rows_by_table.entry(table.to_string()).or_insert(0) += n;
    }

    let n = migrate_links(
        catalog,
        src,
        dest,
        &workset.reaction_ids,
        &workset.assembly_ids,
        reindex,
        &maps,
        batch_size,
    )
    .await?;
    if n > 0 {
        info!("{}: {} rows from {}", LINK_TABLE, n, workset.schema);
    }
    *rows_by_table.entry(LINK_TABLE.to_string()).or_insert(0) += n;

    Ok(())
}
