//! Read side of the migration: parameterized row selection from one
//! source schema.
//!
//! Implementations are read-only and hold no migration state; the same
//! trait is implemented by the MySQL driver and by in-memory fixtures in
//! the test suite.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Record;

/// Read rows and identifier sets from one source schema.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Schema label, for progress output.
    fn schema(&self) -> &str;

    /// Select root plate identifiers.
    ///
    /// With a non-empty `name_filter`, only plates with those names
    /// qualify. Ordering is most recent date first, higher identifier
    /// first on ties; at most `limit` plates are returned.
    async fn root_plates(&self, name_filter: &[String], limit: u32) -> Result<Vec<i64>>;

    /// Identifiers of `table` rows whose `fk_column` equals one of
    /// `parents`.
    ///
    /// Callers must not pass an empty parent set; the workset builder
    /// short-circuits instead, so no unconstrained query is ever issued.
    async fn child_ids(
        &self,
        table: &str,
        pk_column: &str,
        fk_column: &str,
        parents: &[i64],
    ) -> Result<BTreeSet<i64>>;

    /// Distinct non-null `ref_column` values of `table` rows whose
    /// `fk_column` equals one of `parents`.
    async fn referenced_ids(
        &self,
        table: &str,
        ref_column: &str,
        fk_column: &str,
        parents: &[i64],
    ) -> Result<BTreeSet<i64>>;

    /// Full rows of `table` whose `pk_column` equals one of `ids`,
    /// with every column included.
    async fn rows_by_id(&self, table: &str, pk_column: &str, ids: &[i64]) -> Result<Vec<Record>>;

    /// Every row of `table`, in any order.
    async fn all_rows(&self, table: &str) -> Result<Vec<Record>>;

    /// (reaction, assembly) pairs of the association `table` where the
    /// reaction column matches one of `reactions` or the assembly column
    /// matches one of `assemblies` (inclusive or). An empty id set
    /// disables that side of the predicate; with both empty the result
    /// is empty.
    async fn link_pairs(
        &self,
        table: &str,
        reaction_column: &str,
        reactions: &[i64],
        assembly_column: &str,
        assemblies: &[i64],
    ) -> Result<Vec<(i64, i64)>>;
}
