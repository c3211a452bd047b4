//! Write side of the migration: transactional batched insertion into the
//! destination schema.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::SqlValue;

/// Write rows into the destination inside one run-wide transaction.
///
/// The transaction is opened when the writer is created and committed only
/// by [`commit`](DestWriter::commit); dropping an uncommitted writer rolls
/// everything back, so the destination observes all-or-nothing semantics
/// for the whole run.
#[async_trait]
pub trait DestWriter: Send {
    /// Current maximum value of `pk_column` in `table`; 0 when the table
    /// is empty. Reads through the run's transaction, so rows inserted
    /// earlier in the run are visible.
    async fn max_id(&mut self, table: &str, pk_column: &str) -> Result<i64>;

    /// Whether `column` of `table` already holds `value`. Used by
    /// unique-text collision resolution; also reads through the run's
    /// transaction.
    async fn text_exists(&mut self, table: &str, column: &str, value: &str) -> Result<bool>;

    /// Insert rows into `table`. Every row's values follow the order of
    /// `columns`. Returns the number of rows written.
    async fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64>;

    /// Commit the run's transaction, consuming the writer.
    async fn commit(self: Box<Self>) -> Result<()>;
}
