//! MySQL destination writer implementation.
//!
//! Holds one transaction for the entire run: opened at connect time,
//! committed only when every pass has succeeded. Dropping the writer
//! without committing rolls everything back.

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::query::Query;
use sqlx::Transaction;
use tracing::info;

use crate::config::DestConfig;
use crate::dest::DestWriter;
use crate::error::{MergeError, Result};
use crate::record::SqlValue;

use super::{placeholders, quote_ident, POOL_CONNECTION_TIMEOUT};

/// MySQL maximum prepared-statement placeholders.
const MYSQL_MAX_PLACEHOLDERS: usize = 65_535;

/// MySQL destination writer holding the run's transaction.
pub struct MysqlDestWriter {
    // The pool outlives the transaction borrowed from it.
    #[allow(dead_code)]
    pool: MySqlPool,
    tx: Transaction<'static, MySql>,
}

impl MysqlDestWriter {
    /// Connect to the destination and open the run's transaction.
    pub async fn connect(config: &DestConfig) -> Result<Self> {
        let ssl_mode = if config.require_tls {
            MySqlSslMode::Required
        } else {
            MySqlSslMode::Preferred
        };

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .charset("utf8mb4")
            .ssl_mode(ssl_mode);

        // One connection: the whole run lives in one transaction.
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MergeError::pool(e, "creating destination pool"))?;

        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| MergeError::pool(e, "testing destination connection"))?;

        info!(
            "Connected to destination: {}:{}/{}",
            config.host, config.port, config.database
        );

        let tx = pool
            .begin()
            .await
            .map_err(|e| MergeError::pool(e, "opening destination transaction"))?;

        Ok(Self { pool, tx })
    }
}

/// Bind one value onto a query.
fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::I64(v) => query.bind(*v),
        SqlValue::F64(v) => query.bind(*v),
        SqlValue::Decimal(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Bytes(v) => query.bind(v.clone()),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::Time(v) => query.bind(*v),
        SqlValue::DateTime(v) => query.bind(*v),
    }
}

#[async_trait]
impl DestWriter for MysqlDestWriter {
    async fn max_id(&mut self, table: &str, pk_column: &str) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX({}), 0) FROM {}",
            quote_ident(pk_column),
            quote_ident(table)
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| MergeError::query(e, format!("reading max {} of {}", pk_column, table)))
    }

    async fn text_exists(&mut self, table: &str, column: &str, value: &str) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ? LIMIT 1",
            quote_ident(table),
            quote_ident(column)
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| MergeError::query(e, format!("probing {}.{}", table, column)))?;
        Ok(row.is_some())
    }

    async fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64> {
        if rows.is_empty() || columns.is_empty() {
            return Ok(0);
        }

        let col_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let row_placeholders = format!("({})", placeholders(columns.len()));
        let max_rows_per_statement = (MYSQL_MAX_PLACEHOLDERS / columns.len()).max(1);

        let mut written = 0u64;
        for chunk in rows.chunks(max_rows_per_statement) {
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote_ident(table),
                col_list,
                vec![row_placeholders.as_str(); chunk.len()].join(", ")
            );

            let mut query = sqlx::query(&sql);
            for row in chunk {
                for value in row {
                    query = bind_value(query, value);
                }
            }

            let result = query
                .execute(&mut *self.tx)
                .await
                .map_err(|e| MergeError::query(e, format!("inserting into {}", table)))?;
            written += result.rows_affected();
        }

        Ok(written)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tx
            .commit()
            .await
            .map_err(|e| MergeError::query(e, "committing destination transaction"))
    }
}
