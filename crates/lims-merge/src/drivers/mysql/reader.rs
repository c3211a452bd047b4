//! MySQL source reader implementation.
//!
//! Implements the `SourceReader` trait over one source schema. Uses SQLx
//! for connection pooling and async query execution; all identifier-set
//! filters are bound placeholders, never spliced values.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::info;

use crate::config::SourceConfig;
use crate::error::{MergeError, Result};
use crate::record::{Record, SqlValue};
use crate::source::SourceReader;

use super::{placeholders, quote_ident, POOL_CONNECTION_TIMEOUT};

/// Source reads never need more than a couple of connections; the run is
/// strictly sequential.
const SOURCE_POOL_SIZE: u32 = 2;

/// MySQL source reader for one schema.
pub struct MysqlSourceReader {
    pool: MySqlPool,
    schema: String,
}

impl MysqlSourceReader {
    /// Connect to one source schema.
    pub async fn connect(config: &SourceConfig, schema: &str) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(schema)
            .username(&config.user)
            .password(&config.password)
            .charset("utf8mb4")
            .ssl_mode(MySqlSslMode::Preferred);

        let pool = MySqlPoolOptions::new()
            .max_connections(SOURCE_POOL_SIZE)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MergeError::pool(e, format!("creating source pool for {}", schema)))?;

        // Test connection
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| MergeError::pool(e, format!("testing source connection to {}", schema)))?;

        info!(
            "Connected to source: {}:{}/{}",
            config.host, config.port, schema
        );

        Ok(Self {
            pool,
            schema: schema.to_string(),
        })
    }

    async fn fetch_id_set(&self, sql: &str, params: &[i64], context: &str) -> Result<BTreeSet<i64>> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for p in params {
            query = query.bind(p);
        }
        let ids = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MergeError::query(e, format!("{} in {}", context, self.schema)))?;
        Ok(ids.into_iter().collect())
    }

    /// Convert a MySQL row to a Record, preserving column order.
    fn record_from_row(row: &MySqlRow) -> Record {
        let mut columns = Vec::with_capacity(row.columns().len());
        let mut values = Vec::with_capacity(row.columns().len());
        for (i, col) in row.columns().iter().enumerate() {
            columns.push(col.name().to_string());
            values.push(Self::decode_value(row, i, col.type_info().name()));
        }
        Record::new(columns, values)
    }

    /// Decode one column by its MySQL type name.
    fn decode_value(row: &MySqlRow, i: usize, type_name: &str) -> SqlValue {
        let is_null = row.try_get_raw(i).map(|v| v.is_null()).unwrap_or(true);
        if is_null {
            return SqlValue::Null;
        }

        match type_name {
            "BOOLEAN" => row
                .try_get::<bool, _>(i)
                .map(SqlValue::Bool)
                .unwrap_or(SqlValue::Null),

            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
                .try_get::<i64, _>(i)
                .map(SqlValue::I64)
                .unwrap_or(SqlValue::Null),

            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => row
                .try_get::<u64, _>(i)
                .map(|v| SqlValue::I64(v as i64))
                .unwrap_or(SqlValue::Null),

            "FLOAT" => row
                .try_get::<f32, _>(i)
                .map(|v| SqlValue::F64(v as f64))
                .unwrap_or(SqlValue::Null),
            "DOUBLE" => row
                .try_get::<f64, _>(i)
                .map(SqlValue::F64)
                .unwrap_or(SqlValue::Null),

            "DECIMAL" => row
                .try_get::<rust_decimal::Decimal, _>(i)
                .map(SqlValue::Decimal)
                .unwrap_or(SqlValue::Null),

            "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" | "JSON" => row
                .try_get::<String, _>(i)
                .map(SqlValue::Text)
                .unwrap_or(SqlValue::Null),

            "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
                .try_get::<Vec<u8>, _>(i)
                .map(SqlValue::Bytes)
                .unwrap_or(SqlValue::Null),

            "DATE" => row
                .try_get::<chrono::NaiveDate, _>(i)
                .map(SqlValue::Date)
                .unwrap_or(SqlValue::Null),
            "TIME" => row
                .try_get::<chrono::NaiveTime, _>(i)
                .map(SqlValue::Time)
                .unwrap_or(SqlValue::Null),
            "DATETIME" | "TIMESTAMP" => row
                .try_get::<chrono::NaiveDateTime, _>(i)
                .map(SqlValue::DateTime)
                .unwrap_or(SqlValue::Null),

            // Anything else survives a round trip as text.
            _ => row
                .try_get::<String, _>(i)
                .map(SqlValue::Text)
                .unwrap_or(SqlValue::Null),
        }
    }
}

#[async_trait]
impl SourceReader for MysqlSourceReader {
    fn schema(&self) -> &str {
        &self.schema
    }

    async fn root_plates(&self, name_filter: &[String], limit: u32) -> Result<Vec<i64>> {
        let mut sql = String::from("SELECT id FROM plate");
        if !name_filter.is_empty() {
            sql.push_str(&format!(
                " WHERE name IN ({})",
                placeholders(name_filter.len())
            ));
        }
        sql.push_str(" ORDER BY date DESC, id DESC LIMIT ?");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for name in name_filter {
            query = query.bind(name);
        }
        query = query.bind(limit);

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MergeError::query(e, format!("selecting root plates in {}", self.schema)))
    }

    async fn child_ids(
        &self,
        table: &str,
        pk_column: &str,
        fk_column: &str,
        parents: &[i64],
    ) -> Result<BTreeSet<i64>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} IN ({})",
            quote_ident(pk_column),
            quote_ident(table),
            quote_ident(fk_column),
            placeholders(parents.len())
        );
        self.fetch_id_set(&sql, parents, &format!("selecting {} ids", table))
            .await
    }

    async fn referenced_ids(
        &self,
        table: &str,
        ref_column: &str,
        fk_column: &str,
        parents: &[i64],
    ) -> Result<BTreeSet<i64>> {
        let sql = format!(
            "SELECT DISTINCT {} FROM {} WHERE {} IS NOT NULL AND {} IN ({})",
            quote_ident(ref_column),
            quote_ident(table),
            quote_ident(ref_column),
            quote_ident(fk_column),
            placeholders(parents.len())
        );
        self.fetch_id_set(
            &sql,
            parents,
            &format!("selecting {} references of {}", ref_column, table),
        )
        .await
    }

    async fn rows_by_id(&self, table: &str, pk_column: &str, ids: &[i64]) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} IN ({})",
            quote_ident(table),
            quote_ident(pk_column),
            placeholders(ids.len())
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows: Vec<MySqlRow> = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MergeError::query(e, format!("fetching {} rows in {}", table, self.schema)))?;

        Ok(rows.iter().map(Self::record_from_row).collect())
    }

    async fn all_rows(&self, table: &str) -> Result<Vec<Record>> {
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        let rows: Vec<MySqlRow> = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MergeError::query(e, format!("fetching {} rows in {}", table, self.schema)))?;

        Ok(rows.iter().map(Self::record_from_row).collect())
    }

    async fn link_pairs(
        &self,
        table: &str,
        reaction_column: &str,
        reactions: &[i64],
        assembly_column: &str,
        assemblies: &[i64],
    ) -> Result<Vec<(i64, i64)>> {
        let mut clauses = Vec::new();
        if !reactions.is_empty() {
            clauses.push(format!(
                "{} IN ({})",
                quote_ident(reaction_column),
                placeholders(reactions.len())
            ));
        }
        if !assemblies.is_empty() {
            clauses.push(format!(
                "{} IN ({})",
                quote_ident(assembly_column),
                placeholders(assemblies.len())
            ));
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {}, {} FROM {} WHERE {}",
            quote_ident(reaction_column),
            quote_ident(assembly_column),
            quote_ident(table),
            clauses.join(" OR ")
        );

        let mut query = sqlx::query(&sql);
        for id in reactions.iter().chain(assemblies) {
            query = query.bind(id);
        }

        let rows: Vec<MySqlRow> = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MergeError::query(e, format!("fetching {} rows in {}", table, self.schema)))?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            let reaction: i64 = row
                .try_get(0)
                .map_err(|e| MergeError::query(e, format!("decoding {} reaction", table)))?;
            let assembly: i64 = row
                .try_get(1)
                .map_err(|e| MergeError::query(e, format!("decoding {} assembly", table)))?;
            pairs.push((reaction, assembly));
        }
        Ok(pairs)
    }
}
