//! Row values and the ordered column/value record they travel in.
//!
//! `SqlValue` is a database-agnostic owned value; `Record` is one source row
//! read with its column order intact. Rewrite steps (primary key, foreign
//! keys, unique text) never mutate a record in place: each produces a new
//! `Record`, which keeps the rewrite pipeline composable and testable.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Owned SQL value as read from (and written back to) a MySQL row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,

    Bool(bool),

    /// Any signed integer width; identifiers always land here.
    I64(i64),

    F64(f64),

    /// Decimal value with arbitrary precision.
    Decimal(Decimal),

    Text(String),

    Bytes(Vec<u8>),

    Date(NaiveDate),

    Time(NaiveTime),

    /// Timestamp without timezone (MySQL DATETIME/TIMESTAMP).
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Interpret this value as a row identifier.
    #[must_use]
    pub fn as_id(&self) -> Option<i64> {
        match self {
            SqlValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow this value as text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

/// One source row: column names and values in source column order.
///
/// Column order is preserved from read to write so the insert statement's
/// column list always matches the value list.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Record {
    /// Create a record from parallel column and value vectors.
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Create a record from (column, value) pairs.
    pub fn from_pairs(pairs: Vec<(String, SqlValue)>) -> Self {
        let (columns, values) = pairs.into_iter().unzip();
        Self { columns, values }
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in source column order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a value by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Look up an identifier column; `None` when the column is missing,
    /// NULL, or not an integer.
    pub fn id(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_id)
    }

    /// Return a new record with `column` replaced by `value`.
    ///
    /// A record without the named column is returned unchanged; rewrite
    /// steps check presence before rewriting.
    #[must_use]
    pub fn with_value(&self, column: &str, value: SqlValue) -> Record {
        let mut values = self.values.clone();
        if let Some(i) = self.columns.iter().position(|c| c == column) {
            values[i] = value;
        }
        Record {
            columns: self.columns.clone(),
            values,
        }
    }

    /// Consume the record, yielding its values in column order.
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}
