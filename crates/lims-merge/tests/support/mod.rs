//! In-memory source and destination fixtures for pipeline tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use lims_merge::error::Result;
use lims_merge::{DestWriter, Record, SourceReader, SqlValue};

/// Build a record from (column, value) pairs.
pub fn rec(pairs: &[(&str, SqlValue)]) -> Record {
    Record::from_pairs(
        pairs
            .iter()
            .map(|(c, v)| (c.to_string(), v.clone()))
            .collect(),
    )
}

/// A date value from "YYYY-MM-DD".
pub fn date(s: &str) -> SqlValue {
    SqlValue::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
}

/// In-memory source schema. Records every selection it serves so tests
/// can assert which queries were (not) issued.
pub struct FakeSource {
    schema: String,
    tables: HashMap<String, Vec<Record>>,
    links: Vec<(i64, i64)>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            tables: HashMap::new(),
            links: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Record>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    pub fn with_links(mut self, links: Vec<(i64, i64)>) -> Self {
        self.links = links;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn rows(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn log(&self, entry: String) {
        self.queries.lock().unwrap().push(entry);
    }
}

fn plate_sort_key(record: &Record) -> (NaiveDate, i64) {
    let date = match record.get("date") {
        Some(SqlValue::Date(d)) => *d,
        Some(SqlValue::DateTime(dt)) => dt.date(),
        _ => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
    };
    (date, record.id("id").unwrap_or(0))
}

#[async_trait]
impl SourceReader for FakeSource {
    fn schema(&self) -> &str {
        &self.schema
    }

    async fn root_plates(&self, name_filter: &[String], limit: u32) -> Result<Vec<i64>> {
        self.log("root_plates".to_string());
        let mut plates: Vec<&Record> = self
            .rows("plate")
            .iter()
            .filter(|r| {
                name_filter.is_empty()
                    || r.get("name")
                        .and_then(SqlValue::as_text)
                        .map(|n| name_filter.iter().any(|f| f == n))
                        .unwrap_or(false)
            })
            .collect();
        plates.sort_by(|a, b| plate_sort_key(b).cmp(&plate_sort_key(a)));
        Ok(plates
            .into_iter()
            .take(limit as usize)
            .filter_map(|r| r.id("id"))
            .collect())
    }

    async fn child_ids(
        &self,
        table: &str,
        pk_column: &str,
        fk_column: &str,
        parents: &[i64],
    ) -> Result<BTreeSet<i64>> {
        self.log(format!("child_ids:{}:{}", table, fk_column));
        Ok(self
            .rows(table)
            .iter()
            .filter(|r| r.id(fk_column).map(|v| parents.contains(&v)).unwrap_or(false))
            .filter_map(|r| r.id(pk_column))
            .collect())
    }

    async fn referenced_ids(
        &self,
        table: &str,
        ref_column: &str,
        fk_column: &str,
        parents: &[i64],
    ) -> Result<BTreeSet<i64>> {
        self.log(format!("referenced_ids:{}:{}", table, ref_column));
        Ok(self
            .rows(table)
            .iter()
            .filter(|r| r.id(fk_column).map(|v| parents.contains(&v)).unwrap_or(false))
            .filter_map(|r| r.id(ref_column))
            .collect())
    }

    async fn rows_by_id(&self, table: &str, pk_column: &str, ids: &[i64]) -> Result<Vec<Record>> {
        self.log(format!("rows_by_id:{}", table));
        Ok(self
            .rows(table)
            .iter()
            .filter(|r| r.id(pk_column).map(|v| ids.contains(&v)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn all_rows(&self, table: &str) -> Result<Vec<Record>> {
        self.log(format!("all_rows:{}", table));
        Ok(self.rows(table).to_vec())
    }

    async fn link_pairs(
        &self,
        _table: &str,
        _reaction_column: &str,
        reactions: &[i64],
        _assembly_column: &str,
        assemblies: &[i64],
    ) -> Result<Vec<(i64, i64)>> {
        self.log("link_pairs".to_string());
        Ok(self
            .links
            .iter()
            .filter(|(r, a)| reactions.contains(r) || assemblies.contains(a))
            .copied()
            .collect())
    }
}

/// Observable destination state, shared between the writer handed to the
/// code under test and the test itself.
#[derive(Default)]
pub struct DestState {
    pub tables: HashMap<String, Vec<Record>>,
    /// Every max-id probe as "table.pk", in order. Lets tests assert
    /// whether a foreign-key rewrite took the mapped or the fallback path.
    pub max_id_probes: Vec<String>,
    pub committed: bool,
}

impl DestState {
    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids(&self, table: &str, pk_column: &str) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .rows(table)
            .iter()
            .filter_map(|r| r.id(pk_column))
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn seed(&mut self, table: &str, rows: Vec<Record>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }
}

/// In-memory destination writer over shared [`DestState`].
#[derive(Default)]
pub struct FakeDest {
    state: Arc<Mutex<DestState>>,
}

impl FakeDest {
    pub fn new() -> (Self, Arc<Mutex<DestState>>) {
        let state = Arc::new(Mutex::new(DestState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

#[async_trait]
impl DestWriter for FakeDest {
    async fn max_id(&mut self, table: &str, pk_column: &str) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.max_id_probes.push(format!("{}.{}", table, pk_column));
        Ok(state
            .rows(table)
            .iter()
            .filter_map(|r| r.id(pk_column))
            .max()
            .unwrap_or(0))
    }

    async fn text_exists(&mut self, table: &str, column: &str, value: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rows(table)
            .iter()
            .any(|r| r.get(column).and_then(SqlValue::as_text) == Some(value)))
    }

    async fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let stored = state.tables.entry(table.to_string()).or_default();
        let written = rows.len() as u64;
        for values in rows {
            stored.push(Record::new(columns.to_vec(), values));
        }
        Ok(written)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().committed = true;
        Ok(())
    }
}
