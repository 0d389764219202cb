//! Helpers shared by unit and integration tests.

use crate::storage::{Row, Storage};
use crate::updater::SchemaChangeContext;
use chrono::{DateTime, Utc};
use spandb_commons::{
    ColumnId, ColumnIdGenerator, Result, SchemaError, TableId, TableIdGenerator, Value,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type TableRows = BTreeMap<Vec<Value>, BTreeMap<ColumnId, Value>>;

/// In-memory [`Storage`] with failure injection.
///
/// Timestamps are accepted and ignored; the store always serves its current
/// contents, which is enough for exercising backfills.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<BTreeMap<TableId, TableRows>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row directly, bypassing the engine.
    pub fn insert_row(&self, table: &TableId, key: Vec<Value>, values: Vec<(ColumnId, Value)>) {
        let mut tables = self.tables.lock().expect("storage mutex poisoned");
        tables
            .entry(table.clone())
            .or_default()
            .insert(key, values.into_iter().collect());
    }

    /// Number of rows currently stored for `table`.
    pub fn row_count(&self, table: &TableId) -> usize {
        let tables = self.tables.lock().expect("storage mutex poisoned");
        tables.get(table).map(BTreeMap::len).unwrap_or(0)
    }

    /// Snapshot of `table`'s rows for assertions.
    pub fn rows(&self, table: &TableId) -> Vec<(Vec<Value>, BTreeMap<ColumnId, Value>)> {
        let tables = self.tables.lock().expect("storage mutex poisoned");
        tables
            .get(table)
            .map(|rows| rows.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Makes every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Makes every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

impl Storage for MemoryStorage {
    fn read_table(
        &self,
        table: &TableId,
        _timestamp: DateTime<Utc>,
        columns: &[ColumnId],
    ) -> Result<Vec<Row>> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(SchemaError::storage("injected read failure"));
        }
        let tables = self
            .tables
            .lock()
            .map_err(|_| SchemaError::storage("storage mutex poisoned"))?;
        let rows = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|(key, row)| Row {
                        key: key.clone(),
                        values: columns
                            .iter()
                            .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    fn write_row(
        &self,
        table: &TableId,
        _timestamp: DateTime<Utc>,
        key: Vec<Value>,
        columns: &[ColumnId],
        values: Vec<Value>,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(SchemaError::storage("injected write failure"));
        }
        if columns.len() != values.len() {
            return Err(SchemaError::storage(format!(
                "{} columns with {} values",
                columns.len(),
                values.len()
            )));
        }
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| SchemaError::storage("storage mutex poisoned"))?;
        tables
            .entry(table.clone())
            .or_default()
            .insert(key, columns.iter().cloned().zip(values).collect());
        Ok(())
    }
}

/// A change context over the given storage with fresh id generators.
pub fn change_context(storage: Arc<dyn Storage>) -> SchemaChangeContext {
    SchemaChangeContext {
        storage,
        table_id_generator: Arc::new(TableIdGenerator::new()),
        column_id_generator: Arc::new(ColumnIdGenerator::new()),
        schema_change_timestamp: Utc::now(),
    }
}
