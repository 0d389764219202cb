//! The storage seam used by deferred schema change actions.

use chrono::{DateTime, Utc};
use spandb_commons::{ColumnId, Result, TableId, Value};

/// One row read from or written to storage: the primary key values and the
/// values of the requested columns, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: Vec<Value>,
    pub values: Vec<Value>,
}

/// Abstract storage handle.
///
/// The engine assumes the handle is externally synchronized; deferred
/// actions call it sequentially on one thread. Reads observe the database
/// contents as of the given timestamp.
pub trait Storage: Send + Sync {
    /// Reads every row of `table` visible at `timestamp`, projecting
    /// `columns`. Absent column values are returned as [`Value::Null`].
    fn read_table(
        &self,
        table: &TableId,
        timestamp: DateTime<Utc>,
        columns: &[ColumnId],
    ) -> Result<Vec<Row>>;

    /// Writes one row of `table` at `timestamp`.
    fn write_row(
        &self,
        table: &TableId,
        timestamp: DateTime<Utc>,
        key: Vec<Value>,
        columns: &[ColumnId],
        values: Vec<Value>,
    ) -> Result<()>;
}
