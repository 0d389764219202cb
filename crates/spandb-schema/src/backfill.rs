//! Index backfill.
//!
//! Populates an index's data table from the contents of its indexed table at
//! the schema change timestamp. Runs as a deferred action after the whole
//! batch has been structurally applied.

use crate::graph::NodeId;
use crate::updater::SchemaValidationContext;
use log::debug;
use spandb_commons::{Result, SchemaError, Value};
use std::collections::BTreeSet;

pub(crate) fn backfill_index(index_id: NodeId, context: &SchemaValidationContext) -> Result<()> {
    let schema = context
        .new_schema()
        .ok_or_else(|| SchemaError::internal("backfill action run without a schema snapshot"))?;
    let graph = schema.graph();
    let index = graph.index(index_id)?;
    let data_table = graph.table(index.index_data_table())?;
    let indexed_table = graph.table(index.indexed_table())?;

    // Every data table column is a projection of a column of the indexed
    // table.
    let mut source_columns = Vec::with_capacity(data_table.columns().len());
    let mut data_columns = Vec::with_capacity(data_table.columns().len());
    for &id in data_table.columns() {
        let column = graph.column(id)?;
        let source = column.source_column().ok_or_else(|| {
            SchemaError::internal(format!(
                "index data table column {} has no source column",
                column.name()
            ))
        })?;
        source_columns.push(graph.column(source)?.id().clone());
        data_columns.push(column.id().clone());
    }

    // Positions of the data table's key columns within its column list.
    let mut key_positions = Vec::with_capacity(data_table.primary_key().len());
    for &id in data_table.primary_key() {
        let column = graph.key_column(id)?.column();
        let position = data_table
            .columns()
            .iter()
            .position(|&c| c == column)
            .ok_or_else(|| {
                SchemaError::internal(format!(
                    "key column of {} is not in its column list",
                    data_table.name()
                ))
            })?;
        key_positions.push(position);
    }
    let num_declared_keys = index.key_columns().len();

    let rows = context
        .storage()
        .read_table(
            indexed_table.id(),
            context.schema_change_timestamp(),
            &source_columns,
        )
        .map_err(|source| SchemaError::Backfill {
            index: index.name().to_string(),
            message: source.to_string(),
        })?;

    let mut seen_keys: BTreeSet<Vec<Value>> = BTreeSet::new();
    let mut written = 0usize;
    for row in rows {
        if row.values.len() != data_columns.len() {
            return Err(SchemaError::internal(format!(
                "storage returned {} values for {} columns",
                row.values.len(),
                data_columns.len()
            )));
        }
        let key: Vec<Value> = key_positions
            .iter()
            .map(|&position| row.values[position].clone())
            .collect();

        // A null-filtered index omits rows with NULL in any declared key.
        if index.null_filtered() && key[..num_declared_keys].iter().any(Value::is_null) {
            continue;
        }

        if index.unique() {
            let declared_key = key[..num_declared_keys].to_vec();
            if !seen_keys.insert(declared_key.clone()) {
                return Err(SchemaError::UniqueIndexViolation {
                    index: index.name().to_string(),
                    key: format!("{:?}", declared_key),
                });
            }
        }

        context
            .storage()
            .write_row(
                data_table.id(),
                context.schema_change_timestamp(),
                key,
                &data_columns,
                row.values,
            )
            .map_err(|source| SchemaError::Backfill {
                index: index.name().to_string(),
                message: source.to_string(),
            })?;
        written += 1;
    }
    debug!("backfilled {} rows into index {}", written, index.name());
    Ok(())
}
