//! Per-statement validation context and deferred schema change actions.

use crate::backfill::backfill_index;
use crate::catalog::Schema;
use crate::graph::NodeId;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use spandb_commons::Result;
use std::sync::Arc;

/// A data-plane action registered during structural apply and executed after
/// every statement of the batch has been applied.
///
/// Actions are plain values rather than closures so pending work can be
/// inspected and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaChangeAction {
    /// Populate an index's data table from its indexed table at the change
    /// timestamp.
    BackfillIndex { index: NodeId },
}

/// Carrier of everything a statement's deferred actions need: the storage
/// handle, the change timestamp, and the snapshots before and after the
/// statement.
pub struct SchemaValidationContext {
    storage: Arc<dyn Storage>,
    schema_change_timestamp: DateTime<Utc>,
    old_schema: Option<Arc<Schema>>,
    new_schema: Option<Arc<Schema>>,
    actions: Vec<SchemaChangeAction>,
}

impl SchemaValidationContext {
    pub fn new(storage: Arc<dyn Storage>, schema_change_timestamp: DateTime<Utc>) -> Self {
        Self {
            storage,
            schema_change_timestamp,
            old_schema: None,
            new_schema: None,
            actions: Vec::new(),
        }
    }

    /// Appends a deferred action. Actions run in registration order.
    pub fn add_action(&mut self, action: SchemaChangeAction) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[SchemaChangeAction] {
        &self.actions
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn schema_change_timestamp(&self) -> DateTime<Utc> {
        self.schema_change_timestamp
    }

    /// The snapshot visible before the statement was applied.
    pub fn old_schema(&self) -> Option<&Arc<Schema>> {
        self.old_schema.as_ref()
    }

    /// The snapshot produced by the statement.
    pub fn new_schema(&self) -> Option<&Arc<Schema>> {
        self.new_schema.as_ref()
    }

    pub(crate) fn set_old_schema_snapshot(&mut self, schema: Arc<Schema>) {
        self.old_schema = Some(schema);
    }

    pub(crate) fn set_new_schema_snapshot(&mut self, schema: Arc<Schema>) {
        self.new_schema = Some(schema);
    }

    /// Runs the statement's deferred actions in order, stopping at the first
    /// failure. Already-written storage effects are not rolled back.
    pub fn run_schema_change_actions(&self) -> Result<()> {
        for action in &self.actions {
            match action {
                SchemaChangeAction::BackfillIndex { index } => backfill_index(*index, self)?,
            }
        }
        Ok(())
    }
}
