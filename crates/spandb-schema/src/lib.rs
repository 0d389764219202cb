//! Schema update engine of the spandb emulator.
//!
//! Takes a batch of DDL statements and produces a new, validated, immutable
//! schema snapshot plus deferred data-plane work (index backfills).
//!
//! - [`catalog`]: the immutable schema node types and snapshots
//! - [`graph`]: the id-keyed schema graph and its copy-on-write editor
//! - [`updater`]: the name registry, validation context and batch driver
//! - [`storage`]: the storage seam used by deferred actions
//!
//! ```no_run
//! use spandb_schema::test_helpers::MemoryStorage;
//! use spandb_schema::{SchemaChangeContext, SchemaUpdater};
//! use std::sync::Arc;
//!
//! # fn example() -> spandb_commons::Result<()> {
//! let context = SchemaChangeContext {
//!     storage: Arc::new(MemoryStorage::new()),
//!     table_id_generator: Arc::new(Default::default()),
//!     column_id_generator: Arc::new(Default::default()),
//!     schema_change_timestamp: chrono::Utc::now(),
//! };
//! let schema = SchemaUpdater::new().create_schema_from_ddl(
//!     &["CREATE TABLE Users (Id INT64, Name STRING(MAX)) PRIMARY KEY (Id)".to_string()],
//!     &context,
//! )?;
//! assert!(schema.find_table("users").is_some());
//! # Ok(())
//! # }
//! ```

mod backfill;
pub mod catalog;
pub mod graph;
pub mod storage;
pub mod test_helpers;
pub mod updater;

pub use catalog::{
    Column, ForeignKey, Index, KeyColumn, OnDeleteAction, Schema, Table, INDEX_DATA_TABLE_PREFIX,
};
pub use graph::{NodeId, SchemaGraph, SchemaGraphEditor, SchemaNode};
pub use storage::{Row, Storage};
pub use updater::{
    GlobalSchemaNames, SchemaChangeAction, SchemaChangeContext, SchemaChangeResult, SchemaUpdater,
    SchemaValidationContext,
};
