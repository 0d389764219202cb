//! The schema update engine: name registry, validation context and the DDL
//! batch driver.

mod context;
mod global_names;
mod schema_updater;

pub use context::{SchemaChangeAction, SchemaValidationContext};
pub use global_names::GlobalSchemaNames;
pub use schema_updater::{SchemaChangeContext, SchemaChangeResult, SchemaUpdater};
