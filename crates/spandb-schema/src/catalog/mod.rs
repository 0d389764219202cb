//! Catalog node types.
//!
//! The immutable schema objects a snapshot is made of: [`Table`], [`Column`],
//! [`KeyColumn`], [`Index`] and [`ForeignKey`], plus the builders that
//! construct fresh nodes. Cross-references between nodes are
//! [`crate::graph::NodeId`]s resolved through the owning graph.

mod column;
mod foreign_key;
mod index;
mod schema;
mod table;

pub use column::{Column, ColumnBuilder, ColumnDefinitionModifier, KeyColumn, KeyColumnBuilder};
pub use foreign_key::{ForeignKey, ForeignKeyBuilder};
pub use index::{Index, IndexBuilder};
pub use schema::Schema;
pub use table::{OnDeleteAction, Table, TableBuilder};

/// Name prefix of the hidden tables that store index entries.
pub const INDEX_DATA_TABLE_PREFIX: &str = "_IDX_";
