//! The schema node sum type and node identity.

use crate::catalog::{Column, ForeignKey, Index, KeyColumn, Table};
use spandb_commons::{Result, SchemaError};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::SchemaGraph;

/// Process-unique identity of a schema node.
///
/// A node keeps its id across copy-on-write edits; edges between nodes are
/// stored as ids and resolved through the graph, so an edge always refers to
/// the current generation of its target. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn allocate() -> NodeId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a schema-visible name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Table,
    Index,
    ForeignKey,
}

impl NameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameKind::Table => "Table",
            NameKind::Index => "Index",
            NameKind::ForeignKey => "Foreign Key",
        }
    }

    /// Tables and indexes share one namespace; constraints have their own.
    pub(crate) fn namespace(&self) -> NameNamespace {
        match self {
            NameKind::Table | NameKind::Index => NameNamespace::Relation,
            NameKind::ForeignKey => NameNamespace::Constraint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NameNamespace {
    Relation,
    Constraint,
}

/// Name information of a node, used to seed and police the global namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNameInfo {
    pub kind: NameKind,
    pub name: String,
    /// Whether the name lives in the database-wide namespace. Hidden index
    /// data tables are not global.
    pub global: bool,
}

/// A node of the schema graph.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Table(Table),
    Column(Column),
    KeyColumn(KeyColumn),
    Index(Index),
    ForeignKey(ForeignKey),
}

impl SchemaNode {
    pub fn node_id(&self) -> NodeId {
        match self {
            SchemaNode::Table(table) => table.node_id(),
            SchemaNode::Column(column) => column.node_id(),
            SchemaNode::KeyColumn(key_column) => key_column.node_id(),
            SchemaNode::Index(index) => index.node_id(),
            SchemaNode::ForeignKey(foreign_key) => foreign_key.node_id(),
        }
    }

    pub fn schema_name_info(&self) -> Option<SchemaNameInfo> {
        match self {
            SchemaNode::Table(table) => Some(SchemaNameInfo {
                kind: NameKind::Table,
                name: table.name().to_string(),
                global: !table.is_index_data_table(),
            }),
            SchemaNode::Index(index) => Some(SchemaNameInfo {
                kind: NameKind::Index,
                name: index.name().to_string(),
                global: true,
            }),
            SchemaNode::ForeignKey(foreign_key) => Some(SchemaNameInfo {
                kind: NameKind::ForeignKey,
                name: foreign_key.name().to_string(),
                global: true,
            }),
            SchemaNode::Column(_) | SchemaNode::KeyColumn(_) => None,
        }
    }

    /// Short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            SchemaNode::Table(table) if table.is_index_data_table() => {
                format!("index data table {}", table.name())
            }
            SchemaNode::Table(table) => format!("table {}", table.name()),
            SchemaNode::Column(column) => format!("column {}", column.name()),
            SchemaNode::KeyColumn(_) => "key column".to_string(),
            SchemaNode::Index(index) => format!("index {}", index.name()),
            SchemaNode::ForeignKey(foreign_key) => format!("foreign key {}", foreign_key.name()),
        }
    }

    /// Every outgoing edge of this node.
    pub(crate) fn outgoing_edges(&self) -> Vec<NodeId> {
        let mut edges = Vec::new();
        match self {
            SchemaNode::Table(table) => {
                edges.extend_from_slice(table.columns());
                edges.extend_from_slice(table.primary_key());
                edges.extend(table.parent_table());
                edges.extend_from_slice(table.child_tables());
                edges.extend_from_slice(table.indexes());
                edges.extend_from_slice(table.foreign_keys());
                edges.extend_from_slice(table.referencing_foreign_keys());
                edges.extend(table.owner_index());
            }
            SchemaNode::Column(column) => {
                edges.push(column.table());
                edges.extend(column.source_column());
            }
            SchemaNode::KeyColumn(key_column) => edges.push(key_column.column()),
            SchemaNode::Index(index) => {
                edges.push(index.indexed_table());
                edges.push(index.index_data_table());
                edges.extend_from_slice(index.key_columns());
                edges.extend_from_slice(index.stored_columns());
            }
            SchemaNode::ForeignKey(foreign_key) => {
                edges.push(foreign_key.referencing_table());
                edges.push(foreign_key.referenced_table());
                edges.extend_from_slice(foreign_key.referencing_columns());
                edges.extend_from_slice(foreign_key.referenced_columns());
            }
        }
        edges
    }

    /// Ids of the nodes this one owns, deleted together with it.
    pub(crate) fn owned_nodes(&self) -> Vec<NodeId> {
        match self {
            SchemaNode::Table(table) => {
                let mut owned = Vec::new();
                owned.extend_from_slice(table.columns());
                owned.extend_from_slice(table.primary_key());
                owned.extend_from_slice(table.foreign_keys());
                owned
            }
            SchemaNode::Index(index) => vec![index.index_data_table()],
            _ => Vec::new(),
        }
    }

    pub(crate) fn validate(&self, graph: &SchemaGraph) -> Result<()> {
        match self {
            SchemaNode::Table(table) => table.validate(graph),
            SchemaNode::Column(column) => column.validate(graph),
            SchemaNode::KeyColumn(key_column) => key_column.validate(graph),
            SchemaNode::Index(index) => index.validate(graph),
            SchemaNode::ForeignKey(foreign_key) => foreign_key.validate(graph),
        }
    }

    pub(crate) fn validate_update(&self, old: &SchemaNode, graph: &SchemaGraph) -> Result<()> {
        match (self, old) {
            (SchemaNode::Table(new), SchemaNode::Table(old)) => new.validate_update(old, graph),
            (SchemaNode::Column(new), SchemaNode::Column(old)) => new.validate_update(old, graph),
            (SchemaNode::KeyColumn(new), SchemaNode::KeyColumn(_)) => new.validate(graph),
            (SchemaNode::Index(new), SchemaNode::Index(old)) => new.validate_update(old, graph),
            (SchemaNode::ForeignKey(new), SchemaNode::ForeignKey(old)) => {
                new.validate_update(old, graph)
            }
            (new, old) => Err(SchemaError::internal(format!(
                "{} edited into a different node kind ({})",
                old.describe(),
                new.describe()
            ))),
        }
    }
}

/// A node kind that can be edited through the graph editor.
pub trait GraphNode: Clone {
    fn kind_name() -> &'static str;
    fn graph_node_id(&self) -> NodeId;
    fn as_node(node: &SchemaNode) -> Option<&Self>;
    fn into_node(self) -> SchemaNode;
}

macro_rules! impl_graph_node {
    ($type:ty, $variant:ident, $kind:literal) => {
        impl GraphNode for $type {
            fn kind_name() -> &'static str {
                $kind
            }

            fn graph_node_id(&self) -> NodeId {
                self.node_id()
            }

            fn as_node(node: &SchemaNode) -> Option<&Self> {
                match node {
                    SchemaNode::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_node(self) -> SchemaNode {
                SchemaNode::$variant(self)
            }
        }
    };
}

impl_graph_node!(Table, Table, "table");
impl_graph_node!(Column, Column, "column");
impl_graph_node!(KeyColumn, KeyColumn, "key column");
impl_graph_node!(Index, Index, "index");
impl_graph_node!(ForeignKey, ForeignKey, "foreign key");

/// Drops references to deleted nodes from this node's containment lists.
/// Scalar edges are left alone; a surviving scalar edge to a deleted node is
/// a referential error reported by canonicalization.
pub(crate) fn prune_deleted(node: &mut SchemaNode, deleted: &HashSet<NodeId>) -> bool {
    match node {
        SchemaNode::Table(table) => table_prune(table, deleted),
        _ => false,
    }
}

fn table_prune(table: &mut Table, deleted: &HashSet<NodeId>) -> bool {
    table.retain_live_edges(|id| !deleted.contains(&id))
}
