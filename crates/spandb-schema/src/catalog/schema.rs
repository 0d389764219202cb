//! Immutable schema snapshots.

use crate::catalog::{Index, Table};
use crate::graph::{NodeId, SchemaGraph, SchemaNode};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable snapshot of the complete schema at one point in time.
///
/// Produced by canonicalizing a graph editor's working copy; never mutated.
/// Snapshots may be shared freely by reference, and unchanged nodes are
/// shared structurally between consecutive snapshots.
#[derive(Debug)]
pub struct Schema {
    graph: SchemaGraph,
    /// User tables by lowercased name. Index data tables are not listed.
    tables_by_name: HashMap<String, NodeId>,
    indexes_by_name: HashMap<String, NodeId>,
}

impl Schema {
    pub fn new(graph: SchemaGraph) -> Self {
        let mut tables_by_name = HashMap::new();
        let mut indexes_by_name = HashMap::new();
        for node in graph.nodes_in_order() {
            match node {
                SchemaNode::Table(table) if !table.is_index_data_table() => {
                    tables_by_name.insert(table.name().to_ascii_lowercase(), table.node_id());
                }
                SchemaNode::Index(index) => {
                    indexes_by_name.insert(index.name().to_ascii_lowercase(), index.node_id());
                }
                _ => {}
            }
        }
        Self {
            graph,
            tables_by_name,
            indexes_by_name,
        }
    }

    /// The canonical empty schema.
    pub fn empty() -> Arc<Schema> {
        static EMPTY: Lazy<Arc<Schema>> =
            Lazy::new(|| Arc::new(Schema::new(SchemaGraph::default())));
        EMPTY.clone()
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// User tables in creation order.
    pub fn tables(&self) -> Vec<&Table> {
        self.graph
            .nodes_in_order()
            .filter_map(|node| match node {
                SchemaNode::Table(table) if !table.is_index_data_table() => Some(table),
                _ => None,
            })
            .collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables_by_name.len()
    }

    pub fn index_count(&self) -> usize {
        self.indexes_by_name.len()
    }

    /// Case-insensitive table lookup.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        let id = *self.tables_by_name.get(&name.to_ascii_lowercase())?;
        self.graph.table(id).ok()
    }

    /// Case-sensitive table lookup, used for foreign key references.
    pub fn find_table_case_sensitive(&self, name: &str) -> Option<&Table> {
        self.find_table(name).filter(|table| table.name() == name)
    }

    /// Case-insensitive index lookup.
    pub fn find_index(&self, name: &str) -> Option<&Index> {
        let id = *self.indexes_by_name.get(&name.to_ascii_lowercase())?;
        self.graph.index(id).ok()
    }
}
