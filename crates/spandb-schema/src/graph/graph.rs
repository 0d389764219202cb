//! The id-keyed node map backing a schema snapshot.

use crate::catalog::{Column, ForeignKey, Index, KeyColumn, Table};
use crate::graph::{NodeId, SchemaNode};
use spandb_commons::{Result, SchemaError};
use std::collections::HashMap;
use std::sync::Arc;

/// The set of schema nodes and their insertion order.
///
/// Nodes are shared by `Arc`, so cloning a graph for a copy-on-write edit
/// shares every unchanged node with the base snapshot. The order vector is
/// stable across snapshots and determines validation order.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: HashMap<NodeId, Arc<SchemaNode>>,
    order: Vec<NodeId>,
}

impl SchemaGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes in insertion order, skipping ids whose node has been removed.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &SchemaNode> + '_ {
        self.order.iter().filter_map(|&id| self.node(id))
    }

    pub fn table(&self, id: NodeId) -> Result<&Table> {
        match self.node(id) {
            Some(SchemaNode::Table(table)) => Ok(table),
            Some(other) => Err(SchemaError::internal(format!(
                "expected node {} to be a table, found {}",
                id,
                other.describe()
            ))),
            None => Err(SchemaError::internal(format!(
                "table node {} not found in graph",
                id
            ))),
        }
    }

    pub fn column(&self, id: NodeId) -> Result<&Column> {
        match self.node(id) {
            Some(SchemaNode::Column(column)) => Ok(column),
            Some(other) => Err(SchemaError::internal(format!(
                "expected node {} to be a column, found {}",
                id,
                other.describe()
            ))),
            None => Err(SchemaError::internal(format!(
                "column node {} not found in graph",
                id
            ))),
        }
    }

    pub fn key_column(&self, id: NodeId) -> Result<&KeyColumn> {
        match self.node(id) {
            Some(SchemaNode::KeyColumn(key_column)) => Ok(key_column),
            Some(other) => Err(SchemaError::internal(format!(
                "expected node {} to be a key column, found {}",
                id,
                other.describe()
            ))),
            None => Err(SchemaError::internal(format!(
                "key column node {} not found in graph",
                id
            ))),
        }
    }

    pub fn index(&self, id: NodeId) -> Result<&Index> {
        match self.node(id) {
            Some(SchemaNode::Index(index)) => Ok(index),
            Some(other) => Err(SchemaError::internal(format!(
                "expected node {} to be an index, found {}",
                id,
                other.describe()
            ))),
            None => Err(SchemaError::internal(format!(
                "index node {} not found in graph",
                id
            ))),
        }
    }

    pub fn foreign_key(&self, id: NodeId) -> Result<&ForeignKey> {
        match self.node(id) {
            Some(SchemaNode::ForeignKey(foreign_key)) => Ok(foreign_key),
            Some(other) => Err(SchemaError::internal(format!(
                "expected node {} to be a foreign key, found {}",
                id,
                other.describe()
            ))),
            None => Err(SchemaError::internal(format!(
                "foreign key node {} not found in graph",
                id
            ))),
        }
    }

    /// Inserts a brand-new node at the end of the order.
    pub(crate) fn insert_new(&mut self, node: Arc<SchemaNode>) -> Result<()> {
        let id = node.node_id();
        if self.nodes.contains_key(&id) {
            return Err(SchemaError::internal(format!(
                "node {} inserted twice into schema graph",
                id
            )));
        }
        self.nodes.insert(id, node);
        self.order.push(id);
        Ok(())
    }

    /// Takes a node out of the map for editing; its order slot is kept.
    pub(crate) fn take(&mut self, id: NodeId) -> Option<Arc<SchemaNode>> {
        self.nodes.remove(&id)
    }

    /// Puts an edited node back at its original order slot.
    pub(crate) fn put_back(&mut self, node: Arc<SchemaNode>) {
        self.nodes.insert(node.node_id(), node);
    }

    /// Removes a node permanently; the order is compacted at canonicalize.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Arc<SchemaNode>> {
        self.nodes.remove(&id)
    }

    /// Drops order entries whose node has been removed.
    pub(crate) fn rebuild_order(&mut self) {
        let nodes = &self.nodes;
        self.order.retain(|id| nodes.contains_key(id));
    }
}
