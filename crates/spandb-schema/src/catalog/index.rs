//! Index nodes.

use crate::graph::{NodeId, SchemaGraph, SchemaNode};
use spandb_commons::{Result, SchemaError};

/// A secondary index. Entries are physically stored in a hidden data table
/// whose primary key is the declared index keys followed by the indexed
/// table's remaining key columns.
#[derive(Debug, Clone)]
pub struct Index {
    node_id: NodeId,
    name: String,
    indexed_table: NodeId,
    index_data_table: NodeId,
    unique: bool,
    null_filtered: bool,
    /// The first N key columns of the data table's primary key, where N is
    /// the number of declared index keys.
    key_columns: Vec<NodeId>,
    /// Data table columns carried via STORING.
    stored_columns: Vec<NodeId>,
}

impl Index {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn indexed_table(&self) -> NodeId {
        self.indexed_table
    }

    pub fn index_data_table(&self) -> NodeId {
        self.index_data_table
    }

    pub fn unique(&self) -> bool {
        self.unique
    }

    pub fn null_filtered(&self) -> bool {
        self.null_filtered
    }

    pub fn key_columns(&self) -> &[NodeId] {
        &self.key_columns
    }

    pub fn stored_columns(&self) -> &[NodeId] {
        &self.stored_columns
    }

    pub(crate) fn validate(&self, graph: &SchemaGraph) -> Result<()> {
        if self.name.is_empty() {
            return Err(SchemaError::internal("index with empty name"));
        }
        if self.key_columns.is_empty() {
            return Err(SchemaError::validation(format!(
                "index {} must have at least one key column",
                self.name
            )));
        }

        // Stored columns may not repeat index key columns.
        let mut key_names = Vec::with_capacity(self.key_columns.len());
        for &id in &self.key_columns {
            let column = graph.column(graph.key_column(id)?.column())?;
            key_names.push(column.name().to_ascii_lowercase());
        }
        for &id in &self.stored_columns {
            let column = graph.column(id)?;
            if key_names.contains(&column.name().to_ascii_lowercase()) {
                return Err(SchemaError::validation(format!(
                    "stored column {} is already a key of index {}",
                    column.name(),
                    self.name
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn validate_update(&self, old: &Index, graph: &SchemaGraph) -> Result<()> {
        self.validate(graph)?;
        if self.name != old.name
            || self.indexed_table != old.indexed_table
            || self.index_data_table != old.index_data_table
        {
            return Err(SchemaError::internal(format!(
                "index {} changed identity during an edit",
                old.name
            )));
        }
        Ok(())
    }
}

/// Builder for a fresh [`Index`] node.
///
/// The table references are wired during construction; [`build`] fails if
/// either is missing.
///
/// [`build`]: IndexBuilder::build
pub struct IndexBuilder {
    node_id: NodeId,
    name: String,
    unique: bool,
    null_filtered: bool,
    indexed_table: Option<NodeId>,
    index_data_table: Option<NodeId>,
    key_columns: Vec<NodeId>,
    stored_columns: Vec<NodeId>,
}

impl IndexBuilder {
    pub fn new(name: &str, unique: bool, null_filtered: bool) -> Self {
        Self {
            node_id: NodeId::allocate(),
            name: name.to_string(),
            unique,
            null_filtered,
            indexed_table: None,
            index_data_table: None,
            key_columns: Vec::new(),
            stored_columns: Vec::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn null_filtered(&self) -> bool {
        self.null_filtered
    }

    pub fn set_indexed_table(&mut self, table: NodeId) -> &mut Self {
        self.indexed_table = Some(table);
        self
    }

    pub fn set_index_data_table(&mut self, table: NodeId) -> &mut Self {
        self.index_data_table = Some(table);
        self
    }

    pub fn add_key_column(&mut self, key_column: NodeId) -> &mut Self {
        self.key_columns.push(key_column);
        self
    }

    pub fn add_stored_column(&mut self, column: NodeId) -> &mut Self {
        self.stored_columns.push(column);
        self
    }

    pub fn build(self) -> Result<SchemaNode> {
        let indexed_table = self.indexed_table.ok_or_else(|| {
            SchemaError::internal(format!("index {} built without an indexed table", self.name))
        })?;
        let index_data_table = self.index_data_table.ok_or_else(|| {
            SchemaError::internal(format!("index {} built without a data table", self.name))
        })?;
        Ok(SchemaNode::Index(Index {
            node_id: self.node_id,
            name: self.name,
            indexed_table,
            index_data_table,
            unique: self.unique,
            null_filtered: self.null_filtered,
            key_columns: self.key_columns,
            stored_columns: self.stored_columns,
        }))
    }
}
