//! Table nodes.

use crate::catalog::{Column, ForeignKey};
use crate::graph::{NodeId, SchemaGraph, SchemaNode};
use spandb_commons::{limits, Result, SchemaError, TableId};
use std::fmt;

/// Action taken on child rows when a parent row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDeleteAction {
    NoAction,
    Cascade,
}

impl fmt::Display for OnDeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnDeleteAction::NoAction => f.write_str("NO ACTION"),
            OnDeleteAction::Cascade => f.write_str("CASCADE"),
        }
    }
}

/// A table, either user-visible or the hidden data table of an index.
#[derive(Debug, Clone)]
pub struct Table {
    node_id: NodeId,
    id: TableId,
    name: String,
    /// Columns in declaration order.
    columns: Vec<NodeId>,
    /// KeyColumn nodes forming the primary key, in key order.
    primary_key: Vec<NodeId>,
    parent_table: Option<NodeId>,
    child_tables: Vec<NodeId>,
    on_delete: OnDeleteAction,
    indexes: Vec<NodeId>,
    /// Foreign keys declared on this table.
    foreign_keys: Vec<NodeId>,
    /// Foreign keys on other tables that reference this table.
    referencing_foreign_keys: Vec<NodeId>,
    /// Set when this is an index data table.
    owner_index: Option<NodeId>,
}

impl Table {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[NodeId] {
        &self.columns
    }

    pub fn primary_key(&self) -> &[NodeId] {
        &self.primary_key
    }

    pub fn parent_table(&self) -> Option<NodeId> {
        self.parent_table
    }

    pub fn child_tables(&self) -> &[NodeId] {
        &self.child_tables
    }

    pub fn on_delete(&self) -> OnDeleteAction {
        self.on_delete
    }

    pub fn indexes(&self) -> &[NodeId] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[NodeId] {
        &self.foreign_keys
    }

    pub fn referencing_foreign_keys(&self) -> &[NodeId] {
        &self.referencing_foreign_keys
    }

    pub fn owner_index(&self) -> Option<NodeId> {
        self.owner_index
    }

    pub fn is_index_data_table(&self) -> bool {
        self.owner_index.is_some()
    }

    /// Case-insensitive column lookup.
    pub fn find_column<'a>(&self, graph: &'a SchemaGraph, name: &str) -> Option<&'a Column> {
        self.columns
            .iter()
            .filter_map(|&id| graph.column(id).ok())
            .find(|column| column.name().eq_ignore_ascii_case(name))
    }

    /// Case-sensitive column lookup, used for key and foreign key column
    /// references.
    pub fn find_column_case_sensitive<'a>(
        &self,
        graph: &'a SchemaGraph,
        name: &str,
    ) -> Option<&'a Column> {
        self.columns
            .iter()
            .filter_map(|&id| graph.column(id).ok())
            .find(|column| column.name() == name)
    }

    /// Case-insensitive lookup of a foreign key declared on this table.
    pub fn find_foreign_key<'a>(
        &self,
        graph: &'a SchemaGraph,
        name: &str,
    ) -> Option<&'a ForeignKey> {
        self.foreign_keys
            .iter()
            .filter_map(|&id| graph.foreign_key(id).ok())
            .find(|foreign_key| foreign_key.name().eq_ignore_ascii_case(name))
    }

    pub(crate) fn add_column(&mut self, column: NodeId) {
        self.columns.push(column);
    }

    pub(crate) fn add_key_column(&mut self, key_column: NodeId) {
        self.primary_key.push(key_column);
    }

    pub(crate) fn set_parent_table(&mut self, parent: NodeId) {
        self.parent_table = Some(parent);
    }

    pub(crate) fn add_child_table(&mut self, child: NodeId) {
        self.child_tables.push(child);
    }

    pub(crate) fn set_on_delete(&mut self, action: OnDeleteAction) {
        self.on_delete = action;
    }

    pub(crate) fn add_index(&mut self, index: NodeId) {
        self.indexes.push(index);
    }

    pub(crate) fn add_foreign_key(&mut self, foreign_key: NodeId) {
        self.foreign_keys.push(foreign_key);
    }

    pub(crate) fn add_referencing_foreign_key(&mut self, foreign_key: NodeId) {
        self.referencing_foreign_keys.push(foreign_key);
    }

    pub(crate) fn set_owner_index(&mut self, index: NodeId) {
        self.owner_index = Some(index);
    }

    /// Drops entries from the containment lists that fail the `live` check.
    /// Returns whether anything was removed. The primary key list is not a
    /// containment list: its entries only die with the table itself.
    pub(crate) fn retain_live_edges(&mut self, mut live: impl FnMut(NodeId) -> bool) -> bool {
        let before = self.columns.len()
            + self.child_tables.len()
            + self.indexes.len()
            + self.foreign_keys.len()
            + self.referencing_foreign_keys.len();
        self.columns.retain(|&id| live(id));
        self.child_tables.retain(|&id| live(id));
        self.indexes.retain(|&id| live(id));
        self.foreign_keys.retain(|&id| live(id));
        self.referencing_foreign_keys.retain(|&id| live(id));
        let after = self.columns.len()
            + self.child_tables.len()
            + self.indexes.len()
            + self.foreign_keys.len()
            + self.referencing_foreign_keys.len();
        before != after
    }

    pub(crate) fn validate(&self, graph: &SchemaGraph) -> Result<()> {
        if self.name.is_empty() {
            return Err(SchemaError::internal("table with empty name"));
        }
        if self.columns.len() > limits::MAX_COLUMNS_PER_TABLE {
            return Err(SchemaError::validation(format!(
                "table {} has {} columns, limit is {}",
                self.name,
                self.columns.len(),
                limits::MAX_COLUMNS_PER_TABLE
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for &id in &self.columns {
            let column = graph.column(id)?;
            if !seen.insert(column.name().to_ascii_lowercase()) {
                return Err(SchemaError::validation(format!(
                    "duplicate column name {} in table {}",
                    column.name(),
                    self.name
                )));
            }
        }

        if self.primary_key.is_empty() {
            return Err(SchemaError::MissingPrimaryKey(self.name.clone()));
        }
        for &id in &self.primary_key {
            let column = graph.column(graph.key_column(id)?.column())?;
            if column.table() != self.node_id {
                return Err(SchemaError::internal(format!(
                    "key column {} of table {} belongs to a different table",
                    column.name(),
                    self.name
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn validate_update(&self, old: &Table, graph: &SchemaGraph) -> Result<()> {
        self.validate(graph)?;
        if self.id != old.id || self.name != old.name {
            return Err(SchemaError::internal(format!(
                "table {} changed identity during an edit",
                old.name
            )));
        }
        if self.owner_index != old.owner_index {
            return Err(SchemaError::internal(format!(
                "table {} changed its owning index during an edit",
                old.name
            )));
        }
        if old.parent_table.is_some() && self.parent_table != old.parent_table {
            return Err(SchemaError::internal(format!(
                "table {} cannot be re-parented",
                old.name
            )));
        }
        Ok(())
    }
}

/// Builder for a fresh [`Table`] node.
///
/// The node id is allocated up front so the table can be referenced by its
/// columns and constraints before it is inserted into the graph.
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new(id: TableId, name: &str) -> Self {
        Self {
            table: Table {
                node_id: NodeId::allocate(),
                id,
                name: name.to_string(),
                columns: Vec::new(),
                primary_key: Vec::new(),
                parent_table: None,
                child_tables: Vec::new(),
                on_delete: OnDeleteAction::NoAction,
                indexes: Vec::new(),
                foreign_keys: Vec::new(),
                referencing_foreign_keys: Vec::new(),
                owner_index: None,
            },
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.table.node_id
    }

    /// The table under construction.
    pub fn get(&self) -> &Table {
        &self.table
    }

    pub fn add_column(&mut self, column: NodeId) -> &mut Self {
        self.table.add_column(column);
        self
    }

    pub fn add_key_column(&mut self, key_column: NodeId) -> &mut Self {
        self.table.add_key_column(key_column);
        self
    }

    pub fn set_parent_table(&mut self, parent: NodeId) -> &mut Self {
        self.table.set_parent_table(parent);
        self
    }

    pub fn set_on_delete(&mut self, action: OnDeleteAction) -> &mut Self {
        self.table.set_on_delete(action);
        self
    }

    pub fn add_foreign_key(&mut self, foreign_key: NodeId) -> &mut Self {
        self.table.add_foreign_key(foreign_key);
        self
    }

    pub fn add_referencing_foreign_key(&mut self, foreign_key: NodeId) -> &mut Self {
        self.table.add_referencing_foreign_key(foreign_key);
        self
    }

    pub fn set_owner_index(&mut self, index: NodeId) -> &mut Self {
        self.table.set_owner_index(index);
        self
    }

    pub fn build(self) -> SchemaNode {
        SchemaNode::Table(self.table)
    }
}
