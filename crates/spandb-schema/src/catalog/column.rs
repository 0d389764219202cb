//! Column and key column nodes.

use crate::graph::{NodeId, SchemaGraph, SchemaNode};
use spandb_commons::{limits, ColumnId, Result, ScalarType, SchemaError};

/// Setter surface shared by the column builder and the column editor, so the
/// same definition-application logic serves CREATE TABLE and ALTER COLUMN.
pub trait ColumnDefinitionModifier {
    fn set_column_type(&mut self, column_type: ScalarType);
    fn set_nullable(&mut self, nullable: bool);
    fn set_declared_max_length(&mut self, length: Option<i64>);
    fn set_allows_commit_timestamp(&mut self, allows: Option<bool>);
}

/// A column of a table.
#[derive(Debug, Clone)]
pub struct Column {
    node_id: NodeId,
    id: ColumnId,
    name: String,
    column_type: ScalarType,
    nullable: bool,
    declared_max_length: Option<i64>,
    allows_commit_timestamp: Option<bool>,
    table: NodeId,
    /// For index data table columns, the column of the indexed table this
    /// one is projected from.
    source_column: Option<NodeId>,
}

impl Column {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ScalarType {
        &self.column_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn declared_max_length(&self) -> Option<i64> {
        self.declared_max_length
    }

    pub fn allows_commit_timestamp(&self) -> Option<bool> {
        self.allows_commit_timestamp
    }

    pub fn table(&self) -> NodeId {
        self.table
    }

    pub fn source_column(&self) -> Option<NodeId> {
        self.source_column
    }

    pub(crate) fn set_source_column(&mut self, source: NodeId) {
        self.source_column = Some(source);
    }

    fn sized_base(&self) -> Option<&ScalarType> {
        match &self.column_type {
            ScalarType::Array(element) if element.is_sized() => Some(element),
            scalar if scalar.is_sized() => Some(scalar),
            _ => None,
        }
    }

    pub(crate) fn validate(&self, _graph: &SchemaGraph) -> Result<()> {
        if self.name.is_empty() {
            return Err(SchemaError::internal("column with empty name"));
        }
        if let Some(length) = self.declared_max_length {
            let max = match self.sized_base() {
                Some(ScalarType::String) => limits::MAX_STRING_COLUMN_LENGTH,
                Some(ScalarType::Bytes) => limits::MAX_BYTES_COLUMN_LENGTH,
                _ => {
                    return Err(SchemaError::validation(format!(
                        "column {} of type {} cannot declare a length",
                        self.name, self.column_type
                    )))
                }
            };
            if length < 1 || length > max {
                return Err(SchemaError::InvalidColumnLength {
                    column: self.name.clone(),
                    length,
                    max,
                });
            }
        }
        if self.allows_commit_timestamp.is_some() && self.column_type != ScalarType::Timestamp {
            return Err(SchemaError::InvalidCommitTimestampOption {
                column: self.name.clone(),
                column_type: self.column_type.sql_name(),
            });
        }
        Ok(())
    }

    pub(crate) fn validate_update(&self, old: &Column, graph: &SchemaGraph) -> Result<()> {
        self.validate(graph)?;
        if self.id != old.id
            || self.name != old.name
            || self.table != old.table
            || self.source_column != old.source_column
        {
            return Err(SchemaError::internal(format!(
                "column {} changed identity during an edit",
                old.name
            )));
        }
        if !old.column_type.base_compatible(&self.column_type) {
            return Err(SchemaError::CannotChangeColumnType {
                column: self.name.clone(),
                from: old.column_type.sql_name(),
                to: self.column_type.sql_name(),
            });
        }
        Ok(())
    }
}

impl ColumnDefinitionModifier for Column {
    fn set_column_type(&mut self, column_type: ScalarType) {
        self.column_type = column_type;
    }

    fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    fn set_declared_max_length(&mut self, length: Option<i64>) {
        self.declared_max_length = length;
    }

    fn set_allows_commit_timestamp(&mut self, allows: Option<bool>) {
        self.allows_commit_timestamp = allows;
    }
}

/// Builder for a fresh [`Column`] node.
pub struct ColumnBuilder {
    column: Column,
}

impl ColumnBuilder {
    pub fn new(id: ColumnId, name: &str, table: NodeId, column_type: ScalarType) -> Self {
        Self {
            column: Column {
                node_id: NodeId::allocate(),
                id,
                name: name.to_string(),
                column_type,
                nullable: true,
                declared_max_length: None,
                allows_commit_timestamp: None,
                table,
                source_column: None,
            },
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.column.node_id
    }

    pub fn get(&self) -> &Column {
        &self.column
    }

    pub fn set_column_type(&mut self, column_type: ScalarType) -> &mut Self {
        self.column.column_type = column_type;
        self
    }

    pub fn set_nullable(&mut self, nullable: bool) -> &mut Self {
        self.column.nullable = nullable;
        self
    }

    pub fn set_declared_max_length(&mut self, length: Option<i64>) -> &mut Self {
        self.column.declared_max_length = length;
        self
    }

    pub fn set_allows_commit_timestamp(&mut self, allows: Option<bool>) -> &mut Self {
        self.column.allows_commit_timestamp = allows;
        self
    }

    pub fn set_source_column(&mut self, source: NodeId) -> &mut Self {
        self.column.set_source_column(source);
        self
    }

    pub fn build(self) -> SchemaNode {
        SchemaNode::Column(self.column)
    }
}

impl ColumnDefinitionModifier for ColumnBuilder {
    fn set_column_type(&mut self, column_type: ScalarType) {
        self.column.column_type = column_type;
    }

    fn set_nullable(&mut self, nullable: bool) {
        self.column.nullable = nullable;
    }

    fn set_declared_max_length(&mut self, length: Option<i64>) {
        self.column.declared_max_length = length;
    }

    fn set_allows_commit_timestamp(&mut self, allows: Option<bool>) {
        self.column.allows_commit_timestamp = allows;
    }
}

/// One part of a table's primary key.
#[derive(Debug, Clone)]
pub struct KeyColumn {
    node_id: NodeId,
    column: NodeId,
    descending: bool,
}

impl KeyColumn {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn column(&self) -> NodeId {
        self.column
    }

    pub fn descending(&self) -> bool {
        self.descending
    }

    pub(crate) fn validate(&self, graph: &SchemaGraph) -> Result<()> {
        graph.column(self.column)?;
        Ok(())
    }
}

/// Builder for a fresh [`KeyColumn`] node.
pub struct KeyColumnBuilder {
    key_column: KeyColumn,
}

impl KeyColumnBuilder {
    pub fn new(column: NodeId) -> Self {
        Self {
            key_column: KeyColumn {
                node_id: NodeId::allocate(),
                column,
                descending: false,
            },
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.key_column.node_id
    }

    pub fn set_descending(&mut self, descending: bool) -> &mut Self {
        self.key_column.descending = descending;
        self
    }

    pub fn build(self) -> SchemaNode {
        SchemaNode::KeyColumn(self.key_column)
    }
}
