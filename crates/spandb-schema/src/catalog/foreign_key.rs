//! Foreign key nodes.
//!
//! Foreign keys are structurally wired into the graph but not enforced
//! against row data.

use crate::graph::{NodeId, SchemaGraph, SchemaNode};
use spandb_commons::{Result, SchemaError};

/// A foreign key constraint declared on a referencing table.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    node_id: NodeId,
    /// Name written in the DDL, if any.
    constraint_name: Option<String>,
    /// Synthetic name assigned when no constraint name was written.
    generated_name: Option<String>,
    referencing_table: NodeId,
    referenced_table: NodeId,
    referencing_columns: Vec<NodeId>,
    referenced_columns: Vec<NodeId>,
}

impl ForeignKey {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The schema-visible name: the declared constraint name, or the
    /// generated one.
    pub fn name(&self) -> &str {
        self.constraint_name
            .as_deref()
            .or(self.generated_name.as_deref())
            .unwrap_or("")
    }

    pub fn constraint_name(&self) -> Option<&str> {
        self.constraint_name.as_deref()
    }

    pub fn generated_name(&self) -> Option<&str> {
        self.generated_name.as_deref()
    }

    pub fn referencing_table(&self) -> NodeId {
        self.referencing_table
    }

    pub fn referenced_table(&self) -> NodeId {
        self.referenced_table
    }

    pub fn referencing_columns(&self) -> &[NodeId] {
        &self.referencing_columns
    }

    pub fn referenced_columns(&self) -> &[NodeId] {
        &self.referenced_columns
    }

    pub(crate) fn validate(&self, graph: &SchemaGraph) -> Result<()> {
        if self.name().is_empty() {
            return Err(SchemaError::internal("foreign key without a name"));
        }
        if self.referencing_columns.len() != self.referenced_columns.len() {
            return Err(SchemaError::ForeignKeyColumnCount {
                foreign_key: self.name().to_string(),
                referencing: self.referencing_columns.len(),
                referenced: self.referenced_columns.len(),
            });
        }
        for (&referencing, &referenced) in self
            .referencing_columns
            .iter()
            .zip(self.referenced_columns.iter())
        {
            let referencing = graph.column(referencing)?;
            let referenced = graph.column(referenced)?;
            if referencing.column_type() != referenced.column_type() {
                return Err(SchemaError::ForeignKeyColumnTypeMismatch {
                    foreign_key: self.name().to_string(),
                    referencing_column: referencing.name().to_string(),
                    referenced_column: referenced.name().to_string(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn validate_update(&self, old: &ForeignKey, graph: &SchemaGraph) -> Result<()> {
        self.validate(graph)?;
        if self.name() != old.name() {
            return Err(SchemaError::internal(format!(
                "foreign key {} changed identity during an edit",
                old.name()
            )));
        }
        Ok(())
    }
}

/// Builder for a fresh [`ForeignKey`] node.
pub struct ForeignKeyBuilder {
    node_id: NodeId,
    constraint_name: Option<String>,
    generated_name: Option<String>,
    referencing_table: Option<NodeId>,
    referenced_table: Option<NodeId>,
    referencing_columns: Vec<NodeId>,
    referenced_columns: Vec<NodeId>,
}

impl ForeignKeyBuilder {
    pub fn new() -> Self {
        Self {
            node_id: NodeId::allocate(),
            constraint_name: None,
            generated_name: None,
            referencing_table: None,
            referenced_table: None,
            referencing_columns: Vec::new(),
            referenced_columns: Vec::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn set_constraint_name(&mut self, name: &str) -> &mut Self {
        self.constraint_name = Some(name.to_string());
        self
    }

    pub fn set_generated_name(&mut self, name: &str) -> &mut Self {
        self.generated_name = Some(name.to_string());
        self
    }

    pub fn set_referencing_table(&mut self, table: NodeId) -> &mut Self {
        self.referencing_table = Some(table);
        self
    }

    pub fn set_referenced_table(&mut self, table: NodeId) -> &mut Self {
        self.referenced_table = Some(table);
        self
    }

    pub fn add_referencing_column(&mut self, column: NodeId) -> &mut Self {
        self.referencing_columns.push(column);
        self
    }

    pub fn add_referenced_column(&mut self, column: NodeId) -> &mut Self {
        self.referenced_columns.push(column);
        self
    }

    pub fn build(self) -> Result<SchemaNode> {
        let name = self
            .constraint_name
            .as_deref()
            .or(self.generated_name.as_deref())
            .unwrap_or("")
            .to_string();
        if name.is_empty() {
            return Err(SchemaError::internal("foreign key built without a name"));
        }
        let referencing_table = self.referencing_table.ok_or_else(|| {
            SchemaError::internal(format!("foreign key {} has no referencing table", name))
        })?;
        let referenced_table = self.referenced_table.ok_or_else(|| {
            SchemaError::internal(format!("foreign key {} has no referenced table", name))
        })?;
        Ok(SchemaNode::ForeignKey(ForeignKey {
            node_id: self.node_id,
            constraint_name: self.constraint_name,
            generated_name: self.generated_name,
            referencing_table,
            referenced_table,
            referencing_columns: self.referencing_columns,
            referenced_columns: self.referenced_columns,
        }))
    }
}

impl Default for ForeignKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
