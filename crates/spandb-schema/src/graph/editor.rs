//! Copy-on-write editing of a schema graph.
//!
//! The editor owns a working copy of a base graph. Statement application
//! composes add/edit/delete operations against the working copy and may
//! leave it temporarily inconsistent; [`SchemaGraphEditor::canonicalize`]
//! is the single point where per-node validation and the graph-wide
//! invariants run, yielding the immutable graph of the next snapshot.

use crate::graph::node::prune_deleted;
use crate::graph::{GraphNode, NodeId, SchemaGraph, SchemaNode};
use log::debug;
use spandb_commons::{Result, SchemaError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct SchemaGraphEditor {
    working: SchemaGraph,
    /// Nodes added by this statement, validated with `validate`.
    added: HashSet<NodeId>,
    /// Prior versions of edited nodes, validated with `validate_update`.
    edited: HashMap<NodeId, Arc<SchemaNode>>,
    /// Removed nodes, kept for error messages.
    deleted: HashMap<NodeId, Arc<SchemaNode>>,
    modified: bool,
}

impl SchemaGraphEditor {
    pub fn new(base: &SchemaGraph) -> Self {
        Self {
            working: base.clone(),
            added: HashSet::new(),
            edited: HashMap::new(),
            deleted: HashMap::new(),
            modified: false,
        }
    }

    pub fn has_modifications(&self) -> bool {
        self.modified
    }

    /// The working copy, for name and type lookups during statement
    /// application.
    pub fn working(&self) -> &SchemaGraph {
        &self.working
    }

    /// Inserts a newly built node.
    pub fn add_node(&mut self, node: SchemaNode) -> Result<()> {
        self.modified = true;
        self.added.insert(node.node_id());
        self.working.insert_new(Arc::new(node))
    }

    /// Removes a node and everything it owns (a table owns its columns, key
    /// columns and declared foreign keys; an index owns its data table).
    /// References from surviving nodes are checked at canonicalization.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.working.remove(id).ok_or_else(|| {
            SchemaError::internal(format!("cannot delete unknown node {}", id))
        })?;
        self.modified = true;
        self.added.remove(&id);
        self.edited.remove(&id);
        let owned = node.owned_nodes();
        self.deleted.insert(id, node);
        for child in owned {
            if self.working.contains(child) {
                self.delete_node(child)?;
            }
        }
        Ok(())
    }

    /// Clones `id`, hands the clone to `edit` together with the editor (so
    /// the callback can create or edit other nodes), and replaces the
    /// original with the edited clone. The first edit of a node records its
    /// prior version for `validate_update`.
    pub fn edit_node<T: GraphNode>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut SchemaGraphEditor, &mut T) -> Result<()>,
    ) -> Result<()> {
        let original = self.working.take(id).ok_or_else(|| {
            SchemaError::internal(format!(
                "cannot edit node {}: unknown or already being edited",
                id
            ))
        })?;
        let mut draft = match T::as_node(&original) {
            Some(node) => node.clone(),
            None => {
                let found = original.describe();
                self.working.put_back(original);
                return Err(SchemaError::internal(format!(
                    "edit of node {} expected a {}, found {}",
                    id,
                    T::kind_name(),
                    found
                )));
            }
        };
        if !self.added.contains(&id) {
            self.edited.entry(id).or_insert_with(|| original.clone());
        }
        self.modified = true;
        edit(self, &mut draft)?;
        self.working.put_back(Arc::new(draft.into_node()));
        Ok(())
    }

    /// Validates the working copy and turns it into the graph of the next
    /// snapshot. Containment lists are pruned of deleted entries first; any
    /// surviving edge to a deleted node is a referential error.
    pub fn canonicalize(mut self) -> Result<SchemaGraph> {
        debug!(
            "canonicalizing schema graph: {} nodes ({} added, {} edited, {} deleted)",
            self.working.len(),
            self.added.len(),
            self.edited.len(),
            self.deleted.len()
        );

        if !self.deleted.is_empty() {
            self.prune_containment_lists()?;
        }
        self.check_references()?;

        // Per-node validation runs in insertion order, so owners are seen
        // before the nodes that point back at them.
        for id in self.working.order().to_vec() {
            let Some(node) = self.working.node(id) else {
                continue;
            };
            if self.added.contains(&id) {
                node.validate(&self.working)?;
            } else if let Some(old) = self.edited.get(&id) {
                node.validate_update(old, &self.working)?;
            }
        }

        self.check_edge_symmetry()?;
        self.check_global_names()?;
        self.check_interleave_forest()?;

        let mut graph = self.working;
        graph.rebuild_order();
        Ok(graph)
    }

    fn prune_containment_lists(&mut self) -> Result<()> {
        let deleted: HashSet<NodeId> = self.deleted.keys().copied().collect();
        for id in self.working.order().to_vec() {
            let Some(original) = self.working.take(id) else {
                continue;
            };
            let mut node = (*original).clone();
            if prune_deleted(&mut node, &deleted) {
                self.working.put_back(Arc::new(node));
            } else {
                self.working.put_back(original);
            }
        }
        Ok(())
    }

    fn check_references(&self) -> Result<()> {
        for node in self.working.nodes_in_order() {
            for target in node.outgoing_edges() {
                if self.working.contains(target) {
                    continue;
                }
                return Err(match self.deleted.get(&target) {
                    Some(dropped) => SchemaError::CannotDrop {
                        dropped: dropped.describe(),
                        dependent: node.describe(),
                    },
                    None => SchemaError::internal(format!(
                        "{} has a dangling reference to node {}",
                        node.describe(),
                        target
                    )),
                });
            }
        }
        Ok(())
    }

    fn check_edge_symmetry(&self) -> Result<()> {
        let graph = &self.working;
        for node in graph.nodes_in_order() {
            match node {
                SchemaNode::Table(table) => {
                    for &id in table.columns() {
                        if graph.column(id)?.table() != table.node_id() {
                            return Err(symmetry_error(node, "column list"));
                        }
                    }
                    if let Some(parent) = table.parent_table() {
                        if !graph.table(parent)?.child_tables().contains(&table.node_id()) {
                            return Err(symmetry_error(node, "interleave parent"));
                        }
                    }
                    for &id in table.child_tables() {
                        if graph.table(id)?.parent_table() != Some(table.node_id()) {
                            return Err(symmetry_error(node, "child table list"));
                        }
                    }
                    for &id in table.indexes() {
                        if graph.index(id)?.indexed_table() != table.node_id() {
                            return Err(symmetry_error(node, "index list"));
                        }
                    }
                    for &id in table.foreign_keys() {
                        if graph.foreign_key(id)?.referencing_table() != table.node_id() {
                            return Err(symmetry_error(node, "foreign key list"));
                        }
                    }
                    for &id in table.referencing_foreign_keys() {
                        if graph.foreign_key(id)?.referenced_table() != table.node_id() {
                            return Err(symmetry_error(node, "referencing foreign key list"));
                        }
                    }
                    if let Some(owner) = table.owner_index() {
                        if graph.index(owner)?.index_data_table() != table.node_id() {
                            return Err(symmetry_error(node, "owning index"));
                        }
                    }
                }
                SchemaNode::Column(column) => {
                    if !graph.table(column.table())?.columns().contains(&column.node_id()) {
                        return Err(symmetry_error(node, "owning table"));
                    }
                }
                SchemaNode::Index(index) => {
                    if !graph
                        .table(index.indexed_table())?
                        .indexes()
                        .contains(&index.node_id())
                    {
                        return Err(symmetry_error(node, "indexed table"));
                    }
                    if graph.table(index.index_data_table())?.owner_index() != Some(index.node_id())
                    {
                        return Err(symmetry_error(node, "index data table"));
                    }
                }
                SchemaNode::ForeignKey(foreign_key) => {
                    if !graph
                        .table(foreign_key.referencing_table())?
                        .foreign_keys()
                        .contains(&foreign_key.node_id())
                    {
                        return Err(symmetry_error(node, "referencing table"));
                    }
                    if !graph
                        .table(foreign_key.referenced_table())?
                        .referencing_foreign_keys()
                        .contains(&foreign_key.node_id())
                    {
                        return Err(symmetry_error(node, "referenced table"));
                    }
                }
                SchemaNode::KeyColumn(_) => {}
            }
        }
        Ok(())
    }

    fn check_global_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for node in self.working.nodes_in_order() {
            let Some(info) = node.schema_name_info() else {
                continue;
            };
            if !info.global {
                continue;
            }
            if !seen.insert((info.kind.namespace(), info.name.to_ascii_lowercase())) {
                return Err(SchemaError::internal(format!(
                    "canonicalized graph contains duplicate global name {}",
                    info.name
                )));
            }
        }
        Ok(())
    }

    fn check_interleave_forest(&self) -> Result<()> {
        let graph = &self.working;
        for node in graph.nodes_in_order() {
            let SchemaNode::Table(table) = node else {
                continue;
            };
            let mut visited = HashSet::new();
            visited.insert(table.node_id());
            let mut current = table.parent_table();
            while let Some(parent) = current {
                if !visited.insert(parent) {
                    return Err(SchemaError::internal(format!(
                        "interleave cycle through table {}",
                        table.name()
                    )));
                }
                current = graph.table(parent)?.parent_table();
            }
        }
        Ok(())
    }
}

fn symmetry_error(node: &SchemaNode, edge: &str) -> SchemaError {
    SchemaError::internal(format!(
        "asymmetric {} edge on {}",
        edge,
        node.describe()
    ))
}
