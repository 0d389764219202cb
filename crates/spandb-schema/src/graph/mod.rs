//! Schema graph: the node sum type, the id-keyed node map, and the
//! copy-on-write editor that produces new snapshots.

mod editor;
#[allow(clippy::module_inception)]
mod graph;
mod node;

pub use editor::SchemaGraphEditor;
pub use graph::SchemaGraph;
pub use node::{GraphNode, NameKind, NodeId, SchemaNameInfo, SchemaNode};

pub(crate) use node::NameNamespace;
