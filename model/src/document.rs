//! Serialized graphs.

use crate::error::ModelError;
use crate::graph::Graph;
use crate::id::NodeId;
use crate::kind::NodeKind;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A self-contained graph: a root and every node reachable from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub root: NodeId,
    pub nodes: Vec<Node>,
}

impl GraphDocument {
    /// Copies the part of `graph` reachable from `root`.
    pub fn capture(graph: &Graph, root: NodeId) -> Result<GraphDocument, ModelError> {
        if !graph.contains(root) {
            return Err(ModelError::NodeNotFound { id: root });
        }
        let mut nodes = Vec::new();
        graph.traverse(root, |node| nodes.push(node.clone()));
        Ok(GraphDocument { root, nodes })
    }

    /// A title for listings: the root’s `title` field if it has one.
    pub fn title(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.id() == self.root)
            .filter(|node| node.kind() == NodeKind::GraphNode)
            .and_then(|node| node.field("title"))
            .filter(|title| !title.is_empty())
    }

    /// Turns the document into a graph, initializing every node.
    pub fn into_graph(self) -> Result<(NodeId, Graph), ModelError> {
        let root = self.root;
        let mut graph = Graph::new();
        for mut node in self.nodes {
            node.init();
            graph.insert(node);
        }
        if !graph.contains(root) {
            return Err(ModelError::MissingRoot { root });
        }
        Ok((root, graph))
    }

    pub fn read_json(path: &Path) -> Result<GraphDocument, ModelError> {
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ModelError::Json {
            path: path.to_owned(),
            source,
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ModelError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ModelError::Json {
            path: path.to_owned(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ModelError::Io {
            path: path.to_owned(),
            source,
        })
    }
}

#[test]
fn test_document_captures_reachable_nodes_only() {
    let mut graph = Graph::new();
    let root = graph.insert(Node::new(NodeKind::GraphNode));
    let child = graph.insert(Node::new(NodeKind::Goal));
    let stray = graph.insert(Node::new(NodeKind::Text));
    graph.link(child, root).unwrap();

    let doc = GraphDocument::capture(&graph, root).unwrap();
    let ids: Vec<_> = doc.nodes.iter().map(Node::id).collect();
    assert_eq!(ids, vec![root, child]);
    assert!(!ids.contains(&stray));

    let json = serde_json::to_string(&doc).unwrap();
    let back: GraphDocument = serde_json::from_str(&json).unwrap();
    let (back_root, back) = back.into_graph().unwrap();
    assert_eq!(back_root, root);
    assert_eq!(back.get(child).unwrap().up(), &[root]);
}

#[test]
fn test_document_without_root_is_rejected() {
    let doc = GraphDocument {
        root: NodeId::new(),
        nodes: vec![Node::new(NodeKind::Text)],
    };
    assert!(matches!(doc.into_graph(), Err(ModelError::MissingRoot { .. })));
}
