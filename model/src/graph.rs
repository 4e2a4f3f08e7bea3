//! The node graph.

use crate::error::ModelError;
use crate::id::NodeId;
use crate::node::Node;
use std::collections::{HashMap, HashSet, VecDeque};

/// Owns every node; nodes refer to each other by id.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Inserts a node, replacing any node with the same id. Returns the id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Like `get_mut`, but a missing node is an error.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ModelError> {
        self.nodes
            .get_mut(&id)
            .ok_or(ModelError::NodeNotFound { id })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Links `below` under `above`: `above` joins `below`’s up list and `below` joins `above`’s
    /// down list.
    pub fn link(&mut self, below: NodeId, above: NodeId) -> Result<(), ModelError> {
        if !self.contains(above) {
            return Err(ModelError::NodeNotFound { id: above });
        }
        self.node_mut(below)?.add_up(above)?;
        self.node_mut(above)?.add_down(below)
    }

    /// Makes `child` the change child of `parent` and `parent` the change parent of `child`.
    pub fn link_change(&mut self, parent: NodeId, child: NodeId) -> Result<(), ModelError> {
        if !self.contains(child) {
            return Err(ModelError::NodeNotFound { id: child });
        }
        self.node_mut(parent)?.set_change_child(Some(child))?;
        self.node_mut(child)?.set_change_parent(Some(parent))
    }

    /// Visits every node reachable from `root` exactly once, breadth first.
    ///
    /// Edges are followed in all directions (up, down, change parent, change child). Ids that
    /// aren’t in the graph are skipped.
    pub fn traverse<F: FnMut(&Node)>(&self, root: NodeId, mut visitor: F) {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(root);
        seen.insert(root);

        while let Some(id) = queue.pop_front() {
            let node = match self.nodes.get(&id) {
                Some(node) => node,
                None => continue,
            };
            visitor(node);

            let change_parent = node.change_parent();
            let change_child = node.change_child();
            let neighbors = node
                .up()
                .iter()
                .chain(node.down().iter())
                .chain(change_parent.iter())
                .chain(change_child.iter());
            for next in neighbors {
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
    }

    /// Returns the ids reachable from `root` in traversal order.
    pub fn reachable(&self, root: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.traverse(root, |node| ids.push(node.id()));
        ids
    }

    /// Moves every node of `other` that this graph doesn’t have yet into this graph.
    ///
    /// Returns the ids that were inserted. Nodes already present are kept as they are.
    pub fn merge(&mut self, other: Graph) -> Vec<NodeId> {
        let mut inserted = Vec::new();
        for (id, node) in other.nodes {
            if !self.nodes.contains_key(&id) {
                self.nodes.insert(id, node);
                inserted.push(id);
            }
        }
        inserted
    }

    /// Flags every node reachable from `root` as changed.
    pub fn mark_changed(&mut self, root: NodeId) {
        for id in self.reachable(root) {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.changed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;

    fn chain() -> (Graph, [NodeId; 3]) {
        let mut graph = Graph::new();
        let a = graph.insert(Node::new(NodeKind::Goal));
        let b = graph.insert(Node::new(NodeKind::Requirement));
        let c = graph.insert(Node::new(NodeKind::Story));
        graph.link(b, a).unwrap();
        graph.link(c, b).unwrap();
        (graph, [a, b, c])
    }

    #[test]
    fn link_updates_both_sides() {
        let (graph, [a, b, _]) = chain();
        assert_eq!(graph.get(b).unwrap().up(), &[a]);
        assert_eq!(graph.get(a).unwrap().down(), &[b]);
    }

    #[test]
    fn traverse_visits_each_node_once() {
        let (mut graph, [a, b, c]) = chain();
        // close a cycle
        graph.link(a, c).unwrap();
        let order = graph.reachable(b);
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], b);
        assert!(order.contains(&a) && order.contains(&c));
    }

    #[test]
    fn traverse_follows_change_links() {
        let mut graph = Graph::new();
        let old = graph.insert(Node::new(NodeKind::Requirement));
        let new = graph.insert(Node::new(NodeKind::Requirement));
        graph.link_change(old, new).unwrap();
        assert_eq!(graph.reachable(new), vec![new, old]);
    }

    #[test]
    fn merge_keeps_existing_nodes() {
        let (mut graph, [a, _, _]) = chain();
        graph.get_mut(a).unwrap().init();

        let mut other = Graph::new();
        other.insert(Node::with_id(a, NodeKind::Goal));
        let fresh = other.insert(Node::new(NodeKind::Text));

        assert_eq!(graph.merge(other), vec![fresh]);
        assert!(graph.get(a).unwrap().is_initted());
        assert_eq!(graph.len(), 4);
    }
}
