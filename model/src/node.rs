//! Domain nodes.

use crate::error::ModelError;
use crate::id::NodeId;
use crate::kind::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in a requirements graph.
///
/// Adjacency is stored as id lists into the owning [`Graph`](crate::Graph). Each list is only
/// ever changed from one side at a time; keeping `a.up` and `b.down` in agreement is the job of
/// whoever links the two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    #[serde(default)]
    up: Vec<NodeId>,
    #[serde(default)]
    down: Vec<NodeId>,
    #[serde(default)]
    change_parent: Option<NodeId>,
    #[serde(default)]
    change_child: Option<NodeId>,
    #[serde(default)]
    committed: bool,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(skip)]
    initted: bool,
    /// Set when the node should be written out on the next save.
    #[serde(skip)]
    pub changed: bool,
}

/// Compares what is saved; `initted` and `changed` are bookkeeping.
impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.up == other.up
            && self.down == other.down
            && self.change_parent == other.change_parent
            && self.change_child == other.change_child
            && self.committed == other.committed
            && self.locked == other.locked
            && self.fields == other.fields
    }
}

impl Node {
    /// Creates an uninitialized node with a fresh id.
    pub fn new(kind: NodeKind) -> Node {
        Node::with_id(NodeId::new(), kind)
    }

    pub fn with_id(id: NodeId, kind: NodeKind) -> Node {
        Node {
            id,
            kind,
            up: Vec::new(),
            down: Vec::new(),
            change_parent: None,
            change_child: None,
            committed: false,
            locked: false,
            fields: BTreeMap::new(),
            initted: false,
            changed: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_initted(&self) -> bool {
        self.initted
    }

    /// Fills in every field of the node kind that is still missing. Only does anything once.
    pub fn init(&mut self) {
        if self.initted {
            return;
        }
        for field in self.kind.fields() {
            self.fields.entry((*field).to_owned()).or_default();
        }
        self.initted = true;
    }

    pub fn up(&self) -> &[NodeId] {
        &self.up
    }

    pub fn down(&self) -> &[NodeId] {
        &self.down
    }

    pub fn add_up(&mut self, other: NodeId) -> Result<(), ModelError> {
        self.check_committed()?;
        if !self.up.contains(&other) {
            self.up.push(other);
            self.changed = true;
        }
        Ok(())
    }

    pub fn add_down(&mut self, other: NodeId) -> Result<(), ModelError> {
        self.check_committed()?;
        if !self.down.contains(&other) {
            self.down.push(other);
            self.changed = true;
        }
        Ok(())
    }

    pub fn remove_up(&mut self, other: NodeId) -> Result<(), ModelError> {
        self.check_committed()?;
        let before = self.up.len();
        self.up.retain(|id| *id != other);
        self.changed |= before != self.up.len();
        Ok(())
    }

    pub fn remove_down(&mut self, other: NodeId) -> Result<(), ModelError> {
        self.check_committed()?;
        let before = self.down.len();
        self.down.retain(|id| *id != other);
        self.changed |= before != self.down.len();
        Ok(())
    }

    pub fn change_parent(&self) -> Option<NodeId> {
        self.change_parent
    }

    pub fn change_child(&self) -> Option<NodeId> {
        self.change_child
    }

    pub fn set_change_parent(&mut self, parent: Option<NodeId>) -> Result<(), ModelError> {
        self.check_committed()?;
        self.change_parent = parent;
        self.changed = true;
        Ok(())
    }

    pub fn set_change_child(&mut self, child: Option<NodeId>) -> Result<(), ModelError> {
        self.check_committed()?;
        self.change_child = child;
        self.changed = true;
        Ok(())
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Commits the node. There is no way back.
    ///
    /// Only commitable kinds can be committed; for the rest this does nothing.
    pub fn commit(&mut self) {
        if self.kind.is_commitable() && !self.committed {
            self.committed = true;
            self.changed = true;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        self.check_committed()?;
        if self.locked {
            return Err(ModelError::Locked { id: self.id });
        }
        if !self.kind.has_field(name) {
            return Err(ModelError::NoSuchField {
                id: self.id,
                field: name.to_owned(),
            });
        }
        self.fields.insert(name.to_owned(), value.to_owned());
        self.changed = true;
        Ok(())
    }

    fn check_committed(&self) -> Result<(), ModelError> {
        if self.committed {
            Err(ModelError::Committed { id: self.id })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_never_duplicates() {
        let mut node = Node::new(NodeKind::Requirement);
        let other = NodeId::new();
        node.add_up(other).unwrap();
        node.add_up(other).unwrap();
        assert_eq!(node.up(), &[other]);
        node.remove_up(other).unwrap();
        node.remove_up(other).unwrap();
        assert!(node.up().is_empty());
    }

    #[test]
    fn commit_is_permanent_and_freezes_edits() {
        let mut node = Node::new(NodeKind::Story);
        node.init();
        node.set_field("title", "Login").unwrap();
        node.commit();
        assert!(node.is_committed());
        assert!(matches!(
            node.set_field("title", "Logout"),
            Err(ModelError::Committed { .. })
        ));
        assert!(node.add_down(NodeId::new()).is_err());
        assert_eq!(node.field("title"), Some("Login"));
    }

    #[test]
    fn non_commitable_kinds_ignore_commit() {
        let mut node = Node::new(NodeKind::Goal);
        node.commit();
        assert!(!node.is_committed());
    }

    #[test]
    fn init_fills_fields_once() {
        let mut node = Node::new(NodeKind::Person);
        assert_eq!(node.field("first_name"), None);
        node.init();
        assert_eq!(node.field("first_name"), Some(""));
        node.set_field("first_name", "Ada").unwrap();
        node.init();
        assert_eq!(node.field("first_name"), Some("Ada"));
    }

    #[test]
    fn locked_nodes_reject_field_edits() {
        let mut node = Node::new(NodeKind::Organization);
        node.init();
        node.lock();
        assert!(matches!(
            node.set_field("name", "Acme"),
            Err(ModelError::Locked { .. })
        ));
        node.unlock();
        node.set_field("name", "Acme").unwrap();
        assert!(node.set_field("colour", "red").is_err());
    }

    #[test]
    fn equality_ignores_unsaved_state() {
        let mut node = Node::new(NodeKind::Text);
        node.init();
        node.set_field("text", "hello").unwrap();
        assert!(node.changed);

        let json = serde_json::to_string(&node).unwrap();
        let read: Node = serde_json::from_str(&json).unwrap();
        assert!(!read.is_initted() && !read.changed);
        assert_eq!(read, node);

        let mut edited = read.clone();
        edited.lock();
        assert_ne!(edited, node);
    }
}
