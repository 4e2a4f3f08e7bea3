//! Node identifiers.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a domain node.
///
/// Displays as the hyphenated uuid, which is also the key a node's window is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> NodeId {
        NodeId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<NodeId, ModelError> {
        Uuid::parse_str(s)
            .map(NodeId)
            .map_err(|_| ModelError::InvalidId { text: s.to_owned() })
    }
}

#[test]
fn test_node_id_string_round_trip() {
    let id = NodeId::new();
    let text = id.to_string();
    assert_eq!(text.len(), 36, "id strings are hyphenated uuids");
    assert_eq!(text.parse::<NodeId>().ok(), Some(id));
    assert_ne!(NodeId::new(), id, "fresh ids should not collide");
}
