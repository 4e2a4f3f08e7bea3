//! Node kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every kind of domain node.
///
/// Kinds take the place of the node class hierarchy: a window type is chosen for a node by
/// matching on its kind rather than by probing its runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A plain node with nothing but adjacency.
    Node,
    /// A plain commitable node.
    Commitable,
    /// Points at a graph served somewhere else. Never rendered.
    ServerLocator,
    Actor,
    Completed,
    Effort,
    Event,
    EmailAddress,
    Goal,
    GraphNode,
    InternationalAddress,
    KeyValue,
    Organization,
    Person,
    PhoneNumber,
    Product,
    Project,
    Purpose,
    Requirement,
    Role,
    Story,
    Text,
    TimeEstimate,
    USAddress,
    UseCase,
}

impl NodeKind {
    pub const ALL: [NodeKind; 25] = [
        NodeKind::Node,
        NodeKind::Commitable,
        NodeKind::ServerLocator,
        NodeKind::Actor,
        NodeKind::Completed,
        NodeKind::Effort,
        NodeKind::Event,
        NodeKind::EmailAddress,
        NodeKind::Goal,
        NodeKind::GraphNode,
        NodeKind::InternationalAddress,
        NodeKind::KeyValue,
        NodeKind::Organization,
        NodeKind::Person,
        NodeKind::PhoneNumber,
        NodeKind::Product,
        NodeKind::Project,
        NodeKind::Purpose,
        NodeKind::Requirement,
        NodeKind::Role,
        NodeKind::Story,
        NodeKind::Text,
        NodeKind::TimeEstimate,
        NodeKind::USAddress,
        NodeKind::UseCase,
    ];

    /// If true, nodes of this kind carry a change parent/child chain and can be committed.
    pub fn is_commitable(self) -> bool {
        match self {
            NodeKind::Commitable
            | NodeKind::Product
            | NodeKind::Requirement
            | NodeKind::Story
            | NodeKind::UseCase => true,
            _ => false,
        }
    }

    /// Names of the text fields a node of this kind holds, in display order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            NodeKind::Node | NodeKind::Commitable => &[],
            NodeKind::ServerLocator => &["graph_uuid", "graph_address", "graph_title"],
            NodeKind::Actor => &["actor"],
            NodeKind::Completed => &["description"],
            NodeKind::Effort => &["effort", "text"],
            NodeKind::Event => &["name", "description"],
            NodeKind::EmailAddress => &["address"],
            NodeKind::Goal => &[
                "action",
                "outcome",
                "context",
                "alignment",
                "target_date",
                "target_date_confidence",
            ],
            NodeKind::GraphNode => &["title"],
            NodeKind::InternationalAddress => {
                &["address_lines", "locality", "postal_code", "country_code"]
            }
            NodeKind::KeyValue => &["key", "value"],
            NodeKind::Organization => &["name"],
            NodeKind::Person => &["first_name", "last_name"],
            NodeKind::PhoneNumber => &["country_code", "number", "phone_type"],
            NodeKind::Product => &["title", "description"],
            NodeKind::Project => &["name", "description"],
            NodeKind::Purpose => &["description", "deadline", "deadline_confidence"],
            NodeKind::Requirement => &["title", "text", "functional"],
            NodeKind::Role => &["who"],
            NodeKind::Story => &["title", "goal", "benefit"],
            NodeKind::Text => &["text"],
            NodeKind::TimeEstimate => &["text", "estimate", "started", "start_timestamp"],
            NodeKind::USAddress => &["address_lines", "city", "state", "zip_code"],
            NodeKind::UseCase => &["name"],
        }
    }

    pub fn has_field(self, field: &str) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[test]
fn test_kind_list_is_complete() {
    use std::collections::HashSet;
    let unique: HashSet<_> = NodeKind::ALL.iter().collect();
    assert_eq!(unique.len(), NodeKind::ALL.len(), "ALL should not repeat a kind");

    let commitable: Vec<_> = NodeKind::ALL.iter().filter(|k| k.is_commitable()).collect();
    assert_eq!(commitable.len(), 5);
    assert!(NodeKind::Goal.has_field("target_date_confidence"));
    assert!(!NodeKind::Node.has_field("title"));
}
