//! Which window type presents which node kind.

use crate::config::EditorConfig;
use crate::entity::EntityWindow;
use crate::error::TreeError;
use crate::tree::WindowTree;
use crate::window::WindowId;
use cgmath::Vector2;
use reqgraph_model::{Graph, NodeId, NodeKind};
use std::collections::BTreeMap;
use tracing::trace;

pub const PROCESS_NODES: &str = "Process Nodes";
pub const UTILITY_NODES: &str = "Utility Nodes";

/// Registration details of a window type.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    pub kind: NodeKind,
    /// Display name; also the window’s title.
    pub name: &'static str,
    /// The menu the window is created from.
    pub top_menu: &'static str,
    pub width: f64,
    pub height: f64,
    /// Runs on a freshly constructed window before it is initialized.
    pub init: Option<fn(&mut EntityWindow)>,
}

impl Record {
    const fn new(
        kind: NodeKind,
        name: &'static str,
        top_menu: &'static str,
        width: f64,
        height: f64,
    ) -> Record {
        Record {
            kind,
            name,
            top_menu,
            width,
            height,
            init: None,
        }
    }

    pub fn starting_size(&self) -> Vector2<f64> {
        Vector2::new(self.width, self.height)
    }
}

fn graph_node_init(window: &mut EntityWindow) {
    window.enable_save();
}

fn organization_init(window: &mut EntityWindow) {
    window.lock_follows_editable();
}

/// Returns the registration record for a kind, or `None` if the kind has no window.
///
/// Every kind has exactly one arm, so registering a kind twice doesn’t compile.
#[deny(unreachable_patterns)]
pub fn record(kind: NodeKind) -> Option<Record> {
    use NodeKind::*;
    let record = match kind {
        Node | Commitable | ServerLocator => return None,
        Actor => Record::new(kind, "Actor", PROCESS_NODES, 300., 300.),
        Completed => Record::new(kind, "Completed", UTILITY_NODES, 300., 300.),
        Effort => Record::new(kind, "Effort", UTILITY_NODES, 350., 320.),
        Event => Record::new(kind, "Event", PROCESS_NODES, 300., 300.),
        EmailAddress => Record::new(kind, "Email Address", UTILITY_NODES, 400., 200.),
        Goal => Record::new(kind, "Goal", PROCESS_NODES, 300., 750.),
        GraphNode => Record {
            init: Some(graph_node_init),
            ..Record::new(kind, "Graph Node", UTILITY_NODES, 300., 300.)
        },
        InternationalAddress => {
            Record::new(kind, "International Address", UTILITY_NODES, 300., 400.)
        }
        KeyValue => Record::new(kind, "KeyValue", UTILITY_NODES, 300., 350.),
        Organization => Record {
            init: Some(organization_init),
            ..Record::new(kind, "Organization", UTILITY_NODES, 300., 300.)
        },
        Person => Record::new(kind, "Person", UTILITY_NODES, 400., 200.),
        PhoneNumber => Record::new(kind, "Phone Number", UTILITY_NODES, 300., 350.),
        Product => Record::new(kind, "Product", PROCESS_NODES, 300., 200.),
        Project => Record::new(kind, "Project", PROCESS_NODES, 300., 200.),
        Purpose => Record::new(kind, "Purpose", PROCESS_NODES, 300., 400.),
        Requirement => Record::new(kind, "Requirement", PROCESS_NODES, 300., 350.),
        Role => Record::new(kind, "Role", PROCESS_NODES, 300., 300.),
        Story => Record::new(kind, "Story", PROCESS_NODES, 300., 500.),
        Text => Record::new(kind, "Text", UTILITY_NODES, 300., 300.),
        TimeEstimate => Record::new(kind, "Time Estimate", UTILITY_NODES, 300., 400.),
        USAddress => Record::new(kind, "US Address", UTILITY_NODES, 300., 400.),
        UseCase => Record::new(kind, "Use Case", PROCESS_NODES, 300., 200.),
    };
    Some(record)
}

/// Every registered record.
pub fn records() -> impl Iterator<Item = Record> {
    NodeKind::ALL.iter().filter_map(|kind| record(*kind))
}

/// Records grouped by top menu, sorted by name within each menu.
pub fn menus() -> BTreeMap<&'static str, Vec<Record>> {
    let mut menus: BTreeMap<&'static str, Vec<Record>> = BTreeMap::new();
    for record in records() {
        menus.entry(record.top_menu).or_default().push(record);
    }
    for records in menus.values_mut() {
        records.sort_by_key(|record| record.name);
    }
    menus
}

/// Creates and initializes the window registered for `kind` and adds it to `parent` under its
/// node id.
///
/// Without a node a fresh one is created. Returns `Ok(None)` if the kind has no window.
pub fn create_window(
    tree: &mut WindowTree,
    parent: WindowId,
    kind: NodeKind,
    node: Option<NodeId>,
    graph: &mut Graph,
    config: &EditorConfig,
) -> Result<Option<WindowId>, TreeError> {
    let record = match record(kind) {
        Some(record) => record,
        None => {
            trace!("{} nodes have no window", kind);
            return Ok(None);
        }
    };

    let mut content = EntityWindow::new(kind, config);
    if let Some(node) = node {
        content.add_node(node);
    }
    if let Some(init) = record.init {
        init(&mut content);
    }

    let id = tree.insert(record.name, content);
    tree.set_starting_size(id, record.starting_size());
    if let Err(err) = tree.init(id, graph, config) {
        tree.destroy(id);
        return Err(err);
    }

    let key = match tree.binding(id) {
        Some(binding) => binding.node.to_string(),
        None => {
            tree.destroy(id);
            return Err(TreeError::Unbound {
                name: record.name.to_string(),
            });
        }
    };
    if let Err(err) = tree.add(parent, &key, id) {
        tree.destroy(id);
        return Err(err);
    }
    Ok(Some(id))
}
