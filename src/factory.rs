//! Builds windows for a whole graph and links their anchors to match the graph’s adjacency.

use crate::anchor::{self, AnchorType, Connection, Rejection};
use crate::config::EditorConfig;
use crate::node_window::NodeBinding;
use crate::registry;
use crate::tree::WindowTree;
use crate::window::WindowId;
use parking_lot::Mutex;
use reqgraph_model::{Graph, NodeId};
use tracing::{debug, error, info, trace, warn};

/// Creates node windows under an editor window and replays graph links onto their anchors.
///
/// Windows are registered under their node id strings. Ids staged since the last
/// [`WindowFactory::clear`] are remembered so their links can be made once every window exists.
#[derive(Debug, Default)]
pub struct WindowFactory {
    added: Mutex<Vec<NodeId>>,
}

/// Links made by a connect pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectReport {
    pub linked: usize,
    pub already_linked: usize,
    pub rejected: usize,
}

impl WindowFactory {
    pub fn new() -> WindowFactory {
        WindowFactory::default()
    }

    /// Ids staged since the last clear, in staging order.
    pub fn added(&self) -> Vec<NodeId> {
        self.added.lock().clone()
    }

    pub fn clear(&self) {
        self.added.lock().clear();
    }

    /// Creates a window for every node reachable from `root` that has a registered window
    /// type and doesn’t have a window yet. Returns the number of windows created.
    pub fn stage(
        &self,
        root: NodeId,
        tree: &mut WindowTree,
        editor: WindowId,
        graph: &mut Graph,
        config: &EditorConfig,
    ) -> usize {
        let mut created = 0;
        for id in graph.reachable(root) {
            let kind = match graph.get(id) {
                Some(node) => node.kind(),
                None => continue,
            };
            let key = id.to_string();
            if tree.contains(editor, &key) {
                debug!("{} already has a window", key);
                self.added.lock().push(id);
                continue;
            }

            match registry::create_window(tree, editor, kind, Some(id), graph, config) {
                Ok(Some(_)) => {
                    trace!("created {} window for {}", kind, key);
                    self.added.lock().push(id);
                    created += 1;
                }
                Ok(None) => trace!("skipping {} node {}", kind, key),
                Err(err) => error!("couldn't create a window for {}: {}", key, err),
            }
        }
        created
    }

    /// Links the anchors of every staged window to the windows of its neighbors.
    ///
    /// Links are replayed without touching the nodes, since the graph already has them.
    /// Running it again links nothing new.
    pub fn connect(
        &self,
        tree: &mut WindowTree,
        editor: WindowId,
        graph: &mut Graph,
    ) -> ConnectReport {
        let mut report = ConnectReport::default();
        for id in self.added() {
            let window = tree.get(editor, &id.to_string());
            let binding = match window.and_then(|window| tree.binding(window)) {
                Some(binding) => binding,
                None => {
                    warn!("no window for staged node {}", id);
                    continue;
                }
            };
            let (up, down, change_parent, change_child) = match graph.get(id) {
                Some(node) => (
                    node.up().to_vec(),
                    node.down().to_vec(),
                    node.change_parent(),
                    node.change_child(),
                ),
                None => continue,
            };

            let binding_of = |tree: &WindowTree, node: NodeId| -> Option<NodeBinding> {
                tree.get(editor, &node.to_string())
                    .and_then(|window| tree.binding(window))
            };

            if let (Some(left), Some(parent)) = (binding.left, change_parent) {
                if let Some(remote) = binding_of(tree, parent).and_then(|b| b.right) {
                    let payload = Connection {
                        anchor: left,
                        node: id,
                        anchor_type: AnchorType::Left,
                    };
                    let result =
                        anchor::establish(tree.widgets_mut(), graph, remote, payload, false);
                    record(&mut report, result);
                }
            }
            if let (Some(right), Some(child)) = (binding.right, change_child) {
                if let Some(remote) = binding_of(tree, child).and_then(|b| b.left) {
                    let payload = Connection {
                        anchor: right,
                        node: id,
                        anchor_type: AnchorType::Right,
                    };
                    let result =
                        anchor::establish(tree.widgets_mut(), graph, remote, payload, false);
                    record(&mut report, result);
                }
            }

            for above in up {
                if let Some(remote) = binding_of(tree, above) {
                    let payload = Connection {
                        anchor: binding.up,
                        node: id,
                        anchor_type: AnchorType::Up,
                    };
                    let result =
                        anchor::establish(tree.widgets_mut(), graph, remote.down, payload, false);
                    record(&mut report, result);
                }
            }
            for below in down {
                if let Some(remote) = binding_of(tree, below) {
                    let payload = Connection {
                        anchor: binding.down,
                        node: id,
                        anchor_type: AnchorType::Down,
                    };
                    let result =
                        anchor::establish(tree.widgets_mut(), graph, remote.up, payload, false);
                    record(&mut report, result);
                }
            }
        }
        report
    }

    /// Stages every window of the graph at `root`, links them, and forgets the staged ids.
    pub fn add(
        &self,
        root: NodeId,
        tree: &mut WindowTree,
        editor: WindowId,
        graph: &mut Graph,
        config: &EditorConfig,
    ) -> ConnectReport {
        let created = self.stage(root, tree, editor, graph, config);
        let report = self.connect(tree, editor, graph);
        self.clear();
        info!("added {} windows for graph {} ({} links)", created, root, report.linked);
        report
    }
}

fn record(report: &mut ConnectReport, result: Result<(), Rejection>) {
    match result {
        Ok(()) => report.linked += 1,
        Err(Rejection::AlreadyConnected(_)) => report.already_linked += 1,
        Err(_) => report.rejected += 1,
    }
}
