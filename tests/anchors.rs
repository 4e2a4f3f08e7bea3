use proptest::prelude::*;
use reqgraph::anchor::{establish, remove_connection, toggle};
use reqgraph::registry::create_window;
use reqgraph::{
    AnchorType, Connection, EditorConfig, GridWindow, NodeBinding, Rejection, WidgetId, WindowId,
    WindowTree,
};
use reqgraph_model::{Graph, NodeId, NodeKind};
use std::collections::HashSet;

struct Scene {
    tree: WindowTree,
    graph: Graph,
    bindings: Vec<NodeBinding>,
}

impl Scene {
    fn new(kinds: &[NodeKind]) -> Scene {
        let config = EditorConfig::default();
        let mut tree = WindowTree::new();
        let mut graph = Graph::new();
        let root: WindowId = tree.insert("root", GridWindow::default());
        let bindings = kinds
            .iter()
            .map(|kind| {
                let window = create_window(&mut tree, root, *kind, None, &mut graph, &config)
                    .unwrap()
                    .unwrap();
                tree.binding(window).unwrap()
            })
            .collect();
        Scene {
            tree,
            graph,
            bindings,
        }
    }

    fn payload(&self, anchor: WidgetId) -> Connection {
        let anchor_widget = self.tree.widgets().anchor(anchor).unwrap();
        Connection {
            anchor,
            node: anchor_widget.node().unwrap(),
            anchor_type: anchor_widget.anchor_type(),
        }
    }

    fn establish(&mut self, local: WidgetId, remote: WidgetId) -> Result<(), Rejection> {
        let payload = self.payload(remote);
        establish(self.tree.widgets_mut(), &mut self.graph, local, payload, true)
    }

    fn remove(&mut self, local: WidgetId, remote: WidgetId) -> Result<(), Rejection> {
        let payload = self.payload(remote);
        remove_connection(self.tree.widgets_mut(), &mut self.graph, local, payload, true)
    }

    fn linked_nodes(&self, anchor: WidgetId) -> HashSet<NodeId> {
        self.tree
            .widgets()
            .anchor(anchor)
            .unwrap()
            .connections()
            .map(|connection| connection.node)
            .collect()
    }

    /// Up and down lists of every node, in binding order.
    fn adjacency(&self) -> Vec<(Vec<NodeId>, Vec<NodeId>)> {
        self.bindings
            .iter()
            .map(|binding| {
                let node = self.graph.get(binding.node).unwrap();
                (node.up().to_vec(), node.down().to_vec())
            })
            .collect()
    }

    fn anchors(binding: &NodeBinding) -> Vec<WidgetId> {
        let mut anchors = vec![binding.up, binding.down];
        anchors.extend(binding.left);
        anchors.extend(binding.right);
        anchors
    }

    /// Every record has a mirror record; up/down records match adjacency exactly.
    fn assert_consistent(&self) {
        let widgets = self.tree.widgets();
        for binding in &self.bindings {
            for id in Scene::anchors(binding) {
                let anchor = widgets.anchor(id).unwrap();
                for connection in anchor.connections() {
                    assert_ne!(connection.node, binding.node);
                    assert!(anchor.anchor_type().accepts(connection.anchor_type));
                    let peer = widgets.anchor(connection.anchor).unwrap();
                    let back = peer.connection(binding.node).expect("missing mirror record");
                    assert_eq!(back.anchor, id);
                    assert_eq!(back.anchor_type, anchor.anchor_type());
                }
            }

            let node = self.graph.get(binding.node).unwrap();
            let up: HashSet<NodeId> = node.up().iter().copied().collect();
            let down: HashSet<NodeId> = node.down().iter().copied().collect();
            assert_eq!(self.linked_nodes(binding.up), up);
            assert_eq!(self.linked_nodes(binding.down), down);
            assert_eq!(up.len(), node.up().len(), "duplicate up entries");
            assert_eq!(down.len(), node.down().len(), "duplicate down entries");
        }
    }
}

#[test]
fn test_link_two_nodes_from_the_up_anchor() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);

    scene.establish(n1.up, n2.down).unwrap();

    assert_eq!(scene.graph.get(n1.node).unwrap().up(), &[n2.node]);
    assert_eq!(scene.graph.get(n2.node).unwrap().down(), &[n1.node]);
    assert!(scene.graph.get(n1.node).unwrap().down().is_empty());
    assert!(scene.graph.get(n2.node).unwrap().up().is_empty());

    let record = *scene.tree.widgets().anchor(n1.up).unwrap().connection(n2.node).unwrap();
    assert_eq!(record.anchor, n2.down);
    assert_eq!(record.anchor_type, AnchorType::Down);
    let back = *scene.tree.widgets().anchor(n2.down).unwrap().connection(n1.node).unwrap();
    assert_eq!(back.anchor, n1.up);
    assert_eq!(back.anchor_type, AnchorType::Up);
    scene.assert_consistent();
}

#[test]
fn test_repeated_link_is_rejected() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);

    scene.establish(n1.up, n2.down).unwrap();
    assert_eq!(
        scene.establish(n1.up, n2.down),
        Err(Rejection::AlreadyConnected(n2.node))
    );
    // from the other end too
    assert_eq!(
        scene.establish(n2.down, n1.up),
        Err(Rejection::AlreadyConnected(n1.node))
    );
    assert_eq!(scene.graph.get(n1.node).unwrap().up().len(), 1);
    scene.assert_consistent();
}

#[test]
fn test_mismatched_types_and_self_links_are_rejected() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Story]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);

    assert_eq!(
        scene.establish(n1.up, n2.up),
        Err(Rejection::Incompatible {
            local: AnchorType::Up,
            remote: AnchorType::Up
        })
    );
    assert!(matches!(
        scene.establish(n1.up, n2.left.unwrap()),
        Err(Rejection::Incompatible { .. })
    ));
    assert_eq!(scene.establish(n1.up, n1.down), Err(Rejection::SelfLink));
    assert_eq!(
        scene.establish(n1.left.unwrap(), n1.right.unwrap()),
        Err(Rejection::SelfLink)
    );

    assert!(scene.graph.get(n1.node).unwrap().up().is_empty());
    assert_eq!(scene.tree.widgets().anchor(n1.up).unwrap().connection_count(), 0);
    scene.assert_consistent();
}

#[test]
fn test_remove_clears_both_sides() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);

    scene.establish(n1.up, n2.down).unwrap();
    scene.remove(n2.down, n1.up).unwrap();

    assert!(scene.graph.get(n1.node).unwrap().up().is_empty());
    assert!(scene.graph.get(n2.node).unwrap().down().is_empty());
    assert_eq!(scene.tree.widgets().anchor(n1.up).unwrap().connection_count(), 0);
    assert_eq!(scene.tree.widgets().anchor(n2.down).unwrap().connection_count(), 0);
    assert_eq!(
        scene.remove(n1.up, n2.down),
        Err(Rejection::NotConnected(n2.node))
    );
}

#[test]
fn test_change_links_leave_adjacency_alone() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Requirement]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);

    scene.establish(n1.right.unwrap(), n2.left.unwrap()).unwrap();

    let node = scene.graph.get(n1.node).unwrap();
    assert!(node.up().is_empty() && node.down().is_empty());
    assert_eq!(node.change_child(), None);
    assert!(scene
        .tree
        .widgets()
        .anchor(n2.left.unwrap())
        .unwrap()
        .is_connected_to(n1.node));
    scene.assert_consistent();
}

#[test]
fn test_committed_nodes_refuse_new_links() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);
    scene.graph.get_mut(n1.node).unwrap().commit();

    assert_eq!(
        scene.establish(n2.down, n1.up),
        Err(Rejection::Committed(n1.node))
    );
    assert!(scene.graph.get(n2.node).unwrap().down().is_empty());

    // replaying an existing link doesn't touch the nodes, so it's fine
    let payload = scene.payload(n1.up);
    establish(scene.tree.widgets_mut(), &mut scene.graph, n2.down, payload, false).unwrap();
    assert!(scene.graph.get(n2.node).unwrap().down().is_empty());
}

#[test]
fn test_destroying_a_window_detaches_its_anchors() {
    let mut scene = Scene::new(&[NodeKind::Requirement, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);
    scene.establish(n1.up, n2.down).unwrap();

    let window = scene.tree.widgets().anchor(n2.down).unwrap().node().unwrap();
    assert_eq!(window, n2.node);
    let parent = scene.tree.widgets().get(n2.down).unwrap().parent().unwrap();
    scene.tree.destroy(parent);

    assert!(!scene.tree.widgets().contains(n2.down));
    assert_eq!(scene.tree.widgets().anchor(n1.up).unwrap().connection_count(), 0);
    // the graph still has the link
    assert_eq!(scene.graph.get(n1.node).unwrap().up(), &[n2.node]);
}

#[test]
fn test_toggle_links_then_unlinks() {
    let mut scene = Scene::new(&[NodeKind::Text, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);

    let payload = scene.payload(n2.up);
    assert_eq!(
        toggle(scene.tree.widgets_mut(), &mut scene.graph, n1.down, payload),
        Ok(true)
    );
    assert_eq!(scene.graph.get(n1.node).unwrap().down(), &[n2.node]);
    assert_eq!(
        toggle(scene.tree.widgets_mut(), &mut scene.graph, n1.down, payload),
        Ok(false)
    );
    assert!(scene.graph.get(n1.node).unwrap().down().is_empty());
    scene.assert_consistent();
}

#[test]
fn test_toggle_with_the_wrong_type_leaves_links_alone() {
    let mut scene = Scene::new(&[NodeKind::Text, NodeKind::Goal]);
    let (n1, n2) = (scene.bindings[0], scene.bindings[1]);
    scene.establish(n1.up, n2.down).unwrap();

    // same nodes, but an up anchor dropped onto an up anchor
    let payload = scene.payload(n2.up);
    assert_eq!(
        toggle(scene.tree.widgets_mut(), &mut scene.graph, n1.up, payload),
        Err(Rejection::Incompatible {
            local: AnchorType::Up,
            remote: AnchorType::Up,
        })
    );
    assert!(scene.tree.widgets().anchor(n1.up).unwrap().is_connected_to(n2.node));
    assert_eq!(scene.graph.get(n1.node).unwrap().up(), &[n2.node]);
    assert_eq!(scene.graph.get(n2.node).unwrap().down(), &[n1.node]);

    let payload = scene.payload(n2.up);
    assert!(matches!(
        remove_connection(scene.tree.widgets_mut(), &mut scene.graph, n1.up, payload, true),
        Err(Rejection::Incompatible { .. })
    ));
    assert_eq!(scene.graph.get(n1.node).unwrap().up(), &[n2.node]);
    scene.assert_consistent();
}

proptest! {
    #[test]
    fn prop_toggles_keep_records_and_adjacency_in_sync(
        ops in prop::collection::vec((0usize..4, 0usize..4, 0usize..4, 0usize..4), 0..40)
    ) {
        let mut scene = Scene::new(&[
            NodeKind::Requirement,
            NodeKind::Story,
            NodeKind::Product,
            NodeKind::UseCase,
        ]);
        for (from, from_slot, to, to_slot) in ops {
            let local = Scene::anchors(&scene.bindings[from])[from_slot];
            let remote = Scene::anchors(&scene.bindings[to])[to_slot];
            let payload = scene.payload(remote);
            let local_type = scene.tree.widgets().anchor(local).unwrap().anchor_type();
            let before = scene.linked_nodes(local);
            let adjacency_before = scene.adjacency();
            let result = toggle(scene.tree.widgets_mut(), &mut scene.graph, local, payload);
            let after = scene.linked_nodes(local);
            match result {
                Ok(true) => {
                    prop_assert!(local_type.accepts(payload.anchor_type));
                    prop_assert!(!before.contains(&payload.node));
                    prop_assert!(after.contains(&payload.node));
                    prop_assert_eq!(after.len(), before.len() + 1);
                }
                Ok(false) => {
                    prop_assert!(local_type.accepts(payload.anchor_type));
                    prop_assert!(before.contains(&payload.node));
                    prop_assert!(!after.contains(&payload.node));
                    prop_assert_eq!(after.len() + 1, before.len());
                }
                Err(_) => {
                    prop_assert_eq!(after, before);
                    prop_assert_eq!(scene.adjacency(), adjacency_before);
                }
            }
            scene.assert_consistent();
        }
    }
}
