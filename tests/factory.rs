use reqgraph::{EditorConfig, GridWindow, NodeBinding, WindowFactory, WindowId, WindowTree};
use reqgraph_model::{Graph, Node, NodeId, NodeKind};

struct Fixture {
    tree: WindowTree,
    editor: WindowId,
    graph: Graph,
    config: EditorConfig,
    factory: WindowFactory,
}

impl Fixture {
    fn new(graph: Graph) -> Fixture {
        let mut tree = WindowTree::new();
        let editor = tree.insert("Node Editor", GridWindow::default());
        Fixture {
            tree,
            editor,
            graph,
            config: EditorConfig::default(),
            factory: WindowFactory::new(),
        }
    }

    fn binding(&self, node: NodeId) -> NodeBinding {
        let window = self.tree.get(self.editor, &node.to_string()).unwrap();
        self.tree.binding(window).unwrap()
    }

    fn linked(&self, anchor: reqgraph::WidgetId, node: NodeId) -> bool {
        self.tree
            .widgets()
            .anchor(anchor)
            .unwrap()
            .is_connected_to(node)
    }
}

/// goal -> requirement -> graph node, bottom to top
fn chain() -> (Graph, NodeId, NodeId, NodeId) {
    let mut graph = Graph::new();
    let top = graph.insert(Node::new(NodeKind::GraphNode));
    let middle = graph.insert(Node::new(NodeKind::Requirement));
    let bottom = graph.insert(Node::new(NodeKind::Goal));
    graph.link(middle, top).unwrap();
    graph.link(bottom, middle).unwrap();
    (graph, top, middle, bottom)
}

#[test]
fn test_chain_gets_three_linked_windows() {
    let (graph, top, middle, bottom) = chain();
    let mut f = Fixture::new(graph);

    let report = f
        .factory
        .add(top, &mut f.tree, f.editor, &mut f.graph, &f.config);

    assert_eq!(f.tree.children(f.editor).len(), 3);
    assert_eq!(report.linked, 2);
    assert_eq!(report.already_linked, 2);
    assert_eq!(report.rejected, 0);
    assert!(f.factory.added().is_empty());

    let (t, m, b) = (f.binding(top), f.binding(middle), f.binding(bottom));
    assert!(f.linked(m.up, top));
    assert!(f.linked(t.down, middle));
    assert!(f.linked(b.up, middle));
    assert!(f.linked(m.down, bottom));
    assert!(!f.linked(t.up, middle));

    // replaying links leaves the graph alone
    assert_eq!(f.graph.get(middle).unwrap().up(), &[top]);
    assert_eq!(f.graph.get(middle).unwrap().down(), &[bottom]);
    assert_eq!(f.graph.get(top).unwrap().down(), &[middle]);
}

#[test]
fn test_connecting_twice_adds_nothing() {
    let (graph, top, middle, _) = chain();
    let mut f = Fixture::new(graph);

    assert_eq!(
        f.factory
            .stage(top, &mut f.tree, f.editor, &mut f.graph, &f.config),
        3
    );
    assert_eq!(f.factory.added().len(), 3);
    let first = f.factory.connect(&mut f.tree, f.editor, &mut f.graph);
    let second = f.factory.connect(&mut f.tree, f.editor, &mut f.graph);
    assert_eq!(first.linked, 2);
    assert_eq!(second.linked, 0);
    assert_eq!(second.already_linked, 4);

    let m = f.binding(middle);
    assert_eq!(f.tree.widgets().anchor(m.up).unwrap().connection_count(), 1);
    assert_eq!(f.tree.widgets().anchor(m.down).unwrap().connection_count(), 1);
}

#[test]
fn test_staging_again_creates_no_duplicates() {
    let (graph, top, _, _) = chain();
    let mut f = Fixture::new(graph);

    f.factory
        .add(top, &mut f.tree, f.editor, &mut f.graph, &f.config);
    let created = f
        .factory
        .stage(top, &mut f.tree, f.editor, &mut f.graph, &f.config);
    assert_eq!(created, 0);
    assert_eq!(f.tree.children(f.editor).len(), 3);
}

#[test]
fn test_kinds_without_windows_are_skipped() {
    let mut graph = Graph::new();
    let top = graph.insert(Node::new(NodeKind::Text));
    let hidden = graph.insert(Node::new(NodeKind::Node));
    let bottom = graph.insert(Node::new(NodeKind::Actor));
    graph.link(hidden, top).unwrap();
    graph.link(bottom, hidden).unwrap();
    let mut f = Fixture::new(graph);

    let report = f
        .factory
        .add(top, &mut f.tree, f.editor, &mut f.graph, &f.config);

    assert_eq!(f.tree.children(f.editor).len(), 2);
    assert!(f.tree.get(f.editor, &hidden.to_string()).is_none());
    assert_eq!(report.linked, 0);
    let t = f.binding(top);
    assert_eq!(f.tree.widgets().anchor(t.down).unwrap().connection_count(), 0);
}

#[test]
fn test_change_chain_links_side_anchors() {
    let mut graph = Graph::new();
    let old = graph.insert(Node::new(NodeKind::Requirement));
    let new = graph.insert(Node::new(NodeKind::Requirement));
    graph.link_change(old, new).unwrap();
    let mut f = Fixture::new(graph);

    let report = f
        .factory
        .add(old, &mut f.tree, f.editor, &mut f.graph, &f.config);

    assert_eq!(report.linked, 1);
    assert_eq!(report.already_linked, 1);
    let (o, n) = (f.binding(old), f.binding(new));
    assert!(f.linked(o.right.unwrap(), new));
    assert!(f.linked(n.left.unwrap(), old));
    assert!(!f.linked(o.left.unwrap(), new));
}
