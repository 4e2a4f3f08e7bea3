use reqgraph_model::{
    DirectorySource, GraphDocument, GraphLocation, GraphSource, MemorySource, ModelError, Node,
    NodeKind, ThreadPool,
};
use std::fs;
use crossbeam::channel;

fn titled_graph(title: &str) -> GraphDocument {
    let mut graph = reqgraph_model::Graph::new();
    let mut root = Node::new(NodeKind::GraphNode);
    root.init();
    root.set_field("title", title).unwrap();
    let root = graph.insert(root);
    let goal = graph.insert(Node::new(NodeKind::Goal));
    graph.link(goal, root).unwrap();
    GraphDocument::capture(&graph, root).unwrap()
}

#[test]
fn directory_source_lists_and_fetches_json_documents() {
    let dir = tempfile::tempdir().unwrap();
    let doc = titled_graph("Billing");
    doc.write_json(&dir.path().join("billing.json")).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a graph").unwrap();
    fs::write(dir.path().join("broken.json"), "{").unwrap();

    let source = DirectorySource::new();
    let found = source.locate(&dir.path().to_string_lossy()).unwrap();
    assert_eq!(found.len(), 1, "only the readable json document is listed");
    assert_eq!(found[0].title, "Billing");
    assert_eq!(found[0].uuid, doc.root.to_string());

    let fetched = source.fetch(&found[0]).unwrap();
    assert_eq!(fetched, doc);
}

#[test]
fn directory_source_reports_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = DirectorySource::new()
        .locate(&missing.to_string_lossy())
        .unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));
}

#[test]
fn memory_source_filters_by_prefix() {
    let source = MemorySource::new();
    source.insert("team/a", titled_graph("A"));
    source.insert("team/b", titled_graph("B"));
    source.insert("other/c", titled_graph("C"));

    let titles: Vec<_> = source
        .locate("team/")
        .unwrap()
        .into_iter()
        .map(|l| l.title)
        .collect();
    assert_eq!(titles, vec!["A", "B"]);

    let missing = GraphLocation {
        uuid: String::new(),
        title: String::new(),
        address: "team/z".into(),
    };
    assert!(matches!(
        source.fetch(&missing),
        Err(ModelError::GraphNotFound { .. })
    ));
}

#[test]
fn sources_can_be_driven_from_the_pool() {
    let dir = tempfile::tempdir().unwrap();
    titled_graph("Pooled")
        .write_json(&dir.path().join("pooled.json"))
        .unwrap();
    let address = dir.path().to_string_lossy().into_owned();

    let mut pool = ThreadPool::new();
    pool.start_threads(2);
    let (tx, rx) = channel::unbounded();
    pool.enqueue(move || {
        let _ = tx.send(DirectorySource::new().locate(&address));
    })
    .unwrap();

    let listed = rx.recv().unwrap().unwrap();
    assert_eq!(listed[0].title, "Pooled");
}
