//! The node editor: the root window, the frame loop, and background loads and saves.

use crate::anchor::{self, Connection, DragSlot, Rejection};
use crate::config::EditorConfig;
use crate::error::{EditorError, TreeError};
use crate::factory::{ConnectReport, WindowFactory};
use crate::grid::{GridStyle, GridWindow};
use crate::impl_window;
use crate::locator::LocatorWindow;
use crate::registry::{self, Record};
use crate::surface::{Surface, WindowOptions};
use crate::tree::{Frame, WindowTree};
use crate::widget::WidgetId;
use crate::window::{unique_label, Window, WindowCx, WindowId};
use cgmath::Point2;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use reqgraph_model::{
    Graph, GraphDocument, GraphLocation, GraphSource, NodeId, NodeKind, ThreadPool,
};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Something a window asked the editor to do once the frame is over.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a window for a new node of this kind.
    Create(NodeKind),
    ShowLocator,
    Load(GraphLocation),
    /// Save the graph reachable from `root` as JSON.
    SaveGraph { root: NodeId, path: PathBuf },
    Exit,
}

/// Results of background work, delivered to the editor’s thread.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded { key: String, document: GraphDocument },
    Saved { path: PathBuf },
    Failed { key: Option<String>, message: String },
}

/// The backdrop window: fills the display, draws a grid, and owns the main menu bar.
#[derive(Debug)]
pub struct NodeEditorWindow {
    grid: GridWindow,
    menus: BTreeMap<&'static str, Vec<Record>>,
    status: Option<String>,
}

impl NodeEditorWindow {
    pub fn new(grid: GridStyle) -> NodeEditorWindow {
        NodeEditorWindow {
            grid: GridWindow::new(grid),
            menus: registry::menus(),
            status: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(String::as_str)
    }

    pub fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }
}

impl_window! {
    NodeEditorWindow;

    fn beginning(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        Window::beginning(&mut self.grid, cx)
    }

    fn open(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) -> bool {
        let size = ui.viewport_size();
        ui.set_next_window_size(size);
        ui.set_next_window_pos(Point2::new(0., 0.));
        let options = WindowOptions {
            backdrop: true,
            menu_bar: true,
            closable: false,
        };
        ui.begin_window(cx.label(), options);
        true
    }

    fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        Window::body(&mut self.grid, cx, ui);

        if ui.begin_main_menu_bar() {
            if ui.begin_menu("File") {
                if ui.menu_item("Query Graph Source") {
                    cx.push(Command::ShowLocator);
                }
                if ui.menu_item("Exit") {
                    cx.push(Command::Exit);
                }
                ui.end_menu();
            }
            for (menu, records) in &self.menus {
                if ui.begin_menu(menu) {
                    for record in records {
                        if ui.menu_item(record.name) {
                            cx.push(Command::Create(record.kind));
                        }
                    }
                    ui.end_menu();
                }
            }
            ui.end_main_menu_bar();
        }

        if let Some(status) = &self.status {
            ui.text(status);
        }
    }
}

/// Owns the window tree, the graph being edited, and the workers that load and save graphs.
///
/// Everything except the workers runs on the thread that calls [`Editor::frame`].
pub struct Editor {
    config: EditorConfig,
    tree: WindowTree,
    graph: Graph,
    drag: DragSlot,
    factory: WindowFactory,
    root: WindowId,
    locator: WindowId,
    pool: ThreadPool,
    source: Arc<dyn GraphSource>,
    event_sender: Sender<LoadEvent>,
    event_recv: Receiver<LoadEvent>,
    pending_loads: HashSet<String>,
    exit_requested: bool,
}

impl Editor {
    pub fn new(config: EditorConfig, source: Arc<dyn GraphSource>) -> Result<Editor, EditorError> {
        let mut pool = ThreadPool::new();
        pool.start_threads(config.worker_threads.max(1));

        let mut tree = WindowTree::new();
        let root = tree.insert("Node Editor", NodeEditorWindow::new(config.grid));
        let locator = tree.insert(
            "Graph Locator",
            LocatorWindow::new(Arc::clone(&source), pool.submitter(), config.default_address()),
        );
        tree.add(root, &unique_label("##Locator"), locator)?;

        let (event_sender, event_recv) = channel::unbounded();
        info!("editor started with {} workers", pool.thread_count());

        Ok(Editor {
            config,
            tree,
            graph: Graph::new(),
            drag: DragSlot::default(),
            factory: WindowFactory::new(),
            root,
            locator,
            pool,
            source,
            event_sender,
            event_recv,
            pending_loads: HashSet::new(),
            exit_requested: false,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tree(&self) -> &WindowTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WindowTree {
        &mut self.tree
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn drag(&self) -> &DragSlot {
        &self.drag
    }

    /// The root editor window.
    pub fn root(&self) -> WindowId {
        self.root
    }

    pub fn locator(&self) -> WindowId {
        self.locator
    }

    pub fn factory(&self) -> &WindowFactory {
        &self.factory
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn status(&self) -> Option<&str> {
        self.tree
            .content::<NodeEditorWindow>(self.root)
            .and_then(NodeEditorWindow::status)
    }

    fn set_status(&mut self, status: String) {
        if let Some(editor) = self.tree.content_mut::<NodeEditorWindow>(self.root) {
            editor.set_status(status);
        }
    }

    /// The window presenting a node, if there is one.
    pub fn window_for(&self, node: NodeId) -> Option<WindowId> {
        self.tree.get(self.root, &node.to_string())
    }

    /// Keys of loads that haven’t completed yet.
    pub fn pending_loads(&self) -> Vec<String> {
        self.pending_loads.iter().cloned().collect()
    }

    /// Draws one frame, then runs the commands windows queued during it.
    pub fn frame(&mut self, ui: &mut dyn Surface) {
        self.poll();

        ui.begin_frame();
        let mut commands = Vec::new();
        {
            let mut frame = Frame {
                surface: &mut *ui,
                graph: &mut self.graph,
                drag: &mut self.drag,
                commands: &mut commands,
                config: &self.config,
            };
            self.tree.begin(self.root, &mut frame);
            self.tree.end(self.root, &mut frame);
        }
        if !ui.is_pointer_down() {
            if let Some(abandoned) = self.drag.take() {
                trace!("drag from {} ended without a drop", abandoned.node);
            }
        }
        ui.end_frame();

        for command in commands {
            self.apply(command);
        }
    }

    /// Handles every background result that has arrived so far.
    pub fn poll(&mut self) {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => self.handle(event),
                Err(TryRecvError::Empty) => break,
                // the editor holds a sender, so this can’t happen
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn handle(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Loaded { key, document } => {
                if !self.pending_loads.remove(&key) {
                    debug!("ignoring load of {} that is no longer wanted", key);
                    return;
                }
                match self.add_document(document) {
                    Ok(root) => self.set_status(format!("Loaded graph {}", root)),
                    Err(err) => {
                        error!("couldn't add graph {}: {}", key, err);
                        self.set_status(format!("Couldn't load graph {}: {}", key, err));
                    }
                }
            }
            LoadEvent::Saved { path } => {
                info!("saved graph to {}", path.display());
                self.set_status(format!("Saved graph to {}", path.display()));
            }
            LoadEvent::Failed { key, message } => {
                if let Some(key) = &key {
                    if !self.pending_loads.remove(key) {
                        debug!("ignoring failure of {} that is no longer wanted", key);
                        return;
                    }
                }
                warn!("background task failed: {}", message);
                self.set_status(message);
            }
        }
    }

    /// Runs a command.
    pub fn apply(&mut self, command: Command) {
        trace!("running {:?}", command);
        match command {
            Command::Create(kind) => {
                if let Err(err) = self.create(kind) {
                    error!("couldn't create {} window: {}", kind, err);
                }
            }
            Command::ShowLocator => {
                if let Some(locator) = self.tree.content_mut::<LocatorWindow>(self.locator) {
                    locator.set_show(true);
                }
            }
            Command::Load(location) => {
                self.request_load(location);
            }
            Command::SaveGraph { root, path } => {
                if let Err(err) = self.save_graph(root, path) {
                    error!("couldn't save graph {}: {}", root, err);
                    self.set_status(format!("Couldn't save graph: {}", err));
                }
            }
            Command::Exit => {
                info!("exit requested");
                self.exit_requested = true;
            }
        }
    }

    /// Creates a window for a fresh node of the given kind.
    pub fn create(&mut self, kind: NodeKind) -> Result<Option<WindowId>, EditorError> {
        let window = registry::create_window(
            &mut self.tree,
            self.root,
            kind,
            None,
            &mut self.graph,
            &self.config,
        )?;
        Ok(window)
    }

    /// Creates windows for every node of a graph and links them.
    ///
    /// Nodes already in the editor’s graph are kept as they are.
    pub fn add_graph(&mut self, root: NodeId, graph: Graph) -> ConnectReport {
        let merged = self.graph.merge(graph);
        debug!("merged {} new nodes", merged.len());
        self.factory
            .add(root, &mut self.tree, self.root, &mut self.graph, &self.config)
    }

    /// Adds a loaded document. Returns its root.
    pub fn add_document(&mut self, document: GraphDocument) -> Result<NodeId, EditorError> {
        let (root, graph) = document.into_graph()?;
        self.add_graph(root, graph);
        Ok(root)
    }

    /// Fetches a listed graph on a worker thread. Returns false if it is already on its way.
    pub fn request_load(&mut self, location: GraphLocation) -> bool {
        let key = location.uuid.clone();
        if !self.pending_loads.insert(key.clone()) {
            debug!("{} is already loading", key);
            return false;
        }

        let source = Arc::clone(&self.source);
        let sender = self.event_sender.clone();
        let task_key = key.clone();
        let submitted = self.pool.enqueue(move || {
            let event = match source.fetch(&location) {
                Ok(document) => LoadEvent::Loaded {
                    key: task_key,
                    document,
                },
                Err(err) => LoadEvent::Failed {
                    message: format!("Couldn't load {}: {}", location.title, err),
                    key: Some(task_key),
                },
            };
            if sender.send(event).is_err() {
                debug!("editor went away before a load finished");
            }
        });

        if let Err(err) = submitted {
            warn!("couldn't start loading {}: {}", key, err);
            self.pending_loads.remove(&key);
            return false;
        }
        true
    }

    /// Stops waiting for a load. Its result is ignored when it arrives.
    pub fn forget_load(&mut self, key: &str) -> bool {
        self.pending_loads.remove(key)
    }

    /// Writes the graph reachable from `root` to a JSON file on a worker thread.
    pub fn save_graph(&mut self, root: NodeId, path: PathBuf) -> Result<(), EditorError> {
        let document = GraphDocument::capture(&self.graph, root)?;
        let sender = self.event_sender.clone();
        self.pool.enqueue(move || {
            let event = match document.write_json(&path) {
                Ok(()) => LoadEvent::Saved { path },
                Err(err) => LoadEvent::Failed {
                    key: None,
                    message: format!("Couldn't save graph: {}", err),
                },
            };
            if sender.send(event).is_err() {
                debug!("editor went away before a save finished");
            }
        })?;
        Ok(())
    }

    /// Links two anchors and their nodes, like a user drag would.
    pub fn connect(&mut self, local: WidgetId, remote: Connection) -> Result<(), Rejection> {
        anchor::establish(self.tree.widgets_mut(), &mut self.graph, local, remote, true)
    }

    /// Unlinks two anchors and their nodes.
    pub fn disconnect(&mut self, local: WidgetId, remote: Connection) -> Result<(), Rejection> {
        anchor::remove_connection(self.tree.widgets_mut(), &mut self.graph, local, remote, true)
    }

    /// Removes a node’s window. The node stays in the graph.
    pub fn close_window(&mut self, node: NodeId) {
        self.tree.remove(self.root, &node.to_string());
    }
}
