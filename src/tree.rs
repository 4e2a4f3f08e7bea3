use crate::anchor::DragSlot;
use crate::color::Color;
use crate::config::EditorConfig;
use crate::editor::Command;
use crate::error::TreeError;
use crate::events::{Signal, WindowGeometry};
use crate::node_window::NodeBinding;
use crate::surface::Surface;
use crate::widget::{Widget, WidgetId, WidgetStore};
use crate::window::{unique_label, Window, WindowCx, WindowId, WindowState};
use cgmath::Vector2;
use reqgraph_model::Graph;
use std::collections::HashMap;
use tracing::{debug, error, trace, warn};

/// Everything a frame renders with.
pub struct Frame<'a> {
    pub surface: &'a mut dyn Surface,
    pub graph: &'a mut Graph,
    pub drag: &'a mut DragSlot,
    pub commands: &'a mut Vec<Command>,
    pub config: &'a EditorConfig,
}

#[derive(Debug)]
struct WindowNode {
    state: WindowState,
    /// Taken out while one of its hooks runs.
    content: Option<Box<dyn Window>>,
}

/// A tree of windows and the widgets they own.
///
/// Every window is owned by the tree. A window with no parent is a root and is drawn by calling
/// [`WindowTree::begin`] and [`WindowTree::end`] on it; children are drawn by their parents.
#[derive(Debug, Default)]
pub struct WindowTree {
    windows: HashMap<WindowId, WindowNode>,
    widgets: WidgetStore,
}

impl WindowTree {
    pub fn new() -> WindowTree {
        WindowTree::default()
    }

    /// Adds a window without a parent. The label is made unique.
    pub fn insert<W: Window>(&mut self, label: &str, content: W) -> WindowId {
        self.insert_boxed(label, Box::new(content))
    }

    pub fn insert_boxed(&mut self, label: &str, content: Box<dyn Window>) -> WindowId {
        let id = WindowId::new();
        self.windows.insert(
            id,
            WindowNode {
                state: WindowState::new(unique_label(label)),
                content: Some(content),
            },
        );
        trace!("inserted window {:?} ({})", id, label);
        id
    }

    pub fn exists(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Adds `child` to `parent`’s children under a key unique among them.
    ///
    /// A child that already has a parent is moved: it is taken out of the old parent’s children.
    pub fn add(&mut self, parent: WindowId, key: &str, child: WindowId) -> Result<(), TreeError> {
        let old_parent = self
            .windows
            .get(&child)
            .ok_or(TreeError::NoSuchWindow(child))?
            .state
            .parent;
        let parent_node = self
            .windows
            .get(&parent)
            .ok_or(TreeError::NoSuchWindow(parent))?;
        if parent_node.state.children.contains_key(key) {
            return Err(TreeError::DuplicateChild {
                key: key.to_string(),
            });
        }

        if let Some(old_parent) = old_parent {
            if let Some(old_node) = self.windows.get_mut(&old_parent) {
                old_node.state.children.retain(|_, id| *id != child);
            }
        }
        if let Some(parent_node) = self.windows.get_mut(&parent) {
            parent_node.state.children.insert(key.to_string(), child);
        }

        if let Some(child_node) = self.windows.get_mut(&child) {
            child_node.state.parent = Some(parent);
        }
        Ok(())
    }

    /// Returns the child with the given key.
    pub fn get(&self, parent: WindowId, key: &str) -> Option<WindowId> {
        self.windows
            .get(&parent)
            .and_then(|node| node.state.children.get(key))
            .copied()
    }

    pub fn contains(&self, parent: WindowId, key: &str) -> bool {
        self.get(parent, key).is_some()
    }

    /// Removes and destroys the child with the given key, if there is one.
    pub fn remove(&mut self, parent: WindowId, key: &str) {
        let child = self
            .windows
            .get_mut(&parent)
            .and_then(|node| node.state.children.remove(key));
        if let Some(child) = child {
            self.destroy(child);
        }
    }

    /// Destroys a window, its children and its widgets.
    ///
    /// Subscriptions held by the window are released first.
    pub fn destroy(&mut self, id: WindowId) {
        let WindowNode { mut state, content } = match self.windows.remove(&id) {
            Some(node) => node,
            None => return,
        };
        trace!("destroying window {}", state.label);

        state.subscriptions.clear();
        state.moved.clear();
        state.resized.clear();

        if let Some(parent) = state.parent {
            // parent may be gone already if this is a recursive call
            if let Some(parent) = self.windows.get_mut(&parent) {
                parent.state.children.retain(|_, child| *child != id);
            }
        }

        for (_, child) in state.children.drain() {
            self.destroy(child);
        }
        for (_, widget) in state.widgets.drain() {
            self.widgets.destroy(widget);
        }
        drop(content);
    }

    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.windows.get(&id).and_then(|node| node.state.parent)
    }

    /// Returns children as (key, id) pairs in no particular order.
    pub fn children(&self, id: WindowId) -> Vec<(String, WindowId)> {
        self.windows
            .get(&id)
            .map(|node| {
                node.state
                    .children
                    .iter()
                    .map(|(key, child)| (key.clone(), *child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn label(&self, id: WindowId) -> Option<&str> {
        self.windows.get(&id).map(|node| node.state.label.as_str())
    }

    /// Returns true once the window’s first frame has started.
    pub fn has_started(&self, id: WindowId) -> bool {
        self.windows.get(&id).map_or(false, |node| node.state.started)
    }

    /// Downcasts a window’s contents.
    pub fn content<W: Window>(&self, id: WindowId) -> Option<&W> {
        self.windows
            .get(&id)
            .and_then(|node| node.content.as_ref())
            .and_then(|content| content.as_any().downcast_ref::<W>())
    }

    pub fn content_mut<W: Window>(&mut self, id: WindowId) -> Option<&mut W> {
        self.windows
            .get_mut(&id)
            .and_then(|node| node.content.as_mut())
            .and_then(|content| content.as_any_mut().downcast_mut::<W>())
    }

    /// The node and anchors a window presents.
    pub fn binding(&self, id: WindowId) -> Option<NodeBinding> {
        self.windows
            .get(&id)
            .and_then(|node| node.content.as_ref())
            .and_then(|content| content.binding())
    }

    pub fn widgets(&self) -> &WidgetStore {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetStore {
        &mut self.widgets
    }

    /// Gives a widget to a window under a key unique within the window.
    pub fn add_widget(
        &mut self,
        window: WindowId,
        key: &str,
        widget: Box<dyn Widget>,
    ) -> Result<WidgetId, TreeError> {
        let WindowTree { windows, widgets } = self;
        let node = windows
            .get_mut(&window)
            .ok_or(TreeError::NoSuchWindow(window))?;
        let id = WidgetId::new();
        node.state.attach_widget(window, widgets, key, id, widget)?;
        Ok(id)
    }

    pub fn widget(&self, window: WindowId, key: &str) -> Option<WidgetId> {
        self.windows
            .get(&window)
            .and_then(|node| node.state.widgets.get(key))
            .copied()
    }

    /// Removes and destroys a window’s widget.
    pub fn remove_widget(&mut self, window: WindowId, key: &str) {
        let widget = self
            .windows
            .get_mut(&window)
            .and_then(|node| node.state.widgets.remove(key));
        if let Some(widget) = widget {
            self.widgets.destroy(widget);
        }
    }

    pub fn moved(&self, id: WindowId) -> Option<Signal<WindowGeometry>> {
        self.windows.get(&id).map(|node| node.state.moved.clone())
    }

    pub fn resized(&self, id: WindowId) -> Option<Signal<WindowGeometry>> {
        self.windows.get(&id).map(|node| node.state.resized.clone())
    }

    pub fn set_starting_size(&mut self, id: WindowId, size: Vector2<f64>) {
        if let Some(node) = self.windows.get_mut(&id) {
            node.state.starting_size = size;
        }
    }

    pub fn set_background(&mut self, id: WindowId, color: Color) {
        if let Some(node) = self.windows.get_mut(&id) {
            node.state.background = color;
        }
    }

    /// Runs a window’s init hook.
    ///
    /// Commands queued during init are dropped.
    pub fn init(
        &mut self,
        id: WindowId,
        graph: &mut Graph,
        config: &EditorConfig,
    ) -> Result<(), TreeError> {
        let WindowTree { windows, widgets } = self;
        let node = windows.get_mut(&id).ok_or(TreeError::NoSuchWindow(id))?;
        let mut content = match node.content.take() {
            Some(content) => content,
            None => return Err(TreeError::NoSuchWindow(id)),
        };

        let mut commands = Vec::new();
        let result = {
            let mut cx = WindowCx::new(id, &mut node.state, widgets, graph, &mut commands, config);
            content.init(&mut cx)
        };
        node.content = Some(content);

        if !commands.is_empty() {
            warn!("dropping {} commands queued while initializing", commands.len());
        }
        result
    }

    /// Opens a window’s scope and draws its children, widgets and body.
    ///
    /// The first call also runs the window’s beginning hook. Moved and resized fire, in that
    /// order, when the window’s geometry differs from the previous frame.
    pub fn begin(&mut self, id: WindowId, frame: &mut Frame<'_>) {
        let (mut content, children, widget_ids) = {
            let WindowTree { windows, widgets } = self;
            let node = match windows.get_mut(&id) {
                Some(node) => node,
                None => {
                    debug!("tried to begin nonexistent window {:?}", id);
                    return;
                }
            };
            let mut content = match node.content.take() {
                Some(content) => content,
                None => {
                    debug!("window {} is already being drawn", node.state.label);
                    return;
                }
            };
            let state = &mut node.state;

            if !state.started {
                state.started = true;
                frame.surface.set_next_window_size(state.starting_size);
                let label = state.label.clone();
                let mut cx = WindowCx::new(
                    id,
                    state,
                    widgets,
                    &mut *frame.graph,
                    &mut *frame.commands,
                    frame.config,
                );
                if let Err(err) = content.beginning(&mut cx) {
                    error!("window {} failed to start: {}", label, err);
                }
            }

            frame.surface.push_background(state.background);
            let visible = {
                let mut cx = WindowCx::new(
                    id,
                    state,
                    widgets,
                    &mut *frame.graph,
                    &mut *frame.commands,
                    frame.config,
                );
                content.open(&mut cx, &mut *frame.surface)
            };
            if !visible {
                frame.surface.pop_background();
                node.content = Some(content);
                return;
            }
            state.open = true;

            let geometry = WindowGeometry {
                window: id,
                position: frame.surface.window_pos(),
                size: frame.surface.content_size(),
            };
            if state.position != Some(geometry.position) {
                state.position = Some(geometry.position);
                state.moved.emit(widgets, &geometry);
            }
            if state.size != Some(geometry.size) {
                state.size = Some(geometry.size);
                state.resized.emit(widgets, &geometry);
            }

            let children: Vec<WindowId> = state.children.values().copied().collect();
            let widget_ids: Vec<WidgetId> = state.widgets.values().copied().collect();
            (content, children, widget_ids)
        };

        for child in children {
            self.begin(child, frame);
            self.end(child, frame);
        }

        let parent_node = content.binding().map(|binding| binding.node);
        self.widgets.render(&widget_ids, parent_node, frame);

        let WindowTree { windows, widgets } = self;
        match windows.get_mut(&id) {
            Some(node) => {
                {
                    let mut cx = WindowCx::new(
                        id,
                        &mut node.state,
                        widgets,
                        &mut *frame.graph,
                        &mut *frame.commands,
                        frame.config,
                    );
                    content.body(&mut cx, &mut *frame.surface);
                }
                node.content = Some(content);
            }
            None => debug!("window {:?} went away while being drawn", id),
        }
    }

    /// Closes a window’s scope if [`WindowTree::begin`] opened it.
    pub fn end(&mut self, id: WindowId, frame: &mut Frame<'_>) {
        let WindowTree { windows, widgets } = self;
        let node = match windows.get_mut(&id) {
            Some(node) => node,
            None => return,
        };
        if !node.state.open {
            return;
        }
        let mut content = match node.content.take() {
            Some(content) => content,
            None => return,
        };

        node.state.open = false;
        frame.surface.pop_background();
        {
            let mut cx = WindowCx::new(
                id,
                &mut node.state,
                widgets,
                &mut *frame.graph,
                &mut *frame.commands,
                frame.config,
            );
            content.close(&mut cx, &mut *frame.surface);
        }
        node.content = Some(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_window;
    use crate::recorder::{DrawCommand, Recorder};
    use crate::window::WindowCx;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Counting {
        beginnings: usize,
        bodies: usize,
    }

    impl_window! {
        Counting;
        fn beginning(&mut self, _cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
            self.beginnings += 1;
            Ok(())
        }

        fn body(&mut self, _cx: &mut WindowCx<'_>, _ui: &mut dyn Surface) {
            self.bodies += 1;
        }
    }

    struct Harness {
        graph: Graph,
        drag: DragSlot,
        config: EditorConfig,
        recorder: Recorder,
    }

    impl Harness {
        fn new() -> Harness {
            Harness {
                graph: Graph::new(),
                drag: DragSlot::default(),
                config: EditorConfig::default(),
                recorder: Recorder::default(),
            }
        }

        fn frame(&mut self, tree: &mut WindowTree, root: WindowId) -> Vec<Command> {
            let mut commands = Vec::new();
            let mut frame = Frame {
                surface: &mut self.recorder,
                graph: &mut self.graph,
                drag: &mut self.drag,
                commands: &mut commands,
                config: &self.config,
            };
            tree.begin(root, &mut frame);
            tree.end(root, &mut frame);
            commands
        }
    }

    #[test]
    fn test_duplicate_child_key_is_rejected() {
        let mut tree = WindowTree::new();
        let root = tree.insert("root", Counting::default());
        let a = tree.insert("a", Counting::default());
        let b = tree.insert("b", Counting::default());

        tree.add(root, "child", a).unwrap();
        assert_eq!(
            tree.add(root, "child", b),
            Err(TreeError::DuplicateChild {
                key: "child".to_string()
            })
        );
        assert_eq!(tree.get(root, "child"), Some(a));
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn test_adding_a_child_elsewhere_moves_it() {
        let mut tree = WindowTree::new();
        let first = tree.insert("first", Counting::default());
        let second = tree.insert("second", Counting::default());
        let child = tree.insert("child", Counting::default());

        tree.add(first, "child", child).unwrap();
        tree.add(second, "moved", child).unwrap();
        assert_eq!(tree.parent(child), Some(second));
        assert!(tree.children(first).is_empty());
        assert_eq!(tree.get(second, "moved"), Some(child));

        let mut harness = Harness::new();
        harness.frame(&mut tree, first);
        assert_eq!(tree.content::<Counting>(child).unwrap().bodies, 0);

        tree.destroy(first);
        assert!(tree.exists(child));
        harness.frame(&mut tree, second);
        assert_eq!(tree.content::<Counting>(child).unwrap().bodies, 1);
    }

    #[test]
    fn test_beginning_runs_once() {
        let mut tree = WindowTree::new();
        let root = tree.insert("root", Counting::default());
        let child = tree.insert("child", Counting::default());
        tree.add(root, "child", child).unwrap();

        let mut harness = Harness::new();
        for _ in 0..3 {
            harness.frame(&mut tree, root);
        }

        let child = tree.content::<Counting>(child).unwrap();
        assert_eq!(child.beginnings, 1);
        assert_eq!(child.bodies, 3);
    }

    #[test]
    fn test_scopes_are_paired() {
        let mut tree = WindowTree::new();
        let root = tree.insert("root", Counting::default());
        let child = tree.insert("child", Counting::default());
        tree.add(root, "child", child).unwrap();

        let mut harness = Harness::new();
        harness.frame(&mut tree, root);

        let mut depth = 0i32;
        let mut backgrounds = 0i32;
        for command in harness.recorder.commands() {
            match command {
                DrawCommand::BeginWindow { .. } => depth += 1,
                DrawCommand::EndWindow => depth -= 1,
                DrawCommand::PushBackground(_) => backgrounds += 1,
                DrawCommand::PopBackground => backgrounds -= 1,
                _ => (),
            }
            assert!(depth >= 0 && backgrounds >= 0);
        }
        assert_eq!(depth, 0);
        assert_eq!(backgrounds, 0);
    }

    #[test]
    fn test_moved_fires_before_resized_and_only_on_change() {
        let mut tree = WindowTree::new();
        let root = tree.insert("root", Counting::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let moved = {
            let log = Arc::clone(&log);
            tree.moved(root)
                .unwrap()
                .subscribe(move |_, _: &WindowGeometry| log.lock().push("moved"))
        };
        let resized = {
            let log = Arc::clone(&log);
            tree.resized(root)
                .unwrap()
                .subscribe(move |_, _: &WindowGeometry| log.lock().push("resized"))
        };

        let mut harness = Harness::new();
        harness.frame(&mut tree, root);
        assert_eq!(*log.lock(), vec!["moved", "resized"]);

        harness.frame(&mut tree, root);
        assert_eq!(log.lock().len(), 2);

        let label = tree.label(root).unwrap().to_string();
        let size = harness.recorder.placement(&label).unwrap().size;
        harness
            .recorder
            .place(&label, cgmath::Point2::new(500., 10.), size);
        harness.frame(&mut tree, root);
        assert_eq!(*log.lock(), vec!["moved", "resized", "moved"]);

        drop((moved, resized));
    }

    #[test]
    fn test_destroy_releases_subscriptions_and_children() {
        let mut tree = WindowTree::new();
        let root = tree.insert("root", Counting::default());
        let child = tree.insert("child", Counting::default());
        let grandchild = tree.insert("grandchild", Counting::default());
        tree.add(root, "child", child).unwrap();
        tree.add(child, "grandchild", grandchild).unwrap();

        let signal = tree.moved(child).unwrap();
        signal.subscribe(|_, _| ()).forget();
        assert_eq!(signal.len(), 1);

        tree.remove(root, "child");
        assert!(!tree.exists(child));
        assert!(!tree.exists(grandchild));
        assert!(!tree.contains(root, "child"));
        assert!(signal.is_empty());

        // removing again is a no-op
        tree.remove(root, "child");
        assert_eq!(tree.len(), 1);
    }
}
