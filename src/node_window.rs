//! Windows that present a single domain node.

use crate::anchor::{AnchorStyle, AnchorType, NodeAnchor};
use crate::config::EditorConfig;
use crate::error::TreeError;
use crate::events::WindowGeometry;
use crate::impl_window;
use crate::surface::Surface;
use crate::widget::{Widget, WidgetId, WidgetStore};
use crate::window::{unique_label, WindowCx};
use cgmath::{Point2, Vector2};
use reqgraph_model::{Node, NodeId, NodeKind};
use tracing::{debug, trace};

/// Distance of the top anchors below the window’s title bar.
const TITLE_BAR_OFFSET: f64 = 25.;

/// Distance of the left anchor from the window’s left edge.
const LEFT_INSET: f64 = 10.;

const COMMIT_TOOLTIP: &str = "Committing the node causes it to become permanently un-editable.";

/// The node a window presents and the anchors its links attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBinding {
    pub node: NodeId,
    pub up: WidgetId,
    pub down: WidgetId,
    /// Only commitable windows have change anchors.
    pub left: Option<WidgetId>,
    pub right: Option<WidgetId>,
}

/// An anchor waiting for its window to be initialized.
#[derive(Debug)]
struct PendingAnchor {
    id: WidgetId,
    anchor: Option<NodeAnchor>,
}

impl PendingAnchor {
    fn new(label: &str, anchor_type: AnchorType, style: AnchorStyle) -> PendingAnchor {
        PendingAnchor {
            id: WidgetId::new(),
            anchor: Some(NodeAnchor::new(label, anchor_type, style)),
        }
    }

    /// Binds the anchor and hands it to the window. Only the first call does anything.
    fn attach(&mut self, cx: &mut WindowCx<'_>, node: NodeId) -> Result<(), TreeError> {
        if let Some(mut anchor) = self.anchor.take() {
            anchor.bind(node);
            let key = anchor.label().to_string();
            cx.add_widget(&key, self.id, Box::new(anchor))?;
        }
        Ok(())
    }
}

/// Moves anchors to offsets computed from the window geometry whenever it moves or resizes.
fn follow_geometry<F>(cx: &mut WindowCx<'_>, place: F)
where
    F: 'static + Fn(&mut WidgetStore, &WindowGeometry) + Send + Clone,
{
    let moved = place.clone();
    let subscription = cx
        .moved()
        .subscribe(move |widgets: &mut WidgetStore, geometry: &WindowGeometry| {
            moved(widgets, geometry)
        });
    cx.keep(subscription);
    let subscription = cx
        .resized()
        .subscribe(move |widgets: &mut WidgetStore, geometry: &WindowGeometry| {
            place(widgets, geometry)
        });
    cx.keep(subscription);
}

fn set_anchor_center(widgets: &mut WidgetStore, anchor: WidgetId, center: Point2<f64>) {
    if let Some(anchor) = widgets.anchor_mut(anchor) {
        anchor.set_center(center);
    }
}

/// A window presenting one node, with an up anchor at the top and a down anchor at the bottom.
///
/// If no node was given before init, a fresh one of the window’s kind is added to the graph.
#[derive(Debug)]
pub struct NodeWindow {
    kind: NodeKind,
    node: Option<NodeId>,
    editable: bool,
    display_editable: bool,
    initialized: bool,
    up: PendingAnchor,
    down: PendingAnchor,
    id_text: String,
    editable_label: String,
    id_label: String,
}

impl NodeWindow {
    pub fn new(kind: NodeKind, config: &EditorConfig) -> NodeWindow {
        NodeWindow {
            kind,
            node: None,
            editable: config.default_editable,
            display_editable: config.display_editable_checkbox,
            initialized: false,
            up: PendingAnchor::new("##UpAnchor", AnchorType::Up, config.anchor),
            down: PendingAnchor::new("##DownAnchor", AnchorType::Down, config.anchor),
            id_text: String::new(),
            editable_label: unique_label("Enable Editing"),
            id_label: unique_label("##ID:"),
        }
    }

    /// Sets the node to present. Must be called before init to have any effect on the anchors.
    pub fn add_node(&mut self, node: NodeId) {
        self.node = Some(node);
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The node id as a string, or empty without a node.
    pub fn id_string(&self) -> String {
        self.node.map(|node| node.to_string()).unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn displays_editable_checkbox(&self) -> bool {
        self.display_editable
    }

    pub fn set_display_editable(&mut self, display: bool) {
        self.display_editable = display;
    }

    pub fn up_anchor(&self) -> WidgetId {
        self.up.id
    }

    pub fn down_anchor(&self) -> WidgetId {
        self.down.id
    }
}

impl_window! {
    NodeWindow;

    fn init(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        if self.initialized {
            return Ok(());
        }

        let node = match self.node {
            Some(node) => node,
            None => {
                let node = cx.graph.insert(Node::new(self.kind));
                trace!("created {} node {}", self.kind, node);
                self.node = Some(node);
                node
            }
        };
        match cx.graph.get_mut(node) {
            Some(node) if !node.is_initted() => node.init(),
            Some(_) => (),
            None => debug!("window presents node {} which is not in the graph", node),
        }

        self.up.attach(cx, node)?;
        self.down.attach(cx, node)?;

        let (up, down) = (self.up.id, self.down.id);
        follow_geometry(cx, move |widgets: &mut WidgetStore, geometry: &WindowGeometry| {
            let size = geometry.size;
            set_anchor_center(
                widgets,
                up,
                geometry.screen(Vector2::new(size.x / 2., TITLE_BAR_OFFSET)),
            );
            set_anchor_center(
                widgets,
                down,
                geometry.screen(Vector2::new(size.x / 2., size.y)),
            );
        });

        self.initialized = true;
        Ok(())
    }

    fn beginning(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        if self.node.is_none() || !self.initialized {
            crate::Window::init(self, cx)?;
        }
        if self.id_text.is_empty() {
            self.id_text = self.id_string();
        }
        Ok(())
    }

    fn body(&mut self, _cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        if self.display_editable {
            ui.checkbox(&self.editable_label, &mut self.editable);
        }
        ui.input_text(&self.id_label, &mut self.id_text, true);
    }

    fn binding(&self) -> Option<NodeBinding> {
        self.node.map(|node| NodeBinding {
            node,
            up: self.up.id,
            down: self.down.id,
            left: None,
            right: None,
        })
    }
}

/// A node window that can commit its node, with left and right anchors for change links.
#[derive(Debug)]
pub struct CommitableNodeWindow {
    base: NodeWindow,
    left: PendingAnchor,
    right: PendingAnchor,
    commit_label: String,
}

impl CommitableNodeWindow {
    pub fn new(kind: NodeKind, config: &EditorConfig) -> CommitableNodeWindow {
        CommitableNodeWindow {
            base: NodeWindow::new(kind, config),
            left: PendingAnchor::new("##LeftAnchor", AnchorType::Left, config.anchor),
            right: PendingAnchor::new("##RightAnchor", AnchorType::Right, config.anchor),
            commit_label: unique_label("Commit"),
        }
    }

    pub fn base(&self) -> &NodeWindow {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut NodeWindow {
        &mut self.base
    }

    pub fn left_anchor(&self) -> WidgetId {
        self.left.id
    }

    pub fn right_anchor(&self) -> WidgetId {
        self.right.id
    }

    pub fn commit_label(&self) -> &str {
        &self.commit_label
    }
}

impl_window! {
    CommitableNodeWindow;

    fn init(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        if self.base.initialized {
            return Ok(());
        }
        crate::Window::init(&mut self.base, cx)?;
        let node = match self.base.node {
            Some(node) => node,
            None => return Ok(()),
        };
        self.left.attach(cx, node)?;
        self.right.attach(cx, node)?;

        let (left, right) = (self.left.id, self.right.id);
        follow_geometry(cx, move |widgets: &mut WidgetStore, geometry: &WindowGeometry| {
            let size = geometry.size;
            set_anchor_center(
                widgets,
                left,
                geometry.screen(Vector2::new(LEFT_INSET, TITLE_BAR_OFFSET)),
            );
            set_anchor_center(
                widgets,
                right,
                geometry.screen(Vector2::new(size.x, TITLE_BAR_OFFSET)),
            );
        });
        Ok(())
    }

    fn beginning(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        if self.base.node.is_none() || !self.base.initialized {
            crate::Window::init(self, cx)?;
        }
        crate::Window::beginning(&mut self.base, cx)
    }

    fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        let committed = self
            .base
            .node
            .and_then(|node| cx.graph.get(node))
            .map_or(false, Node::is_committed);
        if committed {
            self.base.display_editable = false;
            self.base.editable = false;
        }

        crate::Window::body(&mut self.base, cx, ui);

        if !committed && self.base.node.is_some() {
            if ui.button(&self.commit_label) {
                if let Some(node) = self.base.node.and_then(|node| cx.graph.get_mut(node)) {
                    node.commit();
                    debug!("committed node {}", node.id());
                }
            }
            ui.item_tooltip(COMMIT_TOOLTIP);
        }
    }

    fn binding(&self) -> Option<NodeBinding> {
        crate::Window::binding(&self.base).map(|binding| NodeBinding {
            left: Some(self.left.id),
            right: Some(self.right.id),
            ..binding
        })
    }
}
