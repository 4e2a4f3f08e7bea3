//! Widgets: per-frame UI elements owned by a window.

use crate::anchor::{self, Connection, DragSlot, NodeAnchor};
use crate::config::EditorConfig;
use crate::surface::Surface;
use crate::tree::Frame;
use crate::window::WindowId;
use core::any::Any;
use core::fmt;
use reqgraph_model::{Graph, NodeId};
use std::collections::HashMap;
use tracing::{debug, trace};
use uuid::Uuid;

/// A widget identifier.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u32, u16, u16, [u8; 8]);

impl WidgetId {
    pub fn new() -> WidgetId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        WidgetId(a, b, c, *d)
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        WidgetId::new()
    }
}

/// Implements the boilerplate parts of [`Widget`](crate::Widget).
///
/// ```ignore
/// impl_widget! {
///     StructName;
///     fn set_parent(&mut self, parent: WindowId) { ... }
///     (other widget methods, using normal rust syntax)
/// }
/// ```
#[macro_export]
macro_rules! impl_widget {
    ($(#[$attr:meta])* $struct:ty; $($extra:tt)*) => {
        $(#[$attr])*
        impl $crate::Widget for $struct {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            $($extra)*
        }
    };
}

/// A UI element drawn inside its parent window’s scope.
pub trait Widget: Any + fmt::Debug {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Called once when the widget is added to a window.
    fn set_parent(&mut self, parent: WindowId);

    fn parent(&self) -> Option<WindowId>;

    fn label(&self) -> &str;

    /// Draws the widget. Called every frame while its window is open.
    fn begin(&mut self, cx: &mut WidgetCx<'_>) {
        let _ = cx;
    }

    /// Called right after [`Widget::begin`].
    fn end(&mut self, cx: &mut WidgetCx<'_>) {
        let _ = cx;
    }

    /// Called when the widget is destroyed along with its window.
    ///
    /// The widget itself is no longer in the store at this point.
    fn detach(&mut self, id: WidgetId, peers: &mut WidgetStore) {
        let _ = (id, peers);
    }
}

/// A change to other widgets, applied after the requesting widget has finished drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Request {
    /// Connect or disconnect an anchor and a dropped payload.
    Toggle { target: WidgetId, dropped: Connection },
}

/// Everything a widget can reach while drawing.
pub struct WidgetCx<'a> {
    pub(crate) id: WidgetId,
    pub(crate) surface: &'a mut dyn Surface,
    pub(crate) drag: &'a mut DragSlot,
    pub(crate) parent_node: Option<NodeId>,
    pub(crate) peers: &'a WidgetStore,
    pub(crate) requests: &'a mut Vec<Request>,
    pub(crate) config: &'a EditorConfig,
}

impl<'a> WidgetCx<'a> {
    /// The widget being drawn.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// The node bound to the parent window, if any.
    pub fn parent_node(&self) -> Option<NodeId> {
        self.parent_node
    }

    /// Every other widget. The one being drawn is not in here.
    pub fn peers(&self) -> &WidgetStore {
        self.peers
    }

    pub fn config(&self) -> &EditorConfig {
        self.config
    }

    pub(crate) fn request(&mut self, request: Request) {
        self.requests.push(request);
    }
}

/// Owns every widget in a window tree.
#[derive(Debug, Default)]
pub struct WidgetStore {
    widgets: HashMap<WidgetId, Box<dyn Widget>>,
}

impl WidgetStore {
    pub fn new() -> WidgetStore {
        WidgetStore::default()
    }

    pub(crate) fn insert(&mut self, id: WidgetId, widget: Box<dyn Widget>) {
        self.widgets.insert(id, widget);
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn get(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets.get(&id).map(|widget| &**widget)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        self.widgets.get_mut(&id).map(|widget| &mut **widget)
    }

    /// Returns the widget if it’s an anchor.
    pub fn anchor(&self, id: WidgetId) -> Option<&NodeAnchor> {
        self.get(id)
            .and_then(|widget| widget.as_any().downcast_ref::<NodeAnchor>())
    }

    pub fn anchor_mut(&mut self, id: WidgetId) -> Option<&mut NodeAnchor> {
        self.get_mut(id)
            .and_then(|widget| widget.as_any_mut().downcast_mut::<NodeAnchor>())
    }

    /// Removes a widget and lets it detach from its peers.
    pub(crate) fn destroy(&mut self, id: WidgetId) {
        if let Some(mut widget) = self.widgets.remove(&id) {
            trace!("destroying widget {}", widget.label());
            widget.detach(id, self);
        }
    }

    /// Draws the given widgets in order.
    pub(crate) fn render(
        &mut self,
        ids: &[WidgetId],
        parent_node: Option<NodeId>,
        frame: &mut Frame<'_>,
    ) {
        for id in ids {
            let mut widget = match self.widgets.remove(id) {
                Some(widget) => widget,
                None => {
                    debug!("widget {:?} is missing from the store", id);
                    continue;
                }
            };

            let mut requests = Vec::new();
            {
                let mut cx = WidgetCx {
                    id: *id,
                    surface: &mut *frame.surface,
                    drag: &mut *frame.drag,
                    parent_node,
                    peers: &*self,
                    requests: &mut requests,
                    config: frame.config,
                };
                widget.begin(&mut cx);
                widget.end(&mut cx);
            }
            self.widgets.insert(*id, widget);

            for request in requests {
                self.apply(request, &mut *frame.graph);
            }
        }
    }

    fn apply(&mut self, request: Request, graph: &mut Graph) {
        match request {
            Request::Toggle { target, dropped } => {
                match anchor::toggle(self, graph, target, dropped) {
                    Ok(true) => debug!("linked {} by drag and drop", dropped.node),
                    Ok(false) => debug!("unlinked {} by drag and drop", dropped.node),
                    Err(rejection) => debug!("drop of {} rejected: {}", dropped.node, rejection),
                }
            }
        }
    }
}
