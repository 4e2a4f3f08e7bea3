//! Windows.

use crate::color::Color;
use crate::config::EditorConfig;
use crate::editor::Command;
use crate::error::TreeError;
use crate::events::{Signal, Subscription, WindowGeometry};
use crate::node_window::NodeBinding;
use crate::surface::{Surface, WindowOptions};
use crate::widget::{Widget, WidgetId, WidgetStore};
use cgmath::{Point2, Vector2};
use core::any::Any;
use core::fmt;
use reqgraph_model::Graph;
use std::collections::HashMap;
use uuid::Uuid;

/// A window identifier.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u32, u16, u16, [u8; 8]);

impl WindowId {
    pub(crate) fn new() -> WindowId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        WindowId(a, b, c, *d)
    }
}

/// Appends a fresh random suffix to a label so that two items with the same visible text don’t
/// collide.
pub fn unique_label(label: &str) -> String {
    format!("{}##{}", label, Uuid::new_v4())
}

pub(crate) const DEFAULT_STARTING_SIZE: Vector2<f64> = Vector2 { x: 300., y: 200. };

/// Implements the boilerplate parts of [`Window`].
///
/// ```ignore
/// impl_window! {
///     StructName;
///     fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) { ... }
///     (other window hooks, using normal rust syntax)
/// }
/// ```
#[macro_export]
macro_rules! impl_window {
    ($(#[$attr:meta])* $struct:ty; $($extra:tt)*) => {
        $(#[$attr])*
        impl $crate::Window for $struct {
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

/// The contents of a window.
///
/// The tree calls the hooks in this order: [`Window::init`] once when the window is created,
/// [`Window::beginning`] before its first frame, then [`Window::open`], [`Window::body`] and
/// [`Window::close`] every frame. Children and widgets are drawn between `open` and `body`.
///
/// This trait should probably be implemented using the [`impl_window`] macro.
pub trait Window: Any + fmt::Debug {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn init(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        let _ = cx;
        Ok(())
    }

    fn beginning(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        let _ = cx;
        Ok(())
    }

    /// Opens the window scope. Returns false if nothing is drawn this frame, in which case
    /// [`Window::close`] is not called either.
    fn open(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) -> bool {
        ui.begin_window(cx.label(), WindowOptions::default());
        true
    }

    fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        let _ = (cx, ui);
    }

    fn close(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        let _ = cx;
        ui.end_window();
    }

    /// The node and anchors this window presents, if it presents one.
    fn binding(&self) -> Option<NodeBinding> {
        None
    }
}

/// Tree bookkeeping for a window.
#[derive(Debug)]
pub(crate) struct WindowState {
    pub(crate) label: String,
    pub(crate) parent: Option<WindowId>,
    pub(crate) children: HashMap<String, WindowId>,
    pub(crate) widgets: HashMap<String, WidgetId>,
    pub(crate) position: Option<Point2<f64>>,
    pub(crate) size: Option<Vector2<f64>>,
    pub(crate) starting_size: Vector2<f64>,
    pub(crate) background: Color,
    pub(crate) started: bool,
    pub(crate) open: bool,
    pub(crate) moved: Signal<WindowGeometry>,
    pub(crate) resized: Signal<WindowGeometry>,
    pub(crate) subscriptions: Vec<Subscription>,
}

impl WindowState {
    pub(crate) fn new(label: String) -> WindowState {
        WindowState {
            label,
            parent: None,
            children: HashMap::new(),
            widgets: HashMap::new(),
            position: None,
            size: None,
            starting_size: DEFAULT_STARTING_SIZE,
            background: Color::BLACK,
            started: false,
            open: false,
            moved: Signal::new(),
            resized: Signal::new(),
            subscriptions: Vec::new(),
        }
    }

    pub(crate) fn attach_widget(
        &mut self,
        id: WindowId,
        widgets: &mut WidgetStore,
        key: &str,
        widget_id: WidgetId,
        mut widget: Box<dyn Widget>,
    ) -> Result<(), TreeError> {
        if self.widgets.contains_key(key) {
            return Err(TreeError::DuplicateWidget {
                key: key.to_string(),
                window: self.label.clone(),
            });
        }
        widget.set_parent(id);
        widgets.insert(widget_id, widget);
        self.widgets.insert(key.to_string(), widget_id);
        Ok(())
    }
}

/// Everything a window hook can reach.
pub struct WindowCx<'a> {
    pub(crate) id: WindowId,
    pub(crate) state: &'a mut WindowState,
    pub(crate) widgets: &'a mut WidgetStore,
    pub(crate) commands: &'a mut Vec<Command>,
    pub(crate) config: &'a EditorConfig,

    /// The graph being edited.
    pub graph: &'a mut Graph,
}

impl<'a> WindowCx<'a> {
    pub(crate) fn new(
        id: WindowId,
        state: &'a mut WindowState,
        widgets: &'a mut WidgetStore,
        graph: &'a mut Graph,
        commands: &'a mut Vec<Command>,
        config: &'a EditorConfig,
    ) -> WindowCx<'a> {
        WindowCx {
            id,
            state,
            widgets,
            commands,
            config,
            graph,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The unique window label.
    pub fn label(&self) -> &str {
        &self.state.label
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.state.parent
    }

    /// Last known screen position.
    pub fn position(&self) -> Point2<f64> {
        self.state.position.unwrap_or_else(|| Point2::new(0., 0.))
    }

    /// Last known content size.
    pub fn size(&self) -> Vector2<f64> {
        self.state.size.unwrap_or(self.state.starting_size)
    }

    /// Converts an offset in window coordinates to screen coordinates.
    pub fn screen_coordinate(&self, offset: Vector2<f64>) -> Point2<f64> {
        self.position() + offset
    }

    pub fn set_background(&mut self, color: Color) {
        self.state.background = color;
    }

    /// Sets the size the window opens with. Only has an effect before the first frame.
    pub fn set_starting_size(&mut self, size: Vector2<f64>) {
        self.state.starting_size = size;
    }

    /// Gives a widget to this window under a key that must be unique within the window.
    pub fn add_widget(
        &mut self,
        key: &str,
        id: WidgetId,
        widget: Box<dyn Widget>,
    ) -> Result<(), TreeError> {
        self.state
            .attach_widget(self.id, &mut *self.widgets, key, id, widget)
    }

    pub fn widgets(&self) -> &WidgetStore {
        &*self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetStore {
        &mut *self.widgets
    }

    /// Emitted when the window moves; also on its first frame.
    pub fn moved(&self) -> &Signal<WindowGeometry> {
        &self.state.moved
    }

    /// Emitted when the window is resized; also on its first frame.
    pub fn resized(&self) -> &Signal<WindowGeometry> {
        &self.state.resized
    }

    /// Keeps a subscription alive until the window is destroyed.
    pub fn keep(&mut self, subscription: Subscription) {
        self.state.subscriptions.push(subscription);
    }

    /// Queues a command for the editor to run after this frame.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn config(&self) -> &EditorConfig {
        self.config
    }
}
