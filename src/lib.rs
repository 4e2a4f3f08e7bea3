//! Windows and widgets for a requirements graph editor.
//!
//! Windows form a tree owned by a [`WindowTree`] and render every frame into an immediate-mode
//! [`Surface`]. Node windows present one node of a [`Graph`](reqgraph_model::Graph) each and carry
//! [`NodeAnchor`]s; dragging one anchor onto a compatible one links or unlinks the two nodes. The
//! [`WindowFactory`] builds windows for a whole graph and replays its links onto their anchors.
//!
//! An [`Editor`] ties it together: it owns the tree, the graph, and a worker pool that lists,
//! loads and saves graphs without blocking the frame loop.

pub mod anchor;
pub mod color;
mod config;
mod editor;
mod entity;
mod error;
pub mod events;
mod factory;
mod grid;
mod locator;
mod node_window;
mod rect;
pub mod recorder;
pub mod registry;
mod surface;
mod tree;
mod widget;
#[macro_use]
mod window;

pub use anchor::{AnchorStyle, AnchorType, Connection, DragPayload, DragSlot, NodeAnchor, Rejection};
pub use config::EditorConfig;
pub use editor::{Command, Editor, LoadEvent, NodeEditorWindow};
pub use entity::EntityWindow;
pub use error::{EditorError, TreeError};
pub use factory::{ConnectReport, WindowFactory};
pub use grid::{draw_grid, GridStyle, GridWindow};
pub use locator::LocatorWindow;
pub use node_window::{CommitableNodeWindow, NodeBinding, NodeWindow};
pub use rect::Rect;
pub use surface::{Interaction, Layer, Surface, WindowOptions};
pub use tree::{Frame, WindowTree};
pub use widget::{Widget, WidgetCx, WidgetId, WidgetStore};
pub use window::{unique_label, Window, WindowCx, WindowId};
