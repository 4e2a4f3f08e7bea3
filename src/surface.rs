//! The immediate-mode drawing surface windows render into.

use crate::color::Color;
use crate::rect::Rect;
use cgmath::{Point2, Vector2};

/// Draw layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// The current window’s draw list.
    Window,

    /// Drawn on top of every window.
    Foreground,
}

/// Flags for opening a window scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowOptions {
    /// Stays behind every other window and can’t be moved or resized.
    pub backdrop: bool,

    /// Has a menu bar.
    pub menu_bar: bool,

    /// Has a close button.
    pub closable: bool,
}

/// What the pointer did to a hit region this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interaction {
    /// The pointer is over the region.
    pub hovered: bool,

    /// A drag started inside the region and is still going.
    pub drag_source: bool,

    /// A drag that started elsewhere was released over the region.
    pub dropped: bool,
}

/// An immediate-mode UI backend.
///
/// All coordinates are screen coordinates. Item labels follow the `visible##id` convention: only
/// the part before `##` is displayed, and the whole label identifies the item.
pub trait Surface {
    /// Called once at the start of each frame.
    fn begin_frame(&mut self) {}

    /// Called once at the end of each frame.
    fn end_frame(&mut self) {}

    /// Returns the size of the whole display.
    fn viewport_size(&self) -> Vector2<f64>;

    /// Sets the size of the next window opened with [`Surface::begin_window`].
    fn set_next_window_size(&mut self, size: Vector2<f64>);

    /// Sets the position of the next window opened with [`Surface::begin_window`].
    fn set_next_window_pos(&mut self, position: Point2<f64>);

    /// Opens a window scope. Must be paired with [`Surface::end_window`].
    ///
    /// Returns false if the user asked to close a closable window.
    fn begin_window(&mut self, label: &str, options: WindowOptions) -> bool;

    /// Closes the innermost window scope.
    fn end_window(&mut self);

    /// Position of the innermost open window.
    fn window_pos(&self) -> Point2<f64>;

    /// Content size of the innermost open window.
    fn content_size(&self) -> Vector2<f64>;

    /// Pushes a window background color.
    fn push_background(&mut self, color: Color);

    /// Pops a window background color.
    fn pop_background(&mut self);

    fn line(&mut self, layer: Layer, from: Point2<f64>, to: Point2<f64>, color: Color);

    /// Draws a cubic bezier curve through four control points.
    fn bezier(&mut self, layer: Layer, points: [Point2<f64>; 4], color: Color, thickness: f64);

    fn circle_filled(&mut self, layer: Layer, center: Point2<f64>, radius: f64, color: Color);

    fn text(&mut self, text: &str);

    /// Places the next item on the same line as the previous one.
    fn same_line(&mut self);

    /// Returns true if the button was clicked.
    fn button(&mut self, label: &str) -> bool;

    /// Returns true if the value was toggled.
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Returns true if the value was edited.
    fn input_text(&mut self, label: &str, value: &mut String, read_only: bool) -> bool;

    /// Shows a tooltip while the previous item is hovered.
    fn item_tooltip(&mut self, text: &str);

    /// Returns true if the main menu bar is open. Only then must it be closed.
    fn begin_main_menu_bar(&mut self) -> bool;
    fn end_main_menu_bar(&mut self);

    /// Returns true if the menu is open. Only then must it be closed.
    fn begin_menu(&mut self, label: &str) -> bool;
    fn end_menu(&mut self);

    /// Returns true if the item was chosen.
    fn menu_item(&mut self, label: &str) -> bool;

    /// Registers a hit region for this frame and reports pointer interaction with it.
    fn interact(&mut self, label: &str, bounds: Rect) -> Interaction;

    fn pointer_pos(&self) -> Point2<f64>;
    fn is_pointer_down(&self) -> bool;

    /// Returns true if the pointer is down and has moved since it was pressed.
    fn is_pointer_dragging(&self) -> bool;
}
