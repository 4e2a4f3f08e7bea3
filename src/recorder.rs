//! A headless [`Surface`] that records draw commands and plays back scripted input.

use crate::color::Color;
use crate::rect::Rect;
use crate::surface::{Interaction, Layer, Surface, WindowOptions};
use cgmath::{Point2, Vector2};
use std::collections::{HashMap, VecDeque};

/// A recorded draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginWindow {
        label: String,
        options: WindowOptions,
    },
    EndWindow,
    PushBackground(Color),
    PopBackground,
    Line {
        layer: Layer,
        from: Point2<f64>,
        to: Point2<f64>,
        color: Color,
    },
    Bezier {
        layer: Layer,
        points: [Point2<f64>; 4],
        color: Color,
        thickness: f64,
    },
    Circle {
        layer: Layer,
        center: Point2<f64>,
        radius: f64,
        color: Color,
    },
    Text(String),
    Button(String),
    Checkbox {
        label: String,
        value: bool,
    },
    InputText {
        label: String,
        value: String,
        read_only: bool,
    },
    Tooltip(String),
    MenuBar,
    Menu(String),
    MenuItem(String),
}

/// Where a window sits on the recorder’s screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point2<f64>,
    pub size: Vector2<f64>,
}

const DEFAULT_WINDOW_SIZE: Vector2<f64> = Vector2 { x: 300., y: 200. };
const CASCADE_STEP: f64 = 30.;

/// Returns true if `name` identifies the item with the given label.
///
/// Either the whole label matches, or the label is `name` followed by a `##` suffix.
fn label_matches(label: &str, name: &str) -> bool {
    if label == name {
        return true;
    }
    !name.is_empty() && label.starts_with(name) && label[name.len()..].starts_with("##")
}

/// Removes the first scripted entry matching the label.
fn take_scripted(script: &mut Vec<String>, label: &str) -> bool {
    match script.iter().position(|name| label_matches(label, name)) {
        Some(index) => {
            script.remove(index);
            true
        }
        None => false,
    }
}

/// A recording surface.
///
/// Windows open at cascading positions unless placed with [`Recorder::place`]. Scripted clicks,
/// checkbox toggles, text input and close requests are consumed by the first matching item.
#[derive(Debug)]
pub struct Recorder {
    commands: VecDeque<DrawCommand>,
    viewport: Vector2<f64>,
    windows: HashMap<String, Placement>,
    stack: Vec<String>,
    next_size: Option<Vector2<f64>>,
    next_position: Option<Point2<f64>>,
    cascade: Point2<f64>,
    pointer: Point2<f64>,
    down: bool,
    released: bool,
    press_origin: Option<Point2<f64>>,
    clicks: Vec<String>,
    toggles: Vec<String>,
    typed: Vec<(String, String)>,
    closes: Vec<String>,
    frames: u64,
}

impl Recorder {
    pub fn new(viewport: Vector2<f64>) -> Recorder {
        Recorder {
            commands: VecDeque::new(),
            viewport,
            windows: HashMap::new(),
            stack: Vec::new(),
            next_size: None,
            next_position: None,
            cascade: Point2::new(CASCADE_STEP, CASCADE_STEP),
            pointer: Point2::new(0., 0.),
            down: false,
            released: false,
            press_origin: None,
            clicks: Vec::new(),
            toggles: Vec::new(),
            typed: Vec::new(),
            closes: Vec::new(),
            frames: 0,
        }
    }

    /// Moves a window, as if the user had dragged it.
    pub fn place(&mut self, label: &str, position: Point2<f64>, size: Vector2<f64>) {
        self.windows
            .insert(label.to_string(), Placement { position, size });
    }

    /// Returns where a window was last placed.
    pub fn placement(&self, label: &str) -> Option<Placement> {
        self.windows.get(label).copied()
    }

    /// Number of frames begun so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn move_pointer(&mut self, position: Point2<f64>) {
        self.pointer = position;
    }

    /// Presses the pointer button at the current pointer position.
    pub fn press(&mut self) {
        self.down = true;
        self.released = false;
        self.press_origin = Some(self.pointer);
    }

    /// Releases the pointer button. The release is visible for one frame.
    pub fn release(&mut self) {
        if self.down {
            self.down = false;
            self.released = true;
        }
    }

    /// Clicks the next button or menu item matching `name`.
    pub fn click(&mut self, name: &str) {
        self.clicks.push(name.to_string());
    }

    /// Toggles the next checkbox matching `name`.
    pub fn toggle(&mut self, name: &str) {
        self.toggles.push(name.to_string());
    }

    /// Replaces the contents of the next editable text input matching `name`.
    pub fn type_text(&mut self, name: &str, text: &str) {
        self.typed.push((name.to_string(), text.to_string()));
    }

    /// Presses the close button of the next closable window matching `name`.
    pub fn close(&mut self, name: &str) {
        self.closes.push(name.to_string());
    }

    /// Recorded commands, oldest first.
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Drains recorded commands, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = DrawCommand> + '_ {
        struct DrainIterator<'a>(&'a mut Recorder);
        impl<'a> Iterator for DrainIterator<'a> {
            type Item = DrawCommand;
            fn next(&mut self) -> Option<DrawCommand> {
                self.0.commands.pop_front()
            }
        }

        DrainIterator(self)
    }

    /// Returns all recorded text items.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns all recorded curves.
    pub fn curves(&self) -> Vec<[Point2<f64>; 4]> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Bezier { points, .. } => Some(*points),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn moved_since_press(&self) -> bool {
        self.press_origin
            .map_or(false, |origin| origin != self.pointer)
    }

    fn current(&self) -> Option<Placement> {
        self.stack
            .last()
            .and_then(|label| self.windows.get(label))
            .copied()
    }
}

impl Default for Recorder {
    fn default() -> Recorder {
        Recorder::new(Vector2::new(1280., 720.))
    }
}

impl Surface for Recorder {
    fn begin_frame(&mut self) {
        self.frames += 1;
    }

    fn end_frame(&mut self) {
        if !self.down {
            self.released = false;
            self.press_origin = None;
        }
    }

    fn viewport_size(&self) -> Vector2<f64> {
        self.viewport
    }

    fn set_next_window_size(&mut self, size: Vector2<f64>) {
        self.next_size = Some(size);
    }

    fn set_next_window_pos(&mut self, position: Point2<f64>) {
        self.next_position = Some(position);
    }

    fn begin_window(&mut self, label: &str, options: WindowOptions) -> bool {
        let next_size = self.next_size.take();
        let next_position = self.next_position.take();
        let cascade = &mut self.cascade;
        let placement = self.windows.entry(label.to_string()).or_insert_with(|| {
            let position = *cascade;
            *cascade = position + Vector2::new(CASCADE_STEP, CASCADE_STEP);
            Placement {
                position,
                size: DEFAULT_WINDOW_SIZE,
            }
        });
        if let Some(size) = next_size {
            placement.size = size;
        }
        if let Some(position) = next_position {
            placement.position = position;
        }

        self.stack.push(label.to_string());
        self.commands.push_back(DrawCommand::BeginWindow {
            label: label.to_string(),
            options,
        });

        !(options.closable && take_scripted(&mut self.closes, label))
    }

    fn end_window(&mut self) {
        self.stack.pop();
        self.commands.push_back(DrawCommand::EndWindow);
    }

    fn window_pos(&self) -> Point2<f64> {
        self.current()
            .map_or(Point2::new(0., 0.), |placement| placement.position)
    }

    fn content_size(&self) -> Vector2<f64> {
        self.current()
            .map_or(self.viewport, |placement| placement.size)
    }

    fn push_background(&mut self, color: Color) {
        self.commands.push_back(DrawCommand::PushBackground(color));
    }

    fn pop_background(&mut self) {
        self.commands.push_back(DrawCommand::PopBackground);
    }

    fn line(&mut self, layer: Layer, from: Point2<f64>, to: Point2<f64>, color: Color) {
        self.commands.push_back(DrawCommand::Line {
            layer,
            from,
            to,
            color,
        });
    }

    fn bezier(&mut self, layer: Layer, points: [Point2<f64>; 4], color: Color, thickness: f64) {
        self.commands.push_back(DrawCommand::Bezier {
            layer,
            points,
            color,
            thickness,
        });
    }

    fn circle_filled(&mut self, layer: Layer, center: Point2<f64>, radius: f64, color: Color) {
        self.commands.push_back(DrawCommand::Circle {
            layer,
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str) {
        self.commands.push_back(DrawCommand::Text(text.to_string()));
    }

    fn same_line(&mut self) {}

    fn button(&mut self, label: &str) -> bool {
        self.commands.push_back(DrawCommand::Button(label.to_string()));
        take_scripted(&mut self.clicks, label)
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let toggled = take_scripted(&mut self.toggles, label);
        if toggled {
            *value = !*value;
        }
        self.commands.push_back(DrawCommand::Checkbox {
            label: label.to_string(),
            value: *value,
        });
        toggled
    }

    fn input_text(&mut self, label: &str, value: &mut String, read_only: bool) -> bool {
        let mut edited = false;
        if !read_only {
            if let Some(index) = self
                .typed
                .iter()
                .position(|(name, _)| label_matches(label, name))
            {
                let (_, text) = self.typed.remove(index);
                *value = text;
                edited = true;
            }
        }
        self.commands.push_back(DrawCommand::InputText {
            label: label.to_string(),
            value: value.clone(),
            read_only,
        });
        edited
    }

    fn item_tooltip(&mut self, text: &str) {
        self.commands.push_back(DrawCommand::Tooltip(text.to_string()));
    }

    fn begin_main_menu_bar(&mut self) -> bool {
        self.commands.push_back(DrawCommand::MenuBar);
        true
    }

    fn end_main_menu_bar(&mut self) {}

    fn begin_menu(&mut self, label: &str) -> bool {
        self.commands.push_back(DrawCommand::Menu(label.to_string()));
        true
    }

    fn end_menu(&mut self) {}

    fn menu_item(&mut self, label: &str) -> bool {
        self.commands
            .push_back(DrawCommand::MenuItem(label.to_string()));
        take_scripted(&mut self.clicks, label)
    }

    fn interact(&mut self, _label: &str, bounds: Rect) -> Interaction {
        let hovered = bounds.contains(self.pointer);
        let started_inside = self
            .press_origin
            .map_or(false, |origin| bounds.contains(origin));
        let moved = self.moved_since_press();
        Interaction {
            hovered,
            drag_source: self.down && started_inside && moved,
            dropped: self.released && moved && !started_inside && hovered,
        }
    }

    fn pointer_pos(&self) -> Point2<f64> {
        self.pointer
    }

    fn is_pointer_down(&self) -> bool {
        self.down
    }

    fn is_pointer_dragging(&self) -> bool {
        self.down && self.moved_since_press()
    }
}
