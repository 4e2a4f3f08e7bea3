use crate::color::Color;
use crate::error::TreeError;
use crate::impl_window;
use crate::surface::{Layer, Surface};
use crate::window::WindowCx;
use cgmath::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Grid appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStyle {
    pub square_size: f64,
    pub line_color: Color,
    pub background: Color,
}

impl Default for GridStyle {
    fn default() -> GridStyle {
        GridStyle {
            square_size: 20.,
            line_color: Color::rgba8(211, 211, 211, 50),
            background: Color::new(0.27, 0.31, 0.33, 1.),
        }
    }
}

/// Draws square grid lines and a border over a window’s content area.
pub fn draw_grid(ui: &mut dyn Surface, style: &GridStyle, origin: Point2<f64>, size: Vector2<f64>) {
    let at = |x: f64, y: f64| origin + Vector2::new(x, y);
    let color = style.line_color;

    // a zero step would never finish
    if style.square_size > 0. {
        let mut y = 0.;
        while y < size.y {
            ui.line(Layer::Window, at(0., y), at(size.x, y), color);
            y += style.square_size;
        }
        let mut x = 0.;
        while x < size.x {
            ui.line(Layer::Window, at(x, 0.), at(x, size.y), color);
            x += style.square_size;
        }
    }

    ui.line(Layer::Window, at(0., 0.), at(0., size.y), color);
    ui.line(Layer::Window, at(0., 0.), at(size.x, 0.), color);
    ui.line(Layer::Window, at(size.x, 0.), at(size.x, size.y), color);
    ui.line(Layer::Window, at(0., size.y), at(size.x, size.y), color);
}

/// A window with a grid background.
#[derive(Debug, Default)]
pub struct GridWindow {
    style: GridStyle,
}

impl GridWindow {
    pub fn new(style: GridStyle) -> GridWindow {
        GridWindow { style }
    }

    pub fn style(&self) -> &GridStyle {
        &self.style
    }

    pub fn set_square_size(&mut self, size: f64) {
        self.style.square_size = size;
    }

    pub fn set_line_color(&mut self, color: Color) {
        self.style.line_color = color;
    }
}

impl_window! {
    GridWindow;

    fn beginning(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        cx.set_background(self.style.background);
        Ok(())
    }

    fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        draw_grid(ui, &self.style, cx.position(), cx.size());
    }
}
