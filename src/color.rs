use serde::{Deserialize, Serialize};

/// An RGBA color with components between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::new(1., 1., 1., 1.);
    pub const RED: Color = Color::new(1., 0., 0., 1.);
    pub const BLACK: Color = Color::new(0., 0., 0., 1.);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// Creates a color from 8-bit components.
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: f64::from(r) / 255.,
            g: f64::from(g) / 255.,
            b: f64::from(b) / 255.,
            a: f64::from(a) / 255.,
        }
    }
}
