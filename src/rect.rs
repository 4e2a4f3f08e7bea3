//! Hit regions.

use cgmath::{Point2, Vector2};

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top left corner.
    pub origin: Point2<f64>,
    pub size: Vector2<f64>,
}

impl Rect {
    /// The square of side `2 * radius` centered on `center`.
    pub fn around(center: Point2<f64>, radius: f64) -> Rect {
        Rect {
            origin: center - Vector2::new(radius, radius),
            size: Vector2::new(radius * 2., radius * 2.),
        }
    }

    pub fn center(&self) -> Point2<f64> {
        self.origin + self.size / 2.
    }

    /// Includes the top and left edges but not the bottom and right ones.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        let max = self.origin + self.size;
        (self.origin.x..max.x).contains(&point.x) && (self.origin.y..max.y).contains(&point.y)
    }
}

#[test]
fn test_rect_around_is_a_square_hit_box() {
    let rect = Rect::around(Point2::new(10., 10.), 5.);
    assert_eq!(rect.origin, Point2::new(5., 5.));
    assert_eq!(rect.center(), Point2::new(10., 10.));
    // corners of the square count even though they’re outside the circle
    assert!(rect.contains(Point2::new(5.5, 5.5)));
    assert!(!rect.contains(Point2::new(15., 10.)));
}
