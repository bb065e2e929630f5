//! Geometric primitives in device units (points)

use serde::{Deserialize, Serialize};

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncate float coordinates toward zero
    pub fn from_f32(x: f32, y: f32) -> Self {
        Self::new(x as i32, y as i32)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A rectangle anchored at its lower-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    #[serde(alias = "w")]
    pub width: i32,
    #[serde(alias = "h")]
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The four corners in drawing order, inclusive of the last pixel row/column
    pub fn corners(&self) -> [Point; 4] {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        [
            Point::new(x, y),
            Point::new(x, y + h - 1),
            Point::new(x + w - 1, y + h - 1),
            Point::new(x + w - 1, y),
        ]
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + 0.5 * self.width as f32,
            self.y as f32 + 0.5 * self.height as f32,
        )
    }
}

/// DSC bounding box, lower-left and upper-right corners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> i32 {
        (self.y1 - self.y0).abs()
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x0, y0, x1, y1]: [i32; 4]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_corners_are_inclusive() {
        let r = Rect::new(10, 10, 50, 30);
        assert_eq!(
            r.corners(),
            [
                Point::new(10, 10),
                Point::new(10, 39),
                Point::new(59, 39),
                Point::new(59, 10),
            ]
        );
        assert_eq!(r.center(), (35.0, 25.0));
    }

    #[test]
    fn from_f32_truncates_toward_zero() {
        assert_eq!(Point::from_f32(2.9, -2.9), Point::new(2, -2));
    }
}
