use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Image or canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: usize,
    pub height: usize,
}

impl CanvasSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }
}

/// Four points in canonical order: bottom-left, bottom-right, top-right, top-left.
///
/// "Bottom" is the side with larger image y, so on an upright image the
/// corners run counter-clockwise on screen starting at the lower left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f32>; 4],
}

impl Quad {
    pub const BOTTOM_LEFT: usize = 0;
    pub const BOTTOM_RIGHT: usize = 1;
    pub const TOP_RIGHT: usize = 2;
    pub const TOP_LEFT: usize = 3;

    pub fn new(corners: [Point2<f32>; 4]) -> Self {
        Self { corners }
    }

    /// The full image frame `(0,h) (w,h) (w,0) (0,0)`.
    pub fn from_canvas(size: CanvasSize) -> Self {
        let w = size.width as f32;
        let h = size.height as f32;
        Self::new([
            Point2::new(0.0, h),
            Point2::new(w, h),
            Point2::new(w, 0.0),
            Point2::new(0.0, 0.0),
        ])
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        self.corners[Self::BOTTOM_LEFT]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        self.corners[Self::BOTTOM_RIGHT]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f32> {
        self.corners[Self::TOP_RIGHT]
    }

    #[inline]
    pub fn top_left(&self) -> Point2<f32> {
        self.corners[Self::TOP_LEFT]
    }

    /// Shift every corner by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.corners.map(|p| Point2::new(p.x + dx, p.y + dy)))
    }

    pub fn extent(&self) -> BoundingExtent {
        BoundingExtent::of(&self.corners)
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingExtent {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingExtent {
    pub fn of(points: &[Point2<f32>]) -> Self {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Pixel canvas large enough for `width × height`, rounded to nearest.
    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(
            self.width.round().max(1.0) as usize,
            self.height.round().max(1.0) as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_quad_is_in_canonical_order() {
        let q = Quad::from_canvas(CanvasSize::new(640, 480));
        assert_eq!(q.bottom_left(), Point2::new(0.0, 480.0));
        assert_eq!(q.bottom_right(), Point2::new(640.0, 480.0));
        assert_eq!(q.top_right(), Point2::new(640.0, 0.0));
        assert_eq!(q.top_left(), Point2::new(0.0, 0.0));
    }

    #[test]
    fn extent_tracks_translation() {
        let q = Quad::from_canvas(CanvasSize::new(10, 20)).translated(-3.0, 4.0);
        let e = q.extent();
        assert_eq!((e.min_x, e.max_x), (-3.0, 7.0));
        assert_eq!((e.min_y, e.max_y), (4.0, 24.0));
        assert_eq!((e.width, e.height), (10.0, 20.0));
        assert_eq!(e.canvas_size(), CanvasSize::new(10, 20));
    }
}
