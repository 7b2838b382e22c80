//! In-memory 2D drawing context used as the canvas host.
//!
//! Keeps a current affine transform and a display list of filled polygons
//! in device pixels. The display list is rebuilt every frame.

use nalgebra::{Matrix3, Point2, Vector2};

use crate::engine::target::CanvasHost;
use crate::types::Color;

/// Pixel size of the square canvas the toys are authored against.
pub const CANVAS_PIXELS: f64 = 400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FilledPolygon {
    /// Device-space vertices.
    pub points: Vec<Point2<f64>>,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    base: Matrix3<f64>,
    current: Matrix3<f64>,
    display: Vec<FilledPolygon>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Origin at the middle of the canvas, user units two pixels wide.
    pub fn new() -> Self {
        let half = CANVAS_PIXELS / 2.0;
        let base = Matrix3::new_translation(&Vector2::new(half, half))
            * Matrix3::new_nonuniform_scaling(&Vector2::new(2.0, 2.0));
        Self::with_base(base)
    }

    pub fn with_base(base: Matrix3<f64>) -> Self {
        Canvas {
            base,
            current: base,
            display: Vec::new(),
        }
    }

    /// Clear the display list and return to the base transform.
    pub fn begin_frame(&mut self) {
        self.current = self.base;
        self.display.clear();
    }

    pub fn base(&self) -> Matrix3<f64> {
        self.base
    }

    pub fn display_list(&self) -> &[FilledPolygon] {
        &self.display
    }
}

impl CanvasHost for Canvas {
    fn translate(&mut self, x: f64, y: f64) {
        self.current *= Matrix3::new_translation(&Vector2::new(x, y));
    }

    fn rotate(&mut self, degrees: f64) {
        self.current *= Matrix3::new_rotation(degrees.to_radians());
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.current *= Matrix3::new_nonuniform_scaling(&Vector2::new(x, y));
    }

    fn transform(&self) -> Matrix3<f64> {
        self.current
    }

    fn set_transform(&mut self, transform: Matrix3<f64>) {
        self.current = transform;
    }

    fn fill_polygon(&mut self, points: &[Point2<f64>], color: Color) {
        let points = points
            .iter()
            .map(|p| self.current.transform_point(p))
            .collect();
        self.display.push(FilledPolygon { points, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point2<f64>, b: Point2<f64>) -> bool {
        (a - b).norm() < 1.0e-9
    }

    #[test]
    fn base_transform_centers_and_doubles() {
        let mut canvas = Canvas::new();
        canvas.fill_polygon(&[Point2::new(10.0, -5.0)], Color::default());
        assert!(close(canvas.display_list()[0].points[0], Point2::new(220.0, 190.0)));
    }

    #[test]
    fn transforms_compose_in_call_order() {
        let mut canvas = Canvas::with_base(Matrix3::identity());
        canvas.translate(10.0, 0.0);
        canvas.rotate(90.0);
        canvas.fill_polygon(&[Point2::new(5.0, 0.0)], Color::default());
        // Rotate first in user space, then shift.
        assert!(close(canvas.display_list()[0].points[0], Point2::new(10.0, 5.0)));
    }

    #[test]
    fn begin_frame_resets() {
        let mut canvas = Canvas::new();
        canvas.scale(3.0, 3.0);
        canvas.fill_polygon(&[Point2::origin()], Color::default());
        canvas.begin_frame();
        assert_eq!(canvas.transform(), canvas.base());
        assert!(canvas.display_list().is_empty());
    }
}
