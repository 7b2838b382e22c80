use nalgebra::Point2;

use crate::engine::Pass;
use crate::types::Color;

use super::{Replay, fixed1, interpolate_scale, literal};

#[derive(Debug, Clone, PartialEq)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

impl Replay for Translate {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        if let Some(canvas) = pass.canvas() {
            canvas.translate(self.x * amt, self.y * amt);
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        vec![format!(
            "context.translate({},{});",
            fixed1(self.x * amt),
            fixed1(self.y * amt)
        )]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rotate {
    pub degrees: f64,
}

impl Replay for Rotate {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        if let Some(canvas) = pass.canvas() {
            canvas.rotate(self.degrees * amt);
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        vec![format!("context.rotate({});", fixed1(self.degrees * amt))]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scale2d {
    pub x: f64,
    pub y: f64,
}

impl Replay for Scale2d {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        if let Some(canvas) = pass.canvas() {
            canvas.scale(interpolate_scale(amt, self.x), interpolate_scale(amt, self.y));
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        vec![format!(
            "context.scale({},{});",
            fixed1(interpolate_scale(amt, self.x)),
            fixed1(interpolate_scale(amt, self.y))
        )]
    }
}

/// Filled rectangle at literal coordinates. `amt` only gates visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

impl Replay for FillRect {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        if amt <= 0.0 {
            return;
        }
        if let Some(canvas) = pass.canvas() {
            let (x, y, w, h) = (self.x, self.y, self.width, self.height);
            let corners = [
                Point2::new(x, y),
                Point2::new(x, y + h),
                Point2::new(x + w, y + h),
                Point2::new(x + w, y),
            ];
            canvas.fill_polygon(&corners, self.color);
        }
    }

    fn trace_lines(&self, _amt: f64) -> Vec<String> {
        vec![
            format!("context.fillStyle=\"{}\"", self.color),
            format!(
                "context.fillRect({},{},{},{});",
                literal(self.x),
                literal(self.y),
                literal(self.width),
                literal(self.height)
            ),
        ]
    }
}

/// Small right triangle with its corner at `(x, y)`: 10 wide, 20 tall.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

impl Replay for Triangle {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        if amt <= 0.0 {
            return;
        }
        if let Some(canvas) = pass.canvas() {
            let corners = [
                Point2::new(self.x, self.y),
                Point2::new(self.x + 10.0, self.y),
                Point2::new(self.x, self.y + 20.0),
            ];
            canvas.fill_polygon(&corners, self.color);
        }
    }

    fn trace_lines(&self, _amt: f64) -> Vec<String> {
        vec![
            format!("context.fillStyle=\"{}\"", self.color),
            format!(
                "triangle(context,{},{},{});",
                literal(self.x),
                literal(self.y),
                self.color
            ),
        ]
    }
}

pub(super) fn save(amt: f64, pass: &mut Pass<'_>) {
    if amt <= 0.0 {
        return;
    }
    if let Some(matrix) = pass.canvas().map(|canvas| canvas.transform()) {
        pass.push_transform(matrix);
    }
}

pub(super) fn restore(amt: f64, pass: &mut Pass<'_>) {
    if amt <= 0.0 {
        return;
    }
    let Some(matrix) = pass.pop_transform() else { return };
    if let Some(canvas) = pass.canvas() {
        canvas.set_transform(matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedColor;

    #[test]
    fn triangle_trace_names_its_color() {
        let triangle = Triangle {
            x: 5.0,
            y: -10.0,
            color: Color::Named(NamedColor::Red),
        };
        assert_eq!(
            triangle.trace_lines(0.5),
            ["context.fillStyle=\"red\"", "triangle(context,5,-10,red);"]
        );
    }

    #[test]
    fn interpolated_traces_round_ties_up() {
        assert_eq!(Scale2d { x: 2.0, y: 2.0 }.trace_lines(0.25), ["context.scale(1.3,1.3);"]);
        assert_eq!(
            Translate { x: 1.0, y: 3.0 }.trace_lines(0.25),
            ["context.translate(0.3,0.8);"]
        );
    }
}
