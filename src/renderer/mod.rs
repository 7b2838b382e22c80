//! The deterministic rasterizer behind both panels.
//!
//! Takes a canvas display list or a scene graph and paints it onto a
//! fixed-size cell grid for the player.
//!
//! The renderer is pure and stateless. Given the same input, it always
//! produces the same grid. It knows nothing about progress or commands.

use nalgebra::{Isometry3, Matrix3, Point2, Point3, Vector3};

use crate::canvas::{CANVAS_PIXELS, Canvas};
use crate::engine::target::Primitive;
use crate::scene::SceneGraph;
use crate::types::{Cell, CellChange, Color, Grid, NamedColor, Style, TerminalContract};

/// Which coordinate-system overlays to draw on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOverlay {
    /// The frame the commands start from.
    pub original: bool,
    /// The frame left in force after the replay, if it should be drawn.
    pub final_transform: Option<Matrix3<f64>>,
}

/// Orthographic view of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    pub eye: Point3<f64>,
    /// World units from the view center to the top edge.
    pub extent: f64,
}

impl Default for SceneView {
    fn default() -> Self {
        SceneView {
            eye: Point3::new(10.0, 10.0, 10.0),
            extent: 6.0,
        }
    }
}

/// Half-length of the drawn coordinate axes, in user units.
const CSYS_HALF: f64 = 50.0;
const CSYS_TIP: f64 = 56.0;

pub struct Renderer;

impl Renderer {
    pub fn render_canvas(
        canvas: &Canvas,
        overlay: CanvasOverlay,
        contract: TerminalContract,
    ) -> Grid {
        let mut raster = Raster::new(contract);

        if overlay.original {
            raster.csys(&canvas.base(), Color::Named(NamedColor::Gray));
        }

        for polygon in canvas.display_list() {
            raster.fill(&polygon.points, polygon.color);
        }

        if let Some(transform) = overlay.final_transform {
            raster.csys(&transform, Color::Named(NamedColor::Red));
        }

        raster.grid
    }

    pub fn render_scene(scene: &SceneGraph, view: SceneView, contract: TerminalContract) -> Grid {
        let mut raster = Raster::new(contract);
        let camera = Camera::new(view, contract);

        let gizmo = [
            (Vector3::x(), 'X', NamedColor::Red),
            (Vector3::y(), 'Y', NamedColor::Green),
            (Vector3::z(), 'Z', NamedColor::Blue),
        ];
        let origin = camera.project(&Point3::origin());
        for (axis, label, color) in gizmo {
            let tip = camera.project(&Point3::from(axis * 5.0));
            let style = Style { fg: Some(Color::Named(color)), dim: true, ..Default::default() };
            raster.line(origin, tip, '·', &style);
            raster.put(tip, label, &Style { bold: true, ..style });
        }

        for id in scene.walk() {
            let Some(node) = scene.node(id) else { continue };
            let Some(primitive) = node.primitive else { continue };
            let world = scene.world_matrix(id);
            let style = Style::fg(node.color);
            for (a, b) in wireframe(primitive) {
                let a = camera.project(&world.transform_point(&a));
                let b = camera.project(&world.transform_point(&b));
                raster.line(a, b, '*', &style);
            }
        }

        raster.grid
    }

    /// One summary line per scene node: name, position, rotation, scale.
    pub fn describe_scene(scene: &SceneGraph) -> Vec<String> {
        scene
            .walk()
            .into_iter()
            .filter_map(|id| scene.node(id))
            .map(|node| {
                let p = node.pose.position;
                let s = node.pose.scale;
                let rotation = match node.pose.rotation.axis_angle() {
                    Some((axis, angle)) => format!(
                        "{:.1}° about ({:.2}, {:.2}, {:.2})",
                        angle.to_degrees(),
                        axis.x,
                        axis.y,
                        axis.z
                    ),
                    None => "none".to_string(),
                };
                format!(
                    "{}  pos ({:.1}, {:.1}, {:.1})  rot {}  scale ({:.1}, {:.1}, {:.1})",
                    node.name, p.x, p.y, p.z, rotation, s.x, s.y, s.z
                )
            })
            .collect()
    }

    /// Compute a cell-level diff between two grids.
    pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}

/// Edges of a primitive in its local space.
fn wireframe(primitive: Primitive) -> Vec<(Point3<f64>, Point3<f64>)> {
    match primitive {
        Primitive::Box { width, height, depth } => {
            let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
            let corner = |i: usize| {
                Point3::new(
                    if i & 1 == 0 { -hx } else { hx },
                    if i & 2 == 0 { -hy } else { hy },
                    if i & 4 == 0 { -hz } else { hz },
                )
            };
            let mut edges = Vec::with_capacity(12);
            for i in 0..8 {
                for bit in [1, 2, 4] {
                    if i & bit == 0 {
                        edges.push((corner(i), corner(i | bit)));
                    }
                }
            }
            edges
        }
        Primitive::Cone { radius, height } => {
            const SEGMENTS: usize = 12;
            let apex = Point3::new(0.0, height / 2.0, 0.0);
            let rim = |i: usize| {
                let a = std::f64::consts::TAU * i as f64 / SEGMENTS as f64;
                Point3::new(radius * a.cos(), -height / 2.0, radius * a.sin())
            };
            let mut edges = Vec::with_capacity(SEGMENTS + 4);
            for i in 0..SEGMENTS {
                edges.push((rim(i), rim(i + 1)));
                if i % 3 == 0 {
                    edges.push((rim(i), apex));
                }
            }
            edges
        }
    }
}

struct Camera {
    view: Isometry3<f64>,
    center: Point2<f64>,
    /// Rows per world unit; columns get twice as many to square up cells.
    scale: f64,
}

impl Camera {
    fn new(view: SceneView, contract: TerminalContract) -> Self {
        let half_h = contract.height as f64 / 2.0;
        Camera {
            view: Isometry3::look_at_rh(&view.eye, &Point3::origin(), &Vector3::y()),
            center: Point2::new(contract.width as f64 / 2.0, half_h),
            scale: half_h / view.extent.max(f64::EPSILON),
        }
    }

    /// World point to fractional cell coordinates.
    fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        let v = self.view.transform_point(p);
        Point2::new(
            self.center.x + v.x * self.scale * 2.0,
            self.center.y - v.y * self.scale,
        )
    }
}

struct Raster {
    contract: TerminalContract,
    grid: Grid,
}

impl Raster {
    fn new(contract: TerminalContract) -> Self {
        let w = contract.width as usize;
        let h = contract.height as usize;
        Raster {
            contract,
            grid: vec![vec![Cell::default(); w]; h],
        }
    }

    /// Device pixels to fractional cell coordinates.
    fn device_to_cell(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::new(
            p.x / CANVAS_PIXELS * self.contract.width as f64,
            p.y / CANVAS_PIXELS * self.contract.height as f64,
        )
    }

    fn put(&mut self, at: Point2<f64>, ch: char, style: &Style) {
        if at.x < 0.0 || at.y < 0.0 {
            return;
        }
        let (x, y) = (at.x as usize, at.y as usize);
        if let Some(cell) = self.grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = Cell { ch, style: style.clone() };
        }
    }

    fn line(&mut self, from: Point2<f64>, to: Point2<f64>, ch: char, style: &Style) {
        let Some((from, to)) = self.clip(from, to) else { return };
        let steps = (to - from).abs().max().ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.put(from + (to - from) * t, ch, style);
        }
    }

    /// Liang-Barsky clip against the grid plus a one-cell margin.
    fn clip(&self, from: Point2<f64>, to: Point2<f64>) -> Option<(Point2<f64>, Point2<f64>)> {
        if !(from.coords.iter().chain(to.coords.iter()).all(|v| v.is_finite())) {
            return None;
        }
        let (min_x, max_x) = (-1.0, self.contract.width as f64 + 1.0);
        let (min_y, max_y) = (-1.0, self.contract.height as f64 + 1.0);
        let d = to - from;
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in [
            (-d.x, from.x - min_x),
            (d.x, max_x - from.x),
            (-d.y, from.y - min_y),
            (d.y, max_y - from.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((from + d * t0, from + d * t1))
    }

    /// Even-odd fill of a device-space polygon, sampled at cell centers.
    fn fill(&mut self, points: &[Point2<f64>], color: Color) {
        let cells: Vec<Point2<f64>> = points.iter().map(|p| self.device_to_cell(p)).collect();
        if cells.len() < 3 {
            return;
        }
        let style = Style::fg(color);
        for y in 0..self.contract.height as usize {
            for x in 0..self.contract.width as usize {
                let sample = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                if contains(&cells, &sample) {
                    self.grid[y][x] = Cell { ch: '█', style: style.clone() };
                }
            }
        }
    }

    fn csys(&mut self, transform: &Matrix3<f64>, color: Color) {
        let style = Style::fg(color);
        let to_cell = |raster: &Raster, x: f64, y: f64| {
            raster.device_to_cell(&transform.transform_point(&Point2::new(x, y)))
        };
        let x0 = to_cell(self, -CSYS_HALF, 0.0);
        let x1 = to_cell(self, CSYS_HALF, 0.0);
        let y0 = to_cell(self, 0.0, -CSYS_HALF);
        let y1 = to_cell(self, 0.0, CSYS_HALF);
        self.line(x0, x1, '·', &style);
        self.line(y0, y1, '·', &style);

        let bold = Style { bold: true, ..style };
        let x_tip = to_cell(self, CSYS_TIP, 0.0);
        let y_tip = to_cell(self, 0.0, CSYS_TIP);
        self.put(x_tip, 'x', &bold);
        self.put(y_tip, 'y', &bold);
    }
}

fn contains(polygon: &[Point2<f64>], p: &Point2<f64>) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::target::{CanvasHost, SceneHost};

    const SMALL: TerminalContract = TerminalContract { width: 40, height: 20 };

    fn count(grid: &Grid, ch: char) -> usize {
        grid.iter().flatten().filter(|c| c.ch == ch).count()
    }

    #[test]
    fn filled_rect_covers_expected_cells() {
        let mut canvas = Canvas::with_base(Matrix3::identity());
        // Left half of the canvas, full height.
        canvas.fill_polygon(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 400.0),
                Point2::new(200.0, 400.0),
                Point2::new(200.0, 0.0),
            ],
            Color::Named(NamedColor::Red),
        );
        let grid = Renderer::render_canvas(
            &canvas,
            CanvasOverlay { original: false, final_transform: None },
            SMALL,
        );
        assert_eq!(count(&grid, '█'), 20 * 20);
        assert_eq!(grid[0][0].style.fg, Some(Color::Named(NamedColor::Red)));
        assert_eq!(grid[0][39].ch, ' ');
    }

    #[test]
    fn overlays_draw_axis_labels() {
        let canvas = Canvas::new();
        let grid = Renderer::render_canvas(
            &canvas,
            CanvasOverlay { original: true, final_transform: None },
            SMALL,
        );
        assert_eq!(count(&grid, 'x'), 1);
        assert_eq!(count(&grid, 'y'), 1);
        assert!(count(&grid, '·') > 0);
    }

    #[test]
    fn scene_render_draws_gizmo_and_primitives() {
        let mut scene = SceneGraph::new();
        let empty = Renderer::render_scene(&scene, SceneView::default(), SMALL);
        assert_eq!(count(&empty, '*'), 0);
        assert_eq!(count(&empty, 'X'), 1);

        let id = scene.create_primitive(
            "b",
            Primitive::Box { width: 2.0, height: 2.0, depth: 2.0 },
            Color::default(),
        );
        scene.attach(None, id);
        let grid = Renderer::render_scene(&scene, SceneView::default(), SMALL);
        assert!(count(&grid, '*') > 0);
        assert_eq!(Renderer::describe_scene(&scene).len(), 1);
    }

    #[test]
    fn huge_transforms_are_clipped_to_the_grid() {
        let canvas = Canvas::new();
        let huge = canvas.base() * Matrix3::new_scaling(1.0e9);
        let grid = Renderer::render_canvas(
            &canvas,
            CanvasOverlay { original: false, final_transform: Some(huge) },
            SMALL,
        );
        // Both axes pass through the center and span the whole panel.
        assert_eq!(count(&grid, '·'), 40 + 20 - 1);
    }

    #[test]
    fn lines_outside_the_grid_draw_nothing() {
        let mut raster = Raster::new(SMALL);
        raster.line(Point2::new(-50.0, -5.0), Point2::new(90.0, -5.0), '#', &Style::default());
        assert_eq!(count(&raster.grid, '#'), 0);
        raster.line(Point2::new(-1.0e12, 5.5), Point2::new(1.0e12, 5.5), '#', &Style::default());
        assert_eq!(count(&raster.grid, '#'), 40);
    }

    #[test]
    fn diff_reports_changed_cells_only() {
        let a = vec![vec![Cell::default(); 3]; 2];
        let mut b = a.clone();
        b[1][2].ch = '#';
        let changes = Renderer::diff(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].x, changes[0].y), (2, 1));
    }
}
