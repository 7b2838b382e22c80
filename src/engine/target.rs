//! Host surfaces the replay engine drives.
//!
//! The engine never owns scene objects. It resolves a name to a handle for the
//! duration of a single command and asks the host to mutate it.

use nalgebra::{Matrix3, Point2, Vector3};

use crate::types::{Axis, Color};

/// Opaque handle into a host's scene storage. Valid until the node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Geometry a creation command asks the host to build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Box { width: f64, height: f64, depth: f64 },
    Cone { radius: f64, height: f64 },
}

/// A 3D scene graph addressed by object name. Angles are in degrees.
pub trait SceneHost {
    fn find_by_name(&self, name: &str) -> Option<NodeId>;
    fn create_primitive(&mut self, name: &str, primitive: Primitive, color: Color) -> NodeId;
    /// Attach `child` under `parent`, or under the scene root when `parent` is `None`.
    fn attach(&mut self, parent: Option<NodeId>, child: NodeId);
    /// Remove `node` and everything below it from the scene.
    fn detach(&mut self, node: NodeId);
    /// Put the node back into the pose it had when it entered the scene.
    fn reset_transform(&mut self, node: NodeId);

    fn translate_local(&mut self, node: NodeId, axis: Axis, distance: f64);
    fn rotate_local(&mut self, node: NodeId, axis: Axis, degrees: f64);
    fn rotate_on_axis(&mut self, node: NodeId, axis: Vector3<f64>, degrees: f64);

    fn set_position(&mut self, node: NodeId, position: Vector3<f64>);
    /// Euler angles applied in X, Y, Z order.
    fn set_rotation(&mut self, node: NodeId, degrees: Vector3<f64>);
    fn set_scale(&mut self, node: NodeId, scale: Vector3<f64>);
    /// Turn the node so its local +Z axis points at `target` in world space.
    fn look_at(&mut self, node: NodeId, target: Vector3<f64>);
}

/// An immediate-mode 2D drawing context with a current affine transform.
pub trait CanvasHost {
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, degrees: f64);
    fn scale(&mut self, x: f64, y: f64);

    /// Current transform as a homogeneous 3x3 matrix.
    fn transform(&self) -> Matrix3<f64>;
    fn set_transform(&mut self, transform: Matrix3<f64>);

    /// Fill a polygon given in current user-space coordinates.
    fn fill_polygon(&mut self, points: &[Point2<f64>], color: Color);
}

/// The surface a replay pass mutates.
pub enum Target<'a> {
    Scene(&'a mut dyn SceneHost),
    Canvas(&'a mut dyn CanvasHost),
}

impl Target<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Scene(_) => "scene",
            Target::Canvas(_) => "canvas",
        }
    }
}
