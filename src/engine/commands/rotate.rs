use nalgebra::Vector3;

use crate::engine::Pass;
use crate::types::Axis;

use super::{Replay, fixed1, literal};

/// Relative rotation about one of the object's local axes, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateAxis {
    pub name: String,
    pub axis: Axis,
    pub degrees: f64,
}

impl Replay for RotateAxis {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.rotate_local(id, self.axis, self.degrees * amt);
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        vec![format!(
            "{}.rotate{}({});",
            self.name,
            self.axis.letter(),
            fixed1(self.degrees * amt)
        )]
    }
}

/// Absolute XYZ Euler rotation in degrees, interpolated from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotation {
    pub fn interpolate(&self, amt: f64) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z) * amt
    }
}

impl Replay for Rotation {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.set_rotation(id, self.interpolate(amt));
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        let r = self.interpolate(amt);
        vec![format!(
            "{}.rotation.set({}, {}, {});",
            self.name,
            fixed1(r.x),
            fixed1(r.y),
            fixed1(r.z)
        )]
    }
}

/// Relative rotation about an arbitrary local axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateOnAxis {
    pub name: String,
    pub axis: Vector3<f64>,
    pub degrees: f64,
}

impl Replay for RotateOnAxis {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.rotate_on_axis(id, self.axis, self.degrees * amt);
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        vec![format!(
            "{}.rotateOnAxis(new T.Vector3({}, {}, {}), {});",
            self.name,
            literal(self.axis.x),
            literal(self.axis.y),
            literal(self.axis.z),
            fixed1(self.degrees * amt)
        )]
    }
}

/// Orient the object's +Z axis toward a world point.
#[derive(Debug, Clone, PartialEq)]
pub struct LookAt {
    pub name: String,
    pub target: Vector3<f64>,
}

impl Replay for LookAt {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.look_at(id, self.target);
        }
    }

    fn trace_lines(&self, _amt: f64) -> Vec<String> {
        vec![format!(
            "{}.lookAt({}, {}, {});",
            self.name,
            literal(self.target.x),
            literal(self.target.y),
            literal(self.target.z)
        )]
    }
}
