use nalgebra::Vector3;

use crate::engine::Pass;
use crate::types::Axis;

use super::{Replay, fixed1};

/// Relative move along one of the object's local axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateAxis {
    pub name: String,
    pub axis: Axis,
    pub distance: f64,
}

impl Replay for TranslateAxis {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.translate_local(id, self.axis, self.distance * amt);
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        vec![format!(
            "{}.translate{}({});",
            self.name,
            self.axis.letter(),
            fixed1(self.distance * amt)
        )]
    }
}

/// Absolute position, interpolated from the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn interpolate(&self, amt: f64) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z) * amt
    }
}

impl Replay for Position {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.set_position(id, self.interpolate(amt));
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        let p = self.interpolate(amt);
        vec![format!(
            "{}.position.set({}, {}, {});",
            self.name,
            fixed1(p.x),
            fixed1(p.y),
            fixed1(p.z)
        )]
    }
}
