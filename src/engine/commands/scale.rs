use nalgebra::Vector3;

use crate::engine::Pass;

use super::{Replay, fixed1};

/// Blend between no scaling (`1`) and `target`.
pub fn interpolate_scale(amt: f64, target: f64) -> f64 {
    amt * target + (1.0 - amt) * 1.0
}

/// Absolute per-axis scale of a named object.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Scale {
    pub fn interpolate(&self, amt: f64) -> Vector3<f64> {
        Vector3::new(
            interpolate_scale(amt, self.x),
            interpolate_scale(amt, self.y),
            interpolate_scale(amt, self.z),
        )
    }
}

impl Replay for Scale {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        let Some((scene, id)) = pass.node(&self.name) else { return };
        if amt > 0.0 {
            scene.set_scale(id, self.interpolate(amt));
        }
    }

    fn trace_lines(&self, amt: f64) -> Vec<String> {
        let s = self.interpolate(amt);
        vec![format!(
            "{}.scale.set({}, {}, {});",
            self.name,
            fixed1(s.x),
            fixed1(s.y),
            fixed1(s.z)
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_boundaries() {
        let s = Scale { name: "b".into(), x: 2.0, y: 3.0, z: 4.0 };
        assert_eq!(s.interpolate(0.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(s.interpolate(1.0), Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(s.interpolate(0.5), Vector3::new(1.5, 2.0, 2.5));
    }

    #[test]
    fn trace_shows_interpolated_scale() {
        let s = Scale { name: "b".into(), x: 2.0, y: 3.0, z: 4.0 };
        assert_eq!(s.trace_lines(0.5), vec!["b.scale.set(1.5, 2.0, 2.5);"]);
    }
}
