use log::debug;

use crate::engine::Pass;
use crate::engine::target::Primitive;
use crate::types::Color;

use super::{Replay, literal};

/// Builds a named primitive and attaches it to a parent, or to the scene root.
///
/// Existence is binary: the object is present whenever `amt > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Create {
    pub name: String,
    pub primitive: Primitive,
    pub color: Color,
    pub parent: Option<String>,
}

impl Replay for Create {
    fn apply(&self, amt: f64, pass: &mut Pass<'_>) {
        if amt <= 0.0 {
            if let Some(scene) = pass.scene() {
                if let Some(id) = scene.find_by_name(&self.name) {
                    scene.detach(id);
                }
            }
            return;
        }

        // Already built on an earlier frame: this puts it back at its rest pose.
        if pass.node(&self.name).is_some() {
            return;
        }

        let Some(scene) = pass.scene() else { return };
        let parent = match &self.parent {
            Some(parent_name) => match scene.find_by_name(parent_name) {
                Some(id) => Some(id),
                None => {
                    debug!("skipping {}: parent {parent_name} does not exist yet", self.name);
                    return;
                }
            },
            None => None,
        };
        let id = scene.create_primitive(&self.name, self.primitive, self.color);
        scene.attach(parent, id);
        pass.mark_touched(&self.name);
    }

    fn trace_lines(&self, _amt: f64) -> Vec<String> {
        let n = &self.name;
        let geometry = match self.primitive {
            Primitive::Box { width, height, depth } => format!(
                "new T.BoxGeometry({}, {}, {})",
                literal(width),
                literal(height),
                literal(depth)
            ),
            Primitive::Cone { radius, height } => {
                format!("new T.ConeGeometry({}, {})", literal(radius), literal(height))
            }
        };
        let parent = self.parent.as_deref().map_or("scene".to_string(), |p| format!("{p}Mesh"));
        vec![
            format!("let {n}Mat = new T.MeshStandardMaterial({{color: \"{}\"}});", self.color),
            format!("let {n}Geom = {geometry};"),
            format!("let {n}Mesh = new T.Mesh({n}Geom, {n}Mat);"),
            format!("{parent}.add({n}Mesh);"),
        ]
    }
}
