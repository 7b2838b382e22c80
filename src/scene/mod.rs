//! In-memory scene graph used as the 3D host.
//!
//! Nodes live in an arena indexed by `NodeId` with a name index beside it.
//! Transforms follow the usual scene-graph conventions: local translation moves
//! along the node's rotated axes, local rotation post-multiplies the node's
//! quaternion, and world matrices compose parent before child.

use std::collections::HashMap;

use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};

use crate::engine::target::{NodeId, Primitive, SceneHost};
use crate::types::{Axis, Color};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }
}

impl Pose {
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub primitive: Option<Primitive>,
    pub color: Color,
    pub pose: Pose,
    /// Pose restored by `reset_transform`.
    pub rest: Pose,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
    names: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a host-built node (no primitive) with its own rest pose.
    pub fn insert_group(&mut self, name: &str, parent: Option<NodeId>, rest: Pose) -> NodeId {
        let id = self.alloc(Node {
            name: name.to_string(),
            primitive: None,
            color: Color::default(),
            pose: rest,
            rest,
            parent: None,
            children: Vec::new(),
        });
        self.attach(parent, id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.names.get(name).and_then(|id| self.node(*id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Live nodes in depth-first order from the roots.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f64> {
        let mut matrix = Matrix4::identity();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else { break };
            matrix = node.pose.to_matrix() * matrix;
            cursor = node.parent;
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vector3<f64> {
        self.world_matrix(id)
            .transform_point(&Point3::origin())
            .coords
    }

    fn world_rotation(&self, id: NodeId) -> UnitQuaternion<f64> {
        let mut rotation = UnitQuaternion::identity();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else { break };
            rotation = node.pose.rotation * rotation;
            cursor = node.parent;
        }
        rotation
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.names.insert(node.name.clone(), id);
        self.nodes.push(Some(node));
        id
    }

    fn pose_mut(&mut self, id: NodeId) -> Option<&mut Pose> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|node| &mut node.pose)
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|n| n.parent);
        match parent.and_then(|p| self.nodes.get_mut(p.0)).and_then(Option::as_mut) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
    }
}

impl SceneHost for SceneGraph {
    fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    fn create_primitive(&mut self, name: &str, primitive: Primitive, color: Color) -> NodeId {
        // A new node with a taken name replaces the old one.
        if let Some(old) = self.find_by_name(name) {
            self.detach(old);
        }
        self.alloc(Node {
            name: name.to_string(),
            primitive: Some(primitive),
            color,
            pose: Pose::default(),
            rest: Pose::default(),
            parent: None,
            children: Vec::new(),
        })
    }

    fn attach(&mut self, parent: Option<NodeId>, child: NodeId) {
        if self.node(child).is_none() {
            return;
        }
        self.unlink(child);
        let parent = parent.filter(|p| self.node(*p).is_some() && *p != child);
        match parent.and_then(|p| self.nodes.get_mut(p.0)).and_then(Option::as_mut) {
            Some(node) => node.children.push(child),
            None => self.roots.push(child),
        }
        if let Some(node) = self.nodes.get_mut(child.0).and_then(Option::as_mut) {
            node.parent = parent;
        }
    }

    fn detach(&mut self, node: NodeId) {
        if self.node(node).is_none() {
            return;
        }
        self.unlink(node);
        let mut doomed = vec![node];
        while let Some(id) = doomed.pop() {
            if let Some(removed) = self.nodes.get_mut(id.0).and_then(Option::take) {
                if self.names.get(&removed.name) == Some(&id) {
                    self.names.remove(&removed.name);
                }
                doomed.extend(removed.children);
            }
        }
    }

    fn reset_transform(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.0).and_then(Option::as_mut) {
            n.pose = n.rest;
        }
    }

    fn translate_local(&mut self, node: NodeId, axis: Axis, distance: f64) {
        if let Some(pose) = self.pose_mut(node) {
            pose.position += pose.rotation * axis.unit() * distance;
        }
    }

    fn rotate_local(&mut self, node: NodeId, axis: Axis, degrees: f64) {
        self.rotate_on_axis(node, axis.unit(), degrees);
    }

    fn rotate_on_axis(&mut self, node: NodeId, axis: Vector3<f64>, degrees: f64) {
        let Some(axis) = Unit::try_new(axis, 1.0e-12) else { return };
        if let Some(pose) = self.pose_mut(node) {
            pose.rotation *= UnitQuaternion::from_axis_angle(&axis, degrees.to_radians());
        }
    }

    fn set_position(&mut self, node: NodeId, position: Vector3<f64>) {
        if let Some(pose) = self.pose_mut(node) {
            pose.position = position;
        }
    }

    fn set_rotation(&mut self, node: NodeId, degrees: Vector3<f64>) {
        let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), degrees.x.to_radians());
        let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), degrees.y.to_radians());
        let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), degrees.z.to_radians());
        if let Some(pose) = self.pose_mut(node) {
            pose.rotation = rx * ry * rz;
        }
    }

    fn set_scale(&mut self, node: NodeId, scale: Vector3<f64>) {
        if let Some(pose) = self.pose_mut(node) {
            pose.scale = scale;
        }
    }

    fn look_at(&mut self, node: NodeId, target: Vector3<f64>) {
        let Some(parent) = self.node(node).map(|n| n.parent) else { return };
        let direction = target - self.world_position(node);
        if direction.norm() < 1.0e-12 {
            return;
        }
        let up = if direction.cross(&Vector3::y()).norm() < 1.0e-9 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        let mut rotation = UnitQuaternion::face_towards(&direction, &up);
        if let Some(parent) = parent {
            rotation = self.world_rotation(parent).inverse() * rotation;
        }
        if let Some(pose) = self.pose_mut(node) {
            pose.rotation = rotation;
        }
    }
}
