/// Scene arena: the transform nodes of one room.
///
/// The scene owns every node. Everything else holds `NodeId`s, which are
/// plain indices into `Scene::nodes` and stay valid for the scene's lifetime
/// (nodes are never removed).
///
/// ## Coordinates
///
/// The room lies on the XY plane (z = 0). +x is east, +y is north.
/// A node's local basis is `right = rotation * X`, `up = rotation * Y`.

pub mod layout;

use glam::{Mat4, Quat, Vec3};

/// Non-owning handle to a node in a `Scene`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

/// What a node is for. Assigned when the node is created, so nothing has
/// to inspect names to find the player or the suspects.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    Player,
    PlayerHead,
    Suspect,
    Evidence,
    Wall,
    Camera,
}

#[derive(Clone, Debug)]
pub struct Transform {
    pub name: String,
    pub role: Role,
    pub position: Vec3,
    /// For walls: half-extents of the box.
    pub scale: Vec3,
    pub rotation: Quat,
    pub parent: Option<NodeId>,
}

impl Transform {
    pub fn new(name: impl Into<String>, role: Role, position: Vec3) -> Self {
        Transform {
            name: name.into(),
            role,
            position,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            parent: None,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[allow(dead_code)]
    pub fn local_to_parent(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Local +x axis in parent space (unit length, scale ignored).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local +y axis in parent space (unit length, scale ignored).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub name: String,
    nodes: Vec<Transform>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Scene { name: name.into(), nodes: Vec::new() }
    }

    pub fn add(&mut self, node: Transform) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Panics on a foreign `NodeId`; ids only come from `add`.
    pub fn get(&self, id: NodeId) -> &Transform {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0]
    }

    pub fn position(&self, id: NodeId) -> Vec3 {
        self.nodes[id.0].position
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Transform)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Nodes with the given role, in insertion order.
    pub fn with_role(&self, role: Role) -> Vec<NodeId> {
        self.iter().filter(|(_, n)| n.role == role).map(|(id, _)| id).collect()
    }

    /// Axis-aligned bounds of every top-level node, walls included at
    /// their full extent. Children sit in their parent's frame and are
    /// skipped. `None` for an empty scene.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut it = self.nodes.iter().filter(|n| n.parent.is_none()).map(|n| {
            let half = if n.role == Role::Wall { n.scale.abs() } else { Vec3::ZERO };
            (n.position - half, n.position + half)
        });
        let first = it.next()?;
        Some(it.fold(first, |(lo, hi), (a, b)| (lo.min(a), hi.max(b))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn ids_follow_insertion_order() {
        let mut scene = Scene::new("test");
        let a = scene.add(Transform::new("Suspect1", Role::Suspect, Vec3::ZERO));
        let _w = scene.add(Transform::new("Wall0", Role::Wall, Vec3::X));
        let b = scene.add(Transform::new("Suspect2", Role::Suspect, Vec3::Y));
        assert_eq!(scene.with_role(Role::Suspect), vec![a, b]);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn basis_follows_rotation() {
        let mut t = Transform::new("Player", Role::Player, Vec3::ZERO);
        assert!((t.right() - Vec3::X).length() < 1e-6);
        assert!((t.up() - Vec3::Y).length() < 1e-6);

        t.rotation = Quat::from_rotation_z(FRAC_PI_2);
        assert!((t.right() - Vec3::Y).length() < 1e-6);
        assert!((t.up() + Vec3::X).length() < 1e-6);
    }

    #[test]
    fn basis_ignores_scale() {
        let t = Transform::new("Player", Role::Player, Vec3::ZERO).with_scale(Vec3::splat(3.0));
        assert!((t.right().length() - 1.0).abs() < 1e-6);
        let m = t.local_to_parent();
        assert!((m.x_axis.truncate().length() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn bounds_include_wall_extent() {
        let mut scene = Scene::new("test");
        scene.add(Transform::new("Wall0", Role::Wall, Vec3::new(5.0, 0.5, 0.0))
            .with_scale(Vec3::new(5.0, 0.5, 0.5)));
        let player = scene.add(Transform::new("Player", Role::Player, Vec3::new(2.0, 3.0, 0.0)));
        scene.add(Transform::new("PlayerHead", Role::PlayerHead, Vec3::new(-4.0, 0.0, 0.8)).with_parent(player));
        let (lo, hi) = scene.bounds().unwrap();
        assert_eq!((lo.x, lo.y), (0.0, 0.0));
        assert_eq!((hi.x, hi.y), (10.0, 3.0));
        assert!(Scene::new("empty").bounds().is_none());
    }
}
