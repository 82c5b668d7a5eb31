use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::framework::math::Transform;

use super::{Color, Geometry, Material};

new_key_type! { pub struct NodeId; }
new_key_type! { pub struct GeometryId; }

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneGraphError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("geometry {0:?} does not exist")]
    UnknownGeometry(GeometryId),
    #[error("node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

pub type Result<T> = std::result::Result<T, SceneGraphError>;

/// Geometry paired with a material, owned by exactly one node.
#[derive(Debug, Clone)]
pub struct Surface {
    pub geometry: GeometryId,
    pub material: Material,
}

impl Surface {
    pub fn new(geometry: GeometryId, material: Material) -> Self {
        Self { geometry, material }
    }
}

/// Light radiating from the origin of its node.
///  - `distance` is cutoff distance where the light fades to zero, 0 means no cutoff
///  - `decay` is exponent of the distance falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color:     Color,
    pub intensity: f32,
    pub distance:  f32,
    pub decay:     f32,
}

#[derive(Debug)]
pub struct Node {
    pub name:      String,
    pub transform: Transform,
    parent:   Option<NodeId>,
    children: Vec<NodeId>,
    surfaces: Vec<Surface>,
    lights:   Vec<PointLight>,
}

impl Node {
    fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            parent: None,
            children: vec![],
            surfaces: vec![],
            lights: vec![],
        }
    }

    pub fn parent(&self) -> Option<NodeId> { self.parent }
    pub fn children(&self) -> &[NodeId] { &self.children }
    pub fn surfaces(&self) -> &[Surface] { &self.surfaces }
    pub fn lights(&self) -> &[PointLight] { &self.lights }
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes:      SlotMap<NodeId, Node>,
    geometries: SlotMap<GeometryId, Geometry>,
    root:       NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

// Construction
impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("scene", Transform::IDENTITY));
        Self { nodes, geometries: SlotMap::with_key(), root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a node which is not attached anywhere yet.
    pub fn create_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        self.nodes.insert(Node::new(name, transform))
    }

    /// Creates a node and attaches it under `parent`.
    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>, transform: Transform) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneGraphError::UnknownNode(parent));
        }
        let child = self.create_node(name, transform);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Attaches a detached node as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let child_node = self.nodes.get(child).ok_or(SceneGraphError::UnknownNode(child))?;
        if !self.nodes.contains_key(parent) {
            return Err(SceneGraphError::UnknownNode(parent));
        }
        if child_node.parent.is_some() || child == self.root {
            return Err(SceneGraphError::AlreadyAttached(child));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(SceneGraphError::Cycle { parent, child });
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    /// Moves the surface into the node, the node becomes its only owner.
    pub fn add_surface(&mut self, node: NodeId, surface: Surface) -> Result<()> {
        if !self.geometries.contains_key(surface.geometry) {
            return Err(SceneGraphError::UnknownGeometry(surface.geometry));
        }
        self.nodes
            .get_mut(node)
            .ok_or(SceneGraphError::UnknownNode(node))?
            .surfaces
            .push(surface);
        Ok(())
    }

    pub fn add_light(&mut self, node: NodeId, light: PointLight) -> Result<()> {
        self.nodes
            .get_mut(node)
            .ok_or(SceneGraphError::UnknownNode(node))?
            .lights
            .push(light);
        Ok(())
    }
}

// Access
impl SceneGraph {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id).map(|node| &mut node.transform)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parent chain of the node, starting with the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(
            self.nodes.contains_key(id).then_some(id),
            move |current| self.nodes.get(*current).and_then(|node| node.parent),
        )
    }

    /// Visits every node attached to root in depth first order, together with its world matrix.
    ///  - world matrix is the parent world matrix composed with the node local transform
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &Node, &glam::Mat4),
    {
        let mut stack = vec![(self.root, glam::Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id];
            let world = parent_world * node.transform.as_mat();
            visit(id, node, &world);
            stack.extend(node.children.iter().rev().map(|child| (*child, world)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::scene_graph::{Geometry, Material};

    #[test]
    fn node_can_be_attached_only_once() {
        let mut graph = SceneGraph::new();
        let group = graph.add_node(graph.root(), "group", Transform::IDENTITY).unwrap();
        let other = graph.add_node(graph.root(), "other", Transform::IDENTITY).unwrap();

        assert_eq!(graph.attach(other, group), Err(SceneGraphError::AlreadyAttached(group)));
        assert_eq!(graph.node(graph.root()).unwrap().children(), &[group, other]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a", Transform::IDENTITY);
        let b = graph.add_node(a, "b", Transform::IDENTITY).unwrap();
        assert_eq!(graph.attach(b, a), Err(SceneGraphError::Cycle { parent: b, child: a }));
        assert_eq!(graph.attach(a, graph.root()), Err(SceneGraphError::AlreadyAttached(graph.root())));
    }

    #[test]
    fn traversal_composes_parent_transforms() {
        let mut graph = SceneGraph::new();
        let group = graph.add_node(
            graph.root(),
            "group",
            Transform::IDENTITY.with_rotation(glam::vec3(0.0, std::f32::consts::FRAC_PI_2, 0.0)),
        ).unwrap();
        let child = graph.add_node(group, "child", Transform::from_position(glam::vec3(15.0, 0.0, 0.0))).unwrap();

        let mut origin = None;
        graph.traverse(|id, _, world| {
            if id == child {
                origin = Some(world.transform_point3(glam::Vec3::ZERO));
            }
        });
        assert!(origin.unwrap().abs_diff_eq(glam::vec3(0.0, 0.0, -15.0), 1e-4));
    }

    #[test]
    fn surfaces_require_registered_geometry() {
        let mut other = SceneGraph::new();
        let foreign = other.add_geometry(Geometry::sphere(1.0, 8, 8));

        let mut graph = SceneGraph::new();
        let node = graph.add_node(graph.root(), "mesh", Transform::IDENTITY).unwrap();
        let rejected = graph.add_surface(node, Surface::new(foreign, Material::basic(Color::WHITE)));
        assert_eq!(rejected, Err(SceneGraphError::UnknownGeometry(foreign)));

        let geometry = graph.add_geometry(Geometry::sphere(1.0, 8, 8));
        graph.add_surface(node, Surface::new(geometry, Material::basic(Color::WHITE))).unwrap();
        assert_eq!(graph.node(node).unwrap().surfaces().len(), 1);
    }

    #[test]
    fn traversal_skips_detached_nodes() {
        let mut graph = SceneGraph::new();
        let group = graph.add_node(graph.root(), "group", Transform::IDENTITY).unwrap();
        graph.add_node(group, "leaf", Transform::IDENTITY).unwrap();
        let detached = graph.create_node("detached", Transform::IDENTITY);
        graph.add_node(detached, "under detached", Transform::IDENTITY).unwrap();

        let mut visited = vec![];
        graph.traverse(|_, node, _| visited.push(node.name.clone()));

        assert_eq!(visited, vec!["scene", "group", "leaf"]);
        assert_eq!(graph.node_count(), 5);
    }
}
