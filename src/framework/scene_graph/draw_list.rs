use strum::{EnumCount, IntoEnumIterator};

use crate::framework::assets::{TextureBinding, TextureStore};

use super::{Geometry, GeometryId, Material, NodeId, PointLight, SceneGraph, TextureSlot};

/// Identifies a surface by its owning node and its position in the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceKey {
    pub node:  NodeId,
    pub index: usize,
}

/// One surface ready to be drawn this frame.
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub key:             SurfaceKey,
    pub geometry_id:     GeometryId,
    pub geometry:        &'a Geometry,
    pub material:        &'a Material,
    pub world:           glam::Mat4,
    pub textures:        [TextureBinding; TextureSlot::COUNT],
    pub camera_distance: f32,
}

impl DrawItem<'_> {
    pub fn texture(&self, slot: TextureSlot) -> TextureBinding {
        self.textures[slot.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightItem {
    pub position: glam::Vec3,
    pub light:    PointLight,
}

/// Scene graph flattened for one frame
///  - `opaque` is sorted front to back, `transparent` back to front
///  - equally distant surfaces keep their traversal order
///  - `points` holds surfaces with point geometry regardless of their material flags
#[derive(Debug, Default)]
pub struct DrawList<'a> {
    pub opaque:      Vec<DrawItem<'a>>,
    pub transparent: Vec<DrawItem<'a>>,
    pub points:      Vec<DrawItem<'a>>,
    pub lights:      Vec<LightItem>,
}

impl<'a> DrawList<'a> {
    #[profiler::function]
    pub fn collect(graph: &'a SceneGraph, textures: &TextureStore, camera_position: glam::Vec3) -> Self {
        let mut list = DrawList::default();

        graph.traverse(|node_id, _, world| {
            // borrow the node for the whole lifetime of the graph
            let Some(node) = graph.node(node_id) else {
                return;
            };
            let origin = world.transform_point3(glam::Vec3::ZERO);

            for light in node.lights() {
                list.lights.push(LightItem {
                    position: origin,
                    light: *light,
                });
            }

            for (index, surface) in node.surfaces().iter().enumerate() {
                let Some(geometry) = graph.geometry(surface.geometry) else {
                    continue;
                };

                let mut bindings = [TextureBinding::Neutral; TextureSlot::COUNT];
                for slot in TextureSlot::iter() {
                    bindings[slot.index()] = textures.binding(surface.material.texture(slot));
                }

                let item = DrawItem {
                    key: SurfaceKey { node: node_id, index },
                    geometry_id: surface.geometry,
                    geometry,
                    material: &surface.material,
                    world: *world,
                    textures: bindings,
                    camera_distance: origin.distance(camera_position),
                };

                if geometry.is_points() {
                    list.points.push(item);
                } else if surface.material.is_transparent() {
                    list.transparent.push(item);
                } else {
                    list.opaque.push(item);
                }
            }
        });

        list.opaque.sort_by(|a, b| a.camera_distance.total_cmp(&b.camera_distance));
        list.transparent.sort_by(|a, b| b.camera_distance.total_cmp(&a.camera_distance));
        list
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len() + self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every drawable item in draw order, points first.
    pub fn iter(&self) -> impl Iterator<Item = &DrawItem<'a>> {
        self.points.iter().chain(self.opaque.iter()).chain(self.transparent.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{
        math::Transform,
        scene_graph::{Color, MaterialFlags, Surface},
    };

    fn graph_with_layers() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let sphere = graph.add_geometry(Geometry::sphere(1.0, 8, 8));

        let near = graph.add_node(graph.root(), "near", Transform::from_position(glam::vec3(0.0, 0.0, 5.0))).unwrap();
        let far = graph.add_node(graph.root(), "far", Transform::from_position(glam::vec3(0.0, 0.0, -5.0))).unwrap();
        let solid = graph.add_node(graph.root(), "solid", Transform::IDENTITY).unwrap();

        let glass = Material::basic(Color::WHITE).with_flags(MaterialFlags::TRANSPARENT);
        graph.add_surface(near, Surface::new(sphere, glass.clone())).unwrap();
        graph.add_surface(far, Surface::new(sphere, glass)).unwrap();
        graph.add_surface(solid, Surface::new(sphere, Material::phong(0.04))).unwrap();
        (graph, near, far, solid)
    }

    #[test]
    fn transparent_surfaces_are_sorted_back_to_front() {
        let (graph, near, far, solid) = graph_with_layers();
        let textures = TextureStore::new();
        let list = DrawList::collect(&graph, &textures, glam::vec3(0.0, 0.0, 10.0));

        assert_eq!(list.opaque.len(), 1);
        assert_eq!(list.opaque[0].key.node, solid);
        let order: Vec<NodeId> = list.transparent.iter().map(|item| item.key.node).collect();
        assert_eq!(order, vec![far, near]);
    }

    #[test]
    fn pending_textures_resolve_blank() {
        let mut graph = SceneGraph::new();
        let mut textures = TextureStore::new();
        let map = textures.load("missing/earth_map.jpg");
        let sphere = graph.add_geometry(Geometry::sphere(1.0, 8, 8));
        let node = graph.add_node(graph.root(), "textured", Transform::IDENTITY).unwrap();
        graph.add_surface(node, Surface::new(
            sphere,
            Material::phong(0.04).with_texture(TextureSlot::ColorMap, map),
        )).unwrap();

        let list = DrawList::collect(&graph, &textures, glam::Vec3::Z);
        let item = &list.opaque[0];
        assert_eq!(item.texture(TextureSlot::ColorMap), TextureBinding::Blank);
        assert_eq!(item.texture(TextureSlot::BumpMap), TextureBinding::Neutral);
    }

    #[test]
    fn lights_take_world_position_of_their_node() {
        let mut graph = SceneGraph::new();
        let group = graph.add_node(graph.root(), "group", Transform::from_position(glam::vec3(1.0, 2.0, 3.0))).unwrap();
        graph.add_light(group, PointLight {
            color: Color::WHITE,
            intensity: 300.0,
            distance: 1000.0,
            decay: 1.7,
        }).unwrap();

        let list = DrawList::collect(&graph, &TextureStore::new(), glam::Vec3::ZERO);
        assert_eq!(list.lights.len(), 1);
        assert!(list.lights[0].position.abs_diff_eq(glam::vec3(1.0, 2.0, 3.0), 1e-6));
        assert!(list.is_empty());
    }
}
