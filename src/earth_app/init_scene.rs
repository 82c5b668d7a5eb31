
use std::time::Duration;

use anyhow::Result;

use crate::{
    info,
    framework::{
        application::Context,
        assets::TextureStore,
        camera::{Camera, OrbitCameraRig, Viewport},
        math::Transform,
        scene_graph::{
            Color,
            Geometry,
            Material,
            MaterialFlags,
            NodeId,
            PointLight,
            SceneGraph,
            Surface,
            TextureSlot,
        },
    },
};

use super::{
    config::SceneConfig,
    scene::{Scene, SceneCounters, SceneNodes},
    starfield::{generate_stars, starfield_rng},
};

const EARTH_GLOW_RIM: u32 = 0x0088ff;
const SUN_EMISSIVE:   u32 = 0xff5500;
const SUN_GLOW:       u32 = 0xff8800;

pub fn init_scene(context: &Context, config: &SceneConfig) -> Result<Scene> {
    build_scene(config, Viewport::from(context.window.inner_size()))
}

/// Builds the whole scene hierarchy, texture loads are only requested unless the config asks to wait for them.
#[profiler::function(pinned)]
pub fn build_scene(config: &SceneConfig, viewport: Viewport) -> Result<Scene> {
    let mut graph = SceneGraph::new();
    let mut textures = TextureStore::new();
    let root = graph.root();

    // Request textures
    // ----------------

    let paths = &config.textures;
    let earth_map      = textures.load(paths.resolve(&paths.earth_map));
    let earth_specular = textures.load(paths.resolve(&paths.earth_specular));
    let earth_bump     = textures.load(paths.resolve(&paths.earth_bump));
    let earth_lights   = textures.load(paths.resolve(&paths.earth_lights));
    let clouds_map     = textures.load(paths.resolve(&paths.clouds));
    let clouds_alpha   = textures.load(paths.resolve(&paths.clouds_alpha));
    let sun_map        = textures.load(paths.resolve(&paths.sun));

    let solar_system = graph.add_node(root, "solar_system", Transform::IDENTITY)?;

    // Earth group with four layers sharing one geometry
    // -------------------------------------------------

    let earth_config = &config.earth;
    let earth = graph.add_node(
        solar_system,
        "earth",
        Transform::from_position(glam::Vec3::from(earth_config.position))
            .with_rotation(glam::vec3(0.0, 0.0, earth_config.tilt_degrees.to_radians())),
    )?;
    let earth_geometry = graph.add_geometry(Geometry::icosahedron(earth_config.radius, earth_config.detail));

    add_layer(
        &mut graph,
        earth,
        "earth_surface",
        Transform::IDENTITY,
        Surface::new(
            earth_geometry,
            Material::phong(earth_config.bump_scale)
                .with_texture(TextureSlot::ColorMap, earth_map)
                .with_texture(TextureSlot::SpecularMap, earth_specular)
                .with_texture(TextureSlot::BumpMap, earth_bump),
        ),
    )?;

    add_layer(
        &mut graph,
        earth,
        "earth_lights",
        Transform::IDENTITY,
        Surface::new(
            earth_geometry,
            Material::basic(Color::WHITE)
                .with_texture(TextureSlot::ColorMap, earth_lights)
                .with_flags(MaterialFlags::ADDITIVE),
        ),
    )?;

    let clouds = add_layer(
        &mut graph,
        earth,
        "clouds",
        Transform::from_uniform_scale(earth_config.clouds_scale),
        Surface::new(
            earth_geometry,
            Material::standard(Color::BLACK, 1.0)
                .with_texture(TextureSlot::ColorMap, clouds_map)
                .with_texture(TextureSlot::AlphaMap, clouds_alpha)
                .with_opacity(earth_config.clouds_opacity)
                .with_flags(MaterialFlags::TRANSPARENT | MaterialFlags::ADDITIVE),
        ),
    )?;

    add_layer(
        &mut graph,
        earth,
        "glow",
        Transform::from_uniform_scale(earth_config.glow_scale),
        Surface::new(
            earth_geometry,
            Material::fresnel(Color::from_hex(EARTH_GLOW_RIM), Color::BLACK),
        ),
    )?;

    // Sun group with the only light of the scene
    // ------------------------------------------

    let sun_config = &config.sun;
    let sun = graph.add_node(solar_system, "sun", Transform::IDENTITY)?;

    let sun_glow_geometry = graph.add_geometry(Geometry::sphere(sun_config.glow_radius, sun_config.segments, sun_config.segments));
    add_layer(
        &mut graph,
        sun,
        "sun_glow",
        Transform::IDENTITY,
        Surface::new(
            sun_glow_geometry,
            Material::basic(Color::from_hex(SUN_GLOW))
                .with_opacity(sun_config.glow_opacity)
                .with_flags(MaterialFlags::TRANSPARENT | MaterialFlags::ADDITIVE),
        ),
    )?;

    let sun_geometry = graph.add_geometry(Geometry::sphere(sun_config.radius, sun_config.segments, sun_config.segments));
    add_layer(
        &mut graph,
        sun,
        "sun_mesh",
        Transform::IDENTITY,
        Surface::new(
            sun_geometry,
            Material::standard(Color::from_hex(SUN_EMISSIVE), sun_config.emissive_intensity)
                .with_texture(TextureSlot::EmissiveMap, sun_map),
        ),
    )?;

    graph.add_light(sun, PointLight {
        color:     Color::WHITE,
        intensity: sun_config.light_intensity,
        distance:  sun_config.light_distance,
        decay:     sun_config.light_decay,
    })?;

    // Starfield outside of the solar system
    // -------------------------------------

    let stars = generate_stars(&config.stars, &mut starfield_rng(&config.stars));
    let star_count = stars.len();
    let starfield = graph.add_node(root, "starfield", Transform::IDENTITY)?;
    let star_geometry = graph.add_geometry(Geometry::points(stars));
    graph.add_surface(starfield, Surface::new(star_geometry, Material::points(config.stars.size)))?;

    // Optional explicit ready gate
    // ----------------------------

    if paths.wait_until_loaded {
        textures.wait_until_settled(Duration::from_millis(paths.wait_timeout_ms));
    }

    // Camera orbiting the origin
    // --------------------------

    let camera = Camera {
        aspect_ratio: if viewport.is_empty() { 1.0 } else { viewport.aspect_ratio() },
        fov:          config.camera.fov,
        near:         config.camera.near,
        far:          config.camera.far,
        position:     glam::vec3(0.0, 0.0, config.camera.distance),
        ..Default::default()
    }.look_at(glam::Vec3::ZERO);

    info!(
        "Scene built: {} nodes, {} stars, {} textures requested",
        graph.node_count(),
        star_count,
        textures.len(),
    );

    Ok(Scene {
        graph,
        textures,
        camera_rig: OrbitCameraRig::from_camera(camera, glam::Vec3::ZERO),
        viewport,
        nodes: SceneNodes { sun, earth, clouds, starfield },
        spin: config.spin,
        counters: SceneCounters::default(),
    })
}

/// Node holding exactly one surface.
fn add_layer(graph: &mut SceneGraph, parent: NodeId, name: &str, transform: Transform, surface: Surface) -> Result<NodeId> {
    let node = graph.add_node(parent, name, transform)?;
    graph.add_surface(node, surface)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        earth_app::test_config,
        framework::{
            assets::TextureBinding,
            camera::CameraRig,
            scene_graph::{DrawList, Shading},
        },
    };
    use strum::IntoEnumIterator;

    fn scene() -> Scene {
        build_scene(&test_config(), Viewport::new(1600, 900)).unwrap()
    }

    fn children_named(scene: &Scene, node: NodeId) -> Vec<String> {
        scene.graph.node(node).unwrap().children().iter()
            .map(|child| scene.graph.node(*child).unwrap().name.clone())
            .collect()
    }

    fn child(scene: &Scene, parent: NodeId, name: &str) -> NodeId {
        *scene.graph.node(parent).unwrap().children().iter()
            .find(|child| scene.graph.node(**child).unwrap().name == name)
            .unwrap()
    }

    #[test]
    fn earth_has_four_layers_sharing_one_geometry() {
        let scene = scene();
        assert_eq!(
            children_named(&scene, scene.nodes.earth),
            vec!["earth_surface", "earth_lights", "clouds", "glow"],
        );

        let layers = ["earth_surface", "earth_lights", "clouds", "glow"].map(|name| child(&scene, scene.nodes.earth, name));
        assert_eq!(layers[2], scene.nodes.clouds);
        let geometries: Vec<_> = layers.iter()
            .map(|layer| {
                let surfaces = scene.graph.node(*layer).unwrap().surfaces();
                assert_eq!(surfaces.len(), 1);
                surfaces[0].geometry
            })
            .collect();
        assert!(geometries.iter().all(|geometry| *geometry == geometries[0]));
        assert_eq!(scene.graph.geometry(geometries[0]).unwrap().triangle_count(), 20 * 13 * 13);
    }

    #[test]
    fn hierarchy_has_single_sun_earth_and_starfield() {
        let scene = scene();
        let root = scene.graph.root();
        assert_eq!(children_named(&scene, root), vec!["solar_system", "starfield"]);
        let solar_system = child(&scene, root, "solar_system");
        assert_eq!(children_named(&scene, solar_system), vec!["earth", "sun"]);
        assert_eq!(child(&scene, solar_system, "sun"), scene.nodes.sun);
        assert_eq!(children_named(&scene, scene.nodes.sun), vec!["sun_glow", "sun_mesh"]);
        assert_eq!(scene.graph.node(scene.nodes.sun).unwrap().lights().len(), 1);

        // every created node is reachable from the root exactly once
        let mut visited = 0;
        scene.graph.traverse(|_, _, _| visited += 1);
        assert_eq!(visited, scene.graph.node_count());
    }

    #[test]
    fn earth_group_is_placed_and_tilted() {
        let scene = scene();
        let transform = scene.graph.node(scene.nodes.earth).unwrap().transform;
        assert_eq!(transform.position, glam::vec3(15.0, 0.0, 0.0));
        assert!((transform.rotation.z - (-23.4f32).to_radians()).abs() < 1e-6);

        let clouds = scene.graph.node(scene.nodes.clouds).unwrap();
        assert_eq!(clouds.transform.scale, glam::Vec3::splat(1.003));
        let material = &clouds.surfaces()[0].material;
        assert!(material.is_transparent() && material.is_additive());
        assert_eq!(material.opacity, 0.8);
        assert!(matches!(
            scene.graph.node(child(&scene, scene.nodes.earth, "glow")).unwrap().surfaces()[0].material.shading,
            Shading::Fresnel { power, .. } if power == 4.0
        ));
    }

    #[test]
    fn camera_matches_viewport() {
        let scene = scene();
        let camera = scene.camera_rig.camera();
        assert_eq!(camera.aspect_ratio, 1600.0 / 900.0);
        assert_eq!(camera.fov, 75.0);
        assert_eq!(camera.position, glam::vec3(0.0, 0.0, 10.0));
    }

    #[test]
    fn drawing_before_textures_load_uses_blank_bindings() {
        let scene = scene();
        let list = DrawList::collect(&scene.graph, &scene.textures, scene.camera_rig.camera().position);

        assert_eq!(list.points.len(), 1);
        assert_eq!(list.lights.len(), 1);
        assert_eq!(list.len(), 7);
        for item in list.iter() {
            for slot in TextureSlot::iter() {
                if item.material.texture(slot).is_some() {
                    assert_eq!(item.texture(slot), TextureBinding::Blank, "{slot} of {:?}", item.key);
                }
            }
        }
    }

    #[test]
    fn waiting_for_missing_textures_settles_them_as_failed() {
        let mut config = test_config();
        config.textures.wait_until_loaded = true;
        config.textures.wait_timeout_ms = 10_000;
        let scene = build_scene(&config, Viewport::new(800, 600)).unwrap();
        assert_eq!(scene.textures.pending_count(), 0);
        assert_eq!(scene.textures.len(), 7);
    }
}
