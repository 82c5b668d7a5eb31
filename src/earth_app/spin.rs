use crate::framework::{
    math::accumulated_angle,
    updater::{UpdateContext, UpdateResultAction, UpdaterModule},
};

use super::scene::Scene;

/// Advances the scene by one frame.
///  - increments are fixed per frame and never scaled by elapsed time
///  - every animated node starts at zero Y rotation, its angle after N frames is `N * increment` modulo 2π
pub fn advance_frame(scene: &mut Scene) {
    scene.counters.frames += 1;
    let frames = scene.counters.frames;
    let nodes = scene.nodes;
    let spin = scene.spin;
    for (node, step) in [
        (nodes.sun, spin.sun),
        (nodes.earth, spin.earth),
        (nodes.clouds, spin.clouds),
        (nodes.starfield, spin.stars),
    ] {
        if let Some(transform) = scene.graph.transform_mut(node) {
            transform.rotation.y = accumulated_angle(frames, step);
        }
    }
}

/// Updater module running the scene animation once per displayed frame.
#[derive(Debug, Default)]
pub struct SpinAnimator;

impl UpdaterModule<Scene> for SpinAnimator {
    #[profiler::function]
    fn update(&mut self, context: &mut UpdateContext<Scene>) -> UpdateResultAction {
        advance_frame(context.scene);
        UpdateResultAction::Redraw
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;
    use crate::{
        earth_app::{config::SceneConfig, init_scene::build_scene, test_config},
        framework::{camera::Viewport, scene_graph::NodeId},
    };

    fn rotation_y(scene: &Scene, node: NodeId) -> f32 {
        scene.graph.node(node).unwrap().transform.rotation.y
    }

    /// Compares angles modulo full turn.
    fn assert_angle(actual: f32, expected: f64, tolerance: f64) {
        let diff = (actual as f64 - expected).rem_euclid(TAU);
        let diff = diff.min(TAU - diff);
        assert!(diff < tolerance, "angle {actual} differs from {expected} by {diff}");
    }

    #[test]
    fn frames_accumulate_fixed_increments() {
        let mut scene = build_scene(&test_config(), Viewport::new(800, 600)).unwrap();
        for _ in 0..120 {
            advance_frame(&mut scene);
        }
        let n = 120.0;
        assert_angle(rotation_y(&scene, scene.nodes.sun), n * 0.001, 1e-6);
        assert_angle(rotation_y(&scene, scene.nodes.earth), n * 0.002, 1e-6);
        assert_angle(rotation_y(&scene, scene.nodes.clouds), n * 0.001, 1e-6);
        assert_angle(rotation_y(&scene, scene.nodes.starfield), -n * 0.0002, 1e-6);
        assert_eq!(scene.counters.frames, 120);
    }

    #[test]
    fn five_hundred_frames_rotate_earth_by_one_radian() {
        let mut scene = build_scene(&test_config(), Viewport::new(800, 600)).unwrap();
        for _ in 0..500 {
            advance_frame(&mut scene);
        }
        assert_angle(rotation_y(&scene, scene.nodes.earth), 1.0, 1e-6);
        assert_angle(rotation_y(&scene, scene.nodes.sun), 0.5, 1e-6);
    }

    #[test]
    fn hours_of_frames_keep_exact_angles() {
        let mut scene = build_scene(&test_config(), Viewport::new(800, 600)).unwrap();
        let spin = scene.spin;
        for frame in 1..=1_000_000u64 {
            advance_frame(&mut scene);
            // one hour at 60 fps, then the end of the run
            if frame == 216_000 || frame == 1_000_000 {
                let n = frame as f64;
                assert_angle(rotation_y(&scene, scene.nodes.sun), n * spin.sun, 1e-5);
                assert_angle(rotation_y(&scene, scene.nodes.earth), n * spin.earth, 1e-5);
                assert_angle(rotation_y(&scene, scene.nodes.clouds), n * spin.clouds, 1e-5);
                assert_angle(rotation_y(&scene, scene.nodes.starfield), n * spin.stars, 1e-5);
            }
        }
        assert_eq!(scene.counters.frames, 1_000_000);
    }

    #[test]
    fn angles_stay_wrapped() {
        let config = SceneConfig {
            spin: crate::earth_app::config::SpinConfig { sun: 1.0, earth: 2.0, clouds: -3.0, stars: -0.5 },
            ..test_config()
        };
        let mut scene = build_scene(&config, Viewport::new(800, 600)).unwrap();
        for _ in 0..1000 {
            advance_frame(&mut scene);
        }
        for node in [scene.nodes.sun, scene.nodes.earth, scene.nodes.clouds, scene.nodes.starfield] {
            let angle = rotation_y(&scene, node);
            assert!((0.0..std::f32::consts::TAU).contains(&angle), "angle {angle} not wrapped");
        }
    }

    #[test]
    fn earth_tilt_is_never_touched() {
        let mut scene = build_scene(&test_config(), Viewport::new(800, 600)).unwrap();
        let tilt = scene.graph.node(scene.nodes.earth).unwrap().transform.rotation.z;
        for _ in 0..300 {
            advance_frame(&mut scene);
        }
        let transform = scene.graph.node(scene.nodes.earth).unwrap().transform;
        assert_eq!(transform.rotation.z, tilt);
        assert!((tilt - (-23.4f32).to_radians()).abs() < 1e-6);
        assert_eq!(transform.rotation.x, 0.0);
    }
}
