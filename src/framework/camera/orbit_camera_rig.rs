use std::marker::PhantomData;
use winit_input_helper::WinitInputHelper;

use dolly::{
    driver::RigDriver,
    prelude::{Handedness, Position, RightHanded, Smooth, YawPitch},
    rig::RigUpdateParams,
};

use super::{Camera, CameraRig};

/// Camera orbiting a target point, dragging with left mouse button rotates, scrolling zooms.
pub struct OrbitCameraRig {
    rig: dolly::rig::CameraRig,
    camera: Camera,
    pub rotate_speed: f32,
}

impl OrbitCameraRig {
    pub fn from_camera(camera: Camera, target: glam::Vec3) -> Self {
        let distance = glam::Vec3::distance(camera.position, target);
        let camera = camera.look_at(target);

        let mut yaw_pitch = YawPitch::new();
        yaw_pitch.set_rotation_quat(camera.rotation);
        let rig = dolly::rig::CameraRig::builder()
            .with(Position::new(target))
            .with(yaw_pitch)
            .with(Smooth::new_rotation(0.8))
            .with(SmoothZoom::new(distance, 0.8))
            .build();

        Self { rig, camera, rotate_speed: 0.7 }
    }
}

impl CameraRig for OrbitCameraRig {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Takes over projection parameters, pose stays owned by the rig.
    fn set_camera(&mut self, camera: Camera) {
        self.camera.fov = camera.fov;
        self.camera.aspect_ratio = camera.aspect_ratio;
        self.camera.near = camera.near;
        self.camera.far = camera.far;
    }

    fn on_input(&mut self, input: &WinitInputHelper) {
        let (dx, dy) = input.mouse_diff();
        if (dx != 0.0 || dy != 0.0) && input.mouse_held(0) {
            self.rig
                .driver_mut::<YawPitch>()
                .rotate_yaw_pitch(-dx * self.rotate_speed, -dy * self.rotate_speed);
        }
        let scroll = input.scroll_diff();
        if scroll != 0.0 {
            self.rig
                .driver_mut::<SmoothZoom<RightHanded>>()
                .zoom(-scroll);
        }
    }

    fn update(&mut self, delta_time_seconds: f32) -> bool {
        let res = self.rig.update(delta_time_seconds);
        let position: glam::Vec3 = res.position.into();
        let rotation: glam::Quat = res.rotation.into();
        let moved = position != self.camera.position || rotation != self.camera.rotation;
        self.camera.position = position;
        self.camera.rotation = rotation;
        moved
    }
}

/// Rig driver placing the camera at a distance behind its parent, the distance changes smoothly.
/// Behaves like dolly's Arm driver with a zoomable length.
#[derive(Debug)]
pub struct SmoothZoom<H: Handedness> {
    rig: dolly::rig::CameraRig<H>,
}

impl<H: Handedness> SmoothZoom<H> {
    pub const MIN_DISTANCE: f32 = 0.1;

    pub fn new(distance: f32, smoothness: f32) -> Self {
        Self {
            rig: dolly::rig::CameraRig::builder()
                .with(Position::new(glam::vec3(0.0, 0.0, distance)))
                .with(Smooth::new_position(smoothness))
                .build(),
        }
    }

    /// Negative zoom moves closer to the parent, each unit scales distance by 30 %.
    pub fn zoom(&mut self, zoom: f32) {
        let p = self.rig.driver_mut::<Position>();
        let scale = 1.0 + zoom * 0.3;
        p.position.z = (p.position.z * scale).max(Self::MIN_DISTANCE);
    }
}

impl<H: Handedness> RigDriver<H> for SmoothZoom<H> {
    fn update(&mut self, params: RigUpdateParams<H>) -> dolly::transform::Transform<H> {
        let t = self.rig.update(params.delta_time_seconds);

        let parent_position: glam::Vec3 = params.parent.position.into();
        let parent_rotation: glam::Quat = params.parent.rotation.into();
        let offset: glam::Vec3 = t.position.into();

        let final_position = parent_position + parent_rotation * offset;
        dolly::transform::Transform {
            rotation: params.parent.rotation,
            position: final_position.into(),
            phantom: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> OrbitCameraRig {
        OrbitCameraRig::from_camera(
            Camera { position: glam::vec3(0.0, 0.0, 10.0), ..Default::default() },
            glam::Vec3::ZERO,
        )
    }

    #[test]
    fn starts_at_camera_distance_from_target() {
        let mut rig = rig();
        rig.update(1.0);
        assert!((rig.camera().position.length() - 10.0).abs() < 1e-3);
        assert!(rig.camera().position.abs_diff_eq(glam::vec3(0.0, 0.0, 10.0), 1e-3));
    }

    #[test]
    fn zoom_never_crosses_the_target() {
        let mut zoom = SmoothZoom::<RightHanded>::new(1.0, 0.8);
        for _ in 0..10 {
            zoom.zoom(-10.0);
        }
        let distance = zoom.rig.driver::<Position>().position.z;
        assert_eq!(distance, SmoothZoom::<RightHanded>::MIN_DISTANCE);
    }

    #[test]
    fn set_camera_keeps_pose() {
        let mut rig = rig();
        rig.update(1.0);
        let position = rig.camera().position;
        rig.set_camera(Camera { aspect_ratio: 2.0, position: glam::Vec3::ONE, ..Default::default() });
        assert_eq!(rig.camera().aspect_ratio, 2.0);
        assert_eq!(rig.camera().position, position);
    }
}
