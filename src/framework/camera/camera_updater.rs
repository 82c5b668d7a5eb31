use winit::dpi::PhysicalSize;

use crate::framework::updater::{
    InputUpdateResult, ResizeContext, UpdateContext, UpdateResultAction, UpdaterModule,
};

use super::{CameraRig, SceneWithCamera};

/// Size of the output surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width:  u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimized windows report zero sized viewport which has no meaningful aspect ratio.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Keeps camera aspect ratio consistent with the viewport.
///  - zero sized viewports are ignored
///  - returns `Redraw` only when something changed, repeated calls with the same size are no-ops
pub fn apply_viewport(rig: &mut dyn CameraRig, viewport: &mut Viewport, new_viewport: Viewport) -> UpdateResultAction {
    if new_viewport.is_empty() {
        return UpdateResultAction::None;
    }
    let aspect_ratio = new_viewport.aspect_ratio();
    if *viewport == new_viewport && rig.camera().aspect_ratio == aspect_ratio {
        return UpdateResultAction::None;
    }
    *viewport = new_viewport;
    rig.set_camera(super::Camera {
        aspect_ratio,
        ..*rig.camera()
    });
    UpdateResultAction::Redraw
}

/// Drives scene camera rig from user input and keeps its projection in sync with window size.
#[derive(Default)]
pub struct CameraUpdater;

impl<S: SceneWithCamera> UpdaterModule<S> for CameraUpdater {
    #[profiler::function]
    fn input(&mut self, context: &mut UpdateContext<S>) -> InputUpdateResult {
        context.scene.get_camera_mut().on_input(context.input);
        InputUpdateResult::default() // do not prevent event propagation
    }

    #[profiler::function]
    fn update(&mut self, context: &mut UpdateContext<S>) -> UpdateResultAction {
        let moved = context.scene.get_camera_mut().update(context.frame.delta.as_secs_f32());
        if moved {
            UpdateResultAction::Redraw
        } else {
            UpdateResultAction::None
        }
    }

    #[profiler::function]
    fn resize(&mut self, context: &mut ResizeContext<S>) -> UpdateResultAction {
        let new_viewport = Viewport::from(*context.size);
        let scene = &mut *context.scene;
        let mut viewport = *scene.get_viewport_mut();
        let result = apply_viewport(scene.get_camera_mut(), &mut viewport, new_viewport);
        *scene.get_viewport_mut() = viewport;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::camera::{Camera, OrbitCameraRig};

    fn rig() -> OrbitCameraRig {
        OrbitCameraRig::from_camera(
            Camera { position: glam::vec3(0.0, 0.0, 10.0), ..Default::default() },
            glam::Vec3::ZERO,
        )
    }

    #[test]
    fn aspect_ratio_follows_viewport() {
        let mut rig = rig();
        let mut viewport = Viewport::new(800, 600);
        apply_viewport(&mut rig, &mut viewport, Viewport::new(1920, 1080));
        assert_eq!(viewport, Viewport::new(1920, 1080));
        assert!((rig.camera().aspect_ratio - 1920.0 / 1080.0).abs() < f32::EPSILON);
    }

    #[test]
    fn repeated_resize_is_idempotent() {
        let mut rig = rig();
        let mut viewport = Viewport::new(800, 600);

        let first = apply_viewport(&mut rig, &mut viewport, Viewport::new(1024, 768));
        let after_first = (*rig.camera(), viewport);
        let second = apply_viewport(&mut rig, &mut viewport, Viewport::new(1024, 768));

        assert!(matches!(first, UpdateResultAction::Redraw));
        assert!(matches!(second, UpdateResultAction::None));
        assert_eq!((*rig.camera(), viewport), after_first);
    }

    #[test]
    fn minimized_window_is_ignored() {
        let mut rig = rig();
        let mut viewport = Viewport::new(800, 600);
        apply_viewport(&mut rig, &mut viewport, Viewport::new(800, 600));
        let result = apply_viewport(&mut rig, &mut viewport, Viewport::new(800, 0));
        assert!(matches!(result, UpdateResultAction::None));
        assert_eq!(viewport, Viewport::new(800, 600));
        assert!((rig.camera().aspect_ratio - 800.0 / 600.0).abs() < f32::EPSILON);
    }
}
