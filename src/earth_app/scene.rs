use crate::framework::{
    assets::TextureStore,
    camera::{CameraRig, OrbitCameraRig, SceneWithCamera, Viewport},
    scene_graph::{NodeId, SceneGraph},
};

use super::config::SpinConfig;

/// Handles of the nodes the application mutates after construction.
#[derive(Debug, Clone, Copy)]
pub struct SceneNodes {
    pub sun:       NodeId,
    pub earth:     NodeId,
    pub clouds:    NodeId,
    pub starfield: NodeId,
}

#[derive(Debug, Default)]
pub struct SceneCounters {
    /// Frames animated so far
    pub frames: u64,
}

/// Everything the frame loop, resize handler and renderer share, owned by the event loop.
pub struct Scene {
    pub graph:      SceneGraph,
    pub textures:   TextureStore,
    pub camera_rig: OrbitCameraRig,
    pub viewport:   Viewport,
    pub nodes:      SceneNodes,
    pub spin:       SpinConfig,
    pub counters:   SceneCounters,
}

impl SceneWithCamera for Scene {
    fn get_camera_rig(&self) -> &dyn CameraRig {
        &self.camera_rig
    }

    fn get_camera_mut(&mut self) -> &mut dyn CameraRig {
        &mut self.camera_rig
    }

    fn get_viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }
}
