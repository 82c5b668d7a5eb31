use crate::{
    debug,
    framework::updater::{UpdateContext, UpdateResultAction, UpdaterModule},
};

use super::scene::Scene;

/// Collects textures decoded in the background so the renderer can pick them up.
#[derive(Debug, Default)]
pub struct TextureStreaming;

impl UpdaterModule<Scene> for TextureStreaming {
    #[profiler::function]
    fn update(&mut self, context: &mut UpdateContext<Scene>) -> UpdateResultAction {
        let textures = &mut context.scene.textures;
        if textures.poll() == 0 {
            return UpdateResultAction::None;
        }
        debug!("{} textures still loading", textures.pending_count());
        UpdateResultAction::Redraw
    }
}
