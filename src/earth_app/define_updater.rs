use crate::framework::{
    application::Context,
    updater::Updater,
    camera::CameraUpdater,
};

use super::{
    scene::Scene,
    spin::SpinAnimator,
    texture_streaming::TextureStreaming,
};

pub fn define_updater(_context: &Context) -> Updater<Scene> {
    Updater::new()
        .with_module(TextureStreaming)
        .with_module(SpinAnimator)
        .with_module(CameraUpdater)
}
