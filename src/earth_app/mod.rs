pub mod config;
pub mod scene;
pub mod starfield;
pub mod spin;
pub mod texture_streaming;
pub mod modules;

mod define_renderer;
pub use define_renderer::define_renderer;

mod define_updater;
pub use define_updater::define_updater;

pub mod init_scene;
pub use init_scene::init_scene;

/// Small deterministic scene whose textures never resolve.
#[cfg(test)]
pub fn test_config() -> config::SceneConfig {
    let mut config = config::SceneConfig::default();
    config.textures.directory = "does-not-exist/textures".into();
    config.stars.count = 200;
    config.stars.seed = Some(1);
    config
}
