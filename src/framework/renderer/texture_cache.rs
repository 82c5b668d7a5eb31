use std::collections::HashMap;

use crate::framework::{
    assets::{TextureBinding, TextureId, TextureStore},
    gpu,
};

/// GPU copies of decoded textures, uploaded lazily as the images become ready.
#[derive(Debug)]
pub struct TextureCache {
    textures:   HashMap<TextureId, gpu::Texture>,
    neutral:    gpu::Texture,
    blank:      gpu::Texture,
    sampler:    wgpu::Sampler,
    generation: Option<u64>,
}

impl TextureCache {
    pub fn new(gpu: &gpu::Context) -> Self {
        Self {
            textures:   HashMap::new(),
            neutral:    gpu::Texture::solid(&gpu.device, &gpu.queue, [255, 255, 255, 255], "Neutral Texture"),
            blank:      gpu::Texture::solid(&gpu.device, &gpu.queue, [0, 0, 0, 255], "Blank Texture"),
            sampler:    gpu::Texture::create_sampler(&gpu.device),
            generation: None,
        }
    }

    /// Uploads images which became ready since last call, returns true when anything was uploaded.
    #[profiler::function]
    pub fn sync(&mut self, gpu: &gpu::Context, store: &TextureStore) -> bool {
        if self.generation == Some(store.generation()) {
            return false;
        }
        self.generation = Some(store.generation());

        let mut uploaded = false;
        for (id, image) in store.ready() {
            if self.textures.contains_key(&id) {
                continue;
            }
            profiler::scope!("Upload texture");
            let texture = gpu::Texture::from_image(&gpu.device, &gpu.queue, image, store.label(id));
            self.textures.insert(id, texture);
            uploaded = true;
        }
        uploaded
    }

    pub fn view(&self, binding: TextureBinding) -> &wgpu::TextureView {
        match binding {
            TextureBinding::Loaded(id) => self.textures.get(&id).map_or(&self.blank.view, |texture| &texture.view),
            TextureBinding::Neutral => &self.neutral.view,
            TextureBinding::Blank => &self.blank.view,
        }
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
