
use std::num::NonZeroU32;

#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Uploads the image as it is, texel values are not decoded from sRGB when sampled.
    #[profiler::function]
    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, img: &image::RgbaImage, label: Option<&str>) -> Self {
        let dimensions = wgpu::Extent3d {
            width: img.width(),
            height: img.height(),
            depth_or_array_layers: 1, // 2D texture is just special case of flat 3d texture
        };

        let texture = profiler::call!(
            device.create_texture(
                &wgpu::TextureDescriptor {
                    label,
                    size: dimensions,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                }
            )
        );

        // copy data from cpu to gpu
        profiler::call!(
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All
                },
                img.as_raw(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: NonZeroU32::new(4 * img.width()),
                    rows_per_image: NonZeroU32::new(img.height()),
                },
                dimensions
            )
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Single texel texture standing in for a missing image.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::from_image(device, queue, &img, Some(label))
    }

    /// Bilinear repeating sampler shared by all material textures.
    pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..wgpu::SamplerDescriptor::default()
        })
    }
}

/// Samples per pixel of the base pass color and depth attachments.
pub const MSAA_SAMPLE_COUNT: u32 = 4;

/// Multisampling setup of pipelines drawing into attachments with `sample_count` samples.
pub fn multisample_state(sample_count: u32) -> wgpu::MultisampleState {
    wgpu::MultisampleState {
        count: sample_count, // <- number of samples
        mask: !0,            // use all the samples
        alpha_to_coverage_enabled: false,
    }
}

/// Render attachment covering the whole surface.
fn attachment_descriptor<'a>(
    label: &'a str,
    format: wgpu::TextureFormat,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureDescriptor<'a> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

/// Multisampled color target which is resolved into the surface texture at the end of a pass.
#[derive(Debug)]
pub struct MultisampledTarget {
    texture: Texture,
}

impl MultisampledTarget {
    #[profiler::function]
    pub fn new(label: &str, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> Self {
        let texture = profiler::call!(
            device.create_texture(&attachment_descriptor(label, config.format, config, sample_count))
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture: Texture { texture, view },
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }
}

/// A construction of depth buffer texture according to: https://sotrh.github.io/learn-wgpu/beginner/tutorial8-depth/#a-pixels-depth
#[derive(Debug)]
pub struct DepthStencilTexture {
    texture: Texture,
}

impl DepthStencilTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    #[profiler::function]
    pub fn new(label: &str, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> Self {
        let texture = profiler::call!(
            device.create_texture(&attachment_descriptor(label, Self::DEPTH_FORMAT, config, sample_count))
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture: Texture { texture, view },
        }
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Depth test which lets coincident layers of one geometry draw over each other.
    pub fn stencil(depth_write_enabled: bool) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachments_cover_surface_with_same_sample_count() {
        let config = wgpu::SurfaceConfiguration {
            usage:        wgpu::TextureUsages::RENDER_ATTACHMENT,
            format:       wgpu::TextureFormat::Bgra8Unorm,
            width:        800,
            height:       0,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode:   wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        let color = attachment_descriptor("color", config.format, &config, MSAA_SAMPLE_COUNT);
        let depth = attachment_descriptor("depth", DepthStencilTexture::DEPTH_FORMAT, &config, MSAA_SAMPLE_COUNT);

        assert_eq!(color.sample_count, 4);
        assert_eq!(depth.sample_count, color.sample_count);
        assert_eq!(color.size, depth.size);
        assert_eq!((color.size.width, color.size.height), (800, 1));
        assert_eq!(color.format, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(multisample_state(MSAA_SAMPLE_COUNT).count, color.sample_count);
    }
}
