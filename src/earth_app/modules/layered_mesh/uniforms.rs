use crate::framework::scene_graph::{LightItem, Material, Shading};

pub const MAX_LIGHTS: usize = 4;

// shading model ids understood by the mesh shader
const SHADING_PHONG:    u32 = 0;
const SHADING_BASIC:    u32 = 1;
const SHADING_STANDARD: u32 = 2;
const SHADING_FRESNEL:  u32 = 3;

/// Material parameters laid out for the uniform buffer of one surface.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color:    glam::Vec4,
    pub specular: glam::Vec4,
    pub emissive: glam::Vec4,
    pub rim:      glam::Vec4,
    pub facing:   glam::Vec4,
    pub params:   glam::Vec4,
    pub kind:     glam::UVec4,
}

impl MaterialUniform {
    pub fn from_material(material: &Material) -> Self {
        let mut uniform = Self {
            color: material.color.rgb().extend(material.opacity),
            kind:  glam::uvec4(SHADING_BASIC, 1, 0, 0),
            ..Default::default()
        };

        match material.shading {
            Shading::Phong { specular, shininess, bump_scale } => {
                uniform.kind.x = SHADING_PHONG;
                uniform.specular = specular.rgb().extend(shininess);
                uniform.params.x = bump_scale;
            },
            Shading::Standard { emissive, emissive_intensity } => {
                uniform.kind.x = SHADING_STANDARD;
                uniform.emissive = emissive.rgb().extend(emissive_intensity);
            },
            Shading::Fresnel { rim, facing, bias, scale, power } => {
                uniform.kind = glam::uvec4(SHADING_FRESNEL, 0, 0, 0);
                uniform.rim = rim.rgb().extend(bias);
                uniform.facing = facing.rgb().extend(scale);
                uniform.params.y = power;
            },
            // points on a triangle mesh are drawn unlit
            Shading::Basic | Shading::Points { .. } => {},
        }
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: glam::Vec4,
    /// rgb multiplied by intensity
    pub color:    glam::Vec4,
    /// x: cutoff distance, y: decay
    pub params:   glam::Vec4,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub count:  glam::UVec4,
    pub lights: [PointLightUniform; MAX_LIGHTS],
}

impl LightsUniform {
    /// Lights past [`MAX_LIGHTS`] are ignored.
    pub fn from_lights(lights: &[LightItem]) -> Self {
        let mut uniform = Self::default();
        for (slot, item) in uniform.lights.iter_mut().zip(lights) {
            *slot = PointLightUniform {
                position: item.position.extend(1.0),
                color:    (item.light.color.rgb() * item.light.intensity).extend(1.0),
                params:   glam::vec4(item.light.distance, item.light.decay, 0.0, 0.0),
            };
        }
        uniform.count.x = lights.len().min(MAX_LIGHTS) as u32;
        uniform
    }
}

/// Fixed function state a surface is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfacePipeline {
    /// Replaces color, writes depth
    Opaque,
    /// Adds color but still occludes what is drawn later
    AdditiveDepthWrite,
    /// Blended over by alpha, no depth write
    AlphaBlended,
    /// Adds color, no depth write
    Additive,
}

impl SurfacePipeline {
    pub fn for_material(material: &Material) -> Self {
        match (material.is_transparent(), material.is_additive()) {
            (false, false) => Self::Opaque,
            (false, true) => Self::AdditiveDepthWrite,
            (true, false) => Self::AlphaBlended,
            (true, true) => Self::Additive,
        }
    }

    pub fn depth_write(self) -> bool {
        matches!(self, Self::Opaque | Self::AdditiveDepthWrite)
    }

    pub fn blend(self) -> Option<wgpu::BlendState> {
        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation:  wgpu::BlendOperation::Add,
        };
        match self {
            Self::Opaque => Some(wgpu::BlendState::REPLACE),
            Self::AlphaBlended => Some(wgpu::BlendState::ALPHA_BLENDING),
            Self::Additive | Self::AdditiveDepthWrite => Some(wgpu::BlendState {
                color: additive,
                alpha: additive,
            }),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Opaque => "Opaque Mesh Pipeline",
            Self::AdditiveDepthWrite => "Additive Depth Writing Mesh Pipeline",
            Self::AlphaBlended => "Alpha Blended Mesh Pipeline",
            Self::Additive => "Additive Mesh Pipeline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::scene_graph::{Color, MaterialFlags, PointLight};

    #[test]
    fn pipeline_follows_material_flags() {
        let lights = Material::basic(Color::WHITE).with_flags(MaterialFlags::ADDITIVE);
        let clouds = Material::standard(Color::BLACK, 1.0)
            .with_flags(MaterialFlags::TRANSPARENT | MaterialFlags::ADDITIVE);

        assert_eq!(SurfacePipeline::for_material(&Material::phong(0.04)), SurfacePipeline::Opaque);
        assert_eq!(SurfacePipeline::for_material(&lights), SurfacePipeline::AdditiveDepthWrite);
        assert_eq!(SurfacePipeline::for_material(&clouds), SurfacePipeline::Additive);
        assert!(SurfacePipeline::AdditiveDepthWrite.depth_write());
        assert!(!SurfacePipeline::Additive.depth_write());
        assert!(!SurfacePipeline::AlphaBlended.depth_write());
    }

    #[test]
    fn fresnel_is_not_tone_mapped() {
        let fresnel = MaterialUniform::from_material(&Material::fresnel(Color::from_hex(0x0088ff), Color::BLACK));
        assert_eq!(fresnel.kind, glam::uvec4(3, 0, 0, 0));
        assert_eq!(fresnel.params.y, 4.0);
        assert_eq!(fresnel.rim.w, 0.1);

        let phong = MaterialUniform::from_material(&Material::phong(0.04));
        assert_eq!(phong.kind, glam::uvec4(0, 1, 0, 0));
        assert_eq!(phong.specular.w, 30.0);
        assert_eq!(phong.params.x, 0.04);
    }

    #[test]
    fn opacity_travels_in_color_alpha() {
        let uniform = MaterialUniform::from_material(&Material::basic(Color::from_hex(0xff8800)).with_opacity(0.5));
        assert_eq!(uniform.color.w, 0.5);
        assert_eq!(uniform.color.x, 1.0);
    }

    #[test]
    fn light_color_is_scaled_by_intensity() {
        let item = LightItem {
            position: glam::vec3(1.0, 2.0, 3.0),
            light: PointLight { color: Color::WHITE, intensity: 300.0, distance: 1000.0, decay: 1.7 },
        };
        let uniform = LightsUniform::from_lights(&[item; 6]);
        assert_eq!(uniform.count.x, MAX_LIGHTS as u32);
        assert_eq!(uniform.lights[0].color, glam::vec4(300.0, 300.0, 300.0, 1.0));
        assert_eq!(uniform.lights[3].params, glam::vec4(1000.0, 1.7, 0.0, 0.0));
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }
}
