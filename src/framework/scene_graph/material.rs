use bitflags::bitflags;
use strum::EnumCount;
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

use crate::framework::assets::TextureId;

/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color(pub glam::Vec3);

impl Color {
    pub const WHITE: Self = Self(glam::Vec3::ONE);
    pub const BLACK: Self = Self(glam::Vec3::ZERO);

    /// Color given as sRGB hex triplet (`0xff8800`), converted to linear space.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self(glam::vec3(channel(16), channel(8), channel(0)))
    }

    /// Color given in sRGB hue, saturation, lightness (all in `[0, 1]`), converted to linear space.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hue = hue.rem_euclid(1.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let lightness = lightness.clamp(0.0, 1.0);

        if saturation == 0.0 {
            let v = srgb_to_linear(lightness);
            return Self(glam::Vec3::splat(v));
        }

        let p = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let q = 2.0 * lightness - p;

        Self(glam::vec3(
            srgb_to_linear(hue_to_rgb(q, p, hue + 1.0 / 3.0)),
            srgb_to_linear(hue_to_rgb(q, p, hue)),
            srgb_to_linear(hue_to_rgb(q, p, hue - 1.0 / 3.0)),
        ))
    }

    pub fn rgb(&self) -> glam::Vec3 {
        self.0
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialFlags: u32 {
        /// Drawn after opaque surfaces without writing depth
        const TRANSPARENT      = 1 << 0;
        /// Color is added to the background instead of replacing it
        const ADDITIVE         = 1 << 1;
        /// Per point colors of point geometry are used
        const VERTEX_COLORS    = 1 << 2;
        /// Point sprites get smaller with distance
        const SIZE_ATTENUATION = 1 << 3;
    }
}

/// Texture inputs a material can sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCountMacro)]
pub enum TextureSlot {
    ColorMap,
    SpecularMap,
    BumpMap,
    AlphaMap,
    EmissiveMap,
}

impl TextureSlot {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// How the surface responds to light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Blinn-Phong lit surface
    Phong {
        specular:   Color,
        shininess:  f32,
        bump_scale: f32,
    },
    /// Unlit color
    Basic,
    /// Rough dielectric with emission
    Standard {
        emissive:           Color,
        emissive_intensity: f32,
    },
    /// View angle dependent rim glow
    Fresnel {
        rim:    Color,
        facing: Color,
        bias:   f32,
        scale:  f32,
        power:  f32,
    },
    /// Camera facing sprites, `size` in world units
    Points {
        size: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shading:  Shading,
    pub color:    Color,
    pub opacity:  f32,
    pub flags:    MaterialFlags,
    textures: [Option<TextureId>; TextureSlot::COUNT],
}

// Factories
impl Material {
    fn new(shading: Shading, color: Color) -> Self {
        Self {
            shading,
            color,
            opacity: 1.0,
            flags: MaterialFlags::empty(),
            textures: [None; TextureSlot::COUNT],
        }
    }

    pub fn phong(bump_scale: f32) -> Self {
        Self::new(
            Shading::Phong {
                specular: Color::from_hex(0x111111),
                shininess: 30.0,
                bump_scale,
            },
            Color::WHITE,
        )
    }

    pub fn basic(color: Color) -> Self {
        Self::new(Shading::Basic, color)
    }

    pub fn standard(emissive: Color, emissive_intensity: f32) -> Self {
        Self::new(Shading::Standard { emissive, emissive_intensity }, Color::WHITE)
    }

    /// Rim glow with default falloff, meant to be drawn as an additive shell around a sphere.
    pub fn fresnel(rim: Color, facing: Color) -> Self {
        Self::new(
            Shading::Fresnel { rim, facing, bias: 0.1, scale: 1.0, power: 4.0 },
            Color::WHITE,
        )
        .with_flags(MaterialFlags::TRANSPARENT | MaterialFlags::ADDITIVE)
    }

    pub fn points(size: f32) -> Self {
        Self::new(Shading::Points { size }, Color::WHITE)
            .with_flags(MaterialFlags::VERTEX_COLORS | MaterialFlags::SIZE_ATTENUATION)
    }
}

// Builders
impl Material {
    pub fn with_texture(mut self, slot: TextureSlot, texture: TextureId) -> Self {
        self.textures[slot.index()] = Some(texture);
        self
    }

    pub fn with_flags(mut self, flags: MaterialFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

// Getters
impl Material {
    pub fn texture(&self, slot: TextureSlot) -> Option<TextureId> {
        self.textures[slot.index()]
    }

    pub fn is_transparent(&self) -> bool {
        self.flags.contains(MaterialFlags::TRANSPARENT)
    }

    pub fn is_additive(&self) -> bool {
        self.flags.contains(MaterialFlags::ADDITIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn hex_colors_are_linearized() {
        let color = Color::from_hex(0xff8800);
        assert_eq!(color.rgb().x, 1.0);
        assert!((color.rgb().y - srgb_to_linear(136.0 / 255.0)).abs() < 1e-6);
        assert_eq!(color.rgb().z, 0.0);
    }

    #[test]
    fn hsl_lightness_extremes() {
        assert!(Color::from_hsl(0.6, 0.2, 0.0).rgb().abs_diff_eq(glam::Vec3::ZERO, 1e-6));
        assert!(Color::from_hsl(0.6, 0.2, 1.0).rgb().abs_diff_eq(glam::Vec3::ONE, 1e-5));
    }

    #[test]
    fn hsl_hue_is_bluish_at_point_six() {
        let c = Color::from_hsl(0.6, 0.2, 0.5).rgb();
        assert!(c.z > c.y && c.y > c.x);
    }

    #[test]
    fn materials_start_without_textures() {
        let material = Material::phong(0.04);
        assert!(TextureSlot::iter().all(|slot| material.texture(slot).is_none()));
        assert!(!material.is_transparent());
        assert!(Material::fresnel(Color::WHITE, Color::BLACK).is_additive());
    }
}
