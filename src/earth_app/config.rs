//! Tunables of the scene, defaults reproduce the stock Earth and Sun look.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::info;

/// Environment variable naming a JSON config file, used when no path is given on the command line.
pub const CONFIG_ENV: &str = "EARTH_SCENE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title:  String,
    pub width:  u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Earth".into(), width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov:      f32,
    pub near:     f32,
    pub far:      f32,
    /// Initial distance from the orbit target on +Z
    pub distance: f32,
    /// Tone mapping exposure
    pub exposure: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov: 75.0, near: 0.1, far: 1000.0, distance: 10.0, exposure: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturesConfig {
    /// Relative texture paths are resolved against this directory
    pub directory:         PathBuf,
    pub earth_map:         PathBuf,
    pub earth_specular:    PathBuf,
    pub earth_bump:        PathBuf,
    pub earth_lights:      PathBuf,
    pub clouds:            PathBuf,
    pub clouds_alpha:      PathBuf,
    pub sun:               PathBuf,
    /// Block startup until every texture settles
    pub wait_until_loaded: bool,
    pub wait_timeout_ms:   u64,
}

impl Default for TexturesConfig {
    fn default() -> Self {
        Self {
            directory:         "textures".into(),
            earth_map:         "00_earthmap1k.jpg".into(),
            earth_bump:        "01_earthbump1k.jpg".into(),
            earth_specular:    "02_earthspec1k.jpg".into(),
            earth_lights:      "03_earthlights1k.jpg".into(),
            clouds:            "04_earthcloudmap.jpg".into(),
            clouds_alpha:      "05_earthcloudmaptrans.jpg".into(),
            sun:               "sun_texture.jpg".into(),
            wait_until_loaded: false,
            wait_timeout_ms:   5000,
        }
    }
}

impl TexturesConfig {
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.directory.join(file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthConfig {
    pub position:       [f32; 3],
    /// Axial tilt around Z in degrees, applied once at construction
    pub tilt_degrees:   f32,
    pub radius:         f32,
    pub detail:         u32,
    pub bump_scale:     f32,
    pub clouds_opacity: f32,
    pub clouds_scale:   f32,
    pub glow_scale:     f32,
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            position:       [15.0, 0.0, 0.0],
            tilt_degrees:   -23.4,
            radius:         1.0,
            detail:         12,
            bump_scale:     0.04,
            clouds_opacity: 0.8,
            clouds_scale:   1.003,
            glow_scale:     1.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    pub radius:             f32,
    pub segments:           u32,
    pub emissive_intensity: f32,
    pub glow_radius:        f32,
    pub glow_opacity:       f32,
    pub light_intensity:    f32,
    /// Distance where the light fades out completely
    pub light_distance:     f32,
    pub light_decay:        f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            radius:             3.5,
            segments:           32,
            emissive_intensity: 3.0,
            glow_radius:        3.7,
            glow_opacity:       0.5,
            light_intensity:    300.0,
            light_distance:     1000.0,
            light_decay:        1.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub count:        usize,
    /// Stars are placed in distance `[min_radius, min_radius + radius_range)` from the origin
    pub min_radius:   f32,
    pub radius_range: f32,
    pub size:         f32,
    pub hue:          f32,
    pub saturation:   f32,
    /// Fixed seed makes the sky identical between runs
    pub seed:         Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count:        8000,
            min_radius:   25.0,
            radius_range: 25.0,
            size:         0.2,
            hue:          0.6,
            saturation:   0.2,
            seed:         None,
        }
    }
}

/// Radians added to the Y rotation of animated nodes every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub sun:    f64,
    pub earth:  f64,
    pub clouds: f64,
    pub stars:  f64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self { sun: 0.001, earth: 0.002, clouds: 0.001, stars: -0.0002 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window:   WindowConfig,
    pub camera:   CameraConfig,
    pub textures: TexturesConfig,
    pub earth:    EarthConfig,
    pub sun:      SunConfig,
    pub stars:    StarfieldConfig,
    pub spin:     SpinConfig,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid scene configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene configuration {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Loads configuration named by the first command line argument or by [`CONFIG_ENV`], defaults otherwise.
    pub fn from_env() -> Result<Self> {
        let path = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => {
                info!("Loading scene configuration from {}", path.display());
                Self::load(&path)
            },
            None => {
                info!("Using default scene configuration");
                Ok(Self::default())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(SceneConfig::from_json("{}").unwrap(), SceneConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SceneConfig::from_json(r#"{ "spin": { "earth": 0.01 }, "stars": { "seed": 7 } }"#).unwrap();
        assert_eq!(config.spin.earth, 0.01);
        assert_eq!(config.spin.sun, 0.001);
        assert_eq!(config.stars.seed, Some(7));
        assert_eq!(config.stars.count, 8000);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SceneConfig::from_json("{ spin: ").is_err());
    }

    #[test]
    fn texture_paths_resolve_against_directory() {
        let textures = TexturesConfig::default();
        assert_eq!(textures.resolve(&textures.sun), PathBuf::from("textures/sun_texture.jpg"));
    }
}
