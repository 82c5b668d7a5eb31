use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::framework::{gpu::vertices::ColorVertex, scene_graph::Color};

use super::config::StarfieldConfig;

/// Seeded generator when the config fixes a seed, otherwise seeded from OS entropy.
pub fn starfield_rng(config: &StarfieldConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Random stars uniformly distributed over directions, in a shell around the origin.
#[profiler::function]
pub fn generate_stars<R: Rng>(config: &StarfieldConfig, rng: &mut R) -> Vec<ColorVertex> {
    (0..config.count)
        .map(|_| {
            let radius = config.min_radius + rng.gen::<f32>() * config.radius_range;
            let theta = TAU * rng.gen::<f32>();
            let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
            let position = radius * glam::vec3(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            );
            let lightness = rng.gen::<f32>();
            ColorVertex {
                position,
                color: Color::from_hsl(config.hue, config.saturation, lightness).rgb(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize, seed: u64) -> Vec<ColorVertex> {
        let config = StarfieldConfig { count, seed: Some(seed), ..Default::default() };
        generate_stars(&config, &mut starfield_rng(&config))
    }

    #[test]
    fn stars_lie_within_shell() {
        let stars = seeded(2000, 1);
        assert_eq!(stars.len(), 2000);
        for star in &stars {
            let radius = star.position.length();
            assert!((25.0 - 1e-3..50.0 + 1e-3).contains(&radius), "radius {radius}");
        }
    }

    #[test]
    fn same_seed_gives_same_sky() {
        assert_eq!(seeded(100, 42), seeded(100, 42));
        assert_ne!(seeded(100, 42), seeded(100, 43));
    }

    #[test]
    fn stars_share_hue_but_not_lightness() {
        let stars = seeded(50, 3);
        assert!(stars.iter().all(|star| star.color.z >= star.color.x));
        let brightest = stars.iter().map(|star| star.color.z).fold(0.0, f32::max);
        let dimmest = stars.iter().map(|star| star.color.z).fold(1.0, f32::min);
        assert!(brightest - dimmest > 0.1);
    }
}
