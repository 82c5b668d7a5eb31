use std::f32::consts::TAU;

/// Local transform of a scene node.
///  - rotation is kept as XYZ Euler angles in radians, matrix composition is `Rx * Ry * Rz`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: glam::Vec3,
    pub rotation: glam::Vec3,
    pub scale:    glam::Vec3,
}

// Constants
impl Transform {
    pub const IDENTITY: Self = Self {
        position: glam::Vec3::ZERO,
        rotation: glam::Vec3::ZERO,
        scale:    glam::Vec3::ONE,
    };
}

// Factories
impl Transform {
    pub fn from_position(position: glam::Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    pub fn from_uniform_scale(scale: f32) -> Self {
        Self {
            scale: glam::Vec3::splat(scale),
            ..Self::IDENTITY
        }
    }
}

// Getters
impl Transform {
    #[inline]
    pub fn quat(&self) -> glam::Quat {
        glam::Quat::from_euler(glam::EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    #[inline]
    pub fn as_mat(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

// Builders
impl Transform {
    pub fn with_rotation(&self, rotation: glam::Vec3) -> Self {
        Self { rotation, ..*self }
    }
}

impl Default for Transform {
    fn default() -> Self { Self::IDENTITY }
}

/// Angle reached after `steps` equal increments of `step` radians, wrapped into `[0, 2π)`.
/// The product is taken in f64, the result stays exact for any realistic step count.
#[inline]
pub fn accumulated_angle(steps: u64, step: f64) -> f32 {
    let angle = (steps as f64 * step).rem_euclid(std::f64::consts::TAU) as f32;
    // rounding to f32 may land exactly on TAU
    if angle >= TAU { 0.0 } else { angle }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_order_matches_x_then_y_then_z() {
        let t = Transform::IDENTITY.with_rotation(glam::vec3(0.3, 0.5, -0.4));
        let expected = glam::Quat::from_rotation_x(0.3)
            * glam::Quat::from_rotation_y(0.5)
            * glam::Quat::from_rotation_z(-0.4);
        assert!(t.quat().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn negative_steps_wrap_below_full_turn() {
        assert!((accumulated_angle(1, -0.5) - (TAU - 0.5)).abs() < 1e-6);
        assert_eq!(accumulated_angle(0, -0.5), 0.0);
        assert_eq!(accumulated_angle(4, std::f64::consts::FRAC_PI_2), 0.0);
    }

    #[test]
    fn million_steps_do_not_drift() {
        let expected = (1_000_000.0 * 0.002f64).rem_euclid(std::f64::consts::TAU);
        assert!((accumulated_angle(1_000_000, 0.002) as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t = Transform {
            scale: glam::Vec3::splat(2.0),
            ..Transform::from_position(glam::vec3(15.0, 0.0, 0.0))
        };
        let p = t.as_mat().transform_point3(glam::vec3(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(glam::vec3(17.0, 0.0, 0.0), 1e-6));
    }
}
