use nalgebra::Point3;
use std::f32::consts::PI;

/// A point light used by the ray tracer for shading and shadow rays.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Point3<f32>,
    /// Radiant power; brightness at distance `d` is `intensity / (4 * PI * d^2)`.
    pub intensity: f32,
}

impl PointLight {
    pub fn new(position: Point3<f32>, intensity: f32) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// Inverse-square falloff at `surface_point`.
    pub fn falloff(&self, surface_point: &Point3<f32>) -> f32 {
        let distance_squared = (self.position - surface_point).norm_squared();
        self.intensity / (4.0 * PI * distance_squared)
    }
}

/// Scalar terms of the Phong brightness model.
#[derive(Debug, Clone)]
pub struct ShadingParams {
    /// Lower bound of every lit or shadowed brightness.
    pub ambient: f32,
    pub specular_power: f32,
    /// Floor applied to the specular factor.
    pub specular_cull: f32,
    /// Shadow-ray hits at or below this parameter are ignored.
    pub shadow_epsilon: f32,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            specular_power: 8.0,
            specular_cull: 0.4,
            shadow_epsilon: 0.01,
        }
    }
}
