use crate::scene::light::{PointLight, ShadingParams};
use crate::scene::mesh::{Element, Face};
use nalgebra::{Point3, Vector3};

/// Reflects the incident direction `incident` about `normal` (`normal` must be unit length).
#[inline]
pub fn reflect(incident: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}

/// Smooth shading normal at barycentric position (`beta`, `gamma`) of a face, weighting the
/// corner vertex normals by `(1 - beta - gamma, beta, gamma)`.
///
/// Surfaces are two-sided: the normal is flipped to face `eye` when it points away from it.
pub fn shading_normal(
    element: &Element,
    face: &Face,
    beta: f32,
    gamma: f32,
    point: &Point3<f32>,
    eye: &Point3<f32>,
) -> Vector3<f32> {
    let [na, nb, nc] = face.vertices.map(|i| element.vertex_normals[i]);
    let blended = na * (1.0 - beta - gamma) + nb * beta + nc * gamma;

    let normal = if blended.norm_squared() > 1e-12 {
        blended.normalize()
    } else if face.normal.norm_squared() > 1e-12 {
        face.normal.normalize()
    } else {
        return Vector3::y();
    };

    if normal.dot(&(eye - point)) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Brightness model used by the ray tracer.
///
/// `specular * diffuse * falloff`, clamped to `[ambient, 1]`:
/// - specular: `(view . reflect(light_dir, n))^power`, floored at `specular_cull`
/// - diffuse: `max(0, -(light_dir . n))`
/// - falloff: inverse square of the light distance
///
/// where `light_dir` points from the light to the surface.
pub struct PhongShader<'a> {
    pub eye: Point3<f32>,
    pub light: &'a PointLight,
    pub params: &'a ShadingParams,
}

impl<'a> PhongShader<'a> {
    pub fn new(eye: Point3<f32>, light: &'a PointLight, params: &'a ShadingParams) -> Self {
        Self { eye, light, params }
    }

    /// Brightness of a lit surface point with unit normal `normal`.
    pub fn brightness(&self, point: &Point3<f32>, normal: &Vector3<f32>) -> f32 {
        let to_surface = point - self.light.position;
        let distance = to_surface.norm();
        let view = self.eye - point;
        if distance <= f32::EPSILON || view.norm_squared() <= f32::EPSILON {
            return self.params.ambient;
        }

        let light_dir = to_surface / distance;
        let reflected = reflect(&light_dir, normal);
        let view = view.normalize();

        let specular = view
            .dot(&reflected)
            .max(0.0)
            .powf(self.params.specular_power)
            .max(self.params.specular_cull);
        let diffuse = (-light_dir.dot(normal)).max(0.0);
        let falloff = self.light.falloff(point);

        let brightness = specular * diffuse * falloff;
        if brightness.is_finite() {
            brightness.clamp(self.params.ambient, 1.0)
        } else {
            self.params.ambient
        }
    }

    /// Brightness of a point the light cannot reach.
    pub fn shadowed(&self) -> f32 {
        self.params.ambient
    }
}
