use crate::core::color::{Colour, unpack};
use crate::core::framebuffer::{Canvas, DepthBuffer};
use crate::pipeline::shaders::phong::{PhongShader, shading_normal};
use crate::scene::context::Scene;
use crate::scene::material::Material;
use crate::scene::mesh::{Element, Face};
use log::debug;
use nalgebra::{Matrix3, Point3, Vector3};
use std::time::Instant;

/// Identifies one triangle in a scene: object, element and face index.
pub type FaceId = (usize, usize, usize);

/// Nearest intersection of a ray with the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point3<f32>,
    /// Ray parameter: `point = origin + t * direction`.
    pub t: f32,
    pub beta: f32,
    pub gamma: f32,
    pub face: FaceId,
}

/// Solves `origin + t * direction = a + beta * (b - a) + gamma * (c - a)`.
///
/// Returns `(t, beta, gamma)` when the ray hits the triangle in front of its origin. A singular
/// system (ray parallel to the triangle, degenerate triangle) is a miss.
pub fn intersect_triangle(
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
    corners: &[Point3<f32>; 3],
) -> Option<(f32, f32, f32)> {
    let [a, b, c] = corners;
    let system = Matrix3::from_columns(&[-direction, b - a, c - a]);
    let solution = system.try_inverse()? * (origin - a);
    if !solution.iter().all(|v| v.is_finite()) {
        return None;
    }

    let (t, beta, gamma) = (solution.x, solution.y, solution.z);
    if t < 0.0
        || !(0.0..=1.0).contains(&beta)
        || !(0.0..=1.0).contains(&gamma)
        || beta + gamma >= 1.0
    {
        return None;
    }
    Some((t, beta, gamma))
}

fn object_faces(scene: &Scene, o: usize) -> impl Iterator<Item = (FaceId, &Element, &Face)> {
    scene.objects[o]
        .model
        .elements
        .iter()
        .enumerate()
        .flat_map(move |(e, element)| {
            element
                .faces
                .iter()
                .enumerate()
                .map(move |(f, face)| ((o, e, f), element, face))
        })
}

fn faces(scene: &Scene) -> impl Iterator<Item = (FaceId, &Element, &Face)> {
    (0..scene.objects.len()).flat_map(move |o| object_faces(scene, o))
}

fn closest<'a>(
    candidates: impl Iterator<Item = (FaceId, &'a Element, &'a Face)>,
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
) -> Option<Intersection> {
    let mut nearest: Option<Intersection> = None;
    for (id, element, face) in candidates {
        let corners = element.face_points(face);
        if let Some((t, beta, gamma)) = intersect_triangle(origin, direction, &corners)
            && nearest.is_none_or(|n| t < n.t)
        {
            nearest = Some(Intersection {
                point: origin + direction * t,
                t,
                beta,
                gamma,
                face: id,
            });
        }
    }
    nearest
}

/// Brute-force ray caster over every triangle in the scene.
///
/// By default each object is traced with the same pixel scale the rasterizer projects it
/// with (`focal_length * draw_scale`), so a hit lands on the pixel its ray was cast through.
/// A fixed horizontal field of view can be set instead.
#[derive(Debug, Clone, Default)]
pub struct RayTracer {
    /// Horizontal field of view in degrees, or `None` to follow the camera projection.
    pub field_of_view: Option<f32>,
}

impl RayTracer {
    pub fn new(field_of_view: Option<f32>) -> Self {
        Self { field_of_view }
    }

    /// World-space direction of the primary ray through the centre of pixel (`x`, `y`), for an
    /// object drawn at `draw_scale`.
    pub fn ray_direction(
        &self,
        scene: &Scene,
        (x, y): (usize, usize),
        (width, height): (usize, usize),
        draw_scale: f32,
    ) -> Vector3<f32> {
        let scale = match self.field_of_view {
            Some(fov) => (fov.to_radians() / 2.0).tan() / (width as f32 / 2.0).max(1.0),
            None => 1.0 / (scene.camera.focal_length * draw_scale),
        };
        let dx = x as f32 + 0.5 - (width / 2) as f32;
        let dy = y as f32 + 0.5 - (height / 2) as f32;
        let view = Vector3::new(dx * scale, -dy * scale, -1.0);
        scene.camera.direction_to_world(&view)
    }

    /// Nearest triangle hit by the ray.
    pub fn nearest_hit(
        &self,
        scene: &Scene,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
    ) -> Option<Intersection> {
        closest(faces(scene), origin, direction)
    }

    /// Nearest triangle of object `o` hit by the ray.
    pub fn nearest_hit_in_object(
        &self,
        scene: &Scene,
        o: usize,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
    ) -> Option<Intersection> {
        closest(object_faces(scene, o), origin, direction)
    }

    /// Whether any triangle other than `exclude` blocks the segment from the light to `point`.
    pub fn is_occluded(&self, scene: &Scene, point: &Point3<f32>, exclude: FaceId) -> bool {
        let origin = scene.light.position;
        let direction = point - origin;
        let epsilon = scene.shading.shadow_epsilon;

        faces(scene).any(|(id, element, face)| {
            id != exclude
                && intersect_triangle(&origin, &direction, &element.face_points(face))
                    .is_some_and(|(t, _, _)| t > epsilon && t < 1.0)
        })
    }

    /// Packed colour of a hit, or `None` for a face index that no longer exists.
    pub fn shade(&self, scene: &Scene, hit: &Intersection) -> Option<u32> {
        let (o, e, f) = hit.face;
        let element = scene.objects.get(o)?.model.elements.get(e)?;
        let face = element.faces.get(f)?;
        let material = scene.materials.resolve(&element.material);

        let eye = scene.camera.position();
        let shader = PhongShader::new(eye, &scene.light, &scene.shading);
        let brightness = if self.is_occluded(scene, &hit.point, hit.face) {
            shader.shadowed()
        } else {
            let normal = shading_normal(element, face, hit.beta, hit.gamma, &hit.point, &eye);
            shader.brightness(&hit.point, &normal)
        };

        let base = base_colour(material, element, face, hit.beta, hit.gamma);
        Some(base.scaled(brightness).pack(255))
    }

    /// Nearest hit through pixel (`x`, `y`) over all objects, with its inverse depth.
    fn pixel_hit(
        &self,
        scene: &Scene,
        origin: &Point3<f32>,
        pixel: (usize, usize),
        size: (usize, usize),
    ) -> Option<(Intersection, f32)> {
        let mut nearest: Option<(Intersection, f32)> = None;
        for (o, object) in scene.objects.iter().enumerate() {
            let direction = self.ray_direction(scene, pixel, size, object.draw_scale);
            let Some(hit) = self.nearest_hit_in_object(scene, o, origin, &direction) else {
                continue;
            };
            let inverse_depth = 1.0 / -scene.camera.to_camera_space(&hit.point).z;
            if inverse_depth.is_finite() && nearest.is_none_or(|(_, d)| inverse_depth > d) {
                nearest = Some((hit, inverse_depth));
            }
        }
        nearest
    }

    /// Ray traces the whole canvas. Pixels without a hit are left untouched.
    ///
    /// Each hit is written to the pixel its ray went through, z-tested by its inverse
    /// camera-space depth.
    pub fn render<C: Canvas>(&self, scene: &Scene, canvas: &mut C, depth: &mut DepthBuffer) {
        let start = Instant::now();
        let size = (canvas.width(), canvas.height());
        let origin = scene.camera.position();
        let mut hits = 0usize;

        for y in 0..size.1 {
            for x in 0..size.0 {
                let Some((hit, inverse_depth)) = self.pixel_hit(scene, &origin, (x, y), size) else {
                    continue;
                };
                if !depth.test_and_update(x, y, inverse_depth) {
                    continue;
                }
                if let Some(colour) = self.shade(scene, &hit) {
                    canvas.set_pixel_colour(x, y, colour);
                    hits += 1;
                }
            }
        }

        debug!(
            "Ray traced {}x{} ({} faces, {} pixels written) in {:.2?}",
            size.0,
            size.1,
            scene.face_count(),
            hits,
            start.elapsed()
        );
    }
}

/// Flat colour, or the texel under the hit for textured faces with texture coordinates.
fn base_colour(material: &Material, element: &Element, face: &Face, beta: f32, gamma: f32) -> Colour {
    let (Some(texture), Some([ta, tb, tc])) = (material.texture(), element.face_texture_points(face))
    else {
        return material.colour;
    };
    let uv = ta * (1.0 - beta - gamma) + tb * beta + tc * gamma;
    let [r, g, b, _] = unpack(texture.sample(uv.x, uv.y));
    Colour::new(r, g, b)
}
