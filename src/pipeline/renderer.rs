use crate::core::color::Colour;
use crate::core::framebuffer::Canvas;
use crate::core::geometry::{CanvasPoint, CanvasTriangle};
use crate::core::rasterizer::Rasterizer;
use crate::pipeline::raytracer::RayTracer;
use crate::scene::context::{RenderMode, Scene};
use crate::scene::mesh::Face;
use crate::scene::texture::TextureMap;
use log::debug;
use nalgebra::Vector2;
use std::time::Instant;

/// Per-frame draw dispatcher: projects every element and hands its faces to the rasterizer,
/// or gives the whole frame to the ray tracer.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub raytracer: RayTracer,
    /// Colour of wireframe edges.
    pub wire_colour: Colour,
    /// Faces with a vertex closer to the camera plane than this are skipped.
    pub near_plane: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            raytracer: RayTracer::default(),
            wire_colour: Colour::WHITE,
            near_plane: 0.1,
        }
    }

    /// Draws one frame of `scene` in its current render mode. Pixels are drawn over whatever
    /// the canvas already holds; the caller clears it first.
    pub fn draw<C: Canvas>(&self, scene: &mut Scene, canvas: &mut C) {
        let start = Instant::now();
        let mode = scene.render_mode();

        match mode {
            RenderMode::Raytraced => {
                let mut depth = std::mem::take(&mut scene.depth);
                depth.reset(canvas.width(), canvas.height());
                self.raytracer.render(scene, canvas, &mut depth);
                scene.depth = depth;
            }
            RenderMode::Wireframe | RenderMode::Raster => {
                if mode == RenderMode::Raster {
                    scene.depth.reset(canvas.width(), canvas.height());
                }
                for object in &scene.objects {
                    for element in &object.model.elements {
                        let projected: Vec<CanvasPoint> = element
                            .points
                            .iter()
                            .map(|p| {
                                scene.camera.project(p, object.draw_scale, canvas.width(), canvas.height())
                            })
                            .collect();
                        let material = scene.materials.resolve(&element.material);

                        for face in &element.faces {
                            if !self.in_front(&projected, face) {
                                continue;
                            }
                            if mode == RenderMode::Wireframe {
                                let triangle = face_triangle(&projected, face);
                                self.rasterizer
                                    .draw_triangle(canvas, &triangle, self.wire_colour, 255);
                                continue;
                            }

                            match (material.texture(), element.face_texture_points(face)) {
                                (Some(texture), Some(uvs)) => {
                                    let triangle = textured_triangle(&projected, face, &uvs, texture);
                                    self.rasterizer.map_triangle(
                                        canvas,
                                        &triangle,
                                        texture,
                                        Some(&mut scene.depth),
                                    );
                                }
                                _ => {
                                    let triangle = face_triangle(&projected, face);
                                    self.rasterizer.fill_triangle(
                                        canvas,
                                        &triangle,
                                        material.colour,
                                        255,
                                        Some(&mut scene.depth),
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }

        debug!("Frame ({}) drawn in {:.2?}", mode, start.elapsed());
    }

    /// All three corners lie in front of the near plane. Points at or behind the camera
    /// carry a non-positive or non-finite inverse depth.
    fn in_front(&self, projected: &[CanvasPoint], face: &Face) -> bool {
        let max_inverse_depth = 1.0 / self.near_plane;
        face.vertices.iter().all(|&i| {
            let p = &projected[i];
            p.is_finite() && p.depth > 0.0 && p.depth <= max_inverse_depth
        })
    }
}

fn face_triangle(projected: &[CanvasPoint], face: &Face) -> CanvasTriangle {
    let [a, b, c] = face.vertices.map(|i| projected[i]);
    CanvasTriangle::new(a, b, c)
}

/// Attaches texel-space coordinates (`uv` scaled by the texture size) to the corners.
fn textured_triangle(
    projected: &[CanvasPoint],
    face: &Face,
    uvs: &[Vector2<f32>; 3],
    texture: &TextureMap,
) -> CanvasTriangle {
    let size = Vector2::new(texture.width as f32, texture.height as f32);
    let [a, b, c] = [0, 1, 2].map(|k| {
        projected[face.vertices[k]].with_texture(uvs[k].component_mul(&size))
    });
    CanvasTriangle::new(a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::unpack;
    use crate::core::framebuffer::FrameBuffer;
    use crate::scene::camera::Camera;
    use crate::scene::light::PointLight;
    use crate::scene::material::Material;
    use crate::scene::mesh::Element;
    use crate::scene::model::Model;
    use crate::scene::scene_object::SceneObject;
    use nalgebra::Point3;
    use std::sync::Arc;

    const BACKGROUND: u32 = 0xFF00_0000;

    fn single_triangle_scene(material: &str) -> Scene {
        let mut scene = Scene::new(
            Camera::new(Point3::new(0.0, 0.0, 4.0), 2.0),
            PointLight::new(Point3::new(0.0, 0.4, 0.2), 8.0),
        );
        scene.add_object(SceneObject::new(
            Model::new("tri", vec![Element::create_test_triangle(material)]),
            40.0,
        ));
        scene
    }

    fn painted(canvas: &FrameBuffer) -> Vec<(usize, usize, u32)> {
        let mut out = Vec::new();
        for y in 0..canvas.height {
            for x in 0..canvas.width {
                let p = canvas.pixels[y * canvas.width + x];
                if p != BACKGROUND {
                    out.push((x, y, p));
                }
            }
        }
        out
    }

    #[test]
    fn test_wireframe_uses_wire_colour() {
        let mut scene = single_triangle_scene("red");
        scene.add_material(Material::flat("red", Colour::new(255, 0, 0)));
        let mut canvas = FrameBuffer::new(64, 64, BACKGROUND);
        let mut renderer = Renderer::new();
        renderer.wire_colour = Colour::new(0, 255, 0);

        renderer.draw(&mut scene, &mut canvas);

        let pixels = painted(&canvas);
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|&(_, _, p)| p == Colour::new(0, 255, 0).pack(255)));
        // Interior of the triangle stays empty.
        assert_eq!(canvas.get_pixel(36, 28), Some(BACKGROUND));
    }

    #[test]
    fn test_raster_fills_with_material_colour() {
        let mut scene = single_triangle_scene("red");
        scene.add_material(Material::flat("red", Colour::new(255, 0, 0)));
        scene.set_render_mode(RenderMode::Raster);
        let mut canvas = FrameBuffer::new(64, 64, BACKGROUND);

        Renderer::new().draw(&mut scene, &mut canvas);

        // Corners project to (32,32), (52,32) and (32,12).
        assert_eq!(canvas.get_pixel(36, 28), Some(Colour::new(255, 0, 0).pack(255)));
        assert_eq!(canvas.get_pixel(50, 14), Some(BACKGROUND));
        assert!(scene.depth.get(36, 28).is_some_and(|d| (d - 0.25).abs() < 1e-4));
    }

    #[test]
    fn test_unknown_material_uses_fallback() {
        let mut scene = single_triangle_scene("missing");
        scene.set_render_mode(RenderMode::Raster);
        let mut canvas = FrameBuffer::new(64, 64, BACKGROUND);

        Renderer::new().draw(&mut scene, &mut canvas);

        assert_eq!(canvas.get_pixel(36, 28), Some(Colour::WHITE.pack(255)));
    }

    #[test]
    fn test_raster_maps_texture() {
        let mut scene = single_triangle_scene("checker");
        let texture = Arc::new(TextureMap::new(2, 2, vec![0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFFFF_FFFF]));
        scene.add_material(Material::textured("checker", Colour::WHITE, "checker.ppm", texture));
        scene.set_render_mode(RenderMode::Raster);
        let mut canvas = FrameBuffer::new(64, 64, BACKGROUND);

        Renderer::new().draw(&mut scene, &mut canvas);

        // Near the (0,0) corner: uv ~ (0,0) -> texel (0,0).
        assert_eq!(canvas.get_pixel(33, 31), Some(0xFFFF_0000));
        let colours: Vec<u32> = painted(&canvas).into_iter().map(|(_, _, p)| p).collect();
        assert!(colours.contains(&0xFF00_FF00));
        assert!(colours.contains(&0xFF00_00FF));
    }

    #[test]
    fn test_faces_behind_camera_are_skipped() {
        let mut scene = single_triangle_scene("red");
        scene.set_render_mode(RenderMode::Raster);
        // Turn around: the triangle is now behind the camera.
        scene.rotate_camera(&nalgebra::Vector3::new(0.0, std::f32::consts::PI, 0.0));
        let mut canvas = FrameBuffer::new(64, 64, BACKGROUND);

        Renderer::new().draw(&mut scene, &mut canvas);

        assert!(painted(&canvas).is_empty());
    }

    #[test]
    fn test_raytraced_mode_shades_red() {
        let mut scene = single_triangle_scene("red");
        scene.add_material(Material::flat("red", Colour::new(255, 0, 0)));
        scene.set_render_mode(RenderMode::Raytraced);
        let mut canvas = FrameBuffer::new(48, 48, BACKGROUND);

        Renderer::new().draw(&mut scene, &mut canvas);

        let pixels = painted(&canvas);
        assert!(!pixels.is_empty());
        for (_, _, p) in pixels {
            let [r, g, b, a] = unpack(p);
            assert!(r > 0 && g == 0 && b == 0 && a == 255);
        }
    }
}
