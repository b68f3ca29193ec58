//! Software renderer for OBJ/MTL triangle scenes.
//!
//! A pinhole [`crate::scene::camera::Camera`] projects each element onto a [`crate::core::framebuffer::Canvas`],
//! where the scanline [`crate::core::rasterizer::Rasterizer`] draws it as a wireframe, flat-filled or
//! texture-mapped triangles with an inverse-depth buffer. Alternatively the brute-force
//! [`crate::pipeline::raytracer::RayTracer`] shades every pixel with Phong lighting and shadow rays.
//! [`crate::pipeline::renderer::Renderer`] selects between the paths from the scene's render mode.

pub mod app;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod scene;
pub mod ui;
