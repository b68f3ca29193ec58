pub mod raytracer;
pub mod renderer;
pub mod shaders;
