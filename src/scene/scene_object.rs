use crate::scene::model::Model;

/// A model placed in the scene together with the pixel scale used to project it.
pub struct SceneObject {
    pub model: Model,
    pub draw_scale: f32,
}

impl SceneObject {
    pub fn new(model: Model, draw_scale: f32) -> Self {
        Self { model, draw_scale }
    }
}
