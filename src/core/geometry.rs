use nalgebra::{Vector2, Vector3};

/// A projected vertex: screen position, inverse depth and texel-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
    /// `1/z` in camera space. Larger is nearer.
    pub depth: f32,
    /// Texture coordinate already scaled to texel units.
    pub texture: Vector2<f32>,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self {
            x,
            y,
            depth,
            texture: Vector2::zeros(),
        }
    }

    pub fn with_texture(mut self, texture: Vector2<f32>) -> Self {
        self.texture = texture;
        self
    }

    #[inline]
    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.depth)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.depth.is_finite()
    }
}

/// Three projected vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTriangle {
    pub vertices: [CanvasPoint; 3],
}

impl CanvasTriangle {
    pub fn new(v0: CanvasPoint, v1: CanvasPoint, v2: CanvasPoint) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Edges in drawing order: v0-v1, v1-v2, v2-v0.
    pub fn edges(&self) -> [(CanvasPoint, CanvasPoint); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}
