use crate::scene::mesh::Element;

/// Geometry loaded from one OBJ file: a list of elements.
pub struct Model {
    pub name: String,
    pub elements: Vec<Element>,
}

impl Model {
    pub fn new(name: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            elements,
        }
    }

    pub fn face_count(&self) -> usize {
        self.elements.iter().map(|e| e.faces.len()).sum()
    }
}
