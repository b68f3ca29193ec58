use crate::core::color::Colour;
use crate::scene::texture::TextureMap;
use std::collections::HashMap;
use std::sync::Arc;

/// How a surface is coloured.
#[derive(Debug, Clone)]
pub enum MaterialKind {
    /// A single flat colour.
    Flat,
    /// Texture referenced by file name, shared with every other material naming it.
    Textured {
        texture_name: String,
        texture: Arc<TextureMap>,
    },
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Diffuse colour; also the base colour of textured materials in the ray tracer when
    /// a face carries no texture coordinates.
    pub colour: Colour,
    pub kind: MaterialKind,
}

impl Default for Material {
    fn default() -> Self {
        Self::flat("", Colour::WHITE)
    }
}

impl Material {
    pub fn flat(name: impl Into<String>, colour: Colour) -> Self {
        Self {
            name: name.into(),
            colour,
            kind: MaterialKind::Flat,
        }
    }

    pub fn textured(
        name: impl Into<String>,
        colour: Colour,
        texture_name: impl Into<String>,
        texture: Arc<TextureMap>,
    ) -> Self {
        Self {
            name: name.into(),
            colour,
            kind: MaterialKind::Textured {
                texture_name: texture_name.into(),
                texture,
            },
        }
    }

    pub fn texture(&self) -> Option<&TextureMap> {
        match &self.kind {
            MaterialKind::Flat => None,
            MaterialKind::Textured { texture, .. } => Some(texture),
        }
    }
}

/// Every material loaded into a scene, looked up by exact name.
///
/// When two materials share a name the first one added wins; unknown names resolve to
/// the fallback material.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    by_name: HashMap<String, usize>,
    fallback: Material,
}

impl MaterialLibrary {
    pub fn new(fallback: Material) -> Self {
        Self {
            materials: Vec::new(),
            by_name: HashMap::new(),
            fallback,
        }
    }

    pub fn add(&mut self, material: Material) {
        let index = self.materials.len();
        self.by_name.entry(material.name.clone()).or_insert(index);
        self.materials.push(material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.by_name.get(name).map(|&i| &self.materials[i])
    }

    pub fn resolve(&self, name: &str) -> &Material {
        self.get(name).unwrap_or(&self.fallback)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
