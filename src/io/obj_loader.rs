use crate::core::color::Colour;
use crate::scene::material::Material;
use crate::scene::mesh::{Element, Face};
use crate::scene::texture::TextureMap;
use log::{debug, info};
use nalgebra::{Point3, Vector2};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Geometry parsed from one OBJ file.
pub struct ObjData {
    pub name: String,
    pub elements: Vec<Element>,
    /// Material libraries (`mtllib`) referenced by the file, resolved against its directory.
    pub material_libraries: Vec<PathBuf>,
    /// Every material of those libraries, in file order.
    pub materials: Vec<Material>,
}

/// Loads an OBJ file, multiplying every vertex position by `scale`.
///
/// Each object/group becomes an [`Element`] whose face indices refer to that element's own
/// vertex and texture-coordinate lists. Faces must be triangles. Referenced material libraries
/// are parsed once and their textures cached in `textures`, as in [`load_materials`].
pub fn load_geometry<P: AsRef<Path>>(
    path: P,
    scale: f32,
    textures: &mut HashMap<String, Arc<TextureMap>>,
) -> Result<ObjData, String> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| format!("Failed to open OBJ '{}': {}", path.display(), e))?;
    let mut reader = BufReader::new(file);
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    info!("Loading OBJ file: {}", path.display());

    let load_options = tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    // tobj resolves `usemtl` names through this callback; remember each library and how many
    // materials it contributed so textures can be loaded afterwards.
    let libraries = RefCell::new(Vec::new());
    let library_error = RefCell::new(None);
    let (models, materials) = tobj::load_obj_buf(&mut reader, &load_options, |mtl_path| {
        let full_path = base_dir.join(mtl_path);
        let result = read_mtl(&full_path).and_then(|text| {
            tobj::load_mtl_buf(&mut text.as_bytes())
                .map_err(|e| format!("Failed to load MTL '{}': {}", full_path.display(), e))
        });
        match result {
            Ok((mtls, names)) => {
                libraries.borrow_mut().push((full_path, mtls.len()));
                Ok((mtls, names))
            }
            Err(e) => {
                library_error.borrow_mut().get_or_insert(e);
                Err(tobj::LoadError::MaterialParseError)
            }
        }
    })
    .map_err(|e| format!("Failed to load OBJ '{}': {}", path.display(), e))?;

    if let Some(e) = library_error.into_inner() {
        return Err(e);
    }
    let libraries = libraries.into_inner();
    let materials = materials.unwrap_or_default();

    let mut elements = Vec::with_capacity(models.len());
    for model in models {
        let mesh = &model.mesh;

        if mesh.face_arities.iter().any(|&arity| arity != 3) {
            return Err(format!(
                "Non-triangular face in element '{}' of '{}'",
                model.name,
                path.display()
            ));
        }
        if mesh.positions.len() % 3 != 0 || mesh.indices.len() % 3 != 0 {
            return Err(format!(
                "Malformed geometry in element '{}' of '{}'",
                model.name,
                path.display()
            ));
        }

        let points: Vec<Point3<f32>> = mesh
            .positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0] * scale, c[1] * scale, c[2] * scale))
            .collect();
        let texture_points: Vec<Vector2<f32>> = mesh
            .texcoords
            .chunks_exact(2)
            .map(|c| Vector2::new(c[0], c[1]))
            .collect();

        let has_texture_indices =
            !mesh.texcoord_indices.is_empty() && mesh.texcoord_indices.len() == mesh.indices.len();

        let mut faces = Vec::with_capacity(mesh.indices.len() / 3);
        for (f, corners) in mesh.indices.chunks_exact(3).enumerate() {
            let vertices = [corners[0] as usize, corners[1] as usize, corners[2] as usize];
            if vertices.iter().any(|&i| i >= points.len()) {
                return Err(format!(
                    "Face {} of element '{}' references a missing vertex",
                    f, model.name
                ));
            }
            let texture_indices = has_texture_indices.then(|| {
                let t = &mesh.texcoord_indices[f * 3..f * 3 + 3];
                [t[0] as usize, t[1] as usize, t[2] as usize]
            });
            faces.push(Face::new(vertices, texture_indices, &points));
        }

        let material = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .map(|m| m.name.clone())
            .unwrap_or_default();

        debug!(
            "Element '{}': {} vertices, {} faces, material '{}'",
            model.name,
            points.len(),
            faces.len(),
            material
        );

        elements.push(Element::new(
            model.name,
            material,
            points,
            texture_points,
            faces,
        ));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    let mut built = Vec::with_capacity(materials.len());
    let mut offset = 0;
    for (library, count) in &libraries {
        let end = (offset + count).min(materials.len());
        built.extend(build_materials(library, &materials[offset..end], textures)?);
        offset = end;
    }

    info!(
        "OBJ '{}' loaded: {} elements, {} material libraries",
        name,
        elements.len(),
        libraries.len()
    );

    Ok(ObjData {
        name,
        elements,
        material_libraries: libraries.into_iter().map(|(library, _)| library).collect(),
        materials: built,
    })
}

/// Reads an MTL file, rejecting colour lines that do not carry exactly three numbers.
fn read_mtl(path: &Path) -> Result<String, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to open MTL '{}': {}", path.display(), e))?;

    for (number, line) in text.lines().enumerate() {
        let mut words = line.split_whitespace();
        let Some(key @ ("Ka" | "Kd" | "Ks" | "Ke")) = words.next() else {
            continue;
        };
        let values: Vec<&str> = words.collect();
        if values.len() != 3 || values.iter().any(|v| v.parse::<f32>().is_err()) {
            return Err(format!(
                "Malformed MTL line {} in '{}': expected `{} r g b`, found '{}'",
                number + 1,
                path.display(),
                key,
                line.trim()
            ));
        }
    }
    Ok(text)
}

/// Loads an MTL file.
///
/// `Kd` becomes the flat colour (each channel x 255, truncated; black when absent). A `map_Kd`
/// texture is loaded eagerly, relative to the MTL file, and cached in `textures` by its file
/// name so every material naming it shares one copy.
pub fn load_materials<P: AsRef<Path>>(
    path: P,
    textures: &mut HashMap<String, Arc<TextureMap>>,
) -> Result<Vec<Material>, String> {
    let path = path.as_ref();
    let text = read_mtl(path)?;
    let (mtls, _) = tobj::load_mtl_buf(&mut text.as_bytes())
        .map_err(|e| format!("Failed to load MTL '{}': {}", path.display(), e))?;
    build_materials(path, &mtls, textures)
}

fn build_materials(
    path: &Path,
    mtls: &[tobj::Material],
    textures: &mut HashMap<String, Arc<TextureMap>>,
) -> Result<Vec<Material>, String> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut materials = Vec::with_capacity(mtls.len());
    for mtl in mtls {
        let colour = mtl.diffuse.map(Colour::from_unit).unwrap_or(Colour::BLACK);
        let material = match &mtl.diffuse_texture {
            Some(texture_name) => {
                let texture = match textures.get(texture_name) {
                    Some(texture) => Arc::clone(texture),
                    None => {
                        let texture = Arc::new(TextureMap::load(base_dir.join(texture_name))?);
                        textures.insert(texture_name.clone(), Arc::clone(&texture));
                        texture
                    }
                };
                Material::textured(mtl.name.clone(), colour, texture_name.clone(), texture)
            }
            None => Material::flat(mtl.name.clone(), colour),
        };
        materials.push(material);
    }

    info!("MTL '{}' loaded: {} materials", path.display(), materials.len());
    Ok(materials)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("obj-loader-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_elements_have_local_indices() {
        let dir = scratch_dir("local");
        let obj = dir.join("two.obj");
        fs::write(
            &obj,
            "mtllib two.mtl\n\
             o first\nusemtl A\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
             o second\nusemtl B\nv 0 0 1\nv 1 0 1\nv 0 1 1\nvt 0 0\nvt 1 0\nvt 0 1\nf 4/1 5/2 6/3\n",
        )
        .unwrap();
        fs::write(dir.join("two.mtl"), "newmtl A\nKd 1 0 0\nnewmtl B\nKd 0 0 1\n").unwrap();

        let mut textures = HashMap::new();
        let data = load_geometry(&obj, 2.0, &mut textures).unwrap();
        assert_eq!(data.elements.len(), 2);
        assert_eq!(data.material_libraries, vec![dir.join("two.mtl")]);
        assert_eq!(data.materials.len(), 2);
        assert_eq!(data.materials[1].name, "B");
        assert_eq!(data.materials[1].colour, Colour::new(0, 0, 255));

        let second = &data.elements[1];
        assert_eq!(second.name, "second");
        assert_eq!(second.material, "B");
        assert_eq!(second.points.len(), 3);
        assert_eq!(second.faces[0].vertices, [0, 1, 2]);
        assert_eq!(second.faces[0].texture_indices, Some([0, 1, 2]));
        assert_eq!(second.points[1], Point3::new(2.0, 0.0, 2.0));

        let materials = load_materials(dir.join("two.mtl"), &mut textures).unwrap();
        assert_eq!(materials[0].name, "A");
        assert_eq!(materials[0].colour, Colour::new(255, 0, 0));
        assert!(textures.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_textures_are_shared() {
        let dir = scratch_dir("shared");
        let mut ppm = b"P6\n1 1\n255\n".to_vec();
        ppm.extend_from_slice(&[10, 20, 30]);
        fs::write(dir.join("wood.ppm"), ppm).unwrap();
        fs::write(
            dir.join("wood.mtl"),
            "newmtl Floor\nKd 1 1 1\nmap_Kd wood.ppm\nnewmtl Table\nKd 1 1 1\nmap_Kd wood.ppm\n",
        )
        .unwrap();

        let mut textures = HashMap::new();
        let materials = load_materials(dir.join("wood.mtl"), &mut textures).unwrap();
        assert_eq!(textures.len(), 1);
        let a = materials[0].texture().unwrap();
        let b = materials[1].texture().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.pixels[0], 0xFF0A_141E);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_vertex_is_fatal() {
        let dir = scratch_dir("malformed");
        let obj = dir.join("bad.obj");
        fs::write(&obj, "o bad\nv 1.0\nf 1 1 1\n").unwrap();
        assert!(load_geometry(&obj, 1.0, &mut HashMap::new()).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_quad_face_is_fatal() {
        let dir = scratch_dir("quad");
        let obj = dir.join("quad.obj");
        fs::write(&obj, "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert!(load_geometry(&obj, 1.0, &mut HashMap::new()).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_geometry("no/such/file.obj", 1.0, &mut HashMap::new()).is_err());
    }

    #[test]
    fn test_malformed_kd_is_fatal() {
        let dir = scratch_dir("bad-kd");
        fs::write(dir.join("bad.mtl"), "newmtl A\nKd 1 0\n").unwrap();
        fs::write(dir.join("bad.obj"), "mtllib bad.mtl\no tri\nusemtl A\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let Err(err) = load_materials(dir.join("bad.mtl"), &mut HashMap::new()) else {
            panic!("short Kd line accepted");
        };
        assert!(err.contains("Malformed MTL line 2"), "{}", err);
        let Err(err) = load_geometry(dir.join("bad.obj"), 1.0, &mut HashMap::new()) else {
            panic!("short Kd line accepted through mtllib");
        };
        assert!(err.contains("Malformed MTL line 2"), "{}", err);

        fs::write(dir.join("bad.mtl"), "newmtl A\nKs 1 0 0 0\n").unwrap();
        assert!(load_materials(dir.join("bad.mtl"), &mut HashMap::new()).is_err());
        fs::write(dir.join("bad.mtl"), "newmtl A\nKa 1 x 0\n").unwrap();
        assert!(load_materials(dir.join("bad.mtl"), &mut HashMap::new()).is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_material_library_is_error() {
        let dir = scratch_dir("no-mtl");
        let obj = dir.join("lonely.obj");
        fs::write(&obj, "mtllib gone.mtl\no tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let Err(err) = load_geometry(&obj, 1.0, &mut HashMap::new()) else {
            panic!("missing material library accepted");
        };
        assert!(err.contains("gone.mtl"), "{}", err);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_geometry_textures_are_cached() {
        let dir = scratch_dir("obj-tex");
        let mut ppm = b"P6\n1 1\n255\n".to_vec();
        ppm.extend_from_slice(&[1, 2, 3]);
        fs::write(dir.join("tile.ppm"), ppm).unwrap();
        fs::write(dir.join("tile.mtl"), "newmtl Tile\nKd 1 1 1\nmap_Kd tile.ppm\n").unwrap();
        let obj = dir.join("tile.obj");
        fs::write(&obj, "mtllib tile.mtl\no tri\nusemtl Tile\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut textures = HashMap::new();
        let data = load_geometry(&obj, 1.0, &mut textures).unwrap();
        assert_eq!(textures.len(), 1);
        assert_eq!(data.elements[0].material, "Tile");
        let cached = textures.get("tile.ppm").unwrap();
        assert!(std::ptr::eq(data.materials[0].texture().unwrap(), cached.as_ref()));

        fs::remove_dir_all(&dir).ok();
    }
}
