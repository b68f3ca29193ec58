use nalgebra::{Point3, Vector2, Vector3};

/// One triangle of an element.
///
/// Indices are local to the owning [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub texture_indices: Option<[usize; 3]>,
    /// Unnormalised geometric normal, `(b - a) x (c - a)`.
    pub normal: Vector3<f32>,
}

impl Face {
    pub fn new(
        vertices: [usize; 3],
        texture_indices: Option<[usize; 3]>,
        points: &[Point3<f32>],
    ) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        Self {
            vertices,
            texture_indices,
            normal: (b - a).cross(&(c - a)),
        }
    }
}

/// A named group of faces sharing one material.
///
/// Built once at load time and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub material: String,
    pub points: Vec<Point3<f32>>,
    pub texture_points: Vec<Vector2<f32>>,
    pub faces: Vec<Face>,
    /// Unit vertex normals: the normalised sum of every incident face normal.
    pub vertex_normals: Vec<Vector3<f32>>,
}

impl Element {
    pub fn new(
        name: impl Into<String>,
        material: impl Into<String>,
        points: Vec<Point3<f32>>,
        texture_points: Vec<Vector2<f32>>,
        faces: Vec<Face>,
    ) -> Self {
        let vertex_normals = smooth_vertex_normals(points.len(), &faces);
        Self {
            name: name.into(),
            material: material.into(),
            points,
            texture_points,
            faces,
            vertex_normals,
        }
    }

    /// Corner positions of a face.
    #[inline]
    pub fn face_points(&self, face: &Face) -> [Point3<f32>; 3] {
        face.vertices.map(|i| self.points[i])
    }

    /// Corner texture coordinates of a face, if it has any.
    pub fn face_texture_points(&self, face: &Face) -> Option<[Vector2<f32>; 3]> {
        let indices = face.texture_indices?;
        if indices.iter().any(|&i| i >= self.texture_points.len()) {
            return None;
        }
        Some(indices.map(|i| self.texture_points[i]))
    }

    /// Single triangle with corners (0,0,0), (1,0,0), (0,1,0).
    pub fn create_test_triangle(material: &str) -> Self {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let texture_points = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let faces = vec![Face::new([0, 1, 2], Some([0, 1, 2]), &points)];
        Self::new("triangle", material, points, texture_points, faces)
    }
}

/// Sums face normals into their corners, then normalises.
/// Vertices with no usable normal (isolated, or only degenerate faces) fall back to +Y.
fn smooth_vertex_normals(count: usize, faces: &[Face]) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::zeros(); count];
    for face in faces {
        for &i in &face.vertices {
            normals[i] += face.normal;
        }
    }
    for normal in normals.iter_mut() {
        if normal.norm_squared() > 1e-12 {
            normal.normalize_mut();
        } else {
            *normal = Vector3::y();
        }
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normal_is_edge_cross_product() {
        let tri = Element::create_test_triangle("red");
        assert_eq!(tri.faces[0].normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_vertex_normals_average_incident_faces() {
        // Two faces folded along the shared edge 0-1.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            Face::new([0, 1, 2], None, &points),
            Face::new([0, 1, 3], None, &points),
        ];
        let element = Element::new("fold", "", points, Vec::new(), faces);

        let expected = Vector3::new(0.0, 1.0, 1.0).normalize();
        assert!((element.vertex_normals[0] - expected).norm() < 1e-5);
        assert!((element.vertex_normals[2] - Vector3::z()).norm() < 1e-5);
        assert!((element.vertex_normals[3] - Vector3::y()).norm() < 1e-5);
    }

    #[test]
    fn test_face_texture_points_out_of_range() {
        let mut tri = Element::create_test_triangle("red");
        tri.texture_points.truncate(2);
        assert!(tri.face_texture_points(&tri.faces[0]).is_none());
    }
}
