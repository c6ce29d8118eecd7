//! Geometry primitives for 3D rendering

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::math::{try_normalize, Vec3};
use crate::surface::Color;
use crate::transform::TransformState;

/// Precision of the face-grouping key (normals rounded to 1e-3)
const NORMAL_KEY_SCALE: f32 = 1000.0;
/// Precision used to merge coincident vertices when computing the centroid
const POSITION_KEY_SCALE: f32 = 10000.0;

/// Quantized normal direction used as a face-grouping key
pub type NormalKey = (i32, i32, i32);

fn quantize(v: &Vec3, scale: f32) -> (i32, i32, i32) {
    (
        (v.x * scale).round() as i32,
        (v.y * scale).round() as i32,
        (v.z * scale).round() as i32,
    )
}

/// A triangle face defined by three vertices in counter-clockwise order
/// (seen from the front)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    normal: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let vertices = [v0, v1, v2];
        let normal = calculate_normal(&vertices).unwrap_or_else(Vec3::zeros);
        Self { vertices, normal }
    }

    /// Unit normal following the winding, or the zero vector for a
    /// degenerate (zero-area) triangle
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::zeros()
    }

    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }
}

/// Unit normal of `(v1 - v0) x (v2 - v0)`, `None` when the face has no area
pub fn calculate_normal(vertices: &[Vec3; 3]) -> Option<Vec3> {
    let edge1 = vertices[1] - vertices[0];
    let edge2 = vertices[2] - vertices[0];
    try_normalize(&edge1.cross(&edge2))
}

/// Which of the two runtime cameras projects a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraSlot {
    #[default]
    World,
    Overlay,
}

/// A 3D mesh composed of triangles.
///
/// Triangle data is fixed at construction; all edits go through
/// `transform`.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    triangles: Vec<Triangle>,
    face_groups: HashMap<NormalKey, Vec<usize>>,
    pub transform: TransformState,
    pub color: Color,
    pub slot: CameraSlot,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(Error::EmptyMesh);
        }
        Ok(Self::from_parts(name.into(), triangles))
    }

    /// Build a mesh from raw vertex lists, rejecting any entry that does not
    /// hold exactly three vertices.
    pub fn from_vertex_lists(name: impl Into<String>, lists: &[Vec<Vec3>]) -> Result<Self> {
        let mut triangles = Vec::with_capacity(lists.len());
        for (index, vertices) in lists.iter().enumerate() {
            match vertices.as_slice() {
                [v0, v1, v2] => triangles.push(Triangle::new(*v0, *v1, *v2)),
                _ => {
                    tracing::warn!(index, vertices = vertices.len(), "rejecting malformed triangle");
                    return Err(Error::MalformedTriangle {
                        index,
                        vertices: vertices.len(),
                    });
                }
            }
        }
        Self::new(name, triangles)
    }

    fn from_parts(name: String, triangles: Vec<Triangle>) -> Self {
        let face_groups = group_faces(&triangles);
        let pivot = distinct_centroid(&triangles);
        Self {
            name,
            triangles,
            face_groups,
            transform: TransformState::default().with_pivot(pivot),
            color: Color::WHITE,
            slot: CameraSlot::World,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_slot(mut self, slot: CameraSlot) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_transform(mut self, transform: TransformState) -> Self {
        self.transform = transform;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangle indices grouped by shared normal direction, ordered by the
    /// first triangle of each group. Degenerate triangles belong to no face.
    pub fn faces(&self) -> Vec<&[usize]> {
        let mut faces: Vec<&[usize]> = self.face_groups.values().map(Vec::as_slice).collect();
        faces.sort_by_key(|group| group[0]);
        faces
    }

    /// The face group containing `triangle`
    pub fn face_of(&self, triangle: usize) -> Option<&[usize]> {
        let tri = self.triangles.get(triangle)?;
        if tri.is_degenerate() {
            return None;
        }
        self.face_groups
            .get(&quantize(&tri.normal(), NORMAL_KEY_SCALE))
            .map(Vec::as_slice)
    }

    /// Create an axis-aligned box spanning `min`..`max`
    pub fn box_mesh(name: impl Into<String>, min: Vec3, max: Vec3) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let v = Vec3::new;
        let triangles = vec![
            // Front face (+Z)
            Triangle::new(v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1)),
            Triangle::new(v(x0, y0, z1), v(x1, y1, z1), v(x0, y1, z1)),
            // Back face (-Z)
            Triangle::new(v(x0, y0, z0), v(x0, y1, z0), v(x1, y1, z0)),
            Triangle::new(v(x0, y0, z0), v(x1, y1, z0), v(x1, y0, z0)),
            // Top face
            Triangle::new(v(x0, y1, z0), v(x0, y1, z1), v(x1, y1, z1)),
            Triangle::new(v(x0, y1, z0), v(x1, y1, z1), v(x1, y1, z0)),
            // Bottom face
            Triangle::new(v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1)),
            Triangle::new(v(x0, y0, z0), v(x1, y0, z1), v(x0, y0, z1)),
            // Right face
            Triangle::new(v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1)),
            Triangle::new(v(x1, y0, z0), v(x1, y1, z1), v(x1, y0, z1)),
            // Left face
            Triangle::new(v(x0, y0, z0), v(x0, y0, z1), v(x0, y1, z1)),
            Triangle::new(v(x0, y0, z0), v(x0, y1, z1), v(x0, y1, z0)),
        ];
        Self::from_parts(name.into(), triangles)
    }

    /// Create a cube centered on the origin
    pub fn cube(size: f32) -> Self {
        let half = Vec3::repeat(size / 2.0);
        Self::box_mesh("cube", -half, half)
    }

    /// Square-based pyramid centered on the origin, apex toward -Y (up on
    /// screen with the default camera)
    pub fn pyramid(size: f32) -> Self {
        let h = size / 2.0;
        let a = Vec3::new(-h, h, -h);
        let b = Vec3::new(h, h, -h);
        let c = Vec3::new(h, h, h);
        let d = Vec3::new(-h, h, h);
        let apex = Vec3::new(0.0, -h, 0.0);
        let triangles = vec![
            Triangle::new(a, c, b),
            Triangle::new(a, d, c),
            Triangle::new(a, b, apex),
            Triangle::new(b, c, apex),
            Triangle::new(c, d, apex),
            Triangle::new(d, a, apex),
        ];
        Self::from_parts("pyramid".to_string(), triangles)
    }
}

fn group_faces(triangles: &[Triangle]) -> HashMap<NormalKey, Vec<usize>> {
    let mut groups: HashMap<NormalKey, Vec<usize>> = HashMap::new();
    for (index, triangle) in triangles.iter().enumerate() {
        if triangle.is_degenerate() {
            continue;
        }
        groups
            .entry(quantize(&triangle.normal(), NORMAL_KEY_SCALE))
            .or_default()
            .push(index);
    }
    groups
}

/// Mean of the distinct vertex positions
fn distinct_centroid(triangles: &[Triangle]) -> Vec3 {
    let mut seen = HashSet::new();
    let mut sum = Vec3::zeros();
    for vertex in triangles.iter().flat_map(|t| t.vertices.iter()) {
        if seen.insert(quantize(vertex, POSITION_KEY_SCALE)) {
            sum += vertex;
        }
    }
    if seen.is_empty() {
        Vec3::zeros()
    } else {
        sum / seen.len() as f32
    }
}
