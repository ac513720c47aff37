use crate::error::{Result, SurfaceError};
use crate::math::intersect_3d::ray_triangle_intersect;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{KdTree, Surface};

/// An indexed triangle mesh with per-vertex normals, vertex→face links and
/// a k-d tree over its vertices.
#[derive(Debug, Clone)]
pub struct TriangleSurface {
    vertices: Vec<Point3>,
    normals: Vec<Vector3>,
    faces: Vec<[usize; 3]>,
    vertex_faces: Vec<Vec<usize>>,
    tree: KdTree,
    length: f64,
}

impl TriangleSurface {
    /// Builds a surface from positions and faces, computing area-weighted
    /// vertex normals.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is empty or a face references a
    /// vertex that does not exist.
    pub fn new(vertices: Vec<Point3>, faces: Vec<[usize; 3]>) -> Result<Self> {
        validate(&vertices, &faces)?;
        let normals = vertex_normals(&vertices, &faces);
        Ok(Self::assemble(vertices, normals, faces))
    }

    /// Builds a surface with caller-supplied vertex normals.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is empty, a face references a vertex
    /// that does not exist, or the normal count differs from the vertex count.
    pub fn with_normals(
        vertices: Vec<Point3>,
        normals: Vec<Vector3>,
        faces: Vec<[usize; 3]>,
    ) -> Result<Self> {
        validate(&vertices, &faces)?;
        if normals.len() != vertices.len() {
            return Err(SurfaceError::AttributeLength {
                attribute: "normals",
                expected: vertices.len(),
                found: normals.len(),
            }
            .into());
        }
        let normals = normals
            .into_iter()
            .map(|n| n.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros))
            .collect();
        Ok(Self::assemble(vertices, normals, faces))
    }

    /// Builds a flat grid of `nx × ny` vertices in the z = 0 plane, with
    /// vertex `(i, j)` at index `j * nx + i` and position
    /// `(i * spacing, j * spacing, 0)`. Each cell is split into two triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is below 2.
    pub fn grid(nx: usize, ny: usize, spacing: f64) -> Result<Self> {
        if nx < 2 || ny < 2 {
            return Err(SurfaceError::EmptySurface.into());
        }

        let mut vertices = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                #[allow(clippy::cast_precision_loss)]
                vertices.push(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
            }
        }

        let mut faces = Vec::with_capacity((nx - 1) * (ny - 1) * 2);
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let v00 = j * nx + i;
                let v10 = v00 + 1;
                let v01 = v00 + nx;
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        Self::new(vertices, faces)
    }

    /// Returns a copy with moved vertices and the same faces (a deformed
    /// surface). Normals are recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if `positions` does not match the vertex count.
    pub fn deformed(&self, positions: Vec<Point3>) -> Result<Self> {
        if positions.len() != self.vertices.len() {
            return Err(SurfaceError::AttributeLength {
                attribute: "positions",
                expected: self.vertices.len(),
                found: positions.len(),
            }
            .into());
        }
        Self::new(positions, self.faces.clone())
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Vertex normals.
    #[must_use]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    /// Triangle faces.
    #[must_use]
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    fn assemble(vertices: Vec<Point3>, normals: Vec<Vector3>, faces: Vec<[usize; 3]>) -> Self {
        let mut vertex_faces = vec![Vec::new(); vertices.len()];
        for (fi, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_faces[v].push(fi);
            }
        }
        let tree = KdTree::build(&vertices);
        let length = bounding_diagonal(&vertices);
        Self {
            vertices,
            normals,
            faces,
            vertex_faces,
            tree,
            length,
        }
    }
}

impl Surface for TriangleSurface {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex_position(&self, vertex: usize) -> Point3 {
        self.vertices[vertex]
    }

    fn vertex_normal(&self, vertex: usize) -> Vector3 {
        self.normals[vertex]
    }

    fn incident_faces(&self, vertex: usize) -> &[usize] {
        match self.vertex_faces.get(vertex) {
            Some(faces) => faces,
            None => &[],
        }
    }

    fn face_vertices(&self, face: usize) -> [usize; 3] {
        self.faces[face]
    }

    fn nearest_vertex(&self, point: &Point3) -> Option<usize> {
        self.tree.nearest(point)
    }

    fn nearest_vertices(&self, point: &Point3, k: usize) -> Vec<usize> {
        self.tree.nearest_k(point, k)
    }

    fn ray_intersect(&self, start: &Point3, end: &Point3) -> Option<Point3> {
        let dir = end - start;
        if dir.norm_squared() < TOLERANCE * TOLERANCE {
            return None;
        }

        self.faces
            .iter()
            .filter_map(|&[a, b, c]| {
                ray_triangle_intersect(
                    start,
                    &dir,
                    &self.vertices[a],
                    &self.vertices[b],
                    &self.vertices[c],
                )
            })
            .filter(|hit| hit.t <= 1.0)
            .min_by(|x, y| x.t.total_cmp(&y.t))
            .map(|hit| hit.point)
    }

    fn length(&self) -> f64 {
        self.length
    }
}

fn validate(vertices: &[Point3], faces: &[[usize; 3]]) -> Result<()> {
    if vertices.is_empty() || faces.is_empty() {
        return Err(SurfaceError::EmptySurface.into());
    }
    for (face, tri) in faces.iter().enumerate() {
        if let Some(&vertex) = tri.iter().find(|&&v| v >= vertices.len()) {
            return Err(SurfaceError::InvalidFace {
                face,
                vertex,
                vertex_count: vertices.len(),
            }
            .into());
        }
    }
    Ok(())
}

/// Area-weighted vertex normals: each face adds its unnormalized cross
/// product to its three vertices.
fn vertex_normals(vertices: &[Point3], faces: &[[usize; 3]]) -> Vec<Vector3> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];
    for &[a, b, c] in faces {
        let n = (vertices[b] - vertices[a]).cross(&(vertices[c] - vertices[a]));
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros))
        .collect()
}

fn bounding_diagonal(vertices: &[Point3]) -> f64 {
    let Some(first) = vertices.first() else {
        return 0.0;
    };
    let (min, max) = vertices.iter().fold((*first, *first), |(lo, hi), p| {
        (lo.inf(p), hi.sup(p))
    });
    (max - min).norm()
}
