use std::path::Path;

use super::F;
use super::error::ObjError;

/// Flat vertex coordinates and triangle indices, the unit passed between stages.
///
/// `coords` holds `x y z` triples and `tris` holds 0-based index triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub coords: Vec<F>,
    pub tris: Vec<usize>,
}

impl MeshBuffers {
    pub fn new(coords: Vec<F>, tris: Vec<usize>) -> Self {
        debug_assert_eq!(coords.len() % 3, 0);
        debug_assert_eq!(tris.len() % 3, 0);
        Self { coords, tris }
    }
    pub fn from_parts(v: &[[F; 3]], f: &[[usize; 3]]) -> Self {
        Self {
            coords: v.iter().flatten().copied().collect(),
            tris: f.iter().flatten().copied().collect(),
        }
    }
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.coords.len() / 3
    }
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.tris.len() / 3
    }
    #[inline]
    pub fn vertex(&self, i: usize) -> [F; 3] {
        [self.coords[3 * i], self.coords[3 * i + 1], self.coords[3 * i + 2]]
    }
    pub fn vertices(&self) -> impl Iterator<Item = [F; 3]> + '_ {
        self.coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.tris.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Mesh state owned by the simplification stage and mutated in place by
/// [`crate::simplify_mesh`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshContext {
    pub v: Vec<[F; 3]>,
    pub f: Vec<[usize; 3]>,
}

impl MeshContext {
    pub fn from_buffers(b: &MeshBuffers) -> Self {
        Self {
            v: b.vertices().collect(),
            f: b.triangles().collect(),
        }
    }
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, ObjError> {
        super::obj::load_obj(path).map(|b| Self::from_buffers(&b))
    }
    pub fn to_buffers(&self) -> MeshBuffers {
        MeshBuffers::from_parts(&self.v, &self.f)
    }
    pub fn num_vertices(&self) -> usize {
        self.v.len()
    }
    pub fn num_triangles(&self) -> usize {
        self.f.len()
    }
}
