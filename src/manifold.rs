use union_find::{UnionFind, UnionFindOp};

/// A mesh representation which is suitable for collapsing vertices.
/// It associates data with each vertex and tracks vertex adjacency through
/// collapses.
#[derive(Debug, Clone)]
pub struct CollapsibleManifold<T> {
    pub(crate) vertices: UnionFind<u32>,

    pub edges: Vec<Vec<u32>>,

    pub data: Vec<T>,
}

impl<T> CollapsibleManifold<T> {
    pub fn new_with(size: usize, f: impl Fn(usize) -> T) -> Self {
        Self {
            vertices: UnionFind::new_u32(size),
            edges: vec![vec![]; size],

            data: (0..size).map(f).collect(),
        }
    }

    pub fn is_deleted(&self, vi: usize) -> bool {
        !self.vertices.is_root(vi)
    }

    /// Adds an edge, should only be called before any merges.
    pub fn add_edge(&mut self, v0: usize, v1: usize) {
        if v0 == v1 {
            return;
        }
        for [src, dst] in [[v0, v1], [v1, v0]] {
            let e = &mut self.edges[src];
            if let Err(i) = e.binary_search(&(dst as u32)) {
                e.insert(i, dst as u32);
            }
        }
    }

    /// Returns adjacent vertices of a live vertex.
    pub fn vertex_adj(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[v]
            .iter()
            .map(|&dst| self.vertices.find(dst as usize))
    }

    /// Returns whether two vertices v0 and v1 are adjacent.
    /// v0 and v1 can be merged into other vertices.
    #[inline]
    pub fn is_adj(&self, v0: usize, v1: usize) -> bool {
        let v0 = self.vertices.find(v0);
        let v1 = self.vertices.find(v1);
        self.vertex_adj(v0).any(|dst| dst == v1)
    }

    /// Number of distinct vertices adjacent to v.
    pub fn valence(&self, v: usize) -> usize {
        self.edges[v].len()
    }

    /// Vertices adjacent to both v0 and v1, in sorted order.
    pub fn common_adj(&self, v0: usize, v1: usize) -> Vec<usize> {
        let mut a0 = self.vertex_adj(v0).collect::<Vec<_>>();
        a0.sort_unstable();
        a0.dedup();
        let mut a1 = self.vertex_adj(v1).collect::<Vec<_>>();
        a1.sort_unstable();
        a1.dedup();
        a0.retain(|v| a1.binary_search(v).is_ok());
        a0
    }

    /// Merges v0 and v1, storing the output of `merge` on the surviving vertex.
    /// Returns the surviving vertex.
    pub fn merge(&mut self, v0: usize, v1: usize, merge: impl FnOnce(&T, &T) -> T) -> usize {
        debug_assert_ne!(v0, v1);
        debug_assert!(!self.is_deleted(v0));
        debug_assert!(!self.is_deleted(v1));
        debug_assert!(self.is_adj(v0, v1));

        let new_data = merge(&self.data[v0], &self.data[v1]);
        self.vertices.union(v0, v1);
        let root = self.vertices.find(v0);
        let gone = if root == v0 { v1 } else { v0 };
        self.data[root] = new_data;
        // data[gone] should no longer be accessed

        let vertices = &self.vertices;
        let gone_e = std::mem::take(&mut self.edges[gone]);
        let mut root_e = std::mem::take(&mut self.edges[root]);
        root_e.extend(gone_e);
        for v in root_e.iter_mut() {
            *v = vertices.find(*v as usize) as u32;
        }
        root_e.retain(|&v| v as usize != root);
        root_e.sort_unstable();
        root_e.dedup();

        for &adj in &root_e {
            let adj_e = &mut self.edges[adj as usize];
            adj_e.retain(|&v| vertices.find(v as usize) != root);
            adj_e.push(root as u32);
        }
        self.edges[root] = root_e;
        root
    }

    pub fn get(&self, v: usize) -> &T {
        &self.data[self.vertices.find(v)]
    }

    /// All edges in this manifold mesh with v0-v1 in sorted order.
    pub fn ord_edges(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        self.edges.iter().enumerate().flat_map(|(src, dsts)| {
            dsts.iter()
                .filter(move |&&dst| src < dst as usize)
                .map(move |&dst| [src, dst as usize])
        })
    }
}

/// Sorted pair of vertex indices.
#[inline]
pub fn ord_edge(a: usize, b: usize) -> [usize; 2] {
    if a <= b { [a, b] } else { [b, a] }
}

/// Faces adjacent to an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Boundary(usize),
    Manifold([usize; 2]),
    NonManifold(smallvec::SmallVec<[usize; 3]>),
}

impl EdgeKind {
    pub fn insert(&mut self, v: usize) -> bool {
        use EdgeKind::*;
        *self = match self {
            &mut Boundary(a) if a == v => return false,
            &mut Manifold([a, _] | [_, a]) if a == v => return false,
            &mut Boundary(a) => Manifold([a, v]),
            &mut Manifold([a, b]) => NonManifold(smallvec::smallvec![a, b, v]),

            NonManifold(vs) if vs.contains(&v) => return false,
            NonManifold(vs) => {
                vs.push(v);
                return true;
            }
        };
        true
    }
    pub fn as_slice(&self) -> &[usize] {
        use EdgeKind::*;
        match self {
            Boundary(f) => std::slice::from_ref(f),
            Manifold(fs) => fs.as_slice(),
            NonManifold(fs) => fs.as_slice(),
        }
    }
    pub fn is_boundary(&self) -> bool {
        matches!(self, EdgeKind::Boundary(_))
    }
    /// Constructs an edge kind from an iterator of face indices.
    pub fn from_iter(mut v: impl Iterator<Item = usize>) -> Option<Self> {
        let mut curr = Self::Boundary(v.next()?);
        for v in v {
            curr.insert(v);
        }
        Some(curr)
    }
}
