//! Feature preserving isotropic remeshing.
//!
//! Each iteration performs:
//! - **Split**: edges longer than the maximum length are split at their midpoint
//! - **Collapse**: edges shorter than the minimum length are collapsed
//! - **Flip**: edges are flipped to bring vertex valences towards 6 (4 on borders)
//! - **Smooth**: vertices away from features are relaxed in their tangent plane
//!
//! Feature edges are borders, non-manifold edges and edges whose dihedral
//! cosine is below the feature threshold. They are only split or collapsed
//! when the options allow it, and vertices on them never move off the feature.

use std::collections::{HashMap, HashSet};

use log::debug;
use smallvec::SmallVec;

use super::error::{RemeshError, RemeshResult};
use super::manifold::ord_edge;
use super::mesh::MeshBuffers;
use super::options::{RemeshConfig, RemesherOptions};
use super::{F, add, dist_sq, dot, kmul, midpoint, normalize, sub, tri_normal};

const SMOOTH_DAMPING: F = 0.5;

/// Minimum cosine between a face normal before and after an edit.
const MIN_NORMAL_DOT: F = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemeshStats {
    pub iterations: u32,
    pub splits: usize,
    pub collapses: usize,
    pub flips: usize,
}

impl std::fmt::Display for RemeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} iterations, {} splits, {} collapses, {} flips",
            self.iterations, self.splits, self.collapses, self.flips
        )
    }
}

/// Remeshes `input` as configured by `opts`, producing a new mesh.
///
/// # Errors
///
/// Returns an error if the options cannot be parsed or are out of range, or
/// if the input has no vertices, no faces, or out of range indices.
pub fn remesh(opts: &RemesherOptions, input: &MeshBuffers) -> RemeshResult<MeshBuffers> {
    remesh_with_stats(opts, input).map(|(mesh, _)| mesh)
}

/// Same as [`remesh`], also returning operation counts.
pub fn remesh_with_stats(
    opts: &RemesherOptions,
    input: &MeshBuffers,
) -> RemeshResult<(MeshBuffers, RemeshStats)> {
    let cfg = RemeshConfig::from_options(opts)?;
    validate(&cfg)?;
    if input.num_vertices() == 0 {
        return Err(RemeshError::EmptyMesh);
    }
    if input.num_triangles() == 0 {
        return Err(RemeshError::NoFaces);
    }
    if let Some(&i) = input.tris.iter().find(|&&i| i >= input.num_vertices()) {
        return Err(RemeshError::IndexOutOfRange(i));
    }

    let cos = cfg.feature_threshold;
    let mut s = Surface::new(input);
    debug!(
        "Remeshing {} vertices, {} faces, target length {:.4}, {} iterations",
        input.num_vertices(),
        input.num_triangles(),
        cfg.target_edge_length,
        cfg.iterations
    );

    let mut stats = RemeshStats::default();
    for it in 0..cfg.iterations {
        let splits = s.split_long_edges(cfg.max_edge_length, cfg.refine_features, cos);
        let collapses = s.collapse_short_edges(
            cfg.min_edge_length,
            cfg.max_edge_length,
            cfg.coarsen_features,
            cos,
        );
        let flips = s.equalize_valences(cos);
        s.tangential_smooth(cos);

        stats.iterations = it + 1;
        stats.splits += splits;
        stats.collapses += collapses;
        stats.flips += flips;
        debug!(
            "Iteration {}: {splits} splits, {collapses} collapses, {flips} flips",
            it + 1
        );
        if splits == 0 && collapses == 0 && flips == 0 {
            debug!("Converged at iteration {}", it + 1);
            break;
        }
    }

    let out = s.into_buffers();
    debug!(
        "Remeshed: {} vertices, {} faces, mean edge length {:.4} ({stats})",
        out.num_vertices(),
        out.num_triangles(),
        mean_edge_length(&out)
    );
    Ok((out, stats))
}

fn validate(cfg: &RemeshConfig) -> RemeshResult<()> {
    if !(cfg.target_edge_length > 0.) || !cfg.target_edge_length.is_finite() {
        return Err(RemeshError::InvalidEdgeLength(cfg.target_edge_length));
    }
    if !(cfg.max_edge_length > 0.) || cfg.min_edge_length > cfg.max_edge_length {
        return Err(RemeshError::InvalidEdgeBounds {
            min: cfg.min_edge_length,
            max: cfg.max_edge_length,
        });
    }
    if cfg.iterations == 0 {
        return Err(RemeshError::InvalidIterations(0));
    }
    if cfg.relative_edge_error > 0. {
        return Err(RemeshError::UnsupportedRelativeError(cfg.relative_edge_error));
    }
    Ok(())
}

/// Mean length over the unique edges of a mesh.
pub fn mean_edge_length(mesh: &MeshBuffers) -> F {
    let edges = mesh
        .triangles()
        .flat_map(|[a, b, c]| [ord_edge(a, b), ord_edge(b, c), ord_edge(c, a)])
        .collect::<HashSet<_>>();
    if edges.is_empty() {
        return 0.;
    }
    let total: F = edges
        .iter()
        .map(|&[a, b]| dist_sq(mesh.vertex(a), mesh.vertex(b)).sqrt())
        .sum();
    total / edges.len() as F
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexKind {
    /// Not on any feature edge.
    Smooth,
    /// On a feature line, free to slide along it.
    Crease,
    /// End or sharp turn of a feature line, never moves.
    Corner,
}

/// Working mesh with vertex to face adjacency for local edits.
struct Surface {
    v: Vec<[F; 3]>,
    f: Vec<[usize; 3]>,
    f_alive: Vec<bool>,
    v_alive: Vec<bool>,
    /// alive faces of each vertex
    vf: Vec<Vec<usize>>,
}

impl Surface {
    fn new(b: &MeshBuffers) -> Self {
        let mut s = Self {
            v: b.vertices().collect(),
            f: vec![],
            f_alive: vec![],
            v_alive: vec![true; b.num_vertices()],
            vf: vec![vec![]; b.num_vertices()],
        };
        for t in b.triangles() {
            if t[0] != t[1] && t[1] != t[2] && t[2] != t[0] {
                s.push_face(t);
            }
        }
        s
    }

    fn push_face(&mut self, face: [usize; 3]) -> usize {
        let fi = self.f.len();
        self.f.push(face);
        self.f_alive.push(true);
        for vi in face {
            self.vf[vi].push(fi);
        }
        fi
    }

    fn kill_face(&mut self, fi: usize) {
        self.f_alive[fi] = false;
        for vi in self.f[fi] {
            self.vf[vi].retain(|&o| o != fi);
        }
    }

    fn edge_faces(&self, a: usize, b: usize) -> SmallVec<[usize; 2]> {
        self.vf[a]
            .iter()
            .copied()
            .filter(|&fi| self.f[fi].contains(&b))
            .collect()
    }

    /// Sorted distinct neighbors of a vertex.
    fn neighbors(&self, a: usize) -> Vec<usize> {
        let mut out = self.vf[a]
            .iter()
            .flat_map(|&fi| self.f[fi])
            .filter(|&o| o != a)
            .collect::<Vec<_>>();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn face_normal(&self, fi: usize) -> [F; 3] {
        normalize(tri_normal(self.f[fi].map(|vi| self.v[vi])))
    }

    fn alive_faces(&self) -> impl Iterator<Item = (usize, [usize; 3])> + '_ {
        self.f
            .iter()
            .enumerate()
            .filter(|&(fi, _)| self.f_alive[fi])
            .map(|(fi, &f)| (fi, f))
    }

    fn edge_face_map(&self) -> HashMap<[usize; 2], SmallVec<[usize; 2]>> {
        let mut map: HashMap<[usize; 2], SmallVec<[usize; 2]>> = HashMap::new();
        for (fi, [a, b, c]) in self.alive_faces() {
            for e in [ord_edge(a, b), ord_edge(b, c), ord_edge(c, a)] {
                map.entry(e).or_default().push(fi);
            }
        }
        map
    }

    fn feature_edges(&self, cos: F) -> HashSet<[usize; 2]> {
        self.edge_face_map()
            .into_iter()
            .filter(|(_, fs)| match fs.as_slice() {
                &[f0, f1] => dot(self.face_normal(f0), self.face_normal(f1)) < cos,
                _ => true,
            })
            .map(|(e, _)| e)
            .collect()
    }

    fn classify(&self, vi: usize, feats: &HashSet<[usize; 2]>, cos: F) -> VertexKind {
        let fnbrs = self
            .neighbors(vi)
            .into_iter()
            .filter(|&o| feats.contains(&ord_edge(vi, o)))
            .collect::<SmallVec<[usize; 2]>>();
        match fnbrs.as_slice() {
            [] => VertexKind::Smooth,
            &[n0, n1] => {
                let d0 = normalize(sub(self.v[vi], self.v[n0]));
                let d1 = normalize(sub(self.v[n1], self.v[vi]));
                if dot(d0, d1) >= cos {
                    VertexKind::Crease
                } else {
                    VertexKind::Corner
                }
            }
            _ => VertexKind::Corner,
        }
    }

    fn vertex_kinds(&self, feats: &HashSet<[usize; 2]>, cos: F) -> Vec<VertexKind> {
        (0..self.v.len())
            .map(|vi| self.classify(vi, feats, cos))
            .collect()
    }

    /// Unique edges of alive faces with their squared length.
    fn edges_with_len(&self) -> Vec<([usize; 2], F)> {
        self.edge_face_map()
            .into_keys()
            .map(|[a, b]| ([a, b], dist_sq(self.v[a], self.v[b])))
            .collect()
    }

    fn split_long_edges(&mut self, max_len: F, refine_features: bool, cos: F) -> usize {
        let feats = self.feature_edges(cos);
        let max_sq = max_len * max_len;
        let mut long = self
            .edges_with_len()
            .into_iter()
            .filter(|(e, l)| *l > max_sq && (refine_features || !feats.contains(e)))
            .collect::<Vec<_>>();
        // longest first
        long.sort_by(|a, b| b.1.total_cmp(&a.1));

        long.into_iter()
            .filter(|&([a, b], _)| self.split_edge(a, b))
            .count()
    }

    fn split_edge(&mut self, a: usize, b: usize) -> bool {
        let faces = self.edge_faces(a, b);
        if faces.is_empty() {
            return false;
        }
        let mid = self.v.len();
        self.v.push(midpoint(self.v[a], self.v[b]));
        self.v_alive.push(true);
        self.vf.push(vec![]);

        for fi in faces {
            let face = self.f[fi];
            let Some(i) = (0..3).find(|&i| {
                let [x, y] = [face[i], face[(i + 1) % 3]];
                (x == a && y == b) || (x == b && y == a)
            }) else {
                continue;
            };
            let [p, q, r] = [face[i], face[(i + 1) % 3], face[(i + 2) % 3]];
            self.kill_face(fi);
            self.push_face([p, mid, r]);
            self.push_face([mid, q, r]);
        }
        true
    }

    fn collapse_short_edges(
        &mut self,
        min_len: F,
        max_len: F,
        coarsen_features: bool,
        cos: F,
    ) -> usize {
        let mut feats = self.feature_edges(cos);
        let mut kinds = self.vertex_kinds(&feats, cos);
        let min_sq = min_len * min_len;
        let max_sq = max_len * max_len;

        let mut short = self
            .edges_with_len()
            .into_iter()
            .filter(|&(_, l)| l < min_sq)
            .collect::<Vec<_>>();
        // shortest first
        short.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut collapses = 0;
        for ([a, b], _) in short {
            if !self.v_alive[a] || !self.v_alive[b] {
                continue;
            }
            if dist_sq(self.v[a], self.v[b]) >= min_sq || self.edge_faces(a, b).is_empty() {
                continue;
            }
            let is_feature = feats.contains(&ord_edge(a, b));
            let Some((src, dst, pos)) = self.collapse_plan(a, b, is_feature, &kinds, coarsen_features)
            else {
                continue;
            };
            if !self.can_collapse(src, dst, pos, max_sq) {
                continue;
            }

            let src_nbrs = self.neighbors(src);
            self.collapse(src, dst, pos);
            collapses += 1;

            for x in src_nbrs {
                if feats.remove(&ord_edge(src, x)) && x != dst {
                    feats.insert(ord_edge(dst, x));
                }
            }
            kinds[dst] = self.classify(dst, &feats, cos);
            for x in self.neighbors(dst) {
                kinds[x] = self.classify(x, &feats, cos);
            }
        }
        collapses
    }

    /// Picks which vertex of `a`-`b` is removed and where the other one goes.
    fn collapse_plan(
        &self,
        a: usize,
        b: usize,
        is_feature: bool,
        kinds: &[VertexKind],
        coarsen_features: bool,
    ) -> Option<(usize, usize, [F; 3])> {
        use VertexKind::*;
        let fixed = |vi: usize| match is_feature {
            true => kinds[vi] == Corner,
            false => kinds[vi] != Smooth,
        };
        if is_feature && !coarsen_features {
            return None;
        }
        match (fixed(a), fixed(b)) {
            (true, true) => None,
            (true, false) => Some((b, a, self.v[a])),
            (false, true) => Some((a, b, self.v[b])),
            (false, false) => Some((a, b, midpoint(self.v[a], self.v[b]))),
        }
    }

    fn can_collapse(&self, src: usize, dst: usize, pos: [F; 3], max_sq: F) -> bool {
        let ef = self.edge_faces(src, dst);
        if ef.is_empty() || ef.len() > 2 {
            return false;
        }
        let ns = self.neighbors(src);
        let nd = self.neighbors(dst);
        // link condition
        let common = ns.iter().filter(|x| nd.binary_search(x).is_ok()).count();
        if common != ef.len() {
            return false;
        }
        if ef.len() == 2 && ns.len() + nd.len() - 2 - common < 3 {
            return false;
        }

        if ns
            .iter()
            .chain(&nd)
            .any(|&x| x != src && x != dst && dist_sq(self.v[x], pos) > max_sq)
        {
            return false;
        }

        self.vf[src]
            .iter()
            .chain(&self.vf[dst])
            .filter(|&&fi| !(self.f[fi].contains(&src) && self.f[fi].contains(&dst)))
            .all(|&fi| {
                let old = self.face_normal(fi);
                let new = normalize(tri_normal(self.f[fi].map(|vi| {
                    if vi == src || vi == dst { pos } else { self.v[vi] }
                })));
                new != [0.; 3] && dot(old, new) >= MIN_NORMAL_DOT
            })
    }

    fn collapse(&mut self, src: usize, dst: usize, pos: [F; 3]) {
        self.v[dst] = pos;
        for fi in std::mem::take(&mut self.vf[src]) {
            if self.f[fi].contains(&dst) {
                self.kill_face(fi);
                continue;
            }
            for vi in self.f[fi].iter_mut() {
                if *vi == src {
                    *vi = dst;
                }
            }
            self.vf[dst].push(fi);
        }
        self.v_alive[src] = false;
    }

    fn equalize_valences(&mut self, cos: F) -> usize {
        let ef_map = self.edge_face_map();
        let feats = self.feature_edges(cos);
        let mut boundary = vec![false; self.v.len()];
        for (&[a, b], fs) in &ef_map {
            if fs.len() == 1 {
                boundary[a] = true;
                boundary[b] = true;
            }
        }
        let mut valence = (0..self.v.len())
            .map(|vi| self.neighbors(vi).len() as i64)
            .collect::<Vec<_>>();
        let target = |vi: usize| if boundary[vi] { 4 } else { 6 };

        let mut flips = 0;
        for [a, b] in ef_map.into_keys() {
            if feats.contains(&[a, b]) {
                continue;
            }
            let ef = self.edge_faces(a, b);
            let &[fi0, fi1] = ef.as_slice() else {
                continue;
            };
            // orient so that f0 contains a -> b and f1 contains b -> a
            let has = |fi: usize, x: usize, y: usize| {
                let f = self.f[fi];
                (0..3).any(|i| f[i] == x && f[(i + 1) % 3] == y)
            };
            let (f0, f1) = match (has(fi0, a, b), has(fi1, b, a)) {
                (true, true) => (fi0, fi1),
                _ if has(fi1, a, b) && has(fi0, b, a) => (fi1, fi0),
                _ => continue,
            };
            let opposite = |fi: usize| self.f[fi].into_iter().find(|&x| x != a && x != b);
            let (Some(c), Some(d)) = (opposite(f0), opposite(f1)) else {
                continue;
            };
            if c == d || self.neighbors(c).binary_search(&d).is_ok() {
                continue;
            }

            let dev = |vi: usize, delta: i64| (valence[vi] + delta - target(vi)).abs();
            let before = dev(a, 0) + dev(b, 0) + dev(c, 0) + dev(d, 0);
            let after = dev(a, -1) + dev(b, -1) + dev(c, 1) + dev(d, 1);
            if after >= before {
                continue;
            }

            let new0 = [a, d, c];
            let new1 = [b, c, d];
            let avg = normalize(add(self.face_normal(f0), self.face_normal(f1)));
            let n0 = normalize(tri_normal(new0.map(|vi| self.v[vi])));
            let n1 = normalize(tri_normal(new1.map(|vi| self.v[vi])));
            if dot(n0, avg) < MIN_NORMAL_DOT || dot(n1, avg) < MIN_NORMAL_DOT || dot(n0, n1) < cos {
                continue;
            }

            self.f[f0] = new0;
            self.f[f1] = new1;
            self.vf[b].retain(|&fi| fi != f0);
            self.vf[d].push(f0);
            self.vf[a].retain(|&fi| fi != f1);
            self.vf[c].push(f1);
            valence[a] -= 1;
            valence[b] -= 1;
            valence[c] += 1;
            valence[d] += 1;
            flips += 1;
        }
        flips
    }

    fn tangential_smooth(&mut self, cos: F) {
        let feats = self.feature_edges(cos);
        let mut new_v = self.v.clone();
        for vi in 0..self.v.len() {
            if !self.v_alive[vi] || self.vf[vi].is_empty() {
                continue;
            }
            if self.classify(vi, &feats, cos) != VertexKind::Smooth {
                continue;
            }
            let nbrs = self.neighbors(vi);
            let centroid = kmul(
                (nbrs.len() as F).recip(),
                nbrs.iter().fold([0.; 3], |acc, &n| add(acc, self.v[n])),
            );
            // area weighted vertex normal
            let n = normalize(self.vf[vi].iter().fold([0.; 3], |acc, &fi| {
                add(acc, tri_normal(self.f[fi].map(|u| self.v[u])))
            }));
            let d = sub(centroid, self.v[vi]);
            let tangential = sub(d, kmul(dot(n, d), n));
            new_v[vi] = add(self.v[vi], kmul(SMOOTH_DAMPING, tangential));
        }
        self.v = new_v;
    }

    /// Drops dead faces and unreferenced vertices.
    fn into_buffers(self) -> MeshBuffers {
        let mut remap = vec![usize::MAX; self.v.len()];
        let mut v = vec![];
        let mut f = vec![];
        for (_, face) in self.alive_faces() {
            f.push(face.map(|vi| {
                if remap[vi] == usize::MAX {
                    remap[vi] = v.len();
                    v.push(self.v[vi]);
                }
                remap[vi]
            }));
        }
        MeshBuffers::from_parts(&v, &f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ITERATIONS, RELATIVE_EDGE_ERROR, TARGET_EDGE_LENGTH};
    use crate::scale::BoundingBox;

    fn opts(target: F, iterations: u32) -> RemesherOptions {
        RemeshConfig::assemble(1., target, 45., iterations).to_options()
    }

    fn triangle() -> MeshBuffers {
        MeshBuffers::new(vec![0., 0., 0., 1., 0., 0., 0.5, 0.866, 0.], vec![0, 1, 2])
    }

    fn cube() -> MeshBuffers {
        #[rustfmt::skip]
        let coords = vec![
            0., 0., 0., 1., 0., 0., 1., 1., 0., 0., 1., 0.,
            0., 0., 1., 1., 0., 1., 1., 1., 1., 0., 1., 1.,
        ];
        #[rustfmt::skip]
        let tris = vec![
            0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7,
            0, 1, 5, 0, 5, 4, 1, 2, 6, 1, 6, 5,
            2, 3, 7, 2, 7, 6, 3, 0, 4, 3, 4, 7,
        ];
        MeshBuffers::new(coords, tris)
    }

    fn grid(n: usize) -> MeshBuffers {
        let mut v = vec![];
        for j in 0..=n {
            for i in 0..=n {
                v.push([i as F / n as F, j as F / n as F, 0.]);
            }
        }
        let idx = |i: usize, j: usize| j * (n + 1) + i;
        let mut f = vec![];
        for j in 0..n {
            for i in 0..n {
                f.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
                f.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
        MeshBuffers::from_parts(&v, &f)
    }

    fn assert_valid(m: &MeshBuffers) {
        assert_eq!(m.tris.len() % 3, 0);
        assert!(m.tris.iter().all(|&i| i < m.num_vertices()));
        for [a, b, c] in m.triangles() {
            assert!(a != b && b != c && c != a);
        }
    }

    fn assert_same_bounds(a: &MeshBuffers, b: &MeshBuffers) {
        let ba = BoundingBox::from_coords(&a.coords).unwrap();
        let bb = BoundingBox::from_coords(&b.coords).unwrap();
        for i in 0..3 {
            assert!((ba.min[i] - bb.min[i]).abs() < 1e-9);
            assert!((ba.max[i] - bb.max[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_mesh() {
        let result = remesh(&opts(0.1, 3), &MeshBuffers::default());
        assert!(matches!(result, Err(RemeshError::EmptyMesh)));
    }

    #[test]
    fn test_no_faces() {
        let mesh = MeshBuffers::new(vec![0., 0., 0.], vec![]);
        assert!(matches!(remesh(&opts(0.1, 3), &mesh), Err(RemeshError::NoFaces)));
    }

    #[test]
    fn test_bad_index() {
        let mesh = MeshBuffers::new(vec![0., 0., 0., 1., 0., 0., 0., 1., 0.], vec![0, 1, 3]);
        assert!(matches!(
            remesh(&opts(0.1, 3), &mesh),
            Err(RemeshError::IndexOutOfRange(3))
        ));
    }

    #[test]
    fn test_invalid_options() {
        let mesh = triangle();
        assert!(matches!(
            remesh(&opts(0., 3), &mesh),
            Err(RemeshError::InvalidEdgeLength(_))
        ));
        assert!(matches!(
            remesh(&opts(0.1, 0), &mesh),
            Err(RemeshError::InvalidIterations(0))
        ));

        let mut o = opts(0.1, 3);
        o.set(RELATIVE_EDGE_ERROR, 0.01);
        assert!(matches!(
            remesh(&o, &mesh),
            Err(RemeshError::UnsupportedRelativeError(_))
        ));

        let mut o = opts(0.1, 3);
        o.set(ITERATIONS, "ten");
        let err = remesh(&o, &mesh).unwrap_err();
        assert!(err.to_string().contains("REMESHER_ITERATIONS"));

        let mut o = opts(0.1, 3);
        o.set(TARGET_EDGE_LENGTH, "nan");
        assert!(remesh(&o, &mesh).is_err());
    }

    #[test]
    fn test_refines_triangle() {
        let mesh = triangle();
        let (out, stats) = remesh_with_stats(&opts(0.2, 5), &mesh).unwrap();
        assert!(stats.splits > 0);
        assert!(out.num_triangles() > mesh.num_triangles());
        assert_valid(&out);
        assert_same_bounds(&mesh, &out);
        assert!(out.vertices().all(|p| p[2] == 0.));
    }

    #[test]
    fn test_coarsens_grid() {
        let mesh = grid(10);
        let (out, stats) = remesh_with_stats(&opts(0.3, 5), &mesh).unwrap();
        assert!(stats.collapses > 0);
        assert!(out.num_triangles() < mesh.num_triangles());
        assert_valid(&out);
        assert_same_bounds(&mesh, &out);
    }

    #[test]
    fn test_cube_stays_closed() {
        let mesh = cube();
        let out = remesh(&opts(0.25, 5), &mesh).unwrap();
        assert!(out.num_triangles() > 12);
        assert_valid(&out);
        assert_same_bounds(&mesh, &out);

        let mut edges: HashMap<[usize; 2], usize> = HashMap::new();
        for [a, b, c] in out.triangles() {
            for e in [ord_edge(a, b), ord_edge(b, c), ord_edge(c, a)] {
                *edges.entry(e).or_default() += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2));
        let euler =
            out.num_vertices() as i64 - edges.len() as i64 + out.num_triangles() as i64;
        assert_eq!(euler, 2);
    }

    #[test]
    fn test_features_kept_without_refinement() {
        let mesh = cube();
        let mut cfg = RemeshConfig::assemble(1., 0.25, 45., 3);
        cfg.refine_features = false;
        let out = remesh(&cfg.to_options(), &mesh).unwrap();
        // cube edges have length 1 > max, but are features and may not be split
        let on_edge = out
            .vertices()
            .filter(|p| p.iter().filter(|&&c| c == 0. || c == 1.).count() >= 2)
            .count();
        assert_eq!(on_edge, 8);
    }

    #[test]
    fn test_features_kept_without_coarsening() {
        // cube with its edges already subdivided, scaled well below the target length
        let fine = remesh(&opts(0.25, 3), &cube()).unwrap();
        let small = MeshBuffers::new(fine.coords.iter().map(|c| c * 0.1).collect(), fine.tris);
        let on_edge = |p: &[F; 3]| p.iter().filter(|&&c| c == 0. || c == 0.1).count() >= 2;
        let feature_verts = small.vertices().filter(on_edge).collect::<Vec<_>>();
        assert!(feature_verts.len() > 8);

        let mut cfg = RemeshConfig::assemble(1., 0.5, 45., 3);
        cfg.coarsen_features = false;
        let out = remesh(&cfg.to_options(), &small).unwrap();
        assert_valid(&out);
        for p in &feature_verts {
            assert!(out.vertices().any(|q| q == *p), "{p:?} was removed");
        }
        assert_eq!(out.vertices().filter(on_edge).count(), feature_verts.len());
    }

    #[test]
    fn test_mean_edge_length() {
        let mesh = MeshBuffers::new(vec![0., 0., 0., 3., 0., 0., 0., 4., 0.], vec![0, 1, 2]);
        assert!((mean_edge_length(&mesh) - 4.).abs() < 1e-12);
    }
}
