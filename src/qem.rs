use std::collections::HashMap;

use log::{debug, info};
use ordered_float::NotNan;
use priority_queue::PriorityQueue;

use super::{
    F, add, bounds, cross, dot, kmul, length,
    manifold::{CollapsibleManifold, EdgeKind, ord_edge},
    mesh::MeshContext,
    normalize,
    quadric::Quadric,
    sub, tri_normal,
};

/// Each pass raises the accepted collapse cost, bounded to this many passes.
const MAX_PASSES: usize = 100;

/// Minimum cosine between a face normal before and after a collapse.
const MIN_NORMAL_DOT: F = 0.2;

/// Scale of the planes keeping border edges in place.
const BORDER_WEIGHT: F = 1e3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    pub passes: usize,
    pub collapses: usize,
}

type Manifold = CollapsibleManifold<(Quadric, [F; 3])>;

/// In-place quadric edge-collapse decimation of a triangle mesh.
///
/// Collapses edges in order of increasing quadric error until at most
/// `target_count` triangles remain. In pass `k` only collapses cheaper than
/// `1e-9 * (k + 3)^aggressiveness` are accepted, so higher aggressiveness
/// trades quality for reaching the target sooner.
///
/// When no collapse is possible the mesh is left untouched; callers should
/// compare triangle counts to detect that. Unreferenced vertices are removed
/// from the output.
pub fn simplify_mesh(
    ctx: &mut MeshContext,
    target_count: usize,
    aggressiveness: F,
    verbose: bool,
) -> SimplifyStats {
    let mut stats = SimplifyStats::default();
    let MeshContext { v, f } = ctx;
    if f.len() <= target_count {
        return stats;
    }
    let Some([l, h]) = bounds(v.iter().copied()) else {
        return stats;
    };

    // Normalize the geometry of this mesh to lay in the unit box.
    let center = kmul(0.5, add(l, h));
    let [dx, dy, dz] = sub(h, l);
    let extent = dx.max(dy).max(dz);
    let pos_scale = if extent == 0. { 1. } else { 2. / extent };
    let norm_v = v
        .iter()
        .map(|&p| kmul(pos_scale, sub(p, center)))
        .collect::<Vec<_>>();

    let mut faces = f.clone();
    let mut alive = vec![true; faces.len()];
    let mut m: Manifold = CollapsibleManifold::new_with(v.len(), |vi| (Quadric::default(), norm_v[vi]));

    let mut edge_face_adj: HashMap<[usize; 2], EdgeKind> = HashMap::new();
    // faces for each vertex
    let mut face_verts = vec![vec![]; v.len()];
    for (fi, &[a, b, c]) in faces.iter().enumerate() {
        for [e0, e1] in [[a, b], [b, c], [c, a]] {
            m.add_edge(e0, e1);
            edge_face_adj
                .entry(ord_edge(e0, e1))
                .and_modify(|p| {
                    p.insert(fi);
                })
                .or_insert(EdgeKind::Boundary(fi));
        }
        for vi in [a, b, c] {
            face_verts[vi].push(fi);
        }

        let n = tri_normal([a, b, c].map(|vi| norm_v[vi]));
        let area = 0.5 * length(n);
        if area == 0. {
            continue;
        }
        let q = Quadric::new_plane(norm_v[a], normalize(n)) * area;
        for vi in [a, b, c] {
            m.data[vi].0 += q;
        }
    }

    // vertices which may only collapse with other border vertices
    let mut border = vec![false; v.len()];
    for (&[e0, e1], ek) in &edge_face_adj {
        if let EdgeKind::Manifold(_) = ek {
            continue;
        }
        if ek.is_boundary() {
            let fnorm = normalize(tri_normal(faces[ek.as_slice()[0]].map(|vi| norm_v[vi])));
            let dir = sub(norm_v[e1], norm_v[e0]);
            let n = normalize(cross(dir, fnorm));
            if length(n) > 0. {
                let q = Quadric::new_plane(norm_v[e0], n) * (BORDER_WEIGHT * dot(dir, dir));
                m.data[e0].0 += q;
                m.data[e1].0 += q;
            }
        }
        border[e0] = true;
        border[e1] = true;
    }

    let mut pq = PriorityQueue::new();
    let edges = m.ord_edges().collect::<Vec<_>>();
    for [e0, e1] in edges {
        if let Some((prio, _)) = collapse_target(&m, e0, e1) {
            pq.push([e0, e1], prio);
        }
    }

    let mut curr_tris = faces.len();
    for pass in 0..MAX_PASSES {
        if curr_tris <= target_count || pq.is_empty() {
            break;
        }
        stats.passes = pass + 1;
        let threshold = 1e-9 * ((pass + 3) as F).powf(aggressiveness);

        let mut deferred = vec![];
        while let Some(([e0, e1], prio)) = pq.pop() {
            if m.is_deleted(e0) || m.is_deleted(e1) {
                continue;
            }
            if -*prio > threshold {
                // everything left in the queue is at least as expensive
                deferred.push(([e0, e1], prio));
                break;
            }
            let Some((_, pos)) = collapse_target(&m, e0, e1) else {
                continue;
            };
            let safe = can_collapse(&m, &faces, &alive, &face_verts, &border, e0, e1, pos);
            if !safe {
                deferred.push(([e0, e1], prio));
                continue;
            }

            // -- Commit
            let q01 = m.get(e0).0 + m.get(e1).0;
            let dst = m.merge(e0, e1, |_, _| (q01, pos));
            let src = if dst == e0 { e1 } else { e0 };
            border[dst] |= border[src];
            stats.collapses += 1;

            for fi in std::mem::take(&mut face_verts[src]) {
                if !alive[fi] {
                    continue;
                }
                let face = &mut faces[fi];
                if face.contains(&dst) {
                    alive[fi] = false;
                    curr_tris -= 1;
                    continue;
                }
                for vi in face.iter_mut() {
                    if *vi == src {
                        *vi = dst;
                    }
                }
                face_verts[dst].push(fi);
            }
            face_verts[dst].retain(|&fi| alive[fi]);

            let adj = m.vertex_adj(dst).collect::<Vec<_>>();
            for a in adj {
                if let Some((prio, _)) = collapse_target(&m, dst, a) {
                    pq.push(ord_edge(dst, a), prio);
                }
            }

            if curr_tris <= target_count {
                break;
            }
        }
        for (e, prio) in deferred {
            pq.push(e, prio);
        }

        if verbose {
            info!("pass {pass} - triangles {curr_tris} threshold {threshold:.3e}");
        }
    }

    debug!(
        "simplify: {} collapses over {} passes, {} -> {} triangles",
        stats.collapses,
        stats.passes,
        faces.len(),
        curr_tris
    );
    if stats.collapses == 0 {
        return stats;
    }

    // compact and denormalize the output
    let inv_pos_scale = pos_scale.recip();
    let mut remap = vec![usize::MAX; v.len()];
    let mut new_v = vec![];
    let mut new_f = Vec::with_capacity(curr_tris);
    for (fi, face) in faces.iter().enumerate() {
        if !alive[fi] {
            continue;
        }
        new_f.push(face.map(|vi| {
            if remap[vi] == usize::MAX {
                remap[vi] = new_v.len();
                new_v.push(add(kmul(inv_pos_scale, m.get(vi).1), center));
            }
            remap[vi]
        }));
    }
    *v = new_v;
    *f = new_f;
    stats
}

/// Priority (negated cost) and position of collapsing `e0`-`e1`.
fn collapse_target(m: &Manifold, e0: usize, e1: usize) -> Option<(NotNan<F>, [F; 3])> {
    let &(q0, p0) = m.get(e0);
    let &(q1, p1) = m.get(e1);
    let q = q0 + q1;
    let p = q.optimal_point(p0, p1);
    let cost = q.cost(p).max(0.);
    NotNan::new(-cost).ok().map(|prio| (prio, p))
}

/// Whether collapsing `e0`-`e1` to `pos` keeps the surface a valid manifold.
#[allow(clippy::too_many_arguments)]
fn can_collapse(
    m: &Manifold,
    faces: &[[usize; 3]],
    alive: &[bool],
    face_verts: &[Vec<usize>],
    border: &[bool],
    e0: usize,
    e1: usize,
    pos: [F; 3],
) -> bool {
    if border[e0] != border[e1] {
        return false;
    }

    let edge_faces = face_verts[e0]
        .iter()
        .copied()
        .filter(|&fi| alive[fi] && faces[fi].contains(&e1));
    let Some(ek) = EdgeKind::from_iter(edge_faces) else {
        return false;
    };
    // one face on a border, two on a manifold edge
    let expected = ek.as_slice().len();
    if expected > 2 {
        return false;
    }

    // link condition
    let common = m.common_adj(e0, e1);
    if common.len() != expected {
        return false;
    }
    if !border[e0] {
        // don't shrink a closed surface below a tetrahedron
        let valence = m.valence(e0) + m.valence(e1) - 2 - common.len();
        if valence < 3 || common.iter().any(|&c| m.valence(c) <= 3) {
            return false;
        }
    }

    for (vi, other) in [(e0, e1), (e1, e0)] {
        for &fi in &face_verts[vi] {
            if !alive[fi] || faces[fi].contains(&other) {
                continue;
            }
            let face = faces[fi];
            let n_old = normalize(tri_normal(face.map(|u| m.get(u).1)));
            let n_new = normalize(tri_normal(
                face.map(|u| if u == vi { pos } else { m.get(u).1 }),
            ));
            if n_new == [0.; 3] {
                return false;
            }
            if n_old != [0.; 3] && dot(n_old, n_new) < MIN_NORMAL_DOT {
                return false;
            }
        }
    }
    true
}
