//! Minimal OBJ reader/writer: positions (`v`) and triangles (`f`) only.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use super::F;
use super::error::ObjError;
use super::mesh::MeshBuffers;

/// Loads an OBJ file into flat buffers, rejecting any non-triangular face.
///
/// Records other than `v` and `f` are skipped. Indices are converted to
/// 0-based and must reference three distinct, existing vertices.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshBuffers, ObjError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ObjError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut coords: Vec<F> = vec![];
    let mut tris: Vec<i64> = vec![];
    for (ln, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ObjError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ln = ln + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut xyz = [0.; 3];
                for c in xyz.iter_mut() {
                    *c = tokens
                        .next()
                        .and_then(|t| t.parse::<F>().ok())
                        .ok_or_else(|| ObjError::MalformedVertex {
                            path: path.to_path_buf(),
                            line: ln,
                        })?;
                }
                coords.extend(xyz);
            }
            Some("f") => {
                let corners = line.split_whitespace().skip(1).collect::<Vec<_>>();
                if corners.len() != 3 {
                    return Err(ObjError::NotTriangulated {
                        path: path.to_path_buf(),
                        line: ln,
                        corners: corners.len(),
                    });
                }
                for c in corners {
                    // v/vt/vn, only the position index is kept
                    let c = c.replace('/', " ");
                    let idx = c
                        .split_whitespace()
                        .next()
                        .and_then(|t| t.parse::<i64>().ok())
                        .ok_or_else(|| ObjError::MalformedIndex {
                            path: path.to_path_buf(),
                            line: ln,
                            token: c.trim().to_string(),
                        })?;
                    tris.push(idx - 1);
                }
            }
            _ => {}
        }
    }

    let num_verts = coords.len() / 3;
    let mut out_tris = Vec::with_capacity(tris.len());
    for &i in &tris {
        if i < 0 || i as usize >= num_verts {
            return Err(ObjError::IndexOutOfRange {
                path: path.to_path_buf(),
                index: i + 1,
                vertices: num_verts,
            });
        }
        out_tris.push(i as usize);
    }
    for (fi, t) in out_tris.chunks_exact(3).enumerate() {
        if t[0] == t[1] || t[1] == t[2] || t[2] == t[0] {
            return Err(ObjError::DegenerateFace {
                path: path.to_path_buf(),
                face: fi,
            });
        }
    }

    debug!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        num_verts,
        out_tris.len() / 3
    );
    Ok(MeshBuffers::new(coords, out_tris))
}

/// Writes `v` records followed by 1-based `f` records.
pub fn save_obj(path: impl AsRef<Path>, mesh: &MeshBuffers) -> Result<(), ObjError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ObjError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source| ObjError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut w = BufWriter::new(file);
    for [x, y, z] in mesh.vertices() {
        writeln!(w, "v {x} {y} {z}").map_err(write_err)?;
    }
    for [i, j, k] in mesh.triangles() {
        writeln!(w, "f {} {} {}", i + 1, j + 1, k + 1).map_err(write_err)?;
    }
    w.flush().map_err(write_err)?;

    debug!(
        "Saved {}: {} vertices, {} triangles",
        path.display(),
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    Ok(())
}
