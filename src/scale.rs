use super::{F, bounds, sub};

/// Axis-aligned bounds of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [F; 3],
    pub max: [F; 3],
}

impl BoundingBox {
    /// Bounds of flat `x y z` coordinates, `None` if there are no vertices.
    pub fn from_coords(coords: &[F]) -> Option<Self> {
        let [min, max] = bounds(coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]]))?;
        Some(Self { min, max })
    }

    /// Longest side of the box, the unit relative lengths are measured in.
    pub fn longest_extent(&self) -> F {
        let [dx, dy, dz] = sub(self.max, self.min);
        dx.max(dy).max(dz)
    }
}

/// Converts a length given as a fraction of `extent` to an absolute length.
#[inline]
pub fn absolute_edge_length(relative: F, extent: F) -> F {
    relative * extent
}
