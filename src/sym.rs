use std::array::from_fn;
use std::ops::{Add, Mul};

use super::F;

/// Upper triangle of a symmetric 3x3 matrix: `[xx, xy, xz, yy, yz, zz]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymMatrix3 {
    pub(crate) data: [F; 6],
}

impl SymMatrix3 {
    #[inline]
    pub fn new(data: [F; 6]) -> Self {
        Self { data }
    }
    pub fn zero() -> Self {
        Self { data: [0.; 6] }
    }

    #[inline]
    pub fn outer([x, y, z]: [F; 3]) -> Self {
        Self::new([x * x, x * y, x * z, y * y, y * z, z * z])
    }
    #[rustfmt::skip]
    pub const SYM_IDX: [[usize;3];3] = [
      [0,1,2],
      [1,3,4],
      [2,4,5],
    ];

    #[inline]
    pub fn v(&self, x: usize, y: usize) -> F {
        self.data[Self::SYM_IDX[x][y]]
    }

    pub fn vec_mul(&self, v: [F; 3]) -> [F; 3] {
        from_fn(|i| (0..3).map(|j| self.v(j, i) * v[j]).sum())
    }

    pub fn det(&self) -> F {
        let [xx, xy, xz, yy, yz, zz] = self.data;
        xx * (yy * zz - yz * yz) - xy * (xy * zz - yz * xz) + xz * (xy * yz - yy * xz)
    }

    /// Solves `self * x = rhs` by Cramer's rule.
    /// Returns `None` when the matrix is (nearly) singular.
    pub fn solve(&self, [r0, r1, r2]: [F; 3], eps: F) -> Option<[F; 3]> {
        let det = self.det();
        if det.abs() < eps {
            return None;
        }
        let [xx, xy, xz, yy, yz, zz] = self.data;
        let det3 = |[a, b, c]: [[F; 3]; 3]| {
            a[0] * (b[1] * c[2] - b[2] * c[1]) - b[0] * (a[1] * c[2] - a[2] * c[1])
                + c[0] * (a[1] * b[2] - a[2] * b[1])
        };
        // columns of the matrix, one replaced by the rhs
        let c0 = [xx, xy, xz];
        let c1 = [xy, yy, yz];
        let c2 = [xz, yz, zz];
        let r = [r0, r1, r2];
        let inv = det.recip();
        Some([
            det3([r, c1, c2]) * inv,
            det3([c0, r, c2]) * inv,
            det3([c0, c1, r]) * inv,
        ])
    }
}

impl Add for SymMatrix3 {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(from_fn(|i| self.data[i] + o.data[i]))
    }
}

impl Mul<F> for SymMatrix3 {
    type Output = Self;
    fn mul(self, o: F) -> Self {
        Self::new(from_fn(|i| self.data[i] * o))
    }
}
