use super::sym::SymMatrix3;
use super::{F, add, dot, kmul, length, midpoint, sub};

use core::ops::{Add, AddAssign, Mul, MulAssign};

const SOLVE_EPS: F = 1e-12;

/// Squared-distance-to-plane error, `p^T A p + 2 b.p + c`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Quadric {
    pub a: SymMatrix3,
    pub b: [F; 3],
    c: F,
}

impl Quadric {
    pub fn cost(&self, p: [F; 3]) -> F {
        let quadratic = dot(p, self.a.vec_mul(p));
        quadratic + 2. * dot(self.b, p) + self.c
    }
    /// Quadric of the plane through `v` with unit normal `n`.
    pub fn new_plane(v: [F; 3], n: [F; 3]) -> Self {
        let a = SymMatrix3::outer(n);
        let dist = -dot(n, v);
        let b = kmul(dist, n);
        let c = dist * dist;
        Self { a, b, c }
    }

    /// Position minimizing this quadric for a collapse of `p0`-`p1`.
    ///
    /// Uses the exact minimizer if the system is well conditioned and the
    /// result stays near the edge, otherwise the cheapest of the endpoints
    /// and the midpoint.
    pub fn optimal_point(&self, p0: [F; 3], p1: [F; 3]) -> [F; 3] {
        let mid = midpoint(p0, p1);
        let reach = length(sub(p1, p0));
        if let Some(p) = self.a.solve(kmul(-1., self.b), SOLVE_EPS) {
            if p.iter().all(|v| v.is_finite()) && length(sub(p, mid)) <= reach {
                return p;
            }
        }
        [p0, p1, mid]
            .into_iter()
            .map(|p| (self.cost(p), p))
            .fold((F::INFINITY, mid), |best, cur| if cur.0 < best.0 { cur } else { best })
            .1
    }
}

impl Add for Quadric {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self {
            a: self.a + o.a,
            b: add(self.b, o.b),
            c: self.c + o.c,
        }
    }
}

impl Mul<F> for Quadric {
    type Output = Self;
    fn mul(self, o: F) -> Self {
        Self {
            a: self.a * o,
            b: kmul(o, self.b),
            c: o * self.c,
        }
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, o: Self) {
        *self = *self + o;
    }
}

impl MulAssign<F> for Quadric {
    fn mul_assign(&mut self, o: F) {
        *self = *self * o;
    }
}
