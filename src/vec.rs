use super::F;

use std::array::from_fn;

#[inline]
pub fn cross([x, y, z]: [F; 3], [a, b, c]: [F; 3]) -> [F; 3] {
    [y * c - z * b, z * a - x * c, x * b - y * a]
}

#[inline]
pub fn add<const N: usize>(a: [F; N], b: [F; N]) -> [F; N] {
    from_fn(|i| a[i] + b[i])
}

#[inline]
pub fn sub<const N: usize>(a: [F; N], b: [F; N]) -> [F; N] {
    from_fn(|i| a[i] - b[i])
}

#[inline]
pub fn dot<const N: usize>(a: [F; N], b: [F; N]) -> F {
    (0..N).map(|i| a[i] * b[i]).sum()
}

#[inline]
pub fn kmul<const N: usize>(k: F, xyz: [F; N]) -> [F; N] {
    xyz.map(|v| v * k)
}

/// L-2 norm of a vector
pub fn length<const N: usize>(v: [F; N]) -> F {
    dot(v, v).sqrt()
}

#[inline]
pub fn dist_sq<const N: usize>(a: [F; N], b: [F; N]) -> F {
    let d = sub(a, b);
    dot(d, d)
}

#[inline]
pub fn midpoint<const N: usize>(a: [F; N], b: [F; N]) -> [F; N] {
    kmul(0.5, add(a, b))
}

#[inline]
pub fn normalize<const N: usize>(v: [F; N]) -> [F; N] {
    let sum: F = v.iter().map(|v| v * v).sum();
    if sum < 1e-20 {
        return [0.; N];
    }
    let s = sum.sqrt().recip();
    v.map(|v| v * s)
}

/// Unnormalized normal of a triangle, its length is twice the area.
#[inline]
pub fn tri_normal([a, b, c]: [[F; 3]; 3]) -> [F; 3] {
    cross(sub(b, a), sub(c, a))
}

/// Component-wise [min, max] over a set of points, `None` if empty.
pub fn bounds(mut pts: impl Iterator<Item = [F; 3]>) -> Option<[[F; 3]; 2]> {
    let first = pts.next()?;
    Some(pts.fold([first, first], |[l, h], n| {
        [from_fn(|i| l[i].min(n[i])), from_fn(|i| h[i].max(n[i]))]
    }))
}
