//! Finite-difference operators evaluated on a previous-level snapshot.
//!
//! Every operator reads neighbours through a node value, so the same code
//! serves interior points and the wrapped index-0 point of a periodic axis.

use crate::state::Field2D;

/// Neighbour indices on one axis of `n` points.
///
/// Periodic axes store the end point twice (`f[0] == f[n-1]`), so the
/// upstream neighbour of index 0 is `n - 2` and the downstream neighbour of
/// index `n - 1` is 1.
#[inline]
fn neighbours(i: usize, n: usize) -> (usize, usize) {
    let im1 = if i == 0 { n.saturating_sub(2) } else { i - 1 };
    let ip1 = if i + 1 == n { 1.min(n - 1) } else { i + 1 };
    (im1, ip1)
}

/// A point on a 1D grid together with its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node1 {
    pub i: usize,
    pub im1: usize,
    pub ip1: usize,
}

impl Node1 {
    pub fn new(i: usize, n: usize) -> Self {
        let (im1, ip1) = neighbours(i, n);
        Self { i, im1, ip1 }
    }
}

/// A point on a 2D grid together with its four neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub i: usize,
    pub j: usize,
    pub im1: usize,
    pub ip1: usize,
    pub jm1: usize,
    pub jp1: usize,
}

impl Node {
    pub fn new(i: usize, j: usize, nx: usize, ny: usize) -> Self {
        let (im1, ip1) = neighbours(i, nx);
        let (jm1, jp1) = neighbours(j, ny);
        Self { i, j, im1, ip1, jm1, jp1 }
    }
}

/// `(f[i] - f[i-1]) / dx`, upwind for positive transport speed.
#[inline]
pub fn backward(f: &[f64], n: Node1, dx: f64) -> f64 {
    (f[n.i] - f[n.im1]) / dx
}

/// `(f[i+1] - f[i-1]) / (2 dx)`.
#[inline]
pub fn central(f: &[f64], n: Node1, dx: f64) -> f64 {
    (f[n.ip1] - f[n.im1]) / (2.0 * dx)
}

/// `(f[i+1] - 2 f[i] + f[i-1]) / dx²`.
#[inline]
pub fn second(f: &[f64], n: Node1, dx: f64) -> f64 {
    (f[n.ip1] - 2.0 * f[n.i] + f[n.im1]) / (dx * dx)
}

#[inline]
pub fn backward_x(f: &Field2D, n: Node, dx: f64) -> f64 {
    (f[(n.i, n.j)] - f[(n.im1, n.j)]) / dx
}

#[inline]
pub fn backward_y(f: &Field2D, n: Node, dy: f64) -> f64 {
    (f[(n.i, n.j)] - f[(n.i, n.jm1)]) / dy
}

#[inline]
pub fn central_x(f: &Field2D, n: Node, dx: f64) -> f64 {
    (f[(n.ip1, n.j)] - f[(n.im1, n.j)]) / (2.0 * dx)
}

#[inline]
pub fn central_y(f: &Field2D, n: Node, dy: f64) -> f64 {
    (f[(n.i, n.jp1)] - f[(n.i, n.jm1)]) / (2.0 * dy)
}

#[inline]
pub fn second_x(f: &Field2D, n: Node, dx: f64) -> f64 {
    (f[(n.ip1, n.j)] - 2.0 * f[(n.i, n.j)] + f[(n.im1, n.j)]) / (dx * dx)
}

#[inline]
pub fn second_y(f: &Field2D, n: Node, dy: f64) -> f64 {
    (f[(n.i, n.jp1)] - 2.0 * f[(n.i, n.j)] + f[(n.i, n.jm1)]) / (dy * dy)
}

/// Five-point Laplacian.
#[inline]
pub fn laplacian(f: &Field2D, n: Node, dx: f64, dy: f64) -> f64 {
    second_x(f, n, dx) + second_y(f, n, dy)
}
