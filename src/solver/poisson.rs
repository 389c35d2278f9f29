//! Jacobi relaxation for `∇²p = b` and the Navier-Stokes source term.

use std::mem;

use super::boundary::{self, Boundaries2D};
use super::stencil::{central_x, central_y, Node};
use crate::grid::Grid2D;
use crate::state::Field2D;

/// Source term of the pressure equation, built from the velocity snapshot:
/// `rho * (div/dt - (u_x)² - 2 u_y v_x - (v_y)²)` with central differences.
///
/// Interior points are always written; the wrapped column/row is written
/// when `bc` is periodic on that axis. Other edges are left as they are.
pub fn build_up_b(
    b: &mut Field2D,
    u: &Field2D,
    v: &Field2D,
    grid: &Grid2D,
    rho: f64,
    dt: f64,
    bc: &Boundaries2D,
) {
    let (nx, ny) = (grid.nx(), grid.ny());
    let (dx, dy) = (grid.dx(), grid.dy());
    let source = |n: Node| {
        let dudx = central_x(u, n, dx);
        let dudy = central_y(u, n, dy);
        let dvdx = central_x(v, n, dx);
        let dvdy = central_y(v, n, dy);
        rho * ((dudx + dvdy) / dt - dudx * dudx - 2.0 * dudy * dvdx - dvdy * dvdy)
    };
    for j in 1..(ny - 1) {
        for i in 1..(nx - 1) {
            b[(i, j)] = source(Node::new(i, j, nx, ny));
        }
    }
    boundary::wrap_periodic(b, bc, source);
}

/// One Jacobi update at `n`, reading only the previous sweep `pn`.
#[inline]
fn jacobi(pn: &Field2D, n: Node, source: f64, dx2: f64, dy2: f64) -> f64 {
    ((pn[(n.ip1, n.j)] + pn[(n.im1, n.j)]) * dy2 + (pn[(n.i, n.jp1)] + pn[(n.i, n.jm1)]) * dx2
        - source * dx2 * dy2)
        / (2.0 * (dx2 + dy2))
}

/// One full sweep from `pn` into `p`, boundaries included.
fn sweep(p: &mut Field2D, pn: &Field2D, b: Option<&Field2D>, grid: &Grid2D, bc: &Boundaries2D) {
    let (nx, ny) = (grid.nx(), grid.ny());
    let dx2 = grid.dx() * grid.dx();
    let dy2 = grid.dy() * grid.dy();
    let src = |n: Node| b.map_or(0.0, |b| b[(n.i, n.j)]);
    for j in 1..(ny - 1) {
        for i in 1..(nx - 1) {
            let n = Node::new(i, j, nx, ny);
            p[(i, j)] = jacobi(pn, n, src(n), dx2, dy2);
        }
    }
    boundary::apply_2d(p, pn, bc, |n| jacobi(pn, n, src(n), dx2, dy2));
}

/// Runs exactly `nit` Jacobi sweeps on `∇²p = b`, starting from the values
/// already in `p`. There is no convergence test: an iteration budget that is
/// too small returns an under-converged field without complaint.
///
/// `scratch` holds the previous sweep; its contents on entry do not matter.
pub fn pressure_poisson(
    p: &mut Field2D,
    scratch: &mut Field2D,
    b: &Field2D,
    grid: &Grid2D,
    nit: usize,
    bc: &Boundaries2D,
) {
    debug_assert!(p.same_shape(b) && p.same_shape(scratch));
    for _ in 0..nit {
        mem::swap(p, scratch);
        sweep(p, scratch, Some(b), grid, bc);
    }
}

/// Outcome of [`relax_laplace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplaceReport {
    pub sweeps: usize,
    /// Relative L1 change of the last sweep.
    pub l1norm: f64,
    pub converged: bool,
}

/// `|Σ|p| - Σ|pn|| / Σ|pn|`. An all-zero previous sweep counts as converged
/// only when nothing changed.
fn l1_change(p: &Field2D, pn: &Field2D) -> f64 {
    let (mut diff, mut total) = (0.0, 0.0);
    for (a, b) in p.as_slice().iter().zip(pn.as_slice()) {
        diff += a.abs() - b.abs();
        total += b.abs();
    }
    if total == 0.0 {
        return if diff == 0.0 { 0.0 } else { f64::INFINITY };
    }
    diff.abs() / total
}

/// Relaxes `∇²p = 0` until the relative L1 change of a sweep drops below
/// `target`, or `max_sweeps` sweeps have run.
pub fn relax_laplace(
    p: &mut Field2D,
    scratch: &mut Field2D,
    grid: &Grid2D,
    bc: &Boundaries2D,
    target: f64,
    max_sweeps: usize,
) -> LaplaceReport {
    let mut report = LaplaceReport { sweeps: 0, l1norm: f64::INFINITY, converged: false };
    while report.sweeps < max_sweeps {
        mem::swap(p, scratch);
        sweep(p, scratch, None, grid, bc);
        report.sweeps += 1;
        report.l1norm = l1_change(p, scratch);
        if report.l1norm < target {
            report.converged = true;
            break;
        }
    }
    if report.converged {
        log::debug!("Laplace relaxation converged after {} sweeps (l1={:.2e})", report.sweeps, report.l1norm);
    } else {
        log::warn!(
            "Laplace relaxation stopped after {} sweeps with l1={:.2e} > {:.2e}",
            report.sweeps,
            report.l1norm,
            target
        );
    }
    report
}
