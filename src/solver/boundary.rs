use serde::{Deserialize, Serialize};

use super::stencil::{Node, Node1};
use crate::error::{ConfigError, Result};
use crate::state::Field2D;

/// Condition on one end of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundarySpec {
    /// The axis wraps; both ends carry the same value.
    Periodic,
    /// Fixed value, written every step.
    Dirichlet { value: f64 },
    /// Zero normal gradient: copy of the adjacent interior value.
    Neumann,
    /// Keeps whatever the initial field stored on this edge.
    Frozen,
}

impl BoundarySpec {
    pub fn dirichlet(value: f64) -> Self {
        BoundarySpec::Dirichlet { value }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, BoundarySpec::Periodic)
    }
}

fn pair(axis: &'static str, lo: BoundarySpec, hi: BoundarySpec) -> Result<()> {
    if lo.is_periodic() != hi.is_periodic() {
        return Err(ConfigError::UnpairedPeriodic { axis });
    }
    Ok(())
}

fn require(side: &'static str, spec: Option<BoundarySpec>) -> Result<BoundarySpec> {
    spec.ok_or(ConfigError::MissingBoundary { side })
}

/// Value of a non-periodic edge point.
/// `inner` is the adjacent point of the new level, `old` the same point one
/// level back.
#[inline]
fn edge_value(spec: BoundarySpec, inner: f64, old: f64) -> f64 {
    match spec {
        BoundarySpec::Dirichlet { value } => value,
        BoundarySpec::Neumann => inner,
        // Paired periodic ends are filled before the sides are visited.
        BoundarySpec::Frozen | BoundarySpec::Periodic => old,
    }
}

/// Conditions on both ends of a 1D domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundaries1D {
    left: BoundarySpec,
    right: BoundarySpec,
}

impl Boundaries1D {
    pub fn new(left: BoundarySpec, right: BoundarySpec) -> Result<Self> {
        pair("x", left, right)?;
        Ok(Self { left, right })
    }

    /// Builds from optionally-specified ends, failing on a missing one.
    pub fn from_sides(left: Option<BoundarySpec>, right: Option<BoundarySpec>) -> Result<Self> {
        Self::new(require("left", left)?, require("right", right)?)
    }

    pub fn periodic() -> Self {
        Self { left: BoundarySpec::Periodic, right: BoundarySpec::Periodic }
    }

    pub fn dirichlet(left: f64, right: f64) -> Self {
        Self { left: BoundarySpec::dirichlet(left), right: BoundarySpec::dirichlet(right) }
    }

    pub fn left(&self) -> BoundarySpec {
        self.left
    }

    pub fn right(&self) -> BoundarySpec {
        self.right
    }

    pub fn is_periodic(&self) -> bool {
        self.left.is_periodic()
    }
}

/// Conditions on the four sides of a 2D domain.
/// West/east bound x, south/north bound y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundaries2D {
    west: BoundarySpec,
    east: BoundarySpec,
    south: BoundarySpec,
    north: BoundarySpec,
}

impl Boundaries2D {
    pub fn new(west: BoundarySpec, east: BoundarySpec, south: BoundarySpec, north: BoundarySpec) -> Result<Self> {
        pair("x", west, east)?;
        pair("y", south, north)?;
        Ok(Self { west, east, south, north })
    }

    pub fn from_sides(
        west: Option<BoundarySpec>,
        east: Option<BoundarySpec>,
        south: Option<BoundarySpec>,
        north: Option<BoundarySpec>,
    ) -> Result<Self> {
        Self::new(
            require("west", west)?,
            require("east", east)?,
            require("south", south)?,
            require("north", north)?,
        )
    }

    /// Same condition on every side.
    pub fn all(spec: BoundarySpec) -> Self {
        Self { west: spec, east: spec, south: spec, north: spec }
    }

    pub fn west(&self) -> BoundarySpec {
        self.west
    }

    pub fn east(&self) -> BoundarySpec {
        self.east
    }

    pub fn south(&self) -> BoundarySpec {
        self.south
    }

    pub fn north(&self) -> BoundarySpec {
        self.north
    }

    pub fn periodic_x(&self) -> bool {
        self.west.is_periodic()
    }

    pub fn periodic_y(&self) -> bool {
        self.south.is_periodic()
    }

    /// Named sides, in application order.
    pub fn sides(&self) -> [(&'static str, BoundarySpec); 4] {
        [("west", self.west), ("east", self.east), ("south", self.south), ("north", self.north)]
    }
}

/// Boundary pass for a 1D field after the interior sweep.
///
/// Periodic: index 0 is recomputed by `point` with its upstream neighbour
/// wrapped to `n - 2`, and index `n - 1` copies it.
pub fn apply_1d(next: &mut [f64], prev: &[f64], bc: &Boundaries1D, point: impl Fn(Node1) -> f64) {
    let n = next.len();
    if bc.is_periodic() {
        next[0] = point(Node1::new(0, n));
        next[n - 1] = next[0];
        return;
    }
    next[0] = edge_value(bc.left, next[1], prev[0]);
    next[n - 1] = edge_value(bc.right, next[n - 2], prev[n - 1]);
}

/// Fills index 0 of every periodic axis with `point` and copies it onto the
/// duplicated end. Non-periodic sides are left untouched.
pub fn wrap_periodic(next: &mut Field2D, bc: &Boundaries2D, mut point: impl FnMut(Node) -> f64) {
    let (nx, ny) = (next.nx(), next.ny());
    let (px, py) = (bc.periodic_x(), bc.periodic_y());
    if px {
        let j_lo = if py { 0 } else { 1 };
        for j in j_lo..(ny - 1) {
            next[(0, j)] = point(Node::new(0, j, nx, ny));
        }
    }
    if py {
        for i in 1..(nx - 1) {
            next[(i, 0)] = point(Node::new(i, 0, nx, ny));
        }
    }
    // Column copy excludes the last row so the row copy below can close the
    // far corner from an already-filled value.
    if px {
        for j in 0..(ny - 1) {
            next[(nx - 1, j)] = next[(0, j)];
        }
    }
    if py {
        for i in 0..nx {
            next[(i, ny - 1)] = next[(i, 0)];
        }
    }
}

/// Writes the non-periodic sides: west and east first, then south and north,
/// so the y-sides own the corners.
pub fn apply_sides(next: &mut Field2D, prev: &Field2D, bc: &Boundaries2D) {
    let (nx, ny) = (next.nx(), next.ny());
    if !bc.periodic_x() {
        for j in 0..ny {
            next[(0, j)] = edge_value(bc.west, next[(1, j)], prev[(0, j)]);
            next[(nx - 1, j)] = edge_value(bc.east, next[(nx - 2, j)], prev[(nx - 1, j)]);
        }
    }
    if !bc.periodic_y() {
        for i in 0..nx {
            next[(i, 0)] = edge_value(bc.south, next[(i, 1)], prev[(i, 0)]);
            next[(i, ny - 1)] = edge_value(bc.north, next[(i, ny - 2)], prev[(i, ny - 1)]);
        }
    }
}

/// Full boundary pass for a 2D field after the interior sweep.
pub fn apply_2d(next: &mut Field2D, prev: &Field2D, bc: &Boundaries2D, point: impl FnMut(Node) -> f64) {
    wrap_periodic(next, bc, point);
    apply_sides(next, prev, bc);
}
