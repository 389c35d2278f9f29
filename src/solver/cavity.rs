use super::boundary::{Boundaries2D, BoundarySpec};
use super::FlowBoundaries;
use crate::error::Result;

/// Lid-driven cavity: no-slip walls, the north wall slides along x at
/// `lid_velocity`. Pressure has zero normal gradient on the west, east and
/// south walls and is pinned to zero under the lid.
pub fn cavity_boundaries(lid_velocity: f64) -> Result<FlowBoundaries> {
    let wall = BoundarySpec::dirichlet(0.0);
    Ok(FlowBoundaries {
        u: Boundaries2D::new(wall, wall, wall, BoundarySpec::dirichlet(lid_velocity))?,
        v: Boundaries2D::all(wall),
        p: Boundaries2D::new(BoundarySpec::Neumann, BoundarySpec::Neumann, BoundarySpec::Neumann, wall)?,
    })
}
