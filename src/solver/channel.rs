use super::boundary::{Boundaries2D, BoundarySpec};
use super::FlowBoundaries;
use crate::error::Result;

/// Channel flow: periodic along x, no-slip walls at the south and north,
/// zero-gradient pressure on the walls. The flow is driven by the body force
/// in the parameters.
pub fn channel_boundaries() -> Result<FlowBoundaries> {
    let wall = BoundarySpec::dirichlet(0.0);
    let periodic = BoundarySpec::Periodic;
    let velocity = Boundaries2D::new(periodic, periodic, wall, wall)?;
    Ok(FlowBoundaries {
        u: velocity,
        v: velocity,
        p: Boundaries2D::new(periodic, periodic, BoundarySpec::Neumann, BoundarySpec::Neumann)?,
    })
}
