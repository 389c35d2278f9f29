mod boundary;
mod cavity;
mod channel;
mod core;
pub mod diagnostics;
mod params;
mod poisson;
pub mod stencil;

// Re-export public API
pub use boundary::{apply_1d, apply_2d, apply_sides, wrap_periodic, Boundaries1D, Boundaries2D, BoundarySpec};
pub use cavity::cavity_boundaries;
pub use channel::channel_boundaries;
pub use self::core::{march_1d, march_scalar_2d, march_vector_2d, Integrator1D, Integrator2D, Model};
pub use params::{SimulationParameters, StabilityNumbers, StabilityPolicy, COURANT_LIMIT, DIFFUSION_LIMIT};
pub use poisson::{build_up_b, pressure_poisson, relax_laplace, LaplaceReport};

use std::mem;

use crate::error::{ConfigError, Result};
use crate::grid::Grid2D;
use crate::state::{Field2D, FlowState};
use stencil::{backward_x, backward_y, central_x, central_y, laplacian, Node};

/// Boundary conditions of a pressure-coupled flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowBoundaries {
    pub u: Boundaries2D,
    pub v: Boundaries2D,
    pub p: Boundaries2D,
}

impl FlowBoundaries {
    /// Largest fixed velocity magnitude on any side.
    fn max_wall_speed(&self) -> f64 {
        [self.u, self.v]
            .iter()
            .flat_map(|bc| bc.sides())
            .map(|(_, spec)| match spec {
                BoundarySpec::Dirichlet { value } => value.abs(),
                _ => 0.0,
            })
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy)]
struct Momentum {
    dx: f64,
    dy: f64,
    dt: f64,
    nu: f64,
    rho: f64,
    force: f64,
}

impl Momentum {
    #[inline]
    fn u(&self, un: &Field2D, vn: &Field2D, p: &Field2D, n: Node) -> f64 {
        let (uu, vv) = (un[(n.i, n.j)], vn[(n.i, n.j)]);
        uu - self.dt * (uu * backward_x(un, n, self.dx) + vv * backward_y(un, n, self.dy))
            - self.dt / self.rho * central_x(p, n, self.dx)
            + self.nu * self.dt * laplacian(un, n, self.dx, self.dy)
            + self.force * self.dt
    }

    #[inline]
    fn v(&self, un: &Field2D, vn: &Field2D, p: &Field2D, n: Node) -> f64 {
        let (uu, vv) = (un[(n.i, n.j)], vn[(n.i, n.j)]);
        vv - self.dt * (uu * backward_x(vn, n, self.dx) + vv * backward_y(vn, n, self.dy))
            - self.dt / self.rho * central_y(p, n, self.dy)
            + self.nu * self.dt * laplacian(vn, n, self.dx, self.dy)
    }
}

/// One Navier-Stokes step: snapshot the velocity, build the pressure source
/// from it, relax the pressure for `nit` sweeps starting from the previous
/// pressure, update the momentum equations and apply the velocity boundaries.
pub fn flow_step(state: &mut FlowState, grid: &Grid2D, params: &SimulationParameters, bc: &FlowBoundaries) {
    let FlowState { u, v, p, un, vn, pn, b } = state;
    mem::swap(u, un);
    mem::swap(v, vn);
    let (un, vn) = (&*un, &*vn);

    build_up_b(b, un, vn, grid, params.rho, params.dt, &bc.p);
    pressure_poisson(p, pn, b, grid, params.nit, &bc.p);
    let p = &*p;

    let m = Momentum {
        dx: grid.dx(),
        dy: grid.dy(),
        dt: params.dt,
        nu: params.nu,
        rho: params.rho,
        force: params.force,
    };
    let (nx, ny) = (grid.nx(), grid.ny());
    for j in 1..(ny - 1) {
        for i in 1..(nx - 1) {
            let n = Node::new(i, j, nx, ny);
            u[(i, j)] = m.u(un, vn, p, n);
            v[(i, j)] = m.v(un, vn, p, n);
        }
    }
    apply_2d(u, un, &bc.u, |n| m.u(un, vn, p, n));
    apply_2d(v, vn, &bc.v, |n| m.v(un, vn, p, n));
}

/// Validated Navier-Stokes time integrator.
#[derive(Debug, Clone)]
pub struct FlowSolver {
    grid: Grid2D,
    params: SimulationParameters,
    bc: FlowBoundaries,
    steps: usize,
}

impl FlowSolver {
    pub fn new(grid: &Grid2D, params: &SimulationParameters, bc: FlowBoundaries, state: &FlowState) -> Result<Self> {
        params.validate_flow()?;
        for f in [&state.u, &state.v, &state.p] {
            if f.nx() != grid.nx() || f.len() != grid.len() {
                return Err(ConfigError::ShapeMismatch { expected: grid.len(), actual: f.len() });
            }
        }
        let speed = state.u.max_abs().max(state.v.max_abs()).max(bc.max_wall_speed());
        let numbers = params.check_stability(speed, &[grid.dx(), grid.dy()], true, true)?;
        log::debug!(
            "flow: {}x{} dt={} nu={} rho={} nit={} force={} courant={:.3} diffusion={:.3}",
            grid.nx(),
            grid.ny(),
            params.dt,
            params.nu,
            params.rho,
            params.nit,
            params.force,
            numbers.courant,
            numbers.diffusion
        );
        Ok(Self { grid: grid.clone(), params: params.clone(), bc, steps: 0 })
    }

    pub fn step(&mut self, state: &mut FlowState) {
        flow_step(state, &self.grid, &self.params, &self.bc);
        self.steps += 1;
        log::trace!("flow step {}", self.steps);
    }

    pub fn run(&mut self, state: &mut FlowState, nt: usize) {
        self.run_with(state, nt, |_, _| {});
    }

    /// Runs `nt` steps, calling `observe(state, step)` after each one.
    pub fn run_with(&mut self, state: &mut FlowState, nt: usize, mut observe: impl FnMut(&FlowState, usize)) {
        for _ in 0..nt {
            self.step(state);
            observe(state, self.steps);
        }
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    pub fn time(&self) -> f64 {
        self.steps as f64 * self.params.dt
    }

    /// Relative change of `u` over the last step.
    pub fn last_change(&self, state: &FlowState) -> f64 {
        diagnostics::relative_change(&state.u, &state.un)
    }
}
