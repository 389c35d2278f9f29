//! Explicit time marching for the convection / diffusion family.
//!
//! Each step swaps the current and previous buffers, recomputes every
//! interior point from the previous level only, then runs the boundary pass.

use std::mem;

use serde::{Deserialize, Serialize};

use super::boundary::{self, Boundaries1D, Boundaries2D};
use super::params::SimulationParameters;
use super::stencil::{self, Node, Node1};
use crate::error::{ConfigError, Result};
use crate::grid::{Grid1D, Grid2D};
use crate::state::{Field1D, Field2D};

/// Which terms the update formula carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// `u_t + c u_x = 0`
    LinearConvection,
    /// `u_t + u u_x = 0`
    NonlinearConvection,
    /// `u_t = nu u_xx`
    Diffusion,
    /// `u_t + u u_x = nu u_xx`
    Burgers,
}

impl Model {
    pub fn name(&self) -> &'static str {
        match self {
            Model::LinearConvection => "linear convection",
            Model::NonlinearConvection => "non-linear convection",
            Model::Diffusion => "diffusion",
            Model::Burgers => "Burgers",
        }
    }

    pub fn convective(&self) -> bool {
        !matches!(self, Model::Diffusion)
    }

    pub fn diffusive(&self) -> bool {
        matches!(self, Model::Diffusion | Model::Burgers)
    }

    /// Transport speed is the field itself rather than the constant `c`.
    pub fn nonlinear(&self) -> bool {
        matches!(self, Model::NonlinearConvection | Model::Burgers)
    }
}

/// Constants of the update formula.
#[derive(Debug, Clone, Copy)]
struct Coeffs {
    model: Model,
    dx: f64,
    dy: f64,
    dt: f64,
    nu: f64,
    c: f64,
}

impl Coeffs {
    fn new(model: Model, params: &SimulationParameters, dx: f64, dy: f64) -> Self {
        Self { model, dx, dy, dt: params.dt, nu: params.nu, c: params.c }
    }

    /// `u_new = u_old - dt * speed * du/dx + dt * nu * d2u/dx2` at one 1D node.
    #[inline]
    fn advance_1d(&self, un: &[f64], n: Node1) -> f64 {
        let mut u = un[n.i];
        if self.model.convective() {
            let speed = if self.model.nonlinear() { un[n.i] } else { self.c };
            u -= self.dt * speed * stencil::backward(un, n, self.dx);
        }
        if self.model.diffusive() {
            u += self.dt * self.nu * stencil::second(un, n, self.dx);
        }
        u
    }

    /// Transport velocity at a node: the snapshot velocity for non-linear
    /// models, `(c, c)` otherwise.
    #[inline]
    fn speeds(&self, un: &Field2D, vn: Option<&Field2D>, n: Node) -> (f64, f64) {
        match (self.model.nonlinear(), vn) {
            (true, Some(vn)) => (un[(n.i, n.j)], vn[(n.i, n.j)]),
            _ => (self.c, self.c),
        }
    }

    #[inline]
    fn advance_2d(&self, f: &Field2D, n: Node, (a, b): (f64, f64)) -> f64 {
        let mut out = f[(n.i, n.j)];
        if self.model.convective() {
            out -= self.dt * (a * stencil::backward_x(f, n, self.dx) + b * stencil::backward_y(f, n, self.dy));
        }
        if self.model.diffusive() {
            out += self.dt * self.nu * stencil::laplacian(f, n, self.dx, self.dy);
        }
        out
    }
}

/// Time integrator for a 1D field.
#[derive(Debug, Clone)]
pub struct Integrator1D {
    coeffs: Coeffs,
    bc: Boundaries1D,
    u: Field1D,
    un: Field1D,
    steps: usize,
}

impl Integrator1D {
    pub fn new(
        model: Model,
        grid: &Grid1D,
        params: &SimulationParameters,
        bc: Boundaries1D,
        initial: Field1D,
    ) -> Result<Self> {
        params.validate()?;
        if initial.len() != grid.nx() {
            return Err(ConfigError::ShapeMismatch { expected: grid.nx(), actual: initial.len() });
        }
        let speed = if model.nonlinear() { initial.max_abs() } else { params.c };
        let numbers = params.check_stability(speed, &[grid.dx()], model.convective(), model.diffusive())?;
        log::debug!(
            "1D {}: nx={} dx={:.4} dt={:.5} courant={:.3} diffusion={:.3}",
            model.name(),
            grid.nx(),
            grid.dx(),
            params.dt,
            numbers.courant,
            numbers.diffusion
        );
        Ok(Self {
            coeffs: Coeffs::new(model, params, grid.dx(), grid.dx()),
            bc,
            un: initial.clone(),
            u: initial,
            steps: 0,
        })
    }

    /// Advances one time level.
    pub fn step(&mut self) {
        mem::swap(&mut self.u, &mut self.un);
        let coeffs = self.coeffs;
        let un = self.un.as_slice();
        let u = self.u.as_mut_slice();
        let n = un.len();
        for i in 1..(n - 1) {
            u[i] = coeffs.advance_1d(un, Node1::new(i, n));
        }
        boundary::apply_1d(u, un, &self.bc, |node| coeffs.advance_1d(un, node));
        self.steps += 1;
        log::trace!("1D {} step {}", coeffs.model.name(), self.steps);
    }

    pub fn run(&mut self, nt: usize) {
        self.run_with(nt, |_| {});
    }

    /// Runs `nt` steps, calling `observe` after each one.
    pub fn run_with(&mut self, nt: usize, mut observe: impl FnMut(&Self)) {
        for _ in 0..nt {
            self.step();
            observe(self);
        }
    }

    pub fn field(&self) -> &Field1D {
        &self.u
    }

    pub fn into_field(self) -> Field1D {
        self.u
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    pub fn time(&self) -> f64 {
        self.steps as f64 * self.coeffs.dt
    }
}

/// Runs `params.nt` steps of a 1D model and returns the final field.
pub fn march_1d(
    model: Model,
    grid: &Grid1D,
    params: &SimulationParameters,
    bc: Boundaries1D,
    initial: Field1D,
) -> Result<Field1D> {
    let mut integrator = Integrator1D::new(model, grid, params, bc, initial)?;
    integrator.run(params.nt);
    Ok(integrator.into_field())
}

/// Time integrator for a 2D scalar field or a 2D velocity pair `(u, v)`.
#[derive(Debug, Clone)]
pub struct Integrator2D {
    coeffs: Coeffs,
    bc: Boundaries2D,
    u: Field2D,
    un: Field2D,
    /// Second velocity component and its previous level, for vector runs.
    v: Option<(Field2D, Field2D)>,
    steps: usize,
}

impl Integrator2D {
    /// Single field transported at the constant speed `c` and/or diffused.
    pub fn scalar(
        model: Model,
        grid: &Grid2D,
        params: &SimulationParameters,
        bc: Boundaries2D,
        initial: Field2D,
    ) -> Result<Self> {
        if model.nonlinear() {
            return Err(ConfigError::UnsupportedModel { model: model.name(), integrator: "a scalar 2D run" });
        }
        Self::build(model, grid, params, bc, initial, None)
    }

    /// Velocity pair. Non-linear models transport both components with the
    /// snapshot velocity; linear ones with `(c, c)`.
    pub fn vector(
        model: Model,
        grid: &Grid2D,
        params: &SimulationParameters,
        bc: Boundaries2D,
        u0: Field2D,
        v0: Field2D,
    ) -> Result<Self> {
        Self::build(model, grid, params, bc, u0, Some(v0))
    }

    fn build(
        model: Model,
        grid: &Grid2D,
        params: &SimulationParameters,
        bc: Boundaries2D,
        u0: Field2D,
        v0: Option<Field2D>,
    ) -> Result<Self> {
        params.validate()?;
        for f in std::iter::once(&u0).chain(v0.as_ref()) {
            if f.len() != grid.len() || f.nx() != grid.nx() {
                return Err(ConfigError::ShapeMismatch { expected: grid.len(), actual: f.len() });
            }
        }
        let speed = if model.nonlinear() {
            v0.as_ref().map_or(u0.max_abs(), |v| u0.max_abs().max(v.max_abs()))
        } else {
            params.c
        };
        let numbers =
            params.check_stability(speed, &[grid.dx(), grid.dy()], model.convective(), model.diffusive())?;
        log::debug!(
            "2D {} ({}): {}x{} dt={:.5} courant={:.3} diffusion={:.3}",
            model.name(),
            if v0.is_some() { "vector" } else { "scalar" },
            grid.nx(),
            grid.ny(),
            params.dt,
            numbers.courant,
            numbers.diffusion
        );
        Ok(Self {
            coeffs: Coeffs::new(model, params, grid.dx(), grid.dy()),
            bc,
            un: u0.clone(),
            u: u0,
            v: v0.map(|v| (v.clone(), v)),
            steps: 0,
        })
    }

    pub fn step(&mut self) {
        mem::swap(&mut self.u, &mut self.un);
        if let Some((v, vn)) = self.v.as_mut() {
            mem::swap(v, vn);
        }
        let coeffs = self.coeffs;
        let (nx, ny) = (self.u.nx(), self.u.ny());
        let un = &self.un;
        let u = &mut self.u;

        match self.v.as_mut() {
            None => {
                for j in 1..(ny - 1) {
                    for i in 1..(nx - 1) {
                        let n = Node::new(i, j, nx, ny);
                        u[(i, j)] = coeffs.advance_2d(un, n, (coeffs.c, coeffs.c));
                    }
                }
                boundary::apply_2d(u, un, &self.bc, |n| coeffs.advance_2d(un, n, (coeffs.c, coeffs.c)));
            }
            Some((v, vn)) => {
                let vn = &*vn;
                for j in 1..(ny - 1) {
                    for i in 1..(nx - 1) {
                        let n = Node::new(i, j, nx, ny);
                        let ab = coeffs.speeds(un, Some(vn), n);
                        u[(i, j)] = coeffs.advance_2d(un, n, ab);
                        v[(i, j)] = coeffs.advance_2d(vn, n, ab);
                    }
                }
                boundary::apply_2d(u, un, &self.bc, |n| coeffs.advance_2d(un, n, coeffs.speeds(un, Some(vn), n)));
                boundary::apply_2d(v, vn, &self.bc, |n| coeffs.advance_2d(vn, n, coeffs.speeds(un, Some(vn), n)));
            }
        }
        self.steps += 1;
        log::trace!("2D {} step {}", coeffs.model.name(), self.steps);
    }

    pub fn run(&mut self, nt: usize) {
        self.run_with(nt, |_| {});
    }

    pub fn run_with(&mut self, nt: usize, mut observe: impl FnMut(&Self)) {
        for _ in 0..nt {
            self.step();
            observe(self);
        }
    }

    pub fn u(&self) -> &Field2D {
        &self.u
    }

    pub fn v(&self) -> Option<&Field2D> {
        self.v.as_ref().map(|(v, _)| v)
    }

    pub fn into_fields(self) -> (Field2D, Option<Field2D>) {
        (self.u, self.v.map(|(v, _)| v))
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    pub fn time(&self) -> f64 {
        self.steps as f64 * self.coeffs.dt
    }
}

/// Runs `params.nt` steps of a linear 2D model on one field.
pub fn march_scalar_2d(
    model: Model,
    grid: &Grid2D,
    params: &SimulationParameters,
    bc: Boundaries2D,
    initial: Field2D,
) -> Result<Field2D> {
    let mut integrator = Integrator2D::scalar(model, grid, params, bc, initial)?;
    integrator.run(params.nt);
    Ok(integrator.into_fields().0)
}

/// Runs `params.nt` steps of a 2D model on a velocity pair.
pub fn march_vector_2d(
    model: Model,
    grid: &Grid2D,
    params: &SimulationParameters,
    bc: Boundaries2D,
    u0: Field2D,
    v0: Field2D,
) -> Result<(Field2D, Field2D)> {
    let mut integrator = Integrator2D::vector(model, grid, params, bc, u0, v0)?;
    integrator.run(params.nt);
    let (u, v) = integrator.into_fields();
    Ok((u, v.unwrap_or_else(|| Field2D::zeros(grid))))
}
