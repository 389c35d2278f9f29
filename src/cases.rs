//! Canonical set-ups: the convection / diffusion ladder from linear
//! convection up to Burgers' equation, the two elliptic problems and the two
//! Navier-Stokes flows.

use std::f64::consts::PI;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::BoundaryConfig;
use crate::error::Result;
use crate::grid::{Grid1D, Grid2D};
use crate::solver::diagnostics::{compute_kinetic_energy, mean_abs_divergence};
use crate::solver::{
    cavity_boundaries, channel_boundaries, pressure_poisson, relax_laplace, Boundaries1D, Boundaries2D,
    BoundarySpec, FlowBoundaries, FlowSolver, Integrator1D, Integrator2D, LaplaceReport, Model,
    SimulationParameters,
};
use crate::state::{Field1D, Field2D, FlowState};
use crate::validate::{validate_1d, ValidationReport};

/// Tolerance on coordinates when marking the square pulse.
const COORD_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Case {
    #[serde(rename = "linear_convection_1d")]
    #[value(name = "linear_convection_1d")]
    LinearConvection1D,
    #[serde(rename = "nonlinear_convection_1d")]
    #[value(name = "nonlinear_convection_1d")]
    NonlinearConvection1D,
    #[serde(rename = "diffusion_1d")]
    #[value(name = "diffusion_1d")]
    Diffusion1D,
    #[serde(rename = "burgers_1d")]
    #[value(name = "burgers_1d")]
    Burgers1D,
    #[serde(rename = "linear_convection_2d")]
    #[value(name = "linear_convection_2d")]
    LinearConvection2D,
    #[serde(rename = "nonlinear_convection_2d")]
    #[value(name = "nonlinear_convection_2d")]
    NonlinearConvection2D,
    #[serde(rename = "diffusion_2d")]
    #[value(name = "diffusion_2d")]
    Diffusion2D,
    #[serde(rename = "burgers_2d")]
    #[value(name = "burgers_2d")]
    Burgers2D,
    #[serde(rename = "laplace_2d")]
    #[value(name = "laplace_2d")]
    Laplace2D,
    #[serde(rename = "poisson_2d")]
    #[value(name = "poisson_2d")]
    Poisson2D,
    #[default]
    #[serde(rename = "cavity")]
    #[value(name = "cavity")]
    Cavity,
    #[serde(rename = "channel")]
    #[value(name = "channel")]
    Channel,
}

/// How a case derives `dt` from the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeStep {
    Fixed(f64),
    /// `dt = sigma * dx`
    Convective(f64),
    /// `dt = sigma * dx * dy / nu` (`dy = dx` in 1D)
    Diffusive(f64),
    /// `dt = nu * dx`
    Viscous,
}

impl TimeStep {
    pub fn resolve(self, spacings: &[f64], nu: f64) -> f64 {
        let dx = spacings.first().copied().unwrap_or(f64::NAN);
        let dy = spacings.get(1).copied().unwrap_or(dx);
        match self {
            TimeStep::Fixed(dt) => dt,
            TimeStep::Convective(sigma) => sigma * dx,
            TimeStep::Diffusive(sigma) => sigma * dx * dy / nu,
            TimeStep::Viscous => nu * dx,
        }
    }
}

/// Everything a case needs to run. `ny` and `ly` are unused by 1D cases.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub nx: usize,
    pub ny: usize,
    pub lx: f64,
    pub ly: f64,
    pub time_step: TimeStep,
    /// `dt` is overwritten from `time_step` at run time.
    pub params: SimulationParameters,
    pub lid_velocity: f64,
    /// Relative L1 change at which the Laplace relaxation stops.
    pub l1_target: f64,
}

impl Setup {
    pub fn grid_1d(&self) -> Result<Grid1D> {
        Grid1D::new(self.lx, self.nx)
    }

    pub fn grid_2d(&self) -> Result<Grid2D> {
        Grid2D::new(self.lx, self.ly, self.nx, self.ny)
    }

    pub fn parameters(&self, spacings: &[f64]) -> SimulationParameters {
        SimulationParameters { dt: self.time_step.resolve(spacings, self.params.nu), ..self.params.clone() }
    }
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub enum Outcome {
    Line { grid: Grid1D, field: Field1D, time: f64 },
    Scalar { grid: Grid2D, field: Field2D, time: f64 },
    Velocity { grid: Grid2D, u: Field2D, v: Field2D, time: f64 },
    Pressure { grid: Grid2D, p: Field2D, report: Option<LaplaceReport> },
    Flow { grid: Grid2D, state: FlowState, time: f64, change: f64 },
}

impl Outcome {
    /// Simulated time; zero for the elliptic problems.
    pub fn time(&self) -> f64 {
        match self {
            Outcome::Line { time, .. }
            | Outcome::Scalar { time, .. }
            | Outcome::Velocity { time, .. }
            | Outcome::Flow { time, .. } => *time,
            Outcome::Pressure { .. } => 0.0,
        }
    }

    /// True when every stored value is finite.
    pub fn is_finite(&self) -> bool {
        let finite = |s: &[f64]| s.iter().all(|v| v.is_finite());
        match self {
            Outcome::Line { field, .. } => finite(field.as_slice()),
            Outcome::Scalar { field, .. } => finite(field.as_slice()),
            Outcome::Velocity { u, v, .. } => finite(u.as_slice()) && finite(v.as_slice()),
            Outcome::Pressure { p, .. } => finite(p.as_slice()),
            Outcome::Flow { state, .. } => {
                finite(state.u.as_slice()) && finite(state.v.as_slice()) && finite(state.p.as_slice())
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Line { grid, field, time } => write!(
                f,
                "t={:.4}: max|u|={:.4} peak at x={:.4}",
                time,
                field.max_abs(),
                grid.x(field.argmax())
            ),
            Outcome::Scalar { field, time, .. } => {
                write!(f, "t={:.4}: max|u|={:.4} sum={:.4}", time, field.max_abs(), field.sum())
            }
            Outcome::Velocity { u, v, time, .. } => write!(
                f,
                "t={:.4}: max|u|={:.4} max|v|={:.4} KE={:.4e}",
                time,
                u.max_abs(),
                v.max_abs(),
                compute_kinetic_energy(u, v)
            ),
            Outcome::Pressure { p, report, .. } => {
                write!(f, "max|p|={:.4}", p.max_abs())?;
                if let Some(r) = report {
                    write!(f, " after {} sweeps (l1={:.2e}, converged={})", r.sweeps, r.l1norm, r.converged)?;
                }
                Ok(())
            }
            Outcome::Flow { grid, state, time, change } => write!(
                f,
                "t={:.4}: KE={:.4e} mean|div|={:.3e} max|p|={:.4} change={:.2e}",
                time,
                compute_kinetic_energy(&state.u, &state.v),
                mean_abs_divergence(&state.u, &state.v, grid),
                state.p.max_abs(),
                change
            ),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default();
        f.write_str(&name)
    }
}

/// Closed-form saw-tooth solution of 1D Burgers' equation on `[0, 2π]`,
/// `u = -2 nu phi_x / phi + 4`.
pub fn burgers_profile(t: f64, x: f64, nu: f64) -> f64 {
    let a = x - 4.0 * t;
    let b = x - 4.0 * t - 2.0 * PI;
    let denom = 4.0 * nu * (t + 1.0);
    let (ea, eb) = ((-a * a / denom).exp(), (-b * b / denom).exp());
    let phi = ea + eb;
    let dphi = -2.0 * a / denom * ea - 2.0 * b / denom * eb;
    -2.0 * nu * dphi / phi + 4.0
}

/// 2 inside `[lo, hi]`, 1 elsewhere.
fn pulse(x: f64, lo: f64, hi: f64) -> f64 {
    if x >= lo - COORD_EPS && x <= hi + COORD_EPS {
        2.0
    } else {
        1.0
    }
}

fn pulse_2d(x: f64, y: f64) -> f64 {
    if pulse(x, 0.5, 1.0) > 1.0 && pulse(y, 0.5, 1.0) > 1.0 {
        2.0
    } else {
        1.0
    }
}

fn sides_1d(sides: Option<&BoundaryConfig>, default: Boundaries1D) -> Result<Boundaries1D> {
    sides.map_or(Ok(default), BoundaryConfig::to_1d)
}

fn sides_2d(sides: Option<&BoundaryConfig>, default: Boundaries2D) -> Result<Boundaries2D> {
    sides.map_or(Ok(default), BoundaryConfig::to_2d)
}

impl Case {
    pub fn is_1d(self) -> bool {
        matches!(self, Case::LinearConvection1D | Case::NonlinearConvection1D | Case::Diffusion1D | Case::Burgers1D)
    }

    pub fn is_flow(self) -> bool {
        matches!(self, Case::Cavity | Case::Channel)
    }

    /// The classic parameters of each case.
    pub fn setup(self) -> Setup {
        let base = Setup {
            nx: 41,
            ny: 41,
            lx: 2.0,
            ly: 2.0,
            time_step: TimeStep::Fixed(0.025),
            params: SimulationParameters { c: 1.0, ..SimulationParameters::default() },
            lid_velocity: 1.0,
            l1_target: 1e-4,
        };
        let with = |nt: usize, nu: f64| SimulationParameters { nt, nu, ..base.params.clone() };
        match self {
            Case::LinearConvection1D => Setup { ny: 1, params: with(25, 0.0), ..base },
            Case::NonlinearConvection1D => Setup { ny: 1, params: with(20, 0.0), ..base },
            Case::Diffusion1D => Setup { ny: 1, time_step: TimeStep::Diffusive(0.2), params: with(20, 0.3), ..base },
            Case::Burgers1D => Setup {
                nx: 101,
                ny: 1,
                lx: 2.0 * PI,
                time_step: TimeStep::Viscous,
                params: with(100, 0.07),
                ..base
            },
            Case::LinearConvection2D => {
                Setup { nx: 81, ny: 81, time_step: TimeStep::Convective(0.2), params: with(100, 0.0), ..base }
            }
            Case::NonlinearConvection2D => {
                Setup { nx: 101, ny: 101, time_step: TimeStep::Convective(0.2), params: with(80, 0.0), ..base }
            }
            Case::Diffusion2D => {
                Setup { nx: 31, ny: 31, time_step: TimeStep::Diffusive(0.25), params: with(50, 0.05), ..base }
            }
            Case::Burgers2D => Setup { time_step: TimeStep::Diffusive(0.0009), params: with(120, 0.01), ..base },
            Case::Laplace2D => Setup {
                nx: 31,
                ny: 31,
                ly: 1.0,
                params: SimulationParameters { nt: 0, nit: 100_000, ..base.params.clone() },
                ..base
            },
            Case::Poisson2D => Setup {
                nx: 50,
                ny: 50,
                ly: 1.0,
                params: SimulationParameters { nt: 0, nit: 100, ..base.params.clone() },
                ..base
            },
            Case::Cavity => Setup { time_step: TimeStep::Fixed(0.001), params: SimulationParameters::cavity(), ..base },
            Case::Channel => Setup { time_step: TimeStep::Fixed(0.01), params: SimulationParameters::channel(), ..base },
        }
    }

    /// Runs the case. `sides`, when given, replaces the default boundaries
    /// of the single-field cases and must name every side the case needs.
    pub fn run(self, setup: &Setup, sides: Option<&BoundaryConfig>) -> Result<Outcome> {
        log::info!("running {} on {} points", self, if self.is_1d() { setup.nx } else { setup.nx * setup.ny });
        let dirichlet_one_1d = Boundaries1D::dirichlet(1.0, 1.0);
        let dirichlet_one_2d = Boundaries2D::all(BoundarySpec::dirichlet(1.0));
        match self {
            Case::LinearConvection1D => {
                let bc = sides_1d(sides, dirichlet_one_1d)?;
                line(setup, Model::LinearConvection, bc, |x| pulse(x, 0.5, 1.0))
            }
            Case::NonlinearConvection1D => {
                let bc = sides_1d(sides, dirichlet_one_1d)?;
                line(setup, Model::NonlinearConvection, bc, |x| pulse(x, 0.5, 1.0))
            }
            Case::Diffusion1D => {
                let bc = sides_1d(sides, dirichlet_one_1d)?;
                line(setup, Model::Diffusion, bc, |x| pulse(x, 0.5, 1.0))
            }
            Case::Burgers1D => {
                let bc = sides_1d(sides, Boundaries1D::periodic())?;
                let nu = setup.params.nu;
                line(setup, Model::Burgers, bc, |x| burgers_profile(0.0, x, nu))
            }
            Case::LinearConvection2D => scalar(setup, Model::LinearConvection, sides_2d(sides, dirichlet_one_2d)?),
            Case::Diffusion2D => scalar(setup, Model::Diffusion, sides_2d(sides, dirichlet_one_2d)?),
            Case::NonlinearConvection2D => vector(setup, Model::NonlinearConvection, sides_2d(sides, dirichlet_one_2d)?),
            Case::Burgers2D => vector(setup, Model::Burgers, sides_2d(sides, dirichlet_one_2d)?),
            Case::Laplace2D => {
                let default = Boundaries2D::new(
                    BoundarySpec::dirichlet(0.0),
                    BoundarySpec::Frozen,
                    BoundarySpec::Neumann,
                    BoundarySpec::Neumann,
                )?;
                laplace(setup, sides_2d(sides, default)?)
            }
            Case::Poisson2D => poisson(setup, sides_2d(sides, Boundaries2D::all(BoundarySpec::dirichlet(0.0)))?),
            Case::Cavity | Case::Channel => {
                if sides.is_some() {
                    log::warn!("{} uses its own wall conditions; configured boundaries are ignored", self);
                }
                let bc = match self {
                    Case::Cavity => cavity_boundaries(setup.lid_velocity)?,
                    _ => channel_boundaries()?,
                };
                flow(setup, bc)
            }
        }
    }

    /// Compares the outcome with the closed-form solution, for the cases
    /// that have one.
    pub fn check(self, setup: &Setup, outcome: &Outcome) -> Result<Option<ValidationReport>> {
        match (self, outcome) {
            (Case::Burgers1D, Outcome::Line { grid, field, time }) => {
                let nu = setup.params.nu;
                validate_1d(grid, field, *time, |t, x| burgers_profile(t, x, nu)).map(Some)
            }
            _ => Ok(None),
        }
    }
}

fn line(setup: &Setup, model: Model, bc: Boundaries1D, initial: impl Fn(f64) -> f64) -> Result<Outcome> {
    let grid = setup.grid_1d()?;
    let params = setup.parameters(&[grid.dx()]);
    let mut integrator = Integrator1D::new(model, &grid, &params, bc, Field1D::from_fn(&grid, initial))?;
    integrator.run(params.nt);
    let time = integrator.time();
    Ok(Outcome::Line { grid, field: integrator.into_field(), time })
}

fn scalar(setup: &Setup, model: Model, bc: Boundaries2D) -> Result<Outcome> {
    let grid = setup.grid_2d()?;
    let params = setup.parameters(&[grid.dx(), grid.dy()]);
    let mut integrator = Integrator2D::scalar(model, &grid, &params, bc, Field2D::from_fn(&grid, pulse_2d))?;
    integrator.run(params.nt);
    let time = integrator.time();
    let (field, _) = integrator.into_fields();
    Ok(Outcome::Scalar { grid, field, time })
}

fn vector(setup: &Setup, model: Model, bc: Boundaries2D) -> Result<Outcome> {
    let grid = setup.grid_2d()?;
    let params = setup.parameters(&[grid.dx(), grid.dy()]);
    let u0 = Field2D::from_fn(&grid, pulse_2d);
    let v0 = u0.clone();
    let mut integrator = Integrator2D::vector(model, &grid, &params, bc, u0, v0)?;
    integrator.run(params.nt);
    let time = integrator.time();
    let (u, v) = integrator.into_fields();
    let v = v.unwrap_or_else(|| Field2D::zeros(&grid));
    Ok(Outcome::Velocity { grid, u, v, time })
}

/// `∇²p = 0` on `[0, 2] x [0, 1]`: grounded west wall, `p = y` on the east
/// wall, insulated south and north walls.
fn laplace(setup: &Setup, bc: Boundaries2D) -> Result<Outcome> {
    let grid = setup.grid_2d()?;
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut p = Field2D::zeros(&grid);
    for j in 0..ny {
        p[(nx - 1, j)] = grid.y(j);
    }
    let mut scratch = p.clone();
    let report = relax_laplace(&mut p, &mut scratch, &grid, &bc, setup.l1_target, setup.params.nit);
    Ok(Outcome::Pressure { grid, p, report: Some(report) })
}

/// `∇²p = b` with a positive and a negative spike in the source.
fn poisson(setup: &Setup, bc: Boundaries2D) -> Result<Outcome> {
    let grid = setup.grid_2d()?;
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut b = Field2D::zeros(&grid);
    b[(nx / 4, ny / 4)] = 100.0;
    b[(3 * nx / 4, 3 * ny / 4)] = -100.0;
    let mut p = Field2D::zeros(&grid);
    let mut scratch = Field2D::zeros(&grid);
    pressure_poisson(&mut p, &mut scratch, &b, &grid, setup.params.nit, &bc);
    Ok(Outcome::Pressure { grid, p, report: None })
}

fn flow(setup: &Setup, bc: FlowBoundaries) -> Result<Outcome> {
    let grid = setup.grid_2d()?;
    let params = setup.parameters(&[grid.dx(), grid.dy()]);
    let mut state = FlowState::new(&grid);
    let mut solver = FlowSolver::new(&grid, &params, bc, &state)?;
    solver.run(&mut state, params.nt);
    let change = solver.last_change(&state);
    Ok(Outcome::Flow { time: solver.time(), change, grid, state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn quick(case: Case) -> Setup {
        let mut setup = case.setup();
        setup.params.nt = setup.params.nt.min(10);
        setup
    }

    #[test]
    fn test_burgers_profile_is_periodic_and_above_zero() {
        let nu = 0.07;
        for t in [0.0, 0.3] {
            let a = burgers_profile(t, 0.0, nu);
            let b = burgers_profile(t, 2.0 * PI, nu);
            assert!((a - b).abs() < 1e-10, "t={}: {} vs {}", t, a, b);
        }
        for k in 0..50 {
            let x = 2.0 * PI * k as f64 / 50.0;
            assert!(burgers_profile(0.0, x, nu) > 0.0);
        }
    }

    #[test]
    fn test_time_step_rules() {
        assert_eq!(TimeStep::Fixed(0.3).resolve(&[0.1], 1.0), 0.3);
        assert!((TimeStep::Convective(0.2).resolve(&[0.05, 0.05], 0.0) - 0.01).abs() < 1e-15);
        assert!((TimeStep::Diffusive(0.2).resolve(&[0.05], 0.3) - 0.2 * 0.0025 / 0.3).abs() < 1e-15);
        assert!((TimeStep::Diffusive(0.25).resolve(&[0.1, 0.05], 0.05) - 0.025).abs() < 1e-15);
        assert!((TimeStep::Viscous.resolve(&[0.1], 0.07) - 0.007).abs() < 1e-15);
    }

    #[test]
    fn test_classic_parameters() {
        let s = Case::Burgers1D.setup();
        assert_eq!((s.nx, s.params.nt, s.params.nu), (101, 100, 0.07));
        assert_eq!(s.time_step, TimeStep::Viscous);
        let s = Case::Diffusion2D.setup();
        assert_eq!((s.nx, s.ny, s.params.nt), (31, 31, 50));
        let s = Case::Poisson2D.setup();
        assert_eq!((s.nx, s.ny, s.lx, s.ly, s.params.nit), (50, 50, 2.0, 1.0, 100));
        assert_eq!(Case::Cavity.setup().params, SimulationParameters::cavity());
    }

    #[test]
    fn test_every_case_runs_briefly() {
        for case in Case::value_variants() {
            let outcome = case.run(&quick(*case), None).unwrap();
            assert!(outcome.is_finite(), "{} produced non-finite values", case);
            assert!(!outcome.to_string().is_empty());
        }
    }

    #[test]
    fn test_case_names() {
        assert_eq!(Case::Burgers1D.to_string(), "burgers_1d");
        assert_eq!(Case::from_str("laplace_2d", false), Ok(Case::Laplace2D));
        let case: Case = serde_yaml::from_str("nonlinear_convection_2d").unwrap();
        assert_eq!(case, Case::NonlinearConvection2D);
    }

    #[test]
    fn test_linear_convection_1d_keeps_walls() {
        let outcome = Case::LinearConvection1D.run(&Case::LinearConvection1D.setup(), None).unwrap();
        let Outcome::Line { field, time, .. } = outcome else { panic!("expected a line") };
        assert_eq!(field.first(), 1.0);
        assert_eq!(field.last(), 1.0);
        assert!((time - 25.0 * 0.025).abs() < 1e-12);
        // The pulse has left [0.5, 1.0] and sits downstream.
        assert!(field[10] < 1.5);
        assert!(field[27] > 1.5);
    }

    #[test]
    fn test_poisson_has_opposite_extremes() {
        let outcome = Case::Poisson2D.run(&Case::Poisson2D.setup(), None).unwrap();
        let Outcome::Pressure { p, report, .. } = outcome else { panic!("expected pressure") };
        assert!(report.is_none());
        assert!(p[(12, 12)] < 0.0);
        assert!(p[(37, 37)] > 0.0);
    }

    #[test]
    fn test_laplace_relaxes_to_converged_report() {
        let outcome = Case::Laplace2D.run(&Case::Laplace2D.setup(), None).unwrap();
        let Outcome::Pressure { p, report: Some(report), grid } = outcome else { panic!("expected a report") };
        assert!(report.converged);
        assert_eq!(p[(0, 15)], 0.0);
        assert!((p[(grid.nx() - 1, 15)] - grid.y(15)).abs() < 1e-15);
    }

    #[test]
    fn test_configured_sides_must_be_complete() {
        let sides = BoundaryConfig { west: Some(BoundarySpec::Periodic), ..Default::default() };
        let err = Case::Burgers1D.run(&quick(Case::Burgers1D), Some(&sides)).unwrap_err();
        assert_eq!(err, ConfigError::MissingBoundary { side: "right" });
    }

    #[test]
    fn test_burgers_check_reports_small_error() {
        let setup = Case::Burgers1D.setup();
        let outcome = Case::Burgers1D.run(&setup, None).unwrap();
        let report = Case::Burgers1D.check(&setup, &outcome).unwrap().unwrap();
        // A field that never moved would be far off by now.
        let grid = setup.grid_1d().unwrap();
        let frozen = Field1D::from_fn(&grid, |x| burgers_profile(0.0, x, setup.params.nu));
        let Outcome::Line { field, .. } = &outcome else { panic!("expected a line") };
        let still = validate_1d(&grid, &frozen, outcome.time(), |t, x| burgers_profile(t, x, 0.07)).unwrap();
        assert!(report.l2_error < 0.5 * still.l2_error, "{:?} vs {:?}", report, still);
        // The smeared front is the worst point; bound it across the whole domain.
        assert!(report.max_abs_error < 4.0, "{:?}", report);
        assert!(field.max_abs() < 8.0);
        assert!(Case::Cavity.check(&setup, &outcome).unwrap().is_none());
    }
}
