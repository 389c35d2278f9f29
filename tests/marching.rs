use std::f64::consts::PI;
use std::io::Write;

use fdflow::cases::{burgers_profile, Case, Outcome};
use fdflow::config;
use fdflow::grid::{Grid1D, Grid2D};
use fdflow::solver::{
    march_1d, Boundaries1D, Boundaries2D, BoundarySpec, Integrator1D, Integrator2D, Model, SimulationParameters,
};
use fdflow::state::{Field1D, Field2D};
use fdflow::validate::validate_1d;
use fdflow::ConfigError;

fn bump(x: f64) -> f64 {
    1.0 + (-(x - 0.6) * (x - 0.6) / 0.02).exp()
}

#[test]
fn test_unit_courant_number_shifts_exactly_one_cell_per_step() {
    let grid = Grid1D::new(2.0, 41).unwrap();
    let params = SimulationParameters { nt: 15, dt: grid.dx(), c: 1.0, ..Default::default() };
    let initial = Field1D::from_fn(&grid, bump);
    let out = march_1d(Model::LinearConvection, &grid, &params, Boundaries1D::periodic(), initial.clone()).unwrap();
    let period = grid.nx() - 1;
    for i in 0..period {
        let from = (i + period - params.nt % period) % period;
        assert!((out[i] - initial[from]).abs() < 1e-12, "i={}: {} vs {}", i, out[i], initial[from]);
    }
    assert_eq!(out.first(), out.last());
}

#[test]
fn test_periodic_diffusion_conserves_total() {
    let grid = Grid1D::new(2.0 * PI, 65).unwrap();
    let nu = 0.2;
    let params = SimulationParameters { dt: 0.4 * grid.dx() * grid.dx() / nu, nu, ..Default::default() };
    let initial = Field1D::from_fn(&grid, |x| 3.0 + x.sin() + 0.5 * (3.0 * x).cos());
    let total = |f: &Field1D| f.as_slice()[..f.len() - 1].iter().sum::<f64>();
    let before = total(&initial);
    let mut it = Integrator1D::new(Model::Diffusion, &grid, &params, Boundaries1D::periodic(), initial).unwrap();
    it.run_with(200, |it| {
        assert!((total(it.field()) - before).abs() < 1e-9);
    });
    // Oscillations decay towards the mean.
    assert!(it.field().max_abs() < 3.6);
}

#[test]
fn test_burgers_tracks_the_closed_form_profile() {
    let nx = 101;
    let grid = Grid1D::new(2.0 * PI, nx).unwrap();
    let nu = 0.07;
    let params = SimulationParameters { nt: 100, dt: grid.dx() * nu, nu, ..Default::default() };
    let initial = Field1D::from_fn(&grid, |x| burgers_profile(0.0, x, nu));
    let mut it =
        Integrator1D::new(Model::Burgers, &grid, &params, Boundaries1D::periodic(), initial.clone()).unwrap();
    it.run(params.nt);
    let t = it.time();
    let report = validate_1d(&grid, it.field(), t, |t, x| burgers_profile(t, x, nu)).unwrap();
    let frozen = validate_1d(&grid, &initial, t, |t, x| burgers_profile(t, x, nu)).unwrap();
    assert!(report.l2_error < 0.5 * frozen.l2_error, "{:?} vs {:?}", report, frozen);
    assert!(report.max_abs_error < 4.0, "worst error at x={}: {:?}", grid.x(report.worst_index), report);
    // Away from the front the profile is close to linear and well resolved.
    let front = grid.x(report.worst_index);
    for i in 0..nx {
        if (grid.x(i) - front).abs() > 1.5 {
            let exact = burgers_profile(t, grid.x(i), nu);
            assert!((it.field()[i] - exact).abs() < 0.5, "x={}: {} vs {}", grid.x(i), it.field()[i], exact);
        }
    }
}

#[test]
fn test_zero_steps_return_the_initial_fields() {
    let grid = Grid2D::new(2.0, 2.0, 21, 21).unwrap();
    let params = SimulationParameters { dt: 0.001, nu: 0.05, ..Default::default() };
    let u0 = Field2D::from_fn(&grid, |x, y| 1.0 + x * y);
    let v0 = Field2D::from_fn(&grid, |x, y| 1.0 - 0.1 * x + y);
    let bc = Boundaries2D::all(BoundarySpec::dirichlet(1.0));

    let mut scalar = Integrator2D::scalar(Model::Diffusion, &grid, &params, bc, u0.clone()).unwrap();
    scalar.run(0);
    assert_eq!(scalar.u(), &u0);

    let mut vector = Integrator2D::vector(Model::Burgers, &grid, &params, bc, u0.clone(), v0.clone()).unwrap();
    vector.run(0);
    assert_eq!(vector.steps_taken(), 0);
    assert_eq!(vector.u(), &u0);
    assert_eq!(vector.v(), Some(&v0));
}

#[test]
fn test_burgers_2d_is_deterministic() {
    let setup = Case::Burgers2D.setup();
    let run = || match Case::Burgers2D.run(&setup, None).unwrap() {
        Outcome::Velocity { u, v, .. } => (u, v),
        other => panic!("unexpected outcome {}", other),
    };
    let (a, b) = (run(), run());
    assert_eq!(a, b);
}

#[test]
fn test_nonlinear_pulse_stays_bounded() {
    let outcome = Case::NonlinearConvection1D.run(&Case::NonlinearConvection1D.setup(), None).unwrap();
    let Outcome::Line { field, .. } = outcome else { panic!("expected a line") };
    for v in field.as_slice() {
        assert!(*v >= 1.0 - 1e-12 && *v <= 2.0 + 1e-12, "upwind at unit Courant number overshot: {}", v);
    }
}

#[test]
fn test_configured_run_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "case: linear_convection_1d\nparams:\n  nt: 40\nboundaries:\n  left: {{ kind: periodic }}\n  right: {{ kind: periodic }}\n"
    )
    .unwrap();
    let cfg = config::load(file.path());
    let setup = cfg.setup();
    let outcome = cfg.case.run(&setup, cfg.boundaries.as_ref()).unwrap();
    let Outcome::Line { field, time, .. } = outcome else { panic!("expected a line") };
    assert!((time - 40.0 * 0.025).abs() < 1e-12);
    assert_eq!(field.first(), field.last());
    // Total excess over the background is carried round the ring, not lost.
    let excess: f64 = field.as_slice()[..field.len() - 1].iter().map(|u| u - 1.0).sum();
    assert!((excess - 11.0).abs() < 1e-9, "excess {}", excess);
}

#[test]
fn test_reject_policy_surfaces_as_an_error() {
    let yaml = "case: diffusion_1d\nparams:\n  dt: 0.1\n  stability: reject\n";
    let cfg: config::Config = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.case.run(&cfg.setup(), None).unwrap_err();
    assert!(matches!(err, ConfigError::Unstable { number: "diffusion", .. }));
}
