use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_non_negative, require_positive, ConfigError, Result};

/// Largest Courant number `speed * dt * Σ 1/h` an upwind step tolerates.
/// The backward difference only upwinds positive speeds, so the lower
/// bound is zero.
pub const COURANT_LIMIT: f64 = 1.0;
/// Largest diffusion number `nu * dt * Σ 1/h²` a forward-Euler step tolerates.
pub const DIFFUSION_LIMIT: f64 = 0.5;

/// What the pre-flight stability check does when a limit is exceeded.
/// It never changes the computed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityPolicy {
    Ignore,
    #[default]
    Warn,
    Reject,
}

/// Solver parameters, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Number of time steps.
    pub nt: usize,
    pub dt: f64,
    /// Viscosity / diffusion coefficient.
    pub nu: f64,
    /// Transport speed of the linear convection models.
    pub c: f64,
    /// Fluid density (Navier-Stokes only).
    pub rho: f64,
    /// Jacobi sweeps per time step (Navier-Stokes only).
    pub nit: usize,
    /// Body force along x (channel flow).
    pub force: f64,
    pub stability: StabilityPolicy,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            nt: 100,
            dt: 0.01,
            nu: 0.1,
            c: 1.0,
            rho: 1.0,
            nit: 50,
            force: 0.0,
            stability: StabilityPolicy::Warn,
        }
    }
}

/// Dimensionless numbers the pre-flight check compares with the limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityNumbers {
    pub courant: f64,
    pub diffusion: f64,
}

impl SimulationParameters {
    /// Lid-driven cavity on a 2 x 2 box.
    pub fn cavity() -> Self {
        Self { nt: 500, dt: 0.001, nu: 0.1, c: 0.0, rho: 1.0, nit: 50, force: 0.0, ..Self::default() }
    }

    /// Pressure-free channel driven by a unit body force.
    pub fn channel() -> Self {
        Self { nt: 500, dt: 0.01, nu: 0.1, c: 0.0, rho: 1.0, nit: 50, force: 1.0, ..Self::default() }
    }

    /// Checks that every step size and coefficient is usable.
    pub fn validate(&self) -> Result<()> {
        require_positive("dt", self.dt)?;
        require_non_negative("nu", self.nu)?;
        require_finite("c", self.c)?;
        require_finite("force", self.force)?;
        Ok(())
    }

    /// Extra checks for the pressure-coupled solvers.
    pub fn validate_flow(&self) -> Result<()> {
        self.validate()?;
        require_positive("rho", self.rho)?;
        Ok(())
    }

    /// The Courant number keeps the sign of `speed`.
    pub fn stability_numbers(&self, speed: f64, spacings: &[f64]) -> StabilityNumbers {
        let inv: f64 = spacings.iter().map(|h| 1.0 / h).sum();
        let inv2: f64 = spacings.iter().map(|h| 1.0 / (h * h)).sum();
        StabilityNumbers {
            courant: speed * self.dt * inv,
            diffusion: self.nu * self.dt * inv2,
        }
    }

    /// Pre-flight stability check for an explicit step on a grid with the
    /// given spacings. `speed` is the largest transport speed expected.
    pub fn check_stability(
        &self,
        speed: f64,
        spacings: &[f64],
        convective: bool,
        diffusive: bool,
    ) -> Result<StabilityNumbers> {
        let numbers = self.stability_numbers(speed, spacings);
        if self.stability == StabilityPolicy::Ignore {
            return Ok(numbers);
        }
        let mut violations = Vec::new();
        if convective && outside(numbers.courant, COURANT_LIMIT) {
            violations.push(("Courant", numbers.courant, COURANT_LIMIT));
        }
        if diffusive && outside(numbers.diffusion, DIFFUSION_LIMIT) {
            violations.push(("diffusion", numbers.diffusion, DIFFUSION_LIMIT));
        }
        for &(number, value, limit) in &violations {
            match self.stability {
                StabilityPolicy::Reject => return Err(ConfigError::Unstable { number, value, limit }),
                _ => log::warn!("{} number {:.4} is outside [0, {}]; the run may blow up", number, value, limit),
            }
        }
        Ok(numbers)
    }
}

// Presets sit exactly on the limit; allow for rounding in dt.
fn outside(value: f64, limit: f64) -> bool {
    value < 0.0 || value > limit * (1.0 + 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cavity_params() {
        let p = SimulationParameters::cavity();
        assert_eq!(p.dt, 0.001);
        assert_eq!(p.nu, 0.1);
        assert_eq!(p.rho, 1.0);
        assert_eq!(p.nit, 50);
        assert_eq!(p.force, 0.0);
        assert!(p.validate_flow().is_ok());
    }

    #[test]
    fn test_default_channel_params() {
        let p = SimulationParameters::channel();
        assert_eq!(p.dt, 0.01);
        assert_eq!(p.force, 1.0);
        assert_eq!(p.stability, StabilityPolicy::Warn);
    }

    #[test]
    fn test_validate_rejects_bad_steps() {
        let p = SimulationParameters { dt: 0.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(ConfigError::NonPositive { name: "dt", .. })));
        let p = SimulationParameters { nu: -1.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(ConfigError::Negative { name: "nu", .. })));
        let p = SimulationParameters { rho: 0.0, ..Default::default() };
        assert!(p.validate().is_ok());
        assert!(matches!(p.validate_flow(), Err(ConfigError::NonPositive { name: "rho", .. })));
    }

    #[test]
    fn test_validate_names_non_finite_coefficients() {
        let p = SimulationParameters { c: f64::NAN, ..Default::default() };
        assert!(matches!(p.validate(), Err(ConfigError::NonFinite { name: "c", .. })));
        let p = SimulationParameters { force: f64::INFINITY, ..Default::default() };
        let err = p.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { name: "force", .. }));
        assert_eq!(err.to_string(), "force must be finite, got inf");
        // Zero and negative forces and speeds are legal values.
        let p = SimulationParameters { c: -1.0, force: -2.0, ..Default::default() };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_stability_numbers() {
        let p = SimulationParameters { dt: 0.025, nu: 0.3, ..Default::default() };
        let n = p.stability_numbers(1.0, &[0.05]);
        assert!((n.courant - 0.5).abs() < 1e-12);
        assert!((n.diffusion - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reject_policy_fails_on_violation() {
        let p = SimulationParameters { dt: 0.1, nu: 0.0, stability: StabilityPolicy::Reject, ..Default::default() };
        let err = p.check_stability(1.0, &[0.05], true, false).unwrap_err();
        assert!(matches!(err, ConfigError::Unstable { number: "Courant", .. }));
        // Diffusion is not checked for a convection-only model.
        assert!(p.check_stability(0.0, &[0.05], true, false).is_ok());
    }

    #[test]
    fn test_negative_speed_is_a_courant_violation() {
        let p = SimulationParameters { dt: 0.01, nu: 0.0, stability: StabilityPolicy::Reject, ..Default::default() };
        let n = p.stability_numbers(-1.0, &[0.05]);
        assert!((n.courant + 0.2).abs() < 1e-12);
        let err = p.check_stability(-1.0, &[0.05], true, false).unwrap_err();
        assert!(matches!(err, ConfigError::Unstable { number: "Courant", limit, .. } if limit == COURANT_LIMIT));
        // Pure diffusion carries no transport, so the sign is irrelevant.
        assert!(p.check_stability(-1.0, &[0.05], false, true).is_ok());
        let p = SimulationParameters { stability: StabilityPolicy::Warn, ..p };
        assert!(p.check_stability(-1.0, &[0.05], true, false).is_ok());
    }

    #[test]
    fn test_warn_and_ignore_never_fail() {
        for stability in [StabilityPolicy::Warn, StabilityPolicy::Ignore] {
            let p = SimulationParameters { dt: 1.0, nu: 1.0, stability, ..Default::default() };
            assert!(p.check_stability(10.0, &[0.01, 0.01], true, true).is_ok());
        }
    }

    #[test]
    fn test_limit_is_inclusive() {
        // sigma = 0.25 in 2D with dx = dy puts the diffusion number exactly at 0.5.
        let dx = 2.0 / 30.0;
        let nu = 0.05;
        let p = SimulationParameters { dt: 0.25 * dx * dx / nu, nu, stability: StabilityPolicy::Reject, ..Default::default() };
        assert!(p.check_stability(0.0, &[dx, dx], false, true).is_ok());
    }
}
