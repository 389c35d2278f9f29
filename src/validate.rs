//! Comparison of computed fields with closed-form references.

use crate::error::{ConfigError, Result};
use crate::grid::{Grid1D, Grid2D};
use crate::state::{Field1D, Field2D};

/// Pointwise agreement between a computed field and a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationReport {
    /// `max |computed - reference|`
    pub max_abs_error: f64,
    /// Root-mean-square of the pointwise error.
    pub l2_error: f64,
    /// Flat index of the largest error.
    pub worst_index: usize,
}

impl ValidationReport {
    pub fn within(&self, tolerance: f64) -> bool {
        self.max_abs_error <= tolerance
    }
}

/// Compares two equally long arrays. A NaN anywhere makes both norms NaN.
pub fn compare(computed: &[f64], reference: &[f64]) -> Result<ValidationReport> {
    if computed.len() != reference.len() {
        return Err(ConfigError::ShapeMismatch { expected: reference.len(), actual: computed.len() });
    }
    let mut report = ValidationReport { max_abs_error: 0.0, l2_error: 0.0, worst_index: 0 };
    let mut sum_sq = 0.0;
    for (k, (c, r)) in computed.iter().zip(reference).enumerate() {
        let err = (c - r).abs();
        sum_sq += err * err;
        if err.is_nan() {
            report.max_abs_error = f64::NAN;
            report.worst_index = k;
        } else if err > report.max_abs_error {
            report.max_abs_error = err;
            report.worst_index = k;
        }
    }
    report.l2_error = if computed.is_empty() { 0.0 } else { (sum_sq / computed.len() as f64).sqrt() };
    Ok(report)
}

/// Samples `reference(t, x)` on the grid and compares it with `field`.
pub fn validate_1d(
    grid: &Grid1D,
    field: &Field1D,
    t: f64,
    reference: impl Fn(f64, f64) -> f64,
) -> Result<ValidationReport> {
    let expected = Field1D::from_fn(grid, |x| reference(t, x));
    let report = compare(field.as_slice(), expected.as_slice())?;
    log::debug!(
        "validation at t={:.4}: max error {:.3e} at x={:.4}, rms {:.3e}",
        t,
        report.max_abs_error,
        grid.x(report.worst_index),
        report.l2_error
    );
    Ok(report)
}

/// Samples `reference(t, x, y)` on the grid and compares it with `field`.
pub fn validate_2d(
    grid: &Grid2D,
    field: &Field2D,
    t: f64,
    reference: impl Fn(f64, f64, f64) -> f64,
) -> Result<ValidationReport> {
    let expected = Field2D::from_fn(grid, |x, y| reference(t, x, y));
    compare(field.as_slice(), expected.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_fields_have_zero_error() {
        let a = [1.0, 2.0, 3.0];
        let report = compare(&a, &a).unwrap();
        assert_eq!(report.max_abs_error, 0.0);
        assert_eq!(report.l2_error, 0.0);
        assert!(report.within(0.0));
    }

    #[test]
    fn test_worst_point_is_located() {
        let report = compare(&[1.0, 2.5, 3.0, 4.0], &[1.0, 2.0, 3.0, 5.0]).unwrap();
        assert_eq!(report.max_abs_error, 1.0);
        assert_eq!(report.worst_index, 3);
        assert!((report.l2_error - (1.25f64 / 4.0).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            compare(&[1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(ConfigError::ShapeMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_nan_poisons_report() {
        let report = compare(&[1.0, f64::NAN, 1.0], &[1.0, 1.0, 1.0]).unwrap();
        assert!(report.max_abs_error.is_nan());
        assert!(report.l2_error.is_nan());
        assert!(!report.within(1e9));
    }

    #[test]
    fn test_validate_against_sampled_reference() {
        let grid = Grid1D::new(1.0, 11).unwrap();
        let field = Field1D::from_fn(&grid, |x| 2.0 * x);
        let report = validate_1d(&grid, &field, 0.5, |t, x| 4.0 * t * x).unwrap();
        assert!(report.max_abs_error < 1e-15);

        let grid = Grid2D::new(1.0, 2.0, 5, 9).unwrap();
        let field = Field2D::from_fn(&grid, |x, y| x + y);
        let report = validate_2d(&grid, &field, 1.0, |t, x, y| x + y + t).unwrap();
        assert!((report.max_abs_error - 1.0).abs() < 1e-15);
    }
}
