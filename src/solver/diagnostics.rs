use super::stencil::{central_x, central_y, Node};
use crate::grid::Grid2D;
use crate::state::Field2D;

/// Interior-averaged kinetic energy: KE = 0.5 * <u² + v²>.
pub fn compute_kinetic_energy(u: &Field2D, v: &Field2D) -> f64 {
    let (nx, ny) = (u.nx(), u.ny());
    let mut sum = 0.0;
    let mut count = 0usize;
    for j in 1..(ny - 1) {
        for i in 1..(nx - 1) {
            sum += u[(i, j)] * u[(i, j)] + v[(i, j)] * v[(i, j)];
            count += 1;
        }
    }
    if count > 0 { 0.5 * sum / count as f64 } else { 0.0 }
}

/// Central-difference divergence `u_x + v_y` at every interior point.
pub fn compute_divergence(u: &Field2D, v: &Field2D, grid: &Grid2D) -> Field2D {
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut div = Field2D::zeros(grid);
    for j in 1..(ny - 1) {
        for i in 1..(nx - 1) {
            let n = Node::new(i, j, nx, ny);
            div[(i, j)] = central_x(u, n, grid.dx()) + central_y(v, n, grid.dy());
        }
    }
    div
}

/// Mean absolute interior divergence.
pub fn mean_abs_divergence(u: &Field2D, v: &Field2D, grid: &Grid2D) -> f64 {
    let div = compute_divergence(u, v, grid);
    let interior = ((grid.nx() - 2) * (grid.ny() - 2)).max(1);
    div.as_slice().iter().map(|d| d.abs()).sum::<f64>() / interior as f64
}

/// Relative change of the field total between two levels,
/// `(Σu - Σun) / Σu`. Zero when both totals are zero.
pub fn relative_change(u: &Field2D, un: &Field2D) -> f64 {
    let total = u.sum();
    if total == 0.0 {
        return if un.sum() == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (total - un.sum()) / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid2D {
        Grid2D::new(2.0, 2.0, 21, 21).unwrap()
    }

    #[test]
    fn test_kinetic_energy_zero() {
        let g = grid();
        let ke = compute_kinetic_energy(&Field2D::zeros(&g), &Field2D::zeros(&g));
        assert!(ke.abs() < 1e-15, "KE should be 0 with no flow, got {}", ke);
    }

    #[test]
    fn test_kinetic_energy_uniform_flow() {
        let g = grid();
        let ke = compute_kinetic_energy(&Field2D::filled(&g, 1.0), &Field2D::zeros(&g));
        assert!((ke - 0.5).abs() < 1e-10, "KE should be 0.5, got {}", ke);
    }

    #[test]
    fn test_divergence_of_rotation_is_zero() {
        let g = grid();
        // Solid-body rotation u = -y, v = x.
        let u = Field2D::from_fn(&g, |_, y| -y);
        let v = Field2D::from_fn(&g, |x, _| x);
        assert!(mean_abs_divergence(&u, &v, &g) < 1e-12);
    }

    #[test]
    fn test_divergence_of_expansion() {
        let g = grid();
        let u = Field2D::from_fn(&g, |x, _| x);
        let v = Field2D::from_fn(&g, |_, y| y);
        let div = compute_divergence(&u, &v, &g);
        assert!((div[(10, 10)] - 2.0).abs() < 1e-10);
        assert_eq!(div[(0, 0)], 0.0);
    }

    #[test]
    fn test_relative_change() {
        let g = grid();
        let u = Field2D::filled(&g, 2.0);
        let un = Field2D::filled(&g, 1.5);
        assert!((relative_change(&u, &un) - 0.25).abs() < 1e-12);
        assert_eq!(relative_change(&Field2D::zeros(&g), &Field2D::zeros(&g)), 0.0);
    }
}
