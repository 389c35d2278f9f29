//! Explicit finite-difference solvers on uniform Cartesian grids: the
//! convection / diffusion family in 1D and 2D, Jacobi relaxation for the
//! Laplace and Poisson equations, and pressure-coupled Navier-Stokes for the
//! lid-driven cavity and the periodic channel.

pub mod cases;
pub mod config;
pub mod error;
pub mod grid;
pub mod solver;
pub mod state;
pub mod validate;

pub use error::{ConfigError, Result};
