use std::ops::{Index, IndexMut};

use crate::error::{ConfigError, Result};
use crate::grid::{Grid1D, Grid2D};

/// Row-major flat index for in-bounds `(i, j)`.
#[inline(always)]
pub const fn idx(i: usize, j: usize, nx: usize) -> usize {
    j * nx + i
}

/// Values of one quantity on a 1D grid at a single time level.
#[derive(Debug, Clone, PartialEq)]
pub struct Field1D {
    data: Vec<f64>,
}

impl Field1D {
    pub fn zeros(grid: &Grid1D) -> Self {
        Self::filled(grid, 0.0)
    }

    pub fn filled(grid: &Grid1D, value: f64) -> Self {
        Self { data: vec![value; grid.nx()] }
    }

    /// Samples `f(x)` at every grid coordinate.
    pub fn from_fn(grid: &Grid1D, f: impl Fn(f64) -> f64) -> Self {
        Self { data: (0..grid.nx()).map(|i| f(grid.x(i))).collect() }
    }

    pub fn from_vec(grid: &Grid1D, data: Vec<f64>) -> Result<Self> {
        if data.len() != grid.nx() {
            return Err(ConfigError::ShapeMismatch { expected: grid.nx(), actual: data.len() });
        }
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn first(&self) -> f64 {
        self.data[0]
    }

    pub fn last(&self) -> f64 {
        self.data[self.data.len() - 1]
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Index of the largest value (first one on ties).
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &v) in self.data.iter().enumerate() {
            if v > self.data[best] {
                best = i;
            }
        }
        best
    }
}

impl Index<usize> for Field1D {
    type Output = f64;

    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<usize> for Field1D {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

/// Values of one quantity on a 2D grid at a single time level.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

impl Field2D {
    pub fn zeros(grid: &Grid2D) -> Self {
        Self::filled(grid, 0.0)
    }

    pub fn filled(grid: &Grid2D, value: f64) -> Self {
        Self { nx: grid.nx(), ny: grid.ny(), data: vec![value; grid.len()] }
    }

    /// Samples `f(x, y)` at every grid point.
    pub fn from_fn(grid: &Grid2D, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut data = Vec::with_capacity(grid.len());
        for j in 0..grid.ny() {
            let y = grid.y(j);
            for i in 0..grid.nx() {
                data.push(f(grid.x(i), y));
            }
        }
        Self { nx: grid.nx(), ny: grid.ny(), data }
    }

    pub fn from_vec(grid: &Grid2D, data: Vec<f64>) -> Result<Self> {
        if data.len() != grid.len() {
            return Err(ConfigError::ShapeMismatch { expected: grid.len(), actual: data.len() });
        }
        Ok(Self { nx: grid.nx(), ny: grid.ny(), data })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    pub fn same_shape(&self, other: &Field2D) -> bool {
        self.nx == other.nx && self.ny == other.ny
    }
}

impl Index<(usize, usize)> for Field2D {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(i < self.nx && j < self.ny);
        &self.data[idx(i, j, self.nx)]
    }
}

impl IndexMut<(usize, usize)> for Field2D {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        debug_assert!(i < self.nx && j < self.ny);
        &mut self.data[idx(i, j, self.nx)]
    }
}

/// Velocity and pressure of an incompressible flow, plus the buffers the
/// flow solver swaps with them every step.
#[derive(Debug, Clone)]
pub struct FlowState {
    pub u: Field2D,
    pub v: Field2D,
    pub p: Field2D,
    /// Previous-level velocity (read-only during a step).
    pub(crate) un: Field2D,
    pub(crate) vn: Field2D,
    /// Previous Jacobi sweep.
    pub(crate) pn: Field2D,
    /// Poisson source term.
    pub(crate) b: Field2D,
}

impl FlowState {
    /// Fluid at rest with zero pressure.
    pub fn new(grid: &Grid2D) -> Self {
        let zero = Field2D::zeros(grid);
        Self {
            u: zero.clone(),
            v: zero.clone(),
            p: zero.clone(),
            un: zero.clone(),
            vn: zero.clone(),
            pn: zero.clone(),
            b: zero,
        }
    }

    /// Starts from the given velocity and pressure.
    pub fn from_fields(u: Field2D, v: Field2D, p: Field2D) -> Result<Self> {
        for other in [&v, &p] {
            if !u.same_shape(other) {
                return Err(ConfigError::ShapeMismatch { expected: u.len(), actual: other.len() });
            }
        }
        let mut zero = u.clone();
        zero.fill(0.0);
        Ok(Self { un: zero.clone(), vn: zero.clone(), pn: zero.clone(), b: zero, u, v, p })
    }
}
