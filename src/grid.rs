use crate::error::{require_positive, ConfigError, Result};

fn require_points(axis: &'static str, points: usize) -> Result<usize> {
    if points < 2 {
        Err(ConfigError::TooFewPoints { axis, points })
    } else {
        Ok(points)
    }
}

/// Uniform 1D grid over `[x0, x0 + length]`, end points included.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid1D {
    nx: usize,
    x0: f64,
    dx: f64,
}

impl Grid1D {
    /// Grid starting at the origin.
    pub fn new(length: f64, nx: usize) -> Result<Self> {
        Self::with_origin(0.0, length, nx)
    }

    pub fn with_origin(x0: f64, length: f64, nx: usize) -> Result<Self> {
        let nx = require_points("x", nx)?;
        let length = require_positive("length", length)?;
        Ok(Self { nx, x0, dx: length / (nx - 1) as f64 })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.x0 + i as f64 * self.dx
    }

    /// Coordinates of every grid point.
    pub fn xs(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.x(i)).collect()
    }
}

/// Uniform 2D grid. Fields on it are stored row-major: `j * nx + i`,
/// with `i` along x and `j` along y.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    nx: usize,
    ny: usize,
    x0: f64,
    y0: f64,
    dx: f64,
    dy: f64,
}

impl Grid2D {
    pub fn new(lx: f64, ly: f64, nx: usize, ny: usize) -> Result<Self> {
        Self::with_origin(0.0, 0.0, lx, ly, nx, ny)
    }

    pub fn with_origin(x0: f64, y0: f64, lx: f64, ly: f64, nx: usize, ny: usize) -> Result<Self> {
        let nx = require_points("x", nx)?;
        let ny = require_points("y", ny)?;
        let lx = require_positive("lx", lx)?;
        let ly = require_positive("ly", ly)?;
        Ok(Self {
            nx,
            ny,
            x0,
            y0,
            dx: lx / (nx - 1) as f64,
            dy: ly / (ny - 1) as f64,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Total number of points.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        crate::state::idx(i, j, self.nx)
    }

    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.x0 + i as f64 * self.dx
    }

    #[inline]
    pub fn y(&self, j: usize) -> f64 {
        self.y0 + j as f64 * self.dy
    }

    pub fn xs(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.x(i)).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        (0..self.ny).map(|j| self.y(j)).collect()
    }
}
