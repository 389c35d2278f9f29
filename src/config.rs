use std::path::Path;

use serde::Deserialize;

use crate::cases::{Case, Setup, TimeStep};
use crate::error::Result;
use crate::solver::{Boundaries1D, Boundaries2D, BoundarySpec, StabilityPolicy};

pub const DEFAULT_PATH: &str = "fdflow.yaml";

/// Run configuration. Anything left out keeps the value the case itself
/// uses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub case: Case,
    pub grid: GridConfig,
    pub params: ParamsConfig,
    pub boundaries: Option<BoundaryConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub nx: Option<usize>,
    pub ny: Option<usize>,
    pub lx: Option<f64>,
    pub ly: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub nt: Option<usize>,
    /// Fixed time step, replacing the case's own rule.
    pub dt: Option<f64>,
    pub nu: Option<f64>,
    pub c: Option<f64>,
    pub rho: Option<f64>,
    pub nit: Option<usize>,
    pub force: Option<f64>,
    pub lid_velocity: Option<f64>,
    pub l1_target: Option<f64>,
    pub stability: Option<StabilityPolicy>,
}

/// Boundary override. 1D cases read `west` and `east` (or `left` and
/// `right`) as the two ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    #[serde(alias = "left")]
    pub west: Option<BoundarySpec>,
    #[serde(alias = "right")]
    pub east: Option<BoundarySpec>,
    pub south: Option<BoundarySpec>,
    pub north: Option<BoundarySpec>,
}

impl BoundaryConfig {
    pub fn to_1d(&self) -> Result<Boundaries1D> {
        Boundaries1D::from_sides(self.west, self.east)
    }

    pub fn to_2d(&self) -> Result<Boundaries2D> {
        Boundaries2D::from_sides(self.west, self.east, self.south, self.north)
    }
}

impl Config {
    /// The case set-up with every configured override applied.
    pub fn setup(&self) -> Setup {
        let mut s = self.case.setup();
        let g = &self.grid;
        s.nx = g.nx.unwrap_or(s.nx);
        s.ny = g.ny.unwrap_or(s.ny);
        s.lx = g.lx.unwrap_or(s.lx);
        s.ly = g.ly.unwrap_or(s.ly);

        let p = &self.params;
        if let Some(dt) = p.dt {
            s.time_step = TimeStep::Fixed(dt);
        }
        s.params.nt = p.nt.unwrap_or(s.params.nt);
        s.params.nu = p.nu.unwrap_or(s.params.nu);
        s.params.c = p.c.unwrap_or(s.params.c);
        s.params.rho = p.rho.unwrap_or(s.params.rho);
        s.params.nit = p.nit.unwrap_or(s.params.nit);
        s.params.force = p.force.unwrap_or(s.params.force);
        s.params.stability = p.stability.unwrap_or(s.params.stability);
        s.lid_velocity = p.lid_velocity.unwrap_or(s.lid_velocity);
        s.l1_target = p.l1_target.unwrap_or(s.l1_target);
        s
    }
}

/// Reads the YAML file at `path`. A missing file gives the defaults; an
/// unreadable or malformed one gives the defaults with a warning.
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        log::debug!("{} not found; using defaults", path.display());
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("failed to parse {}: {e}; using defaults", path.display());
                Config::default()
            }
        },
        Err(e) => {
            log::warn!("failed to read {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}
