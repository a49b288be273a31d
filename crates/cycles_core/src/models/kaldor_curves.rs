//! One-variable Kaldor model: `dY/dt = I(Y) - S(Y)` with an S-shaped saving curve and a
//! wavy investment curve that can cut it several times.

use crate::equilibrium::{classify_equilibria, Equilibrium, RootScanSettings};
use crate::grid::Axis;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaldorCurveParams {
    pub saving_floor: f64,
    pub saving_span: f64,
    pub saving_midpoint: f64,
    pub saving_width: f64,
    pub investment_intercept: f64,
    pub investment_slope: f64,
    pub wave_amplitude: f64,
    pub wave_frequency: f64,
    pub wave_phase: f64,
}

impl Default for KaldorCurveParams {
    fn default() -> Self {
        Self {
            saving_floor: 0.2,
            saving_span: 0.8,
            saving_midpoint: 5.0,
            saving_width: 1.1,
            investment_intercept: 0.25,
            investment_slope: 0.095,
            wave_amplitude: 0.32,
            wave_frequency: 1.2,
            wave_phase: 1.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    Falling,
}

/// Sign of `dY/dt` at a sample income level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionMarker {
    pub income: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaldorCurves {
    pub params: KaldorCurveParams,
}

impl KaldorCurves {
    pub fn new(params: KaldorCurveParams) -> Self {
        Self { params }
    }

    /// Logistic saving schedule.
    pub fn saving(&self, y: f64) -> f64 {
        let p = &self.params;
        p.saving_floor + p.saving_span / (1.0 + (-(y - p.saving_midpoint) / p.saving_width).exp())
    }

    pub fn investment(&self, y: f64) -> f64 {
        let p = &self.params;
        p.investment_slope * y
            + p.wave_amplitude * (p.wave_frequency * (y - p.wave_phase)).sin()
            + p.investment_intercept
    }

    /// `I(Y) - S(Y)`, the right-hand side of the income dynamics.
    pub fn excess_investment(&self, y: f64) -> f64 {
        self.investment(y) - self.saving(y)
    }

    pub fn equilibria(&self, axis: &Axis, settings: RootScanSettings) -> Result<Vec<Equilibrium>> {
        axis.validate()?;
        let grid = axis.values();
        let values: Vec<f64> = grid.iter().map(|&y| self.excess_investment(y)).collect();
        classify_equilibria(&grid, &values, settings)
            .with_context(|| format!("Scanning I(Y) = S(Y) with {:?}", self.params))
    }

    /// One marker per segment midpoint of `linspace(axis.min, axis.max, segments)`.
    pub fn direction_markers(&self, axis: &Axis, segments: usize) -> Result<Vec<DirectionMarker>> {
        let boundaries = Axis::new(axis.min, axis.max, segments);
        boundaries.validate()?;
        Ok(boundaries
            .midpoints()
            .into_iter()
            .map(|income| DirectionMarker {
                income,
                direction: if self.excess_investment(income) > 0.0 {
                    Direction::Rising
                } else {
                    Direction::Falling
                },
            })
            .collect())
    }
}

/// Income domain of the curve plot.
pub fn default_domain() -> Axis {
    Axis::default()
}
