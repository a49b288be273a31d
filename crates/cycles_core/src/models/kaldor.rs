//! Two-variable Kaldor cycle in income `Y` and capital `K`.
//!
//! ```text
//! dY/dt = alpha * (I(Y, K) - S(Y))
//! dK/dt = I(Y, K) - delta * K
//! ```
//!
//! Investment is hump-shaped in `Y` and falls with `K`; saving rises with `Y`. The
//! divergence is positive near the interior equilibrium and negative far from it, so the
//! Bendixson criterion does not rule out a closed orbit. Whether one forms depends on the
//! parameters; the defaults settle on the upper stable node.

use crate::grid::Axis;
use crate::traits::PlanarField;
use crate::trajectory::State;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaldorParams {
    /// Speed of income adjustment.
    pub alpha: f64,
    /// Depreciation rate.
    pub delta: f64,
    /// Accelerator: sensitivity of investment to income.
    pub b: f64,
    /// Cubic saturation of investment.
    pub c: f64,
    /// Sensitivity of investment to the capital gap.
    pub e: f64,
    /// Desired capital per unit of income.
    pub kappa: f64,
    pub s0: f64,
    /// Marginal propensity to save.
    pub s1: f64,
}

impl Default for KaldorParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            delta: 0.35,
            b: 2.2,
            c: 0.18,
            e: 0.8,
            kappa: 0.5,
            s0: 0.2,
            s1: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaldorModel {
    pub params: KaldorParams,
}

impl KaldorModel {
    pub fn new(params: KaldorParams) -> Self {
        Self { params }
    }

    pub fn saving(&self, y: f64) -> f64 {
        let p = &self.params;
        p.s0 + p.s1 * y / (1.0 + 0.05 * y * y)
    }

    pub fn saving_slope(&self, y: f64) -> f64 {
        let p = &self.params;
        let denom = 1.0 + 0.05 * y * y;
        (p.s1 * denom - p.s1 * y * (0.1 * y)) / (denom * denom)
    }

    pub fn investment(&self, y: f64, k: f64) -> f64 {
        let p = &self.params;
        p.b * y - p.c * y.powi(3) - p.e * (k - p.kappa * y)
    }

    pub fn investment_slope(&self, y: f64) -> f64 {
        let p = &self.params;
        p.b - 3.0 * p.c * y * y + p.e * p.kappa
    }
}

impl PlanarField for KaldorModel {
    fn derivative(&self, state: State) -> State {
        let p = &self.params;
        let investment = self.investment(state.x, state.y);
        State::new(
            p.alpha * (investment - self.saving(state.x)),
            investment - p.delta * state.y,
        )
    }

    fn jacobian(&self, state: State) -> [[f64; 2]; 2] {
        let p = &self.params;
        let i_y = self.investment_slope(state.x);
        let s_y = self.saving_slope(state.x);
        let i_k = -p.e;
        [
            [p.alpha * (i_y - s_y), p.alpha * i_k],
            [i_y, i_k - p.delta],
        ]
    }
}

/// Initial condition and horizon of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaldorRun {
    pub initial: State,
    pub step_size: f64,
    pub horizon: f64,
}

impl Default for KaldorRun {
    fn default() -> Self {
        Self {
            initial: State::new(0.2, 0.1),
            step_size: 0.02,
            horizon: 1200.0,
        }
    }
}

impl KaldorRun {
    /// Number of stored samples, `floor(horizon / step_size)`.
    pub fn steps(&self) -> usize {
        if self.step_size > 0.0 && self.horizon.is_finite() && self.horizon > 0.0 {
            (self.horizon / self.step_size + 1e-9).floor() as usize
        } else {
            0
        }
    }
}

/// Window of the phase portrait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseWindow {
    pub income: Axis,
    pub capital: Axis,
    /// Plot every n-th trajectory sample.
    pub trajectory_stride: usize,
}

impl Default for PhaseWindow {
    fn default() -> Self {
        Self {
            income: Axis::new(-1.0, 4.0, 40),
            capital: Axis::new(-0.5, 3.5, 40),
            trajectory_stride: 20,
        }
    }
}
