//! Linear planar fields `(a x + b y, c x + d y)`, used to show what the sign of the
//! divergence means for area under the flow.

use crate::grid::Axis;
use crate::traits::PlanarField;
use crate::trajectory::State;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearField {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl LinearField {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// `(x, y)`: everything flows outward, divergence `+2`.
    pub const fn source() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    /// `(-x, -y)`: everything flows inward, divergence `-2`.
    pub const fn sink() -> Self {
        Self::new(-1.0, 0.0, 0.0, -1.0)
    }
}

impl PlanarField for LinearField {
    fn derivative(&self, state: State) -> State {
        State::new(
            self.a * state.x + self.b * state.y,
            self.c * state.x + self.d * state.y,
        )
    }

    fn jacobian(&self, _state: State) -> [[f64; 2]; 2] {
        [[self.a, self.b], [self.c, self.d]]
    }
}

/// Sampling window shared by the source and sink panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceWindow {
    pub x: Axis,
    pub y: Axis,
}

impl Default for DivergenceWindow {
    fn default() -> Self {
        Self {
            x: Axis::new(-2.0, 2.0, 20),
            y: Axis::new(-2.0, 2.0, 20),
        }
    }
}
