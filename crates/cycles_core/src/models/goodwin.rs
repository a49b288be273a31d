//! Idealised Goodwin growth cycle: a closed orbit on the unit circle in
//! (employment, wage share) deviations, with the counter-clockwise flow marked by arrows.

use crate::grid::Axis;
use crate::trajectory::State;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Angles at which a direction arrow is drawn.
pub const ARROW_ANGLES: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// Length of each direction arrow.
pub const ARROW_LENGTH: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseArrow {
    pub origin: State,
    pub delta: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoodwinCycle {
    pub samples: usize,
}

impl Default for GoodwinCycle {
    fn default() -> Self {
        Self { samples: 200 }
    }
}

impl GoodwinCycle {
    /// `(cos t, sin t)` for `t` evenly spaced over `[0, 2 pi]`, both ends included.
    pub fn orbit(&self) -> Result<Vec<State>> {
        let angles = Axis::new(0.0, 2.0 * PI, self.samples);
        angles.validate()?;
        Ok(angles
            .values()
            .into_iter()
            .map(|t| State::new(t.cos(), t.sin()))
            .collect())
    }

    pub fn arrows(&self) -> Vec<PhaseArrow> {
        ARROW_ANGLES
            .iter()
            .map(|&a| PhaseArrow {
                origin: State::new(a.cos(), a.sin()),
                delta: State::new(-ARROW_LENGTH * a.sin(), ARROW_LENGTH * a.cos()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::GoodwinCycle;

    #[test]
    fn orbit_closes_on_unit_circle() {
        let orbit = GoodwinCycle::default().orbit().expect("orbit");
        assert_eq!(orbit.len(), 200);
        for s in &orbit {
            assert!((s.x.hypot(s.y) - 1.0).abs() < 1e-12);
        }
        let (first, last) = (orbit[0], orbit[199]);
        assert!((first.x - last.x).abs() < 1e-12 && (first.y - last.y).abs() < 1e-12);
    }

    #[test]
    fn arrows_are_tangent_and_counter_clockwise() {
        let arrows = GoodwinCycle::default().arrows();
        assert_eq!(arrows.len(), 4);
        for arrow in &arrows {
            let dot = arrow.origin.x * arrow.delta.x + arrow.origin.y * arrow.delta.y;
            let cross = arrow.origin.x * arrow.delta.y - arrow.origin.y * arrow.delta.x;
            assert!(dot.abs() < 1e-12, "arrow not tangent: {arrow:?}");
            assert!((cross - 0.1).abs() < 1e-12, "arrow turns clockwise: {arrow:?}");
        }
        assert!((arrows[1].origin.y - 1.0).abs() < 1e-12);
        assert!((arrows[1].delta.x + 0.1).abs() < 1e-12);
    }

    #[test]
    fn single_sample_orbit_is_rejected() {
        assert!(GoodwinCycle { samples: 1 }.orbit().is_err());
    }
}
