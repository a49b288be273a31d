//! Fixed-step integration of planar vector fields.

use crate::error::SimulationError;
use crate::solvers::{simulate, RK4};
use crate::traits::{FieldSystem, PlanarField};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A point in a two-dimensional state space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
}

impl State {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// States sampled every `step_size` time units, starting at the initial condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub step_size: f64,
    states: Vec<State>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn first(&self) -> Option<State> {
        self.states.first().copied()
    }

    pub fn last(&self) -> Option<State> {
        self.states.last().copied()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.states.len()).map(move |i| i as f64 * self.step_size)
    }

    pub fn xs(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.y).collect()
    }

    /// Every `stride`-th sample, starting with the first. A zero stride is treated as one.
    pub fn thinned(&self, stride: usize) -> Vec<State> {
        self.states.iter().step_by(stride.max(1)).copied().collect()
    }

    pub fn ensure_finite(&self) -> Result<(), SimulationError> {
        match self.states.iter().position(|s| !s.is_finite()) {
            Some(step) => {
                let s = self.states[step];
                Err(SimulationError::NonFinite {
                    step,
                    x: s.x,
                    y: s.y,
                })
            }
            None => Ok(()),
        }
    }
}

/// Integrates `field` with classical RK4 at fixed step `step_size`.
///
/// The result holds `steps` states and its first element is `initial`.
/// Non-finite values produced along the way are kept as-is; call
/// [`Trajectory::ensure_finite`] to reject them.
pub fn integrate<F: PlanarField + ?Sized>(
    field: &F,
    initial: State,
    step_size: f64,
    steps: usize,
) -> Result<Trajectory> {
    if !step_size.is_finite() || step_size <= 0.0 {
        bail!("Step size h must be positive and finite (got {step_size}).");
    }
    if steps == 0 {
        bail!("Integration requires at least one step (got steps = 0).");
    }
    if !initial.is_finite() {
        bail!(
            "Initial state must be finite (got ({}, {})).",
            initial.x,
            initial.y
        );
    }

    let system = FieldSystem::new(field);
    let mut stepper = RK4::<f64>::new(2);
    let raw = simulate(
        &system,
        &mut stepper,
        &initial.to_array(),
        0.0,
        step_size,
        steps,
    )?;
    let states = raw.into_iter().map(|s| State::new(s[0], s[1])).collect();
    log::debug!("integrated {steps} samples at h = {step_size}");

    Ok(Trajectory { step_size, states })
}

#[cfg(test)]
mod tests {
    use super::{integrate, State};
    use crate::error::SimulationError;
    use crate::traits::FnField;

    #[test]
    fn fixed_point_stays_constant() {
        let field = FnField::new(|_: f64, _: f64| 0.0, |_: f64, _: f64| 0.0);
        for &h in &[1e-3, 0.5, 7.0] {
            let traj = integrate(&field, State::new(1.25, -3.5), h, 50).expect("integrate");
            assert_eq!(traj.len(), 50);
            assert!(
                traj.states().iter().all(|s| *s == State::new(1.25, -3.5)),
                "state drifted for h = {h}"
            );
        }
    }

    #[test]
    fn exponential_decay_matches_closed_form() {
        let field = FnField::new(|y: f64, _k: f64| -y, |_y: f64, k: f64| -k);
        let h = 0.01;
        let traj = integrate(&field, State::new(1.0, 2.0), h, 200).expect("integrate");
        assert_eq!(traj.len(), 200);
        for (i, (state, t)) in traj.states().iter().zip(traj.times()).enumerate() {
            let exact_y = (-t).exp();
            let exact_k = 2.0 * (-t).exp();
            // Global error of RK4 is O(h^4) over a unit horizon.
            assert!(
                (state.x - exact_y).abs() < 1e-9,
                "step {i}: Y = {}, exact {}",
                state.x,
                exact_y
            );
            assert!(
                (state.y - exact_k).abs() < 2e-9,
                "step {i}: K = {}, exact {}",
                state.y,
                exact_k
            );
        }
    }

    #[test]
    fn first_state_is_initial_condition() {
        let field = FnField::new(|_x: f64, y: f64| y, |x: f64, _y: f64| -x);
        let traj = integrate(&field, State::new(0.3, -0.4), 0.05, 10).expect("integrate");
        assert_eq!(traj.first(), Some(State::new(0.3, -0.4)));
        assert_eq!(traj.len(), 10);
    }

    #[test]
    fn single_step_count_returns_only_initial_state() {
        let field = FnField::new(|x: f64, _: f64| x, |_: f64, y: f64| y);
        let traj = integrate(&field, State::new(1.0, 1.0), 0.1, 1).expect("integrate");
        assert_eq!(traj.states(), &[State::new(1.0, 1.0)]);
    }

    #[test]
    fn integrate_rejects_invalid_inputs() {
        let field = FnField::new(|x: f64, _: f64| x, |_: f64, y: f64| y);
        let err = integrate(&field, State::new(0.0, 0.0), 0.0, 5).expect_err("h = 0");
        assert!(err.to_string().contains("Step size"), "{err}");
        let err = integrate(&field, State::new(0.0, 0.0), 0.1, 0).expect_err("steps = 0");
        assert!(err.to_string().contains("at least one step"), "{err}");
        let err = integrate(&field, State::new(f64::NAN, 0.0), 0.1, 5).expect_err("nan initial");
        assert!(err.to_string().contains("finite"), "{err}");
    }

    #[test]
    fn blow_up_propagates_and_is_reported() {
        let field = FnField::new(|x: f64, _: f64| x * x, |_: f64, _: f64| 0.0);
        let traj = integrate(&field, State::new(1.0, 0.0), 0.5, 40).expect("integrate");
        assert_eq!(traj.len(), 40);
        match traj.ensure_finite() {
            Err(SimulationError::NonFinite { step, .. }) => assert!(step > 0),
            other => panic!("expected non-finite error, got {other:?}"),
        }
    }

    #[test]
    fn thinned_keeps_every_other_sample() {
        let field = FnField::new(|_: f64, _: f64| 1.0, |_: f64, _: f64| -1.0);
        let traj = integrate(&field, State::new(0.0, 0.0), 1.0, 5).expect("integrate");
        let thin = traj.thinned(2);
        assert_eq!(thin.len(), 3);
        assert!((thin[2].x - 4.0).abs() < 1e-12);
        assert!((thin[2].y + 4.0).abs() < 1e-12);
        assert_eq!(traj.thinned(0).len(), 5);
    }
}
