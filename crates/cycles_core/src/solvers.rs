use crate::traits::{DynamicalSystem, Scalar, Steppable};
use anyhow::{bail, Result};

/// Upper bound on the number of states a single run or axis may hold.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Classical fourth-order Runge-Kutta with stage buffers sized once for the system.
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    stage: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        let zeros = vec![T::zero(); dim];
        Self {
            k1: zeros.clone(),
            k2: zeros.clone(),
            k3: zeros.clone(),
            k4: zeros.clone(),
            stage: zeros,
        }
    }
}

/// `stage = state + scale * slope`, element-wise.
fn offset<T: Scalar>(stage: &mut [T], state: &[T], slope: &[T], scale: T) {
    for ((s, &x), &k) in stage.iter_mut().zip(state).zip(slope) {
        *s = x + scale * k;
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let two = T::one() + T::one();
        let half_dt = dt / two;
        let t0 = *t;

        system.apply(t0, state, &mut self.k1);
        offset(&mut self.stage, state, &self.k1, half_dt);
        system.apply(t0 + half_dt, &self.stage, &mut self.k2);
        offset(&mut self.stage, state, &self.k2, half_dt);
        system.apply(t0 + half_dt, &self.stage, &mut self.k3);
        offset(&mut self.stage, state, &self.k3, dt);
        system.apply(t0 + dt, &self.stage, &mut self.k4);

        // Weights 1, 2, 2, 1 over six.
        let weight = dt / (two + two + two);
        for (i, x) in state.iter_mut().enumerate() {
            *x = *x + weight * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }
        *t = t0 + dt;
    }
}

/// Iterates a map `x_{n+1} = f(x_n)`; each step is one iteration and advances `t` by `dt`.
pub struct DiscreteMap<T: Scalar> {
    next: Vec<T>,
}

impl<T: Scalar> DiscreteMap<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            next: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for DiscreteMap<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        system.apply(*t, state, &mut self.next);
        state.copy_from_slice(&self.next);
        *t = *t + dt;
    }
}

/// Runs `stepper` over `system` and records every state, starting with `initial`.
///
/// Returns exactly `samples` states, so `samples - 1` steps are taken.
pub fn simulate<S, St>(
    system: &S,
    stepper: &mut St,
    initial: &[f64],
    initial_time: f64,
    dt: f64,
    samples: usize,
) -> Result<Vec<Vec<f64>>>
where
    S: DynamicalSystem<f64>,
    St: Steppable<f64>,
{
    let dim = system.dimension();
    if initial.len() != dim {
        bail!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial.len()
        );
    }
    if samples == 0 {
        bail!("Simulation requires at least one sample.");
    }
    if samples > MAX_SAMPLES {
        bail!("Simulation of {samples} samples exceeds the limit of {MAX_SAMPLES}.");
    }
    if !dt.is_finite() || dt <= 0.0 {
        bail!("Step size dt must be positive and finite (got {dt}).");
    }

    let mut states = Vec::with_capacity(samples);
    let mut state = initial.to_vec();
    let mut t = initial_time;
    states.push(state.clone());
    for _ in 1..samples {
        stepper.step(system, &mut t, &mut state, dt);
        states.push(state.clone());
    }
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::{simulate, DiscreteMap, MAX_SAMPLES, RK4};
    use crate::traits::{DynamicalSystem, Steppable};

    struct Decay {
        rate: f64,
    }

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -self.rate * x[0];
        }
    }

    struct Doubling;

    impl DynamicalSystem<f64> for Doubling {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = 2.0 * x[0];
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn rk4_single_step_matches_taylor_series() {
        let system = Decay { rate: 1.0 };
        let mut rk4 = RK4::new(1);
        let mut t = 0.0;
        let mut state = [1.0];
        let h = 0.1;
        rk4.step(&system, &mut t, &mut state, h);
        // RK4 reproduces exp(-h) through the h^4 term.
        let expected = 1.0 - h + h * h / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert!((state[0] - expected).abs() < 1e-14, "got {}", state[0]);
        assert!((t - h).abs() < 1e-15);
    }

    #[test]
    fn discrete_map_iterates_function() {
        let states = simulate(&Doubling, &mut DiscreteMap::<f64>::new(1), &[1.0], 0.0, 1.0, 5)
            .expect("map should iterate");
        let values: Vec<f64> = states.iter().map(|s| s[0]).collect();
        assert_eq!(values, vec![1.0, 2.0, 4.0, 8.0, 16.0]);
    }

    #[test]
    fn simulate_rejects_invalid_inputs() {
        let system = Decay { rate: 1.0 };
        assert_err_contains(
            simulate(&system, &mut RK4::<f64>::new(1), &[1.0, 2.0], 0.0, 0.1, 3),
            "dimension mismatch",
        );
        assert_err_contains(
            simulate(&system, &mut RK4::<f64>::new(1), &[1.0], 0.0, 0.1, 0),
            "at least one sample",
        );
        assert_err_contains(
            simulate(&system, &mut RK4::<f64>::new(1), &[1.0], 0.0, 0.0, 3),
            "must be positive",
        );
        assert_err_contains(
            simulate(&system, &mut RK4::<f64>::new(1), &[1.0], 0.0, f64::NAN, 3),
            "must be positive",
        );
        assert_err_contains(
            simulate(&system, &mut RK4::<f64>::new(1), &[1.0], 0.0, 0.1, MAX_SAMPLES + 1),
            "exceeds the limit",
        );
    }

    #[test]
    fn simulate_single_sample_returns_initial_state() {
        let states = simulate(&Decay { rate: 3.0 }, &mut RK4::<f64>::new(1), &[0.7], 0.0, 0.5, 1)
            .expect("single sample");
        assert_eq!(states, vec![vec![0.7]]);
    }
}
