use crate::trajectory::State;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Floating-point type the steppers run on.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A system on `R^n`: either a flow (`apply` writes `dx/dt`) or a map (`apply` writes
/// `x_{n+1}`).
pub trait DynamicalSystem<T: Scalar> {
    fn dimension(&self) -> usize;

    /// Writes the right-hand side at `(t, x)` into `out`, which has `dimension()` entries.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// Advances a system by one step, updating `t` and `state` in place.
pub trait Steppable<T: Scalar> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// An autonomous vector field on the plane.
///
/// Every model with two state variables implements this; the integrator,
/// the contour tracer and the Newton solver only ever see this trait.
pub trait PlanarField {
    fn derivative(&self, state: State) -> State;

    /// Row-major Jacobian `[[df/dx, df/dy], [dg/dx, dg/dy]]`.
    /// The default uses central differences; models with closed-form partials override it.
    fn jacobian(&self, state: State) -> [[f64; 2]; 2] {
        let hx = 1e-6 * state.x.abs().max(1.0);
        let hy = 1e-6 * state.y.abs().max(1.0);
        let dx_plus = self.derivative(State::new(state.x + hx, state.y));
        let dx_minus = self.derivative(State::new(state.x - hx, state.y));
        let dy_plus = self.derivative(State::new(state.x, state.y + hy));
        let dy_minus = self.derivative(State::new(state.x, state.y - hy));
        [
            [
                (dx_plus.x - dx_minus.x) / (2.0 * hx),
                (dy_plus.x - dy_minus.x) / (2.0 * hy),
            ],
            [
                (dx_plus.y - dx_minus.y) / (2.0 * hx),
                (dy_plus.y - dy_minus.y) / (2.0 * hy),
            ],
        ]
    }

    /// `df/dx + dg/dy`.
    fn divergence(&self, state: State) -> f64 {
        let jac = self.jacobian(state);
        jac[0][0] + jac[1][1]
    }
}

impl<F: PlanarField + ?Sized> PlanarField for &F {
    fn derivative(&self, state: State) -> State {
        (**self).derivative(state)
    }

    fn jacobian(&self, state: State) -> [[f64; 2]; 2] {
        (**self).jacobian(state)
    }

    fn divergence(&self, state: State) -> f64 {
        (**self).divergence(state)
    }
}

/// Exposes a `PlanarField` to the slice-based steppers.
pub struct FieldSystem<'a, F: PlanarField + ?Sized> {
    field: &'a F,
}

impl<'a, F: PlanarField + ?Sized> FieldSystem<'a, F> {
    pub fn new(field: &'a F) -> Self {
        Self { field }
    }
}

impl<F: PlanarField + ?Sized> DynamicalSystem<f64> for FieldSystem<'_, F> {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let d = self.field.derivative(State::new(x[0], x[1]));
        out[0] = d.x;
        out[1] = d.y;
    }
}

/// A planar field assembled from a pair of scalar functions `f(x, y)` and `g(x, y)`.
#[derive(Clone, Copy)]
pub struct FnField<F, G> {
    f: F,
    g: G,
}

impl<F, G> FnField<F, G>
where
    F: Fn(f64, f64) -> f64,
    G: Fn(f64, f64) -> f64,
{
    pub fn new(f: F, g: G) -> Self {
        Self { f, g }
    }
}

impl<F, G> PlanarField for FnField<F, G>
where
    F: Fn(f64, f64) -> f64,
    G: Fn(f64, f64) -> f64,
{
    fn derivative(&self, state: State) -> State {
        State::new((self.f)(state.x, state.y), (self.g)(state.x, state.y))
    }
}

#[cfg(test)]
mod tests {
    use super::{DynamicalSystem, FieldSystem, FnField, PlanarField};
    use crate::trajectory::State;

    #[test]
    fn finite_difference_jacobian_matches_polynomial_partials() {
        let field = FnField::new(|x: f64, y: f64| x * x * y, |x: f64, y: f64| x - 3.0 * y * y);
        let jac = field.jacobian(State::new(1.5, -2.0));
        let expected = [[2.0 * 1.5 * -2.0, 1.5 * 1.5], [1.0, -6.0 * -2.0]];
        for i in 0..2 {
            for j in 0..2 {
                assert!(
                    (jac[i][j] - expected[i][j]).abs() < 1e-6,
                    "entry ({i}, {j}): got {}, expected {}",
                    jac[i][j],
                    expected[i][j]
                );
            }
        }
        assert!((field.divergence(State::new(1.5, -2.0)) - (-6.0 + 12.0)).abs() < 1e-6);
    }

    #[test]
    fn field_system_writes_both_components() {
        let field = FnField::new(|x: f64, _y: f64| 2.0 * x, |_x: f64, y: f64| y - 1.0);
        let system = FieldSystem::new(&field);
        let mut out = [0.0; 2];
        system.apply(0.0, &[3.0, 4.0], &mut out);
        assert_eq!(system.dimension(), 2);
        assert_eq!(out, [6.0, 3.0]);
    }
}
