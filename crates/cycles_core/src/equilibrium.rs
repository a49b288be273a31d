use crate::traits::PlanarField;
use crate::trajectory::State;
use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{Complex, Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Unstable,
}

/// An intersection of two sampled curves, i.e. a zero of their difference `F`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub location: f64,
    /// Discrete `dF/dY` at the sample nearest `location`.
    pub slope: f64,
    pub stability: Stability,
}

/// How samples that are exactly zero are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroCrossingPolicy {
    /// A sample with `F == 0` is reported as a root at that grid point.
    #[default]
    IncludeGridZeros,
    /// Only strict sign changes between neighbours count.
    StrictSignChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RootScanSettings {
    pub policy: ZeroCrossingPolicy,
}

/// Discrete derivative of `values` over a possibly non-uniform `grid`.
///
/// Interior points use the second-order three-point formula; the two ends use
/// one-sided differences.
pub fn gradient(grid: &[f64], values: &[f64]) -> Result<Vec<f64>> {
    validate_samples(grid, values)?;
    let n = grid.len();
    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / (grid[1] - grid[0]);
    out[n - 1] = (values[n - 1] - values[n - 2]) / (grid[n - 1] - grid[n - 2]);
    for i in 1..n - 1 {
        let hd = grid[i] - grid[i - 1];
        let hs = grid[i + 1] - grid[i];
        out[i] = (hd * hd * values[i + 1] + (hs * hs - hd * hd) * values[i] - hs * hs * values[i - 1])
            / (hs * hd * (hd + hs));
    }
    Ok(out)
}

/// Locates the zeros of a sampled function and labels each by the sign of its slope.
///
/// Sign changes between neighbouring samples are refined by linear interpolation;
/// intervals whose interpolation is undefined are skipped. No zero is an empty result.
pub fn classify_equilibria(
    grid: &[f64],
    values: &[f64],
    settings: RootScanSettings,
) -> Result<Vec<Equilibrium>> {
    let slopes = gradient(grid, values)?;

    let mut roots = Vec::new();
    if settings.policy == ZeroCrossingPolicy::IncludeGridZeros {
        roots.extend(
            grid.iter()
                .zip(values)
                .filter(|(_, v)| **v == 0.0)
                .map(|(y, _)| *y),
        );
    }
    for i in 0..grid.len() - 1 {
        let (y0, y1) = (grid[i], grid[i + 1]);
        let (f0, f1) = (values[i], values[i + 1]);
        if sign(f0) * sign(f1) >= 0.0 {
            continue;
        }
        let denominator = f1 - f0;
        if denominator == 0.0 {
            continue;
        }
        let estimate = y0 - f0 * (y1 - y0) / denominator;
        if estimate.is_finite() {
            roots.push(estimate);
        }
    }
    roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let equilibria: Vec<Equilibrium> = roots
        .into_iter()
        .map(|location| {
            let slope = slopes[nearest_index(grid, location)];
            Equilibrium {
                location,
                slope,
                stability: if slope < 0.0 {
                    Stability::Stable
                } else {
                    Stability::Unstable
                },
            }
        })
        .collect();

    log::debug!("found {} equilibria over {} samples", equilibria.len(), grid.len());
    Ok(equilibria)
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn nearest_index(grid: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, y) in grid.iter().enumerate() {
        let distance = (y - target).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

fn validate_samples(grid: &[f64], values: &[f64]) -> Result<()> {
    if grid.len() != values.len() {
        bail!(
            "Grid and value lengths differ ({} vs {}).",
            grid.len(),
            values.len()
        );
    }
    if grid.len() < 2 {
        bail!("At least two samples are required (got {}).", grid.len());
    }
    if grid.iter().any(|y| !y.is_finite()) {
        bail!("Grid values must be finite.");
    }
    if let Some(i) = grid.windows(2).position(|w| w[1] <= w[0]) {
        bail!(
            "Grid must be strictly increasing (grid[{}] = {} >= grid[{}] = {}).",
            i,
            grid[i],
            i + 1,
            grid[i + 1]
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    pub max_steps: usize,
    pub damping: f64,
    pub tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_steps: 25,
            damping: 1.0,
            tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedPointKind {
    StableNode,
    UnstableNode,
    StableFocus,
    UnstableFocus,
    Saddle,
    Center,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanarEquilibrium {
    pub state: State,
    pub residual_norm: f64,
    pub iterations: usize,
    pub jacobian: [[f64; 2]; 2],
    pub eigenvalues: Vec<ComplexNumber>,
    pub kind: FixedPointKind,
}

/// Damped Newton iteration for `field(state) = 0`, followed by a linear classification
/// of the fixed point from the eigenvalues of its Jacobian.
pub fn solve_planar_equilibrium<F: PlanarField + ?Sized>(
    field: &F,
    initial_guess: State,
    settings: NewtonSettings,
) -> Result<PlanarEquilibrium> {
    if !initial_guess.is_finite() {
        bail!("Initial guess must be finite.");
    }
    if settings.max_steps == 0 {
        bail!("max_steps must be greater than zero.");
    }
    if settings.damping <= 0.0 {
        bail!("damping must be positive.");
    }
    if settings.tolerance <= 0.0 {
        bail!("tolerance must be positive.");
    }

    let mut state = initial_guess;
    let mut residual = field.derivative(state);
    let mut residual_norm = residual.x.hypot(residual.y);
    let mut iterations = 0usize;

    loop {
        if residual_norm <= settings.tolerance {
            break;
        }
        if !residual_norm.is_finite() {
            bail!(
                "Newton iteration left the finite domain at ({}, {}).",
                state.x,
                state.y
            );
        }
        if iterations >= settings.max_steps {
            bail!(
                "Newton solver failed to converge in {} steps (‖f(x)‖ = {}).",
                settings.max_steps,
                residual_norm
            );
        }

        let jacobian = field.jacobian(state);
        let delta = solve_linear_system(&jacobian, residual)
            .context("Failed to solve linear system during Newton iteration.")?;
        state.x -= settings.damping * delta[0];
        state.y -= settings.damping * delta[1];

        iterations += 1;
        residual = field.derivative(state);
        residual_norm = residual.x.hypot(residual.y);
    }

    let jacobian = field.jacobian(state);
    let eigenvalues = eigenvalues(&jacobian);
    let kind = classify_fixed_point(&eigenvalues);
    log::debug!(
        "equilibrium at ({:.6}, {:.6}) after {} Newton steps: {:?}",
        state.x,
        state.y,
        iterations,
        kind
    );

    Ok(PlanarEquilibrium {
        state,
        residual_norm,
        iterations,
        jacobian,
        eigenvalues: eigenvalues.into_iter().map(ComplexNumber::from).collect(),
        kind,
    })
}

fn to_matrix(jacobian: &[[f64; 2]; 2]) -> Matrix2<f64> {
    Matrix2::new(
        jacobian[0][0],
        jacobian[0][1],
        jacobian[1][0],
        jacobian[1][1],
    )
}

fn solve_linear_system(jacobian: &[[f64; 2]; 2], residual: State) -> Result<Vector2<f64>> {
    let rhs = Vector2::new(residual.x, residual.y);
    to_matrix(jacobian)
        .lu()
        .solve(&rhs)
        .ok_or_else(|| anyhow!("Jacobian is singular."))
}

fn eigenvalues(jacobian: &[[f64; 2]; 2]) -> Vec<Complex<f64>> {
    to_matrix(jacobian).complex_eigenvalues().iter().copied().collect()
}

fn classify_fixed_point(eigenvalues: &[Complex<f64>]) -> FixedPointKind {
    const IMAG_EPS: f64 = 1e-12;
    let oscillatory = eigenvalues.iter().any(|l| l.im.abs() > IMAG_EPS);
    if oscillatory {
        let re = eigenvalues[0].re;
        return if re.abs() <= IMAG_EPS {
            FixedPointKind::Center
        } else if re < 0.0 {
            FixedPointKind::StableFocus
        } else {
            FixedPointKind::UnstableFocus
        };
    }
    let negatives = eigenvalues.iter().filter(|l| l.re < 0.0).count();
    match negatives {
        2 => FixedPointKind::StableNode,
        0 => FixedPointKind::UnstableNode,
        _ => FixedPointKind::Saddle,
    }
}
