//! Samuelson multiplier-accelerator model.
//!
//! ```text
//! Y_t = G + (alpha + beta) * Y_{t-1} - beta * Y_{t-2}
//! ```
//!
//! `alpha` is the marginal propensity to consume, `beta` the accelerator. The recurrence
//! runs as a two-dimensional map on `(Y_{t-1}, Y_{t-2})`.

use crate::error::SimulationError;
use crate::grid::Axis;
use crate::solvers::{simulate as run_map, DiscreteMap};
use crate::traits::DynamicalSystem;
use anyhow::{bail, Context, Result};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamuelsonParams {
    pub alpha: f64,
    pub beta: f64,
}

impl SamuelsonParams {
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// `(alpha + beta)^2 < 4 beta`: the response oscillates.
    pub fn has_complex_roots(&self) -> bool {
        (self.alpha + self.beta).powi(2) < 4.0 * self.beta
    }

    pub fn is_stable(&self) -> bool {
        self.beta < 1.0
    }

    /// Roots of `z^2 - (alpha + beta) z + beta`.
    pub fn characteristic_roots(&self) -> [Complex<f64>; 2] {
        let trace = self.alpha + self.beta;
        let disc = Complex::new(trace * trace - 4.0 * self.beta, 0.0).sqrt();
        let half_trace = Complex::new(0.5 * trace, 0.0);
        [half_trace + 0.5 * disc, half_trace - 0.5 * disc]
    }

    /// Largest root modulus; `sqrt(beta)` whenever the roots are complex.
    pub fn spectral_radius(&self) -> f64 {
        if self.has_complex_roots() {
            self.beta.sqrt()
        } else {
            self.characteristic_roots()
                .iter()
                .map(|z| z.norm())
                .fold(0.0, f64::max)
        }
    }

    /// Cycle length implied by the root angle; infinite when the roots are real and positive.
    pub fn approx_period(&self) -> f64 {
        let cos_theta = ((self.alpha + self.beta) / (2.0 * self.beta.sqrt())).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        if theta > 0.0 {
            2.0 * PI / theta
        } else {
            f64::INFINITY
        }
    }
}

/// A one-off disturbance: the first two periods are imposed, the rest follow the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockScenario {
    pub horizon: usize,
    pub y0: f64,
    pub y1: f64,
    pub government: f64,
}

impl Default for ShockScenario {
    fn default() -> Self {
        Self {
            horizon: 80,
            y0: 0.0,
            y1: 1.0,
            government: 0.0,
        }
    }
}

struct SamuelsonMap {
    params: SamuelsonParams,
    government: f64,
}

impl DynamicalSystem<f64> for SamuelsonMap {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let SamuelsonParams { alpha, beta } = self.params;
        out[0] = self.government + (alpha + beta) * x[0] - beta * x[1];
        out[1] = x[0];
    }
}

/// Income path of length `scenario.horizon`, starting `y0, y1`.
pub fn simulate(params: SamuelsonParams, scenario: &ShockScenario) -> Result<Vec<f64>> {
    if scenario.horizon < 2 {
        bail!(
            "Samuelson horizon must cover the two initial periods (got {}).",
            scenario.horizon
        );
    }
    let system = SamuelsonMap {
        params,
        government: scenario.government,
    };
    let states = run_map(
        &system,
        &mut DiscreteMap::<f64>::new(2),
        &[scenario.y1, scenario.y0],
        1.0,
        1.0,
        scenario.horizon - 1,
    )?;
    let mut series = Vec::with_capacity(scenario.horizon);
    series.push(scenario.y0);
    series.extend(states.iter().map(|s| s[0]));
    Ok(series)
}

pub fn ensure_finite_series(series: &[f64]) -> Result<(), SimulationError> {
    match series.iter().position(|v| !v.is_finite()) {
        Some(period) => Err(SimulationError::NonFiniteSeries {
            period,
            value: series[period],
        }),
        None => Ok(()),
    }
}

/// Peak of the path above `baseline`, ignoring the first period.
pub fn overshoot(series: &[f64], baseline: f64) -> Option<f64> {
    series
        .iter()
        .skip(1)
        .map(|y| y - baseline)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub alpha: f64,
    pub beta: f64,
    pub overshoot: f64,
    pub spectral_radius: f64,
    pub approx_period: Option<f64>,
}

/// A rounded arithmetic range over `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    pub decimals: i32,
}

impl ParameterRange {
    pub fn values(&self) -> Result<Vec<f64>> {
        Axis::arange(self.start, self.stop, self.step, self.decimals)
    }
}

impl Default for ParameterRange {
    fn default() -> Self {
        Self {
            start: 0.1,
            stop: 0.991,
            step: 0.005,
            decimals: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrontierMethod {
    /// Complete non-dominated set.
    #[default]
    Exact,
    /// Single pass from the highest overshoot, accepting each record whose radius beats the
    /// best so far by more than `1e-6`, starting from a radius of one.
    Greedy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSearch {
    pub alpha: ParameterRange,
    pub beta: ParameterRange,
    pub scenario: ShockScenario,
    pub frontier: FrontierMethod,
    /// Radius ceiling for the "max bounce but safe" pick.
    pub safe_radius_cap: f64,
    /// Radius the "balanced" frontier pick aims for.
    pub balanced_radius: f64,
    pub table_rows: usize,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self {
            alpha: ParameterRange::default(),
            beta: ParameterRange::default(),
            scenario: ShockScenario::default(),
            frontier: FrontierMethod::default(),
            safe_radius_cap: 0.98,
            balanced_radius: 0.94,
            table_rows: 20,
        }
    }
}

/// Every stable, oscillating `(alpha, beta)` pair on the search grid with its shock metrics.
pub fn grid_search(search: &GridSearch) -> Result<Vec<CandidateRecord>> {
    let alphas = search.alpha.values().context("alpha range")?;
    let betas = search.beta.values().context("beta range")?;
    let mut records = Vec::new();
    for &alpha in &alphas {
        for &beta in &betas {
            let params = SamuelsonParams::new(alpha, beta);
            if !(params.is_stable() && params.has_complex_roots()) {
                continue;
            }
            let series = simulate(params, &search.scenario)?;
            ensure_finite_series(&series)
                .with_context(|| format!("Samuelson run with alpha = {alpha}, beta = {beta}"))?;
            let Some(peak) = overshoot(&series, 0.0) else {
                continue;
            };
            let period = params.approx_period();
            records.push(CandidateRecord {
                alpha,
                beta,
                overshoot: peak,
                spectral_radius: params.spectral_radius(),
                approx_period: period.is_finite().then_some(period),
            });
        }
    }
    if records.is_empty() {
        log::warn!("grid search found no stable oscillating parameter pairs");
    } else {
        log::debug!(
            "grid search kept {} of {} parameter pairs",
            records.len(),
            alphas.len() * betas.len()
        );
    }
    Ok(records)
}

/// Records trading overshoot (maximised) against spectral radius (minimised).
pub fn pareto_frontier(records: &[CandidateRecord], method: FrontierMethod) -> Vec<CandidateRecord> {
    let mut sorted = records.to_vec();
    let mut frontier = Vec::new();
    match method {
        FrontierMethod::Greedy => {
            sorted.sort_by(|a, b| b.overshoot.partial_cmp(&a.overshoot).unwrap_or(Ordering::Equal));
            let mut best_radius = 1.0;
            for record in sorted {
                if record.spectral_radius < best_radius - 1e-6 {
                    best_radius = record.spectral_radius;
                    frontier.push(record);
                }
            }
        }
        FrontierMethod::Exact => {
            sorted.sort_by(|a, b| {
                b.overshoot
                    .partial_cmp(&a.overshoot)
                    .unwrap_or(Ordering::Equal)
                    .then(
                        a.spectral_radius
                            .partial_cmp(&b.spectral_radius)
                            .unwrap_or(Ordering::Equal),
                    )
            });
            let mut best_radius = f64::INFINITY;
            for record in sorted {
                if record.spectral_radius < best_radius {
                    best_radius = record.spectral_radius;
                    frontier.push(record);
                }
            }
        }
    }
    frontier
}

/// Highest overshoot among records whose radius does not exceed `cap`.
pub fn max_bounce_within(records: &[CandidateRecord], cap: f64) -> Option<CandidateRecord> {
    records
        .iter()
        .filter(|r| r.spectral_radius <= cap)
        .fold(None, |best: Option<&CandidateRecord>, r| match best {
            Some(b) if b.overshoot >= r.overshoot => Some(b),
            _ => Some(r),
        })
        .copied()
}

/// Frontier record whose radius is closest to `target`.
pub fn balanced(frontier: &[CandidateRecord], target: f64) -> Option<CandidateRecord> {
    frontier
        .iter()
        .fold(None, |best: Option<&CandidateRecord>, r| match best {
            Some(b) if (b.spectral_radius - target).abs() <= (r.spectral_radius - target).abs() => {
                Some(b)
            }
            _ => Some(r),
        })
        .copied()
}

/// The "max bounce but safe" and "balanced" picks, without duplicates.
pub fn operating_points(
    records: &[CandidateRecord],
    frontier: &[CandidateRecord],
    search: &GridSearch,
) -> Vec<CandidateRecord> {
    let mut picks: Vec<CandidateRecord> = Vec::with_capacity(2);
    for pick in [
        max_bounce_within(records, search.safe_radius_cap),
        balanced(frontier, search.balanced_radius),
    ]
    .into_iter()
    .flatten()
    {
        if !picks.contains(&pick) {
            picks.push(pick);
        }
    }
    picks
}

/// Fixed parameter pairs compared side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePairs {
    pub alpha: f64,
    pub betas: Vec<f64>,
    pub scenario: ShockScenario,
}

impl Default for ReferencePairs {
    fn default() -> Self {
        Self {
            alpha: 0.99,
            betas: vec![0.94, 0.885],
            scenario: ShockScenario::default(),
        }
    }
}

impl ReferencePairs {
    pub fn params(&self) -> Vec<SamuelsonParams> {
        self.betas
            .iter()
            .map(|&beta| SamuelsonParams::new(self.alpha, beta))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        balanced, grid_search, max_bounce_within, operating_points, overshoot, pareto_frontier,
        simulate, CandidateRecord, FrontierMethod, GridSearch, SamuelsonParams, ShockScenario,
    };

    fn record(overshoot: f64, spectral_radius: f64) -> CandidateRecord {
        CandidateRecord {
            alpha: 0.5,
            beta: spectral_radius * spectral_radius,
            overshoot,
            spectral_radius,
            approx_period: None,
        }
    }

    #[test]
    fn simulate_follows_recurrence() {
        let series = simulate(SamuelsonParams::new(0.99, 0.94), &ShockScenario::default())
            .expect("simulate");
        assert_eq!(series.len(), 80);
        assert_eq!(series[0], 0.0);
        assert_eq!(series[1], 1.0);
        assert!((series[2] - 1.93).abs() < 1e-12);
        assert!((series[3] - 2.7849).abs() < 1e-12);
        assert!((series[4] - 3.560657).abs() < 1e-12);
    }

    #[test]
    fn simulate_adds_government_spending() {
        let scenario = ShockScenario {
            horizon: 3,
            y0: 1.0,
            y1: 1.0,
            government: 2.0,
        };
        let series = simulate(SamuelsonParams::new(0.5, 0.25), &scenario).expect("simulate");
        assert_eq!(series, vec![1.0, 1.0, 2.0 + 0.75 - 0.25]);
    }

    #[test]
    fn simulate_rejects_short_horizon() {
        let scenario = ShockScenario {
            horizon: 1,
            ..ShockScenario::default()
        };
        assert!(simulate(SamuelsonParams::new(0.5, 0.5), &scenario).is_err());
    }

    #[test]
    fn root_diagnostics() {
        let p = SamuelsonParams::new(0.99, 0.94);
        assert!(p.has_complex_roots());
        assert!(p.is_stable());
        assert!((p.spectral_radius() - 0.94f64.sqrt()).abs() < 1e-15);
        for root in p.characteristic_roots() {
            assert!((root.norm() - 0.94f64.sqrt()).abs() < 1e-12);
        }
        let cos_theta = 1.93 / (2.0 * 0.94f64.sqrt());
        let expected = 2.0 * std::f64::consts::PI / cos_theta.acos();
        assert!((p.approx_period() - expected).abs() < 1e-9);

        let real = SamuelsonParams::new(0.9, 0.1);
        assert!(!real.has_complex_roots());
        let roots = real.characteristic_roots();
        let largest = roots.iter().map(|z| z.norm()).fold(0.0, f64::max);
        assert!((real.spectral_radius() - largest).abs() < 1e-15);
        assert!(roots.iter().all(|z| z.im == 0.0));
    }

    #[test]
    fn overshoot_ignores_first_period() {
        assert_eq!(overshoot(&[5.0, 1.0, 2.0, -1.0], 0.0), Some(2.0));
        assert_eq!(overshoot(&[5.0, 1.0, 2.0], 1.5), Some(0.5));
        assert_eq!(overshoot(&[5.0], 0.0), None);
    }

    #[test]
    fn exact_frontier_drops_dominated_records() {
        let records = vec![
            record(3.0, 0.9),
            record(2.0, 0.95),
            record(2.0, 0.8),
            record(1.0, 0.85),
            record(1.0, 0.5),
        ];
        let frontier = pareto_frontier(&records, FrontierMethod::Exact);
        let radii: Vec<f64> = frontier.iter().map(|r| r.spectral_radius).collect();
        assert_eq!(radii, vec![0.9, 0.8, 0.5]);
    }

    #[test]
    fn greedy_frontier_skips_radii_above_one() {
        let records = vec![record(3.0, 1.2), record(2.0, 0.9), record(1.0, 0.9 - 1e-7)];
        let greedy = pareto_frontier(&records, FrontierMethod::Greedy);
        let radii: Vec<f64> = greedy.iter().map(|r| r.spectral_radius).collect();
        assert_eq!(radii, vec![0.9]);
        let exact = pareto_frontier(&records, FrontierMethod::Exact);
        assert_eq!(exact.len(), 3);
    }

    #[test]
    fn default_grid_search_matches_reference_picks() {
        let search = GridSearch::default();
        let records = grid_search(&search).expect("grid search");
        assert_eq!(records.len(), 28069);
        assert!(records.iter().all(|r| r.beta < 1.0));

        let exact = pareto_frontier(&records, FrontierMethod::Exact);
        let greedy = pareto_frontier(&records, FrontierMethod::Greedy);
        assert_eq!(exact.len(), 149);
        assert_eq!(greedy.len(), 149);
        assert_eq!((exact[0].alpha, exact[0].beta), (0.99, 0.99));

        let safe = max_bounce_within(&records, 0.98).expect("safe pick");
        assert_eq!((safe.alpha, safe.beta), (0.99, 0.96));
        let mid = balanced(&exact, 0.94).expect("balanced pick");
        assert_eq!((mid.alpha, mid.beta), (0.99, 0.885));

        let picks = operating_points(&records, &exact, &search);
        assert_eq!(picks.len(), 2);
    }
}
