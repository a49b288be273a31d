//! One entry point per study: build the model from configuration, run it, and collect
//! the figures and numbers a front end displays.

use crate::charts::{self, Figure, LabelledSeries};
use crate::equilibrium::{
    solve_planar_equilibrium, Equilibrium, NewtonSettings, PlanarEquilibrium, RootScanSettings,
};
use crate::grid::Axis;
use crate::models::goodwin::GoodwinCycle;
use crate::models::kaldor::{KaldorModel, KaldorParams, KaldorRun, PhaseWindow};
use crate::models::kaldor_curves::{default_domain, KaldorCurveParams, KaldorCurves};
use crate::models::linear::DivergenceWindow;
use crate::models::policy::{default_instruments, PolicyInstrument};
use crate::models::samuelson::{
    self, ensure_finite_series, grid_search, operating_points, pareto_frontier, CandidateRecord,
    GridSearch, ReferencePairs,
};
use crate::solvers::MAX_SAMPLES;
use crate::spectrum::dominant_period;
use crate::trajectory::{integrate, State};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Study {
    Goodwin,
    KaldorPhase,
    KaldorCurves,
    SamuelsonFrontier,
    SamuelsonReference,
    PolicyModes,
    Divergence,
}

impl Study {
    pub const ALL: [Study; 7] = [
        Study::Goodwin,
        Study::KaldorPhase,
        Study::KaldorCurves,
        Study::SamuelsonFrontier,
        Study::SamuelsonReference,
        Study::PolicyModes,
        Study::Divergence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Study::Goodwin => "goodwin",
            Study::KaldorPhase => "kaldor-phase",
            Study::KaldorCurves => "kaldor-curves",
            Study::SamuelsonFrontier => "samuelson-frontier",
            Study::SamuelsonReference => "samuelson-reference",
            Study::PolicyModes => "policy-modes",
            Study::Divergence => "divergence",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Study::Goodwin => "Employment / wage-share orbit of the Goodwin cycle",
            Study::KaldorPhase => "Two-variable Kaldor system: phase portrait and time series",
            Study::KaldorCurves => "One-variable Kaldor curves and their equilibria",
            Study::SamuelsonFrontier => "Samuelson grid search and overshoot / risk frontier",
            Study::SamuelsonReference => "Samuelson shock responses for fixed reference pairs",
            Study::PolicyModes => "Brake and accelerate policy instruments",
            Study::Divergence => "Source and sink vector fields",
        }
    }
}

impl fmt::Display for Study {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Study {
    type Err = anyhow::Error;

    /// Accepts the kebab-case names, ignoring case and treating `_` as `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Study::ALL
            .into_iter()
            .find(|study| study.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Study::ALL.iter().map(|s| s.name()).collect();
                anyhow!("Unknown study '{s}'. Known studies: {}.", known.join(", "))
            })
    }
}

/// Parameters for every study. Partial JSON overrides keep the remaining defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub goodwin: GoodwinCycle,
    pub kaldor: KaldorParams,
    pub kaldor_run: KaldorRun,
    pub phase_window: PhaseWindow,
    /// Newton starting point for the reported equilibrium; the end of the run when absent.
    pub equilibrium_guess: Option<State>,
    pub newton: NewtonSettings,
    pub kaldor_curves: KaldorCurveParams,
    pub curve_domain: Axis,
    pub direction_segments: usize,
    pub root_scan: RootScanSettings,
    pub grid_search: GridSearch,
    pub reference: ReferencePairs,
    pub instruments: Vec<PolicyInstrument>,
    pub divergence_window: DivergenceWindow,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            goodwin: GoodwinCycle::default(),
            kaldor: KaldorParams::default(),
            kaldor_run: KaldorRun::default(),
            phase_window: PhaseWindow::default(),
            equilibrium_guess: None,
            newton: NewtonSettings::default(),
            kaldor_curves: KaldorCurveParams::default(),
            curve_domain: default_domain(),
            direction_segments: 9,
            root_scan: RootScanSettings::default(),
            grid_search: GridSearch::default(),
            reference: ReferencePairs::default(),
            instruments: default_instruments(),
            divergence_window: DivergenceWindow::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub study: Study,
    pub figures: Vec<Figure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equilibria: Vec<Equilibrium>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planar_equilibrium: Option<PlanarEquilibrium>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_period: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frontier: Vec<CandidateRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operating_points: Vec<CandidateRecord>,
}

impl StudyReport {
    fn new(study: Study, figures: Vec<Figure>) -> Self {
        Self {
            study,
            figures,
            equilibria: Vec::new(),
            planar_equilibrium: None,
            cycle_period: None,
            frontier: Vec::new(),
            operating_points: Vec::new(),
        }
    }
}

pub fn run_study(study: Study, config: &StudyConfig) -> Result<StudyReport> {
    log::debug!("running study {study}");
    let report = match study {
        Study::Goodwin => StudyReport::new(study, vec![charts::goodwin_orbit(&config.goodwin)?]),
        Study::KaldorPhase => kaldor_phase(config)?,
        Study::KaldorCurves => kaldor_curves(config)?,
        Study::SamuelsonFrontier => samuelson_frontier(config)?,
        Study::SamuelsonReference => samuelson_reference(config)?,
        Study::PolicyModes => {
            if config.instruments.is_empty() {
                log::warn!("no policy instruments configured");
            }
            StudyReport::new(study, vec![charts::policy_modes(&config.instruments)])
        }
        Study::Divergence => StudyReport::new(
            study,
            charts::divergence_panels(&config.divergence_window)?,
        ),
    };
    log::debug!("study {study} produced {} figures", report.figures.len());
    Ok(report)
}

/// Dominant period of the second half of `samples`; `None` once the signal has settled.
fn settled_cycle_period(samples: &[f64], dt: f64) -> Option<f64> {
    let tail = &samples[samples.len() / 2..];
    let (lo, hi) = tail
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !(hi - lo).is_finite() || hi - lo < 1e-6 {
        return None;
    }
    dominant_period(tail, dt)
}

fn kaldor_phase(config: &StudyConfig) -> Result<StudyReport> {
    let model = KaldorModel::new(config.kaldor);
    let run = &config.kaldor_run;
    let steps = run.steps();
    if steps == 0 {
        bail!(
            "Kaldor run needs a positive horizon and step size (got horizon = {}, h = {}).",
            run.horizon,
            run.step_size
        );
    }
    if steps > MAX_SAMPLES {
        bail!(
            "Kaldor run of horizon = {} with h = {} needs more than {MAX_SAMPLES} samples.",
            run.horizon,
            run.step_size
        );
    }
    let trajectory = integrate(&model, run.initial, run.step_size, steps)?;
    trajectory
        .ensure_finite()
        .with_context(|| format!("Kaldor trajectory diverged with {:?}", config.kaldor))?;

    let guess = match (config.equilibrium_guess, trajectory.last()) {
        (Some(guess), _) | (None, Some(guess)) => guess,
        (None, None) => run.initial,
    };
    let planar_equilibrium = match solve_planar_equilibrium(&model, guess, config.newton) {
        Ok(eq) => {
            log::info!(
                "Kaldor equilibrium at (Y, K) = ({:.5}, {:.5}): {:?}",
                eq.state.x,
                eq.state.y,
                eq.kind
            );
            Some(eq)
        }
        Err(err) => {
            log::warn!("no Kaldor equilibrium from ({}, {}): {err:#}", guess.x, guess.y);
            None
        }
    };
    let cycle_period = settled_cycle_period(&trajectory.xs(), run.step_size);
    match cycle_period {
        Some(period) => log::info!("Kaldor income oscillates with period {period:.3}"),
        None => log::info!("Kaldor income settles without a sustained cycle"),
    }

    let figures = vec![
        charts::kaldor_phase_portrait(&model, &config.phase_window, &trajectory)?,
        charts::kaldor_time_series(&trajectory),
    ];
    Ok(StudyReport {
        planar_equilibrium,
        cycle_period,
        ..StudyReport::new(Study::KaldorPhase, figures)
    })
}

fn kaldor_curves(config: &StudyConfig) -> Result<StudyReport> {
    let curves = KaldorCurves::new(config.kaldor_curves);
    let equilibria = curves.equilibria(&config.curve_domain, config.root_scan)?;
    let markers = curves.direction_markers(&config.curve_domain, config.direction_segments)?;
    if equilibria.is_empty() {
        log::warn!("investment and saving curves do not intersect on the domain");
    } else {
        log::info!("found {} equilibria on the Kaldor curves", equilibria.len());
    }
    let figure = charts::kaldor_curves(&curves, &config.curve_domain, &equilibria, &markers)?;
    Ok(StudyReport {
        equilibria,
        ..StudyReport::new(Study::KaldorCurves, vec![figure])
    })
}

fn samuelson_frontier(config: &StudyConfig) -> Result<StudyReport> {
    let search = &config.grid_search;
    let records = grid_search(search)?;
    let frontier = pareto_frontier(&records, search.frontier);
    let picks = operating_points(&records, &frontier, search);
    log::info!(
        "{} candidates, {} on the frontier, {} operating points",
        records.len(),
        frontier.len(),
        picks.len()
    );

    let mut series = Vec::with_capacity(picks.len());
    for pick in &picks {
        let values = samuelson::simulate(
            samuelson::SamuelsonParams::new(pick.alpha, pick.beta),
            &search.scenario,
        )?;
        series.push(LabelledSeries {
            label: format!(
                "α={}, β={}, ρ≈{:.3}, peak≈{:.2}",
                pick.alpha, pick.beta, pick.spectral_radius, pick.overshoot
            ),
            values,
        });
    }
    let figure = charts::samuelson_responses(
        "samuelson-frontier",
        "Rebound after a unit shock (Y0 = 0, Y1 = 1): Samuelson model",
        &series,
    );
    Ok(StudyReport {
        frontier: frontier.into_iter().take(search.table_rows).collect(),
        operating_points: picks,
        ..StudyReport::new(Study::SamuelsonFrontier, vec![figure])
    })
}

fn samuelson_reference(config: &StudyConfig) -> Result<StudyReport> {
    let reference = &config.reference;
    if reference.betas.is_empty() {
        log::warn!("no reference accelerator values configured");
    }
    let mut series = Vec::with_capacity(reference.betas.len());
    for params in reference.params() {
        let values = samuelson::simulate(params, &reference.scenario)?;
        ensure_finite_series(&values)
            .with_context(|| format!("Samuelson response diverged with {params:?}"))?;
        series.push(LabelledSeries {
            label: format!(
                "α={}, β={} (ρ≈{:.3})",
                params.alpha,
                params.beta,
                params.spectral_radius()
            ),
            values,
        });
    }
    let figure = charts::samuelson_responses(
        "samuelson-reference",
        "Response to a unit shock: long-run safety vs. maximum rebound",
        &series,
    );
    Ok(StudyReport::new(Study::SamuelsonReference, vec![figure]))
}

#[cfg(test)]
mod tests {
    use super::{run_study, Study, StudyConfig};
    use crate::equilibrium::{FixedPointKind, Stability};
    use crate::models::kaldor::{KaldorParams, KaldorRun};
    use crate::models::samuelson::FrontierMethod;
    use crate::trajectory::State;

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        match result {
            Ok(value) => panic!("expected error containing '{needle}', got {value:?}"),
            Err(err) => {
                let message = format!("{err:#}");
                assert!(message.contains(needle), "'{message}' lacks '{needle}'");
            }
        }
    }

    #[test]
    fn names_round_trip() {
        for study in Study::ALL {
            assert_eq!(study.to_string().parse::<Study>().expect("parse"), study);
        }
        assert_eq!("Kaldor_Phase".parse::<Study>().expect("parse"), Study::KaldorPhase);
        assert_err_contains("lorenz".parse::<Study>(), "Known studies");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: StudyConfig =
            serde_json::from_str(r#"{"kaldor": {"delta": 0.4}, "grid_search": {"frontier": "greedy"}}"#)
                .expect("config");
        assert_eq!(config.kaldor.delta, 0.4);
        assert_eq!(config.kaldor.b, 2.2);
        assert_eq!(config.grid_search.frontier, FrontierMethod::Greedy);
        assert_eq!(config.grid_search.safe_radius_cap, 0.98);
        assert_eq!(config.direction_segments, 9);
    }

    #[test]
    fn nested_range_and_axis_overrides_keep_other_fields() {
        let config: StudyConfig = serde_json::from_str(
            r#"{"grid_search": {"alpha": {"stop": 0.5}}, "curve_domain": {"samples": 100}}"#,
        )
        .expect("config");
        assert_eq!(config.grid_search.alpha.stop, 0.5);
        assert_eq!(config.grid_search.alpha.start, 0.1);
        assert_eq!(config.grid_search.alpha.step, 0.005);
        assert_eq!(config.grid_search.alpha.decimals, 3);
        assert_eq!(config.grid_search.beta.stop, 0.991);
        assert_eq!(config.curve_domain.samples, 100);
        assert_eq!(config.curve_domain.min, 0.0);
        assert_eq!(config.curve_domain.max, 10.0);
    }

    #[test]
    fn kaldor_phase_settles_on_upper_node() {
        let config = StudyConfig {
            kaldor_run: KaldorRun {
                horizon: 200.0,
                ..KaldorRun::default()
            },
            ..StudyConfig::default()
        };
        let report = run_study(Study::KaldorPhase, &config).expect("study");
        assert_eq!(report.figures.len(), 2);
        let eq = report.planar_equilibrium.expect("equilibrium");
        assert_eq!(eq.kind, FixedPointKind::StableNode);
        assert!((eq.state.x - 2.96148).abs() < 1e-4, "{:?}", eq.state);
        assert_eq!(report.cycle_period, None);
    }

    #[test]
    fn kaldor_phase_reports_blow_up_with_parameters() {
        let config = StudyConfig {
            kaldor: KaldorParams {
                c: -0.18,
                ..KaldorParams::default()
            },
            kaldor_run: KaldorRun {
                initial: State::new(2.0, 0.1),
                step_size: 0.02,
                horizon: 200.0,
            },
            ..StudyConfig::default()
        };
        assert_err_contains(run_study(Study::KaldorPhase, &config), "diverged");
    }

    #[test]
    fn kaldor_curves_report_three_equilibria() {
        let report = run_study(Study::KaldorCurves, &StudyConfig::default()).expect("study");
        let stabilities: Vec<Stability> = report.equilibria.iter().map(|e| e.stability).collect();
        assert_eq!(
            stabilities,
            vec![Stability::Unstable, Stability::Stable, Stability::Unstable]
        );
    }

    #[test]
    fn samuelson_frontier_fills_table() {
        let report = run_study(Study::SamuelsonFrontier, &StudyConfig::default()).expect("study");
        assert_eq!(report.frontier.len(), 20);
        assert_eq!(report.operating_points.len(), 2);
        let json = serde_json::to_value(&report).expect("serialise");
        assert_eq!(json["study"], "samuelson-frontier");
        assert!(json.get("planar_equilibrium").is_none());
        assert_eq!(json["figures"][0]["layers"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn every_study_runs_with_defaults() {
        let config = StudyConfig {
            kaldor_run: KaldorRun {
                horizon: 20.0,
                ..KaldorRun::default()
            },
            ..StudyConfig::default()
        };
        for study in Study::ALL {
            let report = run_study(study, &config).expect("study");
            assert_eq!(report.study, study);
            assert!(!report.figures.is_empty(), "{study} has no figures");
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let config = StudyConfig {
            kaldor_run: KaldorRun {
                horizon: 0.0,
                ..KaldorRun::default()
            },
            ..StudyConfig::default()
        };
        assert_err_contains(run_study(Study::KaldorPhase, &config), "positive horizon");
    }

    #[test]
    fn oversized_horizon_is_rejected_with_run_settings() {
        let config = StudyConfig {
            kaldor_run: KaldorRun {
                horizon: 1e25,
                ..KaldorRun::default()
            },
            ..StudyConfig::default()
        };
        assert_err_contains(
            run_study(Study::KaldorPhase, &config),
            "with h = 0.02 needs more than 10000000 samples",
        );
    }
}
