use super::{Arrow, Bar, FieldStyle, Figure, Layer, MarkerShape};
use crate::contour::zero_contour;
use crate::equilibrium::{Equilibrium, Stability};
use crate::grid::{sample_field, Axis};
use crate::models::goodwin::GoodwinCycle;
use crate::models::kaldor::{KaldorModel, PhaseWindow};
use crate::models::kaldor_curves::{Direction, DirectionMarker, KaldorCurves};
use crate::models::linear::{DivergenceWindow, LinearField};
use crate::models::policy::PolicyInstrument;
use crate::traits::PlanarField;
use crate::trajectory::{State, Trajectory};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A discrete-time path with its legend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledSeries {
    pub label: String,
    pub values: Vec<f64>,
}

pub fn goodwin_orbit(cycle: &GoodwinCycle) -> Result<Figure> {
    let orbit = cycle.orbit()?;
    let arrows = cycle
        .arrows()
        .into_iter()
        .map(|a| Arrow {
            origin: a.origin.to_array(),
            delta: a.delta.to_array(),
        })
        .collect();
    Ok(Figure::new("goodwin-orbit", "Goodwin cycle: employment and wage share")
        .labels("Employment rate (x)", "Wage share (y)")
        .layer(Layer::line(
            "Employment / wage-share orbit",
            orbit.iter().map(|s| s.to_array()).collect(),
        ))
        .layer(Layer::HorizontalRule {
            y: 0.0,
            dashed: false,
        })
        .layer(Layer::VerticalRule {
            x: 0.0,
            dashed: false,
        })
        .layer(Layer::Arrows {
            color: "red".to_owned(),
            arrows,
        }))
}

/// Stream field, both nullclines, the thinned trajectory and the `div = 0` curve.
pub fn kaldor_phase_portrait(
    model: &KaldorModel,
    window: &PhaseWindow,
    trajectory: &Trajectory,
) -> Result<Figure> {
    let samples = sample_field(model, &window.income, &window.capital)
        .context("Sampling the Kaldor vector field")?;
    let income_nullcline = zero_contour(&window.income, &window.capital, 0.0, |y, k| {
        model.derivative(State::new(y, k)).x
    })?;
    let capital_nullcline = zero_contour(&window.income, &window.capital, 0.0, |y, k| {
        model.derivative(State::new(y, k)).y
    })?;
    let divergence_zero = zero_contour(&window.income, &window.capital, 0.0, |y, k| {
        model.divergence(State::new(y, k))
    })?;
    let thinned = trajectory.thinned(window.trajectory_stride);

    Ok(Figure::new(
        "kaldor-phase",
        "Two-variable Kaldor phase portrait: divergence sign change",
    )
    .labels("Y (income)", "K (capital)")
    .x_range(window.income.min, window.income.max)
    .y_range(window.capital.min, window.capital.max)
    .layer(Layer::VectorField {
        style: FieldStyle::Stream,
        color: None,
        samples,
    })
    .layer(Layer::Contour {
        label: Some("dY/dt = 0".to_owned()),
        segments: income_nullcline,
        dashed: false,
    })
    .layer(Layer::Contour {
        label: Some("dK/dt = 0".to_owned()),
        segments: capital_nullcline,
        dashed: true,
    })
    .layer(Layer::Line {
        label: Some("trajectory".to_owned()),
        points: thinned.iter().map(|s| s.to_array()).collect(),
        dashed: false,
    })
    .layer(Layer::Contour {
        label: Some("div = 0".to_owned()),
        segments: divergence_zero,
        dashed: false,
    }))
}

pub fn kaldor_time_series(trajectory: &Trajectory) -> Figure {
    let times: Vec<f64> = trajectory.times().collect();
    let income = times
        .iter()
        .zip(trajectory.states())
        .map(|(&t, s)| [t, s.x])
        .collect();
    let capital = times
        .iter()
        .zip(trajectory.states())
        .map(|(&t, s)| [t, s.y])
        .collect();
    Figure::new("kaldor-time-series", "Income and capital over time")
        .labels("Time", "Level")
        .layer(Layer::line("Y(t)", income))
        .layer(Layer::line("K(t)", capital))
}

/// Investment and saving curves with their intersections and the sign of `dY/dt`
/// between them. Stable equilibria get a circle, unstable ones a cross.
pub fn kaldor_curves(
    curves: &KaldorCurves,
    domain: &Axis,
    equilibria: &[Equilibrium],
    markers: &[DirectionMarker],
) -> Result<Figure> {
    domain.validate()?;
    let incomes = domain.values();
    let investment = incomes.iter().map(|&y| [y, curves.investment(y)]).collect();
    let saving = incomes.iter().map(|&y| [y, curves.saving(y)]).collect();
    let at_curve = |stability: Stability| -> Vec<[f64; 2]> {
        equilibria
            .iter()
            .filter(|e| e.stability == stability)
            .map(|e| [e.location, curves.investment(e.location)])
            .collect()
    };
    let arrows = markers
        .iter()
        .map(|m| Arrow {
            origin: [m.income, 0.02],
            delta: [
                0.0,
                match m.direction {
                    Direction::Rising => 0.07,
                    Direction::Falling => -0.07,
                },
            ],
        })
        .collect();

    Ok(Figure::new(
        "kaldor-curves",
        "Nonlinear Kaldor curves with dY/dt = I(Y) - S(Y)",
    )
    .labels("Y (income)", "I(Y), S(Y)")
    .x_range(domain.min, domain.max)
    .y_range(0.0, 1.6)
    .layer(Layer::line("I(Y) investment", investment))
    .layer(Layer::line("S(Y) saving", saving))
    .layer(Layer::Markers {
        label: Some("stable equilibrium".to_owned()),
        points: at_curve(Stability::Stable),
        shape: MarkerShape::Circle,
    })
    .layer(Layer::Markers {
        label: Some("unstable equilibrium".to_owned()),
        points: at_curve(Stability::Unstable),
        shape: MarkerShape::Cross,
    })
    .layer(Layer::Arrows {
        color: "black".to_owned(),
        arrows,
    }))
}

/// Shock responses over periods `0, 1, ...` with a dashed zero line.
pub fn samuelson_responses(id: &str, title: &str, series: &[LabelledSeries]) -> Figure {
    series
        .iter()
        .fold(
            Figure::new(id, title).labels("Period (t)", "Deviation from equilibrium"),
            |figure, s| {
                figure.layer(Layer::line(
                    s.label.clone(),
                    s.values
                        .iter()
                        .enumerate()
                        .map(|(t, &y)| [t as f64, y])
                        .collect(),
                ))
            },
        )
        .layer(Layer::HorizontalRule {
            y: 0.0,
            dashed: true,
        })
}

pub fn policy_modes(instruments: &[PolicyInstrument]) -> Figure {
    let bars = instruments
        .iter()
        .map(|i| Bar {
            label: format!("{} ({})", i.name, i.mode.label()),
            color: i.mode.color().to_owned(),
            value: 1.0,
        })
        .collect();
    Figure::new("policy-modes", "Two policy modes: brake vs. accelerate")
        .x_range(0.0, 1.0)
        .layer(Layer::Bars { bars })
}

/// Quiver plots of a source (positive divergence) and a sink (negative divergence).
pub fn divergence_panels(window: &DivergenceWindow) -> Result<Vec<Figure>> {
    let panel = |id: &str, title: &str, field: LinearField, color: &str| -> Result<Figure> {
        let samples = sample_field(&field, &window.x, &window.y)?;
        Ok(Figure::new(id, title)
            .x_range(window.x.min, window.x.max)
            .y_range(window.y.min, window.y.max)
            .layer(Layer::VectorField {
                style: FieldStyle::Quiver,
                color: Some(color.to_owned()),
                samples,
            }))
    };
    Ok(vec![
        panel(
            "divergence-source",
            "Positive divergence (source)",
            LinearField::source(),
            "tab:red",
        )?,
        panel(
            "divergence-sink",
            "Negative divergence (sink)",
            LinearField::sink(),
            "tab:blue",
        )?,
    ])
}
