//! Renderer-agnostic figure payloads.
//!
//! A [`Figure`] is a titled pair of axes with an ordered stack of [`Layer`]s. Everything
//! serialises to JSON so that a web front end or a plotting script can draw it.

mod figures;

pub use figures::{
    divergence_panels, goodwin_orbit, kaldor_curves, kaldor_phase_portrait, kaldor_time_series,
    policy_modes, samuelson_responses, LabelledSeries,
};

use crate::contour::Segment;
use crate::grid::FieldSamples;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStyle {
    /// Streamlines through the sampled field.
    Stream,
    /// One arrow per sample.
    Quiver,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub origin: [f64; 2],
    pub delta: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub color: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum Layer {
    Line {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        points: Vec<[f64; 2]>,
        dashed: bool,
    },
    Markers {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        points: Vec<[f64; 2]>,
        shape: MarkerShape,
    },
    Arrows {
        color: String,
        arrows: Vec<Arrow>,
    },
    VectorField {
        style: FieldStyle,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        samples: FieldSamples,
    },
    Contour {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        segments: Vec<Segment>,
        dashed: bool,
    },
    Bars {
        bars: Vec<Bar>,
    },
    HorizontalRule {
        y: f64,
        dashed: bool,
    },
    VerticalRule {
        x: f64,
        dashed: bool,
    },
}

impl Layer {
    pub fn line(label: impl Into<String>, points: Vec<[f64; 2]>) -> Self {
        Layer::Line {
            label: Some(label.into()),
            points,
            dashed: false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Line { .. } => "line",
            Layer::Markers { .. } => "markers",
            Layer::Arrows { .. } => "arrows",
            Layer::VectorField { .. } => "vector_field",
            Layer::Contour { .. } => "contour",
            Layer::Bars { .. } => "bars",
            Layer::HorizontalRule { .. } => "horizontal_rule",
            Layer::VerticalRule { .. } => "vertical_rule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
    pub layers: Vec<Layer>,
}

impl Figure {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            x_range: None,
            y_range: None,
            layers: Vec::new(),
        }
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some([min, max]);
        self
    }

    pub fn y_range(mut self, min: f64, max: f64) -> Self {
        self.y_range = Some([min, max]);
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn layers_of(&self, kind: &str) -> impl Iterator<Item = &Layer> + '_ {
        let kind = kind.to_owned();
        self.layers.iter().filter(move |l| l.kind() == kind)
    }
}
