use crate::solvers::MAX_SAMPLES;
use crate::traits::PlanarField;
use crate::trajectory::State;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A uniformly sampled closed interval `[min, max]`.
///
/// Fields missing from a deserialized axis fall back to `[0, 10]` with 600 samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl Axis {
    pub const fn new(min: f64, max: f64, samples: usize) -> Self {
        Self { min, max, samples }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            bail!(
                "Axis range must be finite with max > min (got [{}, {}]).",
                self.min,
                self.max
            );
        }
        if self.samples < 2 {
            bail!("Axis needs at least 2 samples (got {}).", self.samples);
        }
        if self.samples > MAX_SAMPLES {
            bail!(
                "Axis of {} samples exceeds the limit of {MAX_SAMPLES}.",
                self.samples
            );
        }
        Ok(())
    }

    pub fn step(&self) -> f64 {
        (self.max - self.min) / (self.samples.saturating_sub(1).max(1) as f64)
    }

    pub fn value(&self, index: usize) -> f64 {
        if index + 1 == self.samples {
            self.max
        } else {
            self.min + self.step() * index as f64
        }
    }

    /// Evenly spaced samples including both end points.
    pub fn values(&self) -> Vec<f64> {
        (0..self.samples).map(|i| self.value(i)).collect()
    }

    /// Midpoints between consecutive samples.
    pub fn midpoints(&self) -> Vec<f64> {
        let values = self.values();
        values.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// `start, start + step, ...` over the half-open range `[start, stop)`, each value
    /// rounded to `decimals` places.
    pub fn arange(start: f64, stop: f64, step: f64, decimals: i32) -> Result<Vec<f64>> {
        if !start.is_finite() || !stop.is_finite() || !step.is_finite() || step <= 0.0 {
            bail!("Range needs finite bounds and a positive step (got {start}..{stop} by {step}).");
        }
        if stop <= start {
            return Ok(Vec::new());
        }
        let scale = 10f64.powi(decimals);
        let span = ((stop - start) / step).ceil();
        if span > MAX_SAMPLES as f64 {
            bail!("Range {start}..{stop} by {step} exceeds {MAX_SAMPLES} values.");
        }
        let count = span as usize;
        Ok((0..count)
            .map(|i| ((start + step * i as f64) * scale).round() / scale)
            .collect())
    }
}

impl Default for Axis {
    fn default() -> Self {
        Self::new(0.0, 10.0, 600)
    }
}

/// A planar field evaluated on a rectangular grid.
///
/// `u` and `v` are row-major: entry `iy * xs.len() + ix` belongs to `(xs[ix], ys[iy])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSamples {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

impl FieldSamples {
    pub fn at(&self, ix: usize, iy: usize) -> Option<(f64, f64)> {
        if ix >= self.xs.len() || iy >= self.ys.len() {
            return None;
        }
        let idx = iy * self.xs.len() + ix;
        Some((self.u[idx], self.v[idx]))
    }
}

pub fn sample_field<F: PlanarField + ?Sized>(
    field: &F,
    x_axis: &Axis,
    y_axis: &Axis,
) -> Result<FieldSamples> {
    x_axis.validate()?;
    y_axis.validate()?;
    let xs = x_axis.values();
    let ys = y_axis.values();
    let mut u = Vec::with_capacity(xs.len() * ys.len());
    let mut v = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            let d = field.derivative(State::new(x, y));
            u.push(d.x);
            v.push(d.y);
        }
    }
    Ok(FieldSamples { xs, ys, u, v })
}

#[cfg(test)]
mod tests {
    use super::{sample_field, Axis};
    use crate::traits::FnField;

    #[test]
    fn values_hit_both_end_points() {
        let axis = Axis::new(-1.0, 4.0, 40);
        let values = axis.values();
        assert_eq!(values.len(), 40);
        assert_eq!(values[0], -1.0);
        assert_eq!(values[39], 4.0);
        assert!((axis.step() - 5.0 / 39.0).abs() < 1e-15);
    }

    #[test]
    fn validate_rejects_degenerate_axes() {
        assert!(Axis::new(1.0, 1.0, 10).validate().is_err());
        assert!(Axis::new(0.0, 1.0, 1).validate().is_err());
        assert!(Axis::new(f64::NAN, 1.0, 10).validate().is_err());
        assert!(Axis::new(0.0, 10.0, 600).validate().is_ok());
        assert!(Axis::new(0.0, 1.0, usize::MAX).validate().is_err());
    }

    #[test]
    fn midpoints_of_nine_segments() {
        let mids = Axis::new(0.0, 10.0, 9).midpoints();
        assert_eq!(mids.len(), 8);
        assert!((mids[0] - 0.625).abs() < 1e-12);
        assert!((mids[7] - 9.375).abs() < 1e-12);
    }

    #[test]
    fn arange_is_rounded_and_half_open() {
        let values = Axis::arange(0.1, 0.991, 0.005, 3).expect("range");
        assert_eq!(values.len(), 179);
        assert_eq!(values[0], 0.1);
        assert_eq!(values[1], 0.105);
        assert_eq!(values[178], 0.99);
        assert!(Axis::arange(0.0, 1.0, 0.0, 3).is_err());
        assert!(Axis::arange(0.0, 1.0e25, 1.0e-3, 3).is_err());
    }

    #[test]
    fn sample_field_is_row_major() {
        let field = FnField::new(|x: f64, _y: f64| x, |_x: f64, y: f64| 10.0 * y);
        let samples =
            sample_field(&field, &Axis::new(0.0, 2.0, 3), &Axis::new(0.0, 1.0, 2)).expect("sample");
        assert_eq!(samples.u.len(), 6);
        assert_eq!(samples.at(2, 0), Some((2.0, 0.0)));
        assert_eq!(samples.at(1, 1), Some((1.0, 10.0)));
        assert_eq!(samples.at(3, 0), None);
    }
}
